pub mod raytracing;

pub use raytracing::camera::Camera;
pub use raytracing::hierarchy::Hierarchy;
pub use raytracing::light::Light;
pub use raytracing::math::{Aabb, Ray, Vec3};
pub use raytracing::mesh::{Mesh, MeshError};
pub use raytracing::object::{Hit, Intersection, Object, Part, SMALL_T};
pub use raytracing::parser::{ParseError, ParsedScene, SceneParser};
pub use raytracing::shader::{FlatShader, PhongShader, ReflectiveShader, Shader};
pub use raytracing::sphere::Sphere;
pub use raytracing::world::{RenderOptions, Scene, SceneObject};
