use std::sync::Arc;

use log::{info, trace};
use rand::Rng;

use super::camera::Camera;
use super::hierarchy::Hierarchy;
use super::light::Light;
use super::math::{Ray, Vec3};
use super::object::{Hit, Object, SMALL_T};
use super::shader::{FlatShader, Shader};

/// A renderable object: geometry plus the shader evaluated where it is hit.
pub struct SceneObject {
    pub geometry: Box<dyn Object>,
    pub shader: Arc<dyn Shader>,
}

/// Knobs of a single render invocation.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Build and query the bounding volume hierarchy instead of scanning
    /// every object per ray. Either way the closest hit is the same.
    pub use_hierarchy: bool,
    /// Rays averaged per pixel; 1 shoots a single ray through the cell
    /// center, more than 1 jitters the rays inside the cell.
    pub sample_rate: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            use_hierarchy: true,
            sample_rate: 1,
        }
    }
}

/// The render world: owns every object, light and the background shader,
/// and drives the recursive ray casting over them.
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub lights: Vec<Light>,
    pub background_shader: Arc<dyn Shader>,
    pub ambient_color: Vec3,
    pub ambient_intensity: f64,
    pub enable_shadows: bool,
    pub recursion_depth_limit: u32,
    hierarchy: Option<Hierarchy>,
}

impl Scene {
    pub fn new() -> Scene {
        Scene {
            objects: Vec::new(),
            lights: Vec::new(),
            background_shader: Arc::new(FlatShader {
                color: Vec3::zero(),
            }),
            ambient_color: Vec3::one(),
            ambient_intensity: 0.0,
            enable_shadows: true,
            recursion_depth_limit: 3,
            hierarchy: None,
        }
    }

    /// Find the hit with the smallest `dist` over every object, skipping
    /// anything at or below [`SMALL_T`]. Delegates to the hierarchy when one
    /// has been built, which returns the identical hit faster.
    pub fn closest_intersection(&self, ray: &Ray) -> Option<Hit> {
        if let Some(hierarchy) = &self.hierarchy {
            return hierarchy.closest_intersection(&self.objects, ray);
        }
        let mut closest: Option<Hit> = None;
        for (index, object) in self.objects.iter().enumerate() {
            if let Some(intersection) = object.geometry.intersect(ray, None) {
                if intersection.dist <= SMALL_T {
                    continue;
                }
                if closest.map_or(true, |hit| intersection.dist < hit.dist) {
                    closest = Some(Hit {
                        object: index,
                        dist: intersection.dist,
                        part: intersection.part,
                    });
                }
            }
        }
        closest
    }

    /// Cast a ray and return the color of the closest intersected surface
    /// point, or the background color when nothing is hit or the recursion
    /// limit is exceeded. Shaders fan out from here by casting their own
    /// rays one level deeper, so the nesting can never outrun the limit.
    pub fn cast_ray(&self, ray: &Ray, recursion_depth: u32) -> Vec3 {
        if recursion_depth > self.recursion_depth_limit {
            return self.shade_background(ray, recursion_depth);
        }
        match self.closest_intersection(ray) {
            Some(hit) => {
                let object = &self.objects[hit.object];
                let intersection_point = ray.at(hit.dist);
                let normal = object.geometry.normal(intersection_point, hit.part);
                trace!(
                    "depth {}: object {} part {:?} at t {}",
                    recursion_depth,
                    hit.object,
                    hit.part,
                    hit.dist
                );
                object
                    .shader
                    .shade_surface(self, ray, intersection_point, normal, recursion_depth)
            }
            None => self.shade_background(ray, recursion_depth),
        }
    }

    fn shade_background(&self, ray: &Ray, recursion_depth: u32) -> Vec3 {
        self.background_shader
            .shade_surface(self, ray, Vec3::zero(), Vec3::zero(), recursion_depth)
    }

    /// Render every pixel of the camera's film. The hierarchy, when asked
    /// for, is built up front: construction must be finished before the
    /// first ray is traced, since tracing reads it without any locking.
    pub fn render(&mut self, camera: &mut Camera, options: &RenderOptions) {
        if options.use_hierarchy {
            let mut hierarchy = Hierarchy::new(&self.objects);
            hierarchy.reorder_entries();
            hierarchy.build_tree();
            self.hierarchy = Some(hierarchy);
        } else {
            self.hierarchy = None;
        }

        let (width, height) = camera.number_pixels();
        info!(
            "rendering {}x{} pixels over {} objects and {} lights",
            width,
            height,
            self.objects.len(),
            self.lights.len()
        );
        for j in 0..height {
            for i in 0..width {
                self.render_pixel(camera, (i, j), options.sample_rate);
            }
        }
    }

    /// Shoot the pixel's rays from the camera through its film cell and
    /// store the averaged color.
    pub fn render_pixel(&self, camera: &mut Camera, pixel: (u32, u32), sample_rate: u32) {
        let color = if sample_rate <= 1 {
            let direction = camera.world_position(pixel) - camera.position;
            self.cast_ray(&Ray::new(camera.position, direction), 1)
        } else {
            let mut rng = rand::thread_rng();
            let mut accumulated = Vec3::zero();
            for _ in 0..sample_rate {
                let offset = (rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5));
                let direction = camera.cell_position(pixel, offset) - camera.position;
                accumulated += self.cast_ray(&Ray::new(camera.position, direction), 1)
                    / sample_rate as f64;
            }
            accumulated
        };
        camera.set_pixel(pixel, color);
    }
}

impl Default for Scene {
    fn default() -> Self {
        Scene::new()
    }
}
