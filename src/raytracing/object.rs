use super::math::{Aabb, Ray, Vec3};

/// Hits closer than this along the ray are discarded, so a ray leaving a
/// surface never re-intersects it at its own origin (shadow acne).
pub const SMALL_T: f64 = 1e-4;

/// Sub-element index inside a composite object (a triangle inside a mesh).
/// `None` addresses the whole object.
pub type Part = Option<usize>;

/// Result of intersecting a ray with a single object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Ray parameter of the intersection point, always greater than [`SMALL_T`].
    pub dist: f64,
    /// Which sub-part was hit, when the object has distinguishable parts.
    pub part: Part,
}

/// Closest intersection found in a scene: which object, at what ray
/// parameter, which sub-part. The object field is an index into the scene's
/// object list and carries no ownership.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub object: usize,
    pub dist: f64,
    pub part: Part,
}

/// Capabilities every geometric object exposes to the ray caster.
pub trait Object {
    /// Test the ray against this object. When `part` is set only that
    /// sub-part is tested, otherwise the whole object; for a composite the
    /// closest sub-part wins. Intersections at `dist <= SMALL_T` are
    /// rejected, as is degenerate input (zero direction, flat geometry).
    fn intersect(&self, ray: &Ray, part: Part) -> Option<Intersection>;

    /// Outward unit normal at a point on the object's surface.
    fn normal(&self, point: Vec3, part: Part) -> Vec3;

    /// Axis-aligned bounds of one sub-part, or of the whole object.
    fn bounding_box(&self, part: Part) -> Aabb;

    /// How many independently intersectable sub-parts the object has.
    fn number_parts(&self) -> usize;
}
