use super::Vec3;

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray from an origin and a direction. The direction is
    /// normalized so that `t` measures world-space distance along the ray.
    /// A zero direction cannot be normalized and is kept as is; every
    /// intersection routine resolves it to a miss.
    pub fn new(origin: Vec3, direction: Vec3) -> Ray {
        let len = direction.len();
        let direction = if len > 0.0 { direction / len } else { direction };
        Ray { origin, direction }
    }

    /// Point along the ray: `origin + t * direction`.
    pub fn at(self: &Self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }
}
