use super::math::{Aabb, Ray, Vec3};
use super::object::{Intersection, Object, Part, SMALL_T};

#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f64) -> Sphere {
        Sphere { center, radius }
    }
}

impl Object for Sphere {
    fn intersect(&self, ray: &Ray, _part: Part) -> Option<Intersection> {
        if self.radius <= 0.0 {
            return None;
        }
        let oc = ray.origin - self.center;
        let a = ray.direction.dot(ray.direction);
        if a < 1e-12 {
            // zero-length direction, nothing to solve
            return None;
        }
        let b = 2.0 * ray.direction.dot(oc);
        let c = oc.dot(oc) - self.radius * self.radius;
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        // prefer the near root, fall back to the far one when the origin
        // sits inside the sphere or right on its surface
        let sqrt_discriminant = discriminant.sqrt();
        let t_near = (-b - sqrt_discriminant) / (2.0 * a);
        let t_far = (-b + sqrt_discriminant) / (2.0 * a);
        let dist = if t_near > SMALL_T {
            t_near
        } else if t_far > SMALL_T {
            t_far
        } else {
            return None;
        };
        Some(Intersection { dist, part: None })
    }

    fn normal(&self, point: Vec3, _part: Part) -> Vec3 {
        (point - self.center).normalize()
    }

    fn bounding_box(&self, _part: Part) -> Aabb {
        let extent = Vec3::one() * self.radius;
        Aabb::from_min_max(self.center - extent, self.center + extent)
    }

    fn number_parts(&self) -> usize {
        1
    }
}
