use super::{Ray, Vec3};

/// Axis-aligned bounding box stored as componentwise min/max corners.
/// An empty box has `min > max` on every axis and absorbs nothing until a
/// point is included.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn empty() -> Aabb {
        Aabb {
            min: Vec3::one() * f64::INFINITY,
            max: Vec3::one() * f64::NEG_INFINITY,
        }
    }

    pub fn from_min_max(min: Vec3, max: Vec3) -> Aabb {
        Aabb { min, max }
    }

    pub fn from_point(point: Vec3) -> Aabb {
        Aabb {
            min: point,
            max: point,
        }
    }

    /// Grow the box to contain the point.
    pub fn include(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Index of the axis along which the box is widest.
    pub fn largest_axis(&self) -> usize {
        let size = self.size();
        if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        }
    }

    /// Slab test against the ray. Returns the parameter where the ray enters
    /// the box (clamped to zero when the origin is inside), or `None` when
    /// the ray misses the box or the box lies entirely behind the origin.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f64> {
        let dirfrac = Vec3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );
        let relative_min = self.min - ray.origin;
        let relative_max = self.max - ray.origin;
        let t1 = relative_min.x * dirfrac.x;
        let t2 = relative_max.x * dirfrac.x;
        let t3 = relative_min.y * dirfrac.y;
        let t4 = relative_max.y * dirfrac.y;
        let t5 = relative_min.z * dirfrac.z;
        let t6 = relative_max.z * dirfrac.z;

        let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
        let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

        // if tmax < 0 the ray (as a line) crosses the box, but the whole box is behind us
        if tmax < 0.0 {
            return None;
        }
        // if tmin > tmax the ray doesn't cross the box at all
        if tmin > tmax {
            return None;
        }
        Some(tmin.max(0.0))
    }
}
