use std::f64::consts::PI;

use super::math::Vec3;

/// Point light radiating uniformly in every direction.
#[derive(Debug, Clone, Copy)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
    pub brightness: f64,
}

impl Light {
    pub fn new(position: Vec3, color: Vec3, brightness: f64) -> Light {
        Light {
            position,
            color,
            brightness,
        }
    }

    /// Light arriving at a point displaced from the light by `to_light`,
    /// spread over the sphere of that radius. A point sitting on the light
    /// itself receives the undiluted color instead of an infinity.
    pub fn emitted_light(&self, to_light: Vec3) -> Vec3 {
        let squared_distance = to_light.squared_len();
        if squared_distance < 1e-12 {
            return self.color * self.brightness;
        }
        self.color * (self.brightness / (4.0 * PI * squared_distance))
    }
}
