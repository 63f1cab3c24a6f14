use std::sync::Arc;

use super::math::{Ray, Vec3};
use super::world::Scene;

/// Computes the color of a surface point. Shaders receive the scene so they
/// can walk the lights and cast further rays back through
/// [`Scene::cast_ray`] for reflections and shadows; every re-entry must pass
/// `recursion_depth + 1` so the caster can bound the nesting.
pub trait Shader {
    fn shade_surface(
        &self,
        scene: &Scene,
        ray: &Ray,
        intersection_point: Vec3,
        normal: Vec3,
        recursion_depth: u32,
    ) -> Vec3;
}

/// Constant color regardless of lighting. Also used as the background
/// shader, where it is evaluated with a zero point and normal.
#[derive(Debug, Clone, Copy)]
pub struct FlatShader {
    pub color: Vec3,
}

impl Shader for FlatShader {
    fn shade_surface(
        &self,
        _scene: &Scene,
        _ray: &Ray,
        _intersection_point: Vec3,
        _normal: Vec3,
        _recursion_depth: u32,
    ) -> Vec3 {
        self.color
    }
}

/// Classic ambient + diffuse + specular shading with optional shadow rays.
#[derive(Debug, Clone, Copy)]
pub struct PhongShader {
    pub color_ambient: Vec3,
    pub color_diffuse: Vec3,
    pub color_specular: Vec3,
    pub specular_power: f64,
}

impl Shader for PhongShader {
    fn shade_surface(
        &self,
        scene: &Scene,
        ray: &Ray,
        intersection_point: Vec3,
        normal: Vec3,
        _recursion_depth: u32,
    ) -> Vec3 {
        let mut color = self.color_ambient * scene.ambient_color * scene.ambient_intensity;

        for light in &scene.lights {
            let to_light = light.position - intersection_point;

            if scene.enable_shadows {
                // an object strictly between the point and the light blocks it;
                // anything beyond the light does not
                let shadow_ray = Ray::new(intersection_point, to_light);
                if let Some(occluder) = scene.closest_intersection(&shadow_ray) {
                    if occluder.dist < to_light.len() {
                        continue;
                    }
                }
            }

            let emitted = light.emitted_light(to_light);
            let light_direction = to_light.normalize();

            let diffuse_intensity = normal.dot(light_direction).max(0.0);
            color += emitted * self.color_diffuse * diffuse_intensity;

            // mirror the light direction around the normal and compare with
            // the direction back to the viewer
            let reflected = normal * (2.0 * normal.dot(light_direction)) - light_direction;
            let to_viewer = ray.direction * -1.0;
            let specular_intensity = to_viewer
                .dot(reflected)
                .max(0.0)
                .powf(self.specular_power);
            color += emitted * self.color_specular * specular_intensity;
        }

        color
    }
}

/// Mixes an underlying shader with the color arriving along the mirrored
/// ray. The bounced ray re-enters the caster one recursion level deeper.
pub struct ReflectiveShader {
    pub shader: Arc<dyn Shader>,
    pub reflectivity: f64,
}

impl Shader for ReflectiveShader {
    fn shade_surface(
        &self,
        scene: &Scene,
        ray: &Ray,
        intersection_point: Vec3,
        normal: Vec3,
        recursion_depth: u32,
    ) -> Vec3 {
        let base =
            self.shader
                .shade_surface(scene, ray, intersection_point, normal, recursion_depth);
        let bounced = Ray::new(intersection_point, ray.direction.reflect(normal));
        let reflected_color = scene.cast_ray(&bounced, recursion_depth + 1);
        base * (1.0 - self.reflectivity) + reflected_color * self.reflectivity
    }
}
