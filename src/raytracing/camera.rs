use image::{Rgb, RgbImage};

use super::math::Vec3;

/// Pinhole camera owning the film it exposes. Pixel (0, 0) is the top-left
/// corner of the image; `world_position` maps a pixel to the center of its
/// cell on the film plane sitting `film_distance` in front of the camera.
pub struct Camera {
    pub position: Vec3,
    forward: Vec3,
    up: Vec3,
    right: Vec3,
    film_distance: f64,
    film_size: (f64, f64),
    number_pixels: (u32, u32),
    pixels: Vec<Vec3>,
}

const DEFAULT_VERTICAL_FOV_DEGREES: f64 = 60.0;

impl Camera {
    /// Creates a camera that looks at a specific point from a specific
    /// position. The point is referred to be the center of the screen.
    pub fn look_at(position: Vec3, point: Vec3) -> Camera {
        let world_up = Vec3::y_axis();
        let forward = (point - position).normalize();
        let mut right = forward.cross(world_up);
        if right.len() < 1e-9 {
            // looking straight up or down, any horizontal works
            right = Vec3::x_axis();
        }
        let right = right.normalize();
        // recompute up so the three vectors form an orthonormal base
        let up = right.cross(forward).normalize();
        Camera {
            position,
            forward,
            up,
            right,
            film_distance: 1.0,
            film_size: (0.0, 0.0),
            number_pixels: (0, 0),
            pixels: Vec::new(),
        }
    }

    /// Creates a camera positioned at zero looking toward the negative z axis.
    pub fn default_view() -> Camera {
        Camera::look_at(Vec3::zero(), Vec3::z_axis() * -1.0)
    }

    /// Size the film from the pixel grid, keeping the configured vertical
    /// field of view and the grid's aspect ratio, and allocate the film.
    pub fn set_resolution(&mut self, width: u32, height: u32) {
        let fov = DEFAULT_VERTICAL_FOV_DEGREES.to_radians();
        let film_height = 2.0 * self.film_distance * (fov / 2.0).tan();
        let film_width = film_height * width as f64 / height as f64;
        self.film_size = (film_width, film_height);
        self.number_pixels = (width, height);
        self.pixels = vec![Vec3::zero(); (width * height) as usize];
    }

    pub fn number_pixels(&self) -> (u32, u32) {
        self.number_pixels
    }

    /// World position of the center of a pixel's film cell.
    pub fn world_position(&self, pixel: (u32, u32)) -> Vec3 {
        self.cell_position(pixel, (0.0, 0.0))
    }

    /// World position of a point inside a pixel's film cell, displaced from
    /// the center by an offset in units of one cell (so both offset
    /// components live in (-0.5, 0.5)).
    pub fn cell_position(&self, pixel: (u32, u32), offset: (f64, f64)) -> Vec3 {
        let (width, height) = self.number_pixels;
        let u = (pixel.0 as f64 + 0.5 + offset.0) / width as f64 - 0.5;
        let v = 0.5 - (pixel.1 as f64 + 0.5 + offset.1) / height as f64;
        let film_center = self.position + self.forward * self.film_distance;
        film_center + self.right * (u * self.film_size.0) + self.up * (v * self.film_size.1)
    }

    pub fn set_pixel(&mut self, pixel: (u32, u32), color: Vec3) {
        let index = (pixel.1 * self.number_pixels.0 + pixel.0) as usize;
        self.pixels[index] = color;
    }

    pub fn pixel(&self, pixel: (u32, u32)) -> Vec3 {
        let index = (pixel.1 * self.number_pixels.0 + pixel.0) as usize;
        self.pixels[index]
    }

    /// Convert the film to an 8 bit image, optionally gamma correcting the
    /// linear colors first.
    pub fn to_image(&self, gamma_correction: bool) -> RgbImage {
        let (width, height) = self.number_pixels;
        let mut buffer = RgbImage::new(width, height);
        for (x, y, pixel) in buffer.enumerate_pixels_mut() {
            let mut color = self.pixel((x, y));
            if gamma_correction {
                color = Vec3::new(
                    gamma_correct(color.x),
                    gamma_correct(color.y),
                    gamma_correct(color.z),
                );
            }
            *pixel = to_rgb(color);
        }
        buffer
    }
}

fn gamma_correct(value: f64) -> f64 {
    if value > 0.0 {
        value.powf(1.0 / 2.2)
    } else {
        0.0
    }
}

fn to_rgb(color: Vec3) -> Rgb<u8> {
    let channel = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgb([channel(color.x), channel(color.y), channel(color.z)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_pixel_maps_to_film_center() {
        let mut camera = Camera::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::zero());
        camera.set_resolution(11, 11);
        let center = camera.world_position((5, 5));
        // film plane sits one unit toward the target
        assert!((center - Vec3::new(0.0, 0.0, 4.0)).len() < 1e-10);
    }

    #[test]
    fn test_pixel_axes_follow_screen_directions() {
        let mut camera = Camera::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::zero());
        camera.set_resolution(10, 10);
        let left = camera.world_position((0, 5));
        let right = camera.world_position((9, 5));
        assert!(left.x < right.x);
        let top = camera.world_position((5, 0));
        let bottom = camera.world_position((5, 9));
        assert!(top.y > bottom.y);
    }

    #[test]
    fn test_set_and_read_pixel() {
        let mut camera = Camera::default_view();
        camera.set_resolution(4, 3);
        camera.set_pixel((2, 1), Vec3::new(0.25, 0.5, 0.75));
        assert_eq!(camera.pixel((2, 1)), Vec3::new(0.25, 0.5, 0.75));
        assert_eq!(camera.pixel((0, 0)), Vec3::zero());
    }

    #[test]
    fn test_to_image_clamps_and_converts() {
        let mut camera = Camera::default_view();
        camera.set_resolution(2, 1);
        camera.set_pixel((0, 0), Vec3::new(2.0, -1.0, 0.5));
        let image = camera.to_image(false);
        assert_eq!(image.dimensions(), (2, 1));
        let pixel = image.get_pixel(0, 0);
        assert_eq!(pixel[0], 255);
        assert_eq!(pixel[1], 0);
        assert_eq!(pixel[2], 128);
    }

    #[test]
    fn test_gamma_correction_brightens_midtones() {
        let mut camera = Camera::default_view();
        camera.set_resolution(1, 1);
        camera.set_pixel((0, 0), Vec3::one() * 0.5);
        let plain = camera.to_image(false).get_pixel(0, 0)[0];
        let corrected = camera.to_image(true).get_pixel(0, 0)[0];
        assert!(corrected > plain);
    }
}
