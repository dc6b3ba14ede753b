use crate::matrix::Matrix4;
use crate::point::Point3;
use crate::ray::Ray;
use crate::vector::Vector3;

use serde::Deserialize;

// Arbitrary world up used to build the view basis; the configured tilt
// angle handles camera roll independently of this choice.
fn world_up() -> Vector3 {
    Vector3::new(0.0, 1.0, 0.0)
}

#[derive(Deserialize)]
pub struct Camera {
    aspect_ratio: f64,
    image_width: u32,
    vertical_fov_degrees: f64,
    centre: Point3,
    look_at: Point3,
    #[serde(default)]
    tilt_angle_degrees: f64,
    focus_dist: f64,
    samples_per_pixel: u32,
    max_bounces: u32,

    #[serde(skip)]
    image_height: u32,
    #[serde(skip, default = "Point3::origin")]
    upper_left: Point3,
    #[serde(skip, default = "Vector3::new_empty")]
    delta_u: Vector3,
    #[serde(skip, default = "Vector3::new_empty")]
    delta_v: Vector3,
}

impl Camera {
    pub fn new(
        aspect_ratio: f64,
        image_width: u32,
        vertical_fov_degrees: f64,
        centre: Point3,
        look_at: Point3,
        tilt_angle_degrees: f64,
        focus_dist: f64,
        samples_per_pixel: u32,
        max_bounces: u32,
    ) -> Camera {
        let mut camera = Camera {
            aspect_ratio,
            image_width,
            vertical_fov_degrees,
            centre,
            look_at,
            tilt_angle_degrees,
            focus_dist,
            samples_per_pixel,
            max_bounces,
            image_height: 1,
            upper_left: Point3::origin(),
            delta_u: Vector3::new_empty(),
            delta_v: Vector3::new_empty(),
        };
        camera.init();
        camera
    }

    // Called once after construction or deserialization (see scene.rs),
    // since serde has no post-init hook to run this automatically.
    pub fn init(&mut self) {
        self.image_height = std::cmp::max(1, (self.image_width as f64 / self.aspect_ratio) as u32);

        let w = (self.centre - self.look_at).normalized();
        let u = world_up().cross(w).normalized();
        let v = -w.cross(u);

        let h = (self.vertical_fov_degrees.to_radians() / 2.0_f64).tan();
        let viewport_height = 2.0_f64 * h * self.focus_dist;
        let viewport_width =
            viewport_height * (self.image_width as f64) / (self.image_height as f64);

        let viewport_u = u * viewport_width;
        let viewport_v = v * viewport_height;

        let mut delta_u = viewport_u / (self.image_width as f64);
        let mut delta_v = viewport_v / (self.image_height as f64);

        if self.tilt_angle_degrees != 0.0_f64 {
            let tilt = Matrix4::new_rotation(&w, self.tilt_angle_degrees.to_radians());
            delta_u = &tilt * delta_u;
            delta_v = &tilt * delta_v;
        }

        self.upper_left = self.centre - (w * self.focus_dist) - viewport_u / 2.0_f64
            - viewport_v / 2.0_f64
            + (delta_u + delta_v) * 0.5_f64;
        self.delta_u = delta_u;
        self.delta_v = delta_v;
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }

    pub fn max_bounces(&self) -> u32 {
        self.max_bounces
    }

    // Configuration errors are rejected before the first scanline is
    // rendered rather than surfacing as a mid-render panic.
    pub fn validate(&self) -> Result<(), String> {
        if self.image_width == 0 {
            return Err(String::from("Camera image_width must be greater than zero."));
        }
        if self.aspect_ratio <= 0.0_f64 {
            return Err(String::from("Camera aspect_ratio must be positive."));
        }
        if self.samples_per_pixel == 0 {
            return Err(String::from(
                "Camera samples_per_pixel must be greater than zero.",
            ));
        }
        if self.max_bounces == 0 {
            return Err(String::from(
                "Camera max_bounces must be greater than zero.",
            ));
        }
        Ok(())
    }

    // Stratified antialiasing: sample index `s` picks one of 4 subpixel
    // quadrants (via s mod 4), each jittered within its own [0, 1/2) cell
    // with a per-quadrant sign so the 4 base samples cover the whole pixel
    // centred on upper_left + i*delta_u + j*delta_v, not just one corner.
    pub fn get_ray(&self, i: u32, j: u32, s: u32) -> Ray {
        let base_i = rand::random::<f64>() * 0.5_f64;
        let base_j = rand::random::<f64>() * 0.5_f64;
        let (ioff, joff) = match s % 4 {
            0 => (base_i, base_j),
            1 => (-base_i, base_j),
            2 => (base_i, -base_j),
            _ => (-base_i, -base_j),
        };

        let pixel_sample =
            self.upper_left + self.delta_u * (i as f64 + ioff) + self.delta_v * (j as f64 + joff);
        Ray::new(self.centre, pixel_sample - self.centre)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_height_follows_aspect_ratio() {
        let cam = Camera::new(
            2.0,
            200,
            90.0,
            Point3::origin(),
            Point3::new(0.0, 0.0, -1.0),
            0.0,
            1.0,
            1,
            1,
        );
        assert_eq!(cam.image_height(), 100);
    }

    #[test]
    fn center_ray_points_toward_look_at() {
        let cam = Camera::new(
            1.0,
            100,
            90.0,
            Point3::origin(),
            Point3::new(0.0, 0.0, -1.0),
            0.0,
            1.0,
            1,
            1,
        );
        let r = cam.get_ray(50, 50, 0);
        assert!(r.dir.z() < 0.0_f64);
        assert!(r.dir.x().abs() < 0.1_f64);
        assert!(r.dir.y().abs() < 0.1_f64);
    }
}
