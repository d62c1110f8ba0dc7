//! Thin-lens perspective camera

use glam::Vec3A;
use rand::Rng;

use crate::{ray::Ray, utils::random::rand_vec3_in_unit_disk};

/// Generates primary rays for viewport coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    origin: Vec3A,
    lower_left_corner: Vec3A,
    horizontal: Vec3A,
    vertical: Vec3A,
    /// Right
    u: Vec3A,
    /// Up
    v: Vec3A,
    /// Backward
    w: Vec3A,
    lens_radius: f32,
}

impl Camera {
    /// Creates a new camera.
    ///
    /// * `vertical_fov` - vertical field of view, in degrees
    /// * `aspect_ratio` - viewport width over height
    /// * `aperture` - lens diameter, 0 for a pinhole camera
    /// * `focus_dist` - distance from `look_from` to the plane in perfect focus
    pub fn new(
        look_from: Vec3A,
        look_at: Vec3A,
        view_up: Vec3A,
        vertical_fov: f32,
        aspect_ratio: f32,
        aperture: f32,
        focus_dist: f32,
    ) -> Self {
        let theta = vertical_fov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = aspect_ratio * viewport_height;

        // degenerate inputs still give an orthonormal basis
        let w = (look_from - look_at).try_normalize().unwrap_or(Vec3A::Z);
        let u = view_up
            .cross(w)
            .try_normalize()
            .unwrap_or_else(|| {
                let helper = if w.x.abs() < 0.9 { Vec3A::X } else { Vec3A::Y };
                helper.cross(w).normalize()
            });
        let v = w.cross(u);

        let horizontal = focus_dist * viewport_width * u;
        let vertical = focus_dist * viewport_height * v;
        let lower_left_corner = look_from - horizontal / 2.0 - vertical / 2.0 - focus_dist * w;

        Self {
            origin: look_from,
            lower_left_corner,
            horizontal,
            vertical,
            u,
            v,
            w,
            lens_radius: aperture / 2.0,
        }
    }

    /// Returns the ray through viewport coordinates `(s, t)`, both in `[0, 1]`
    /// with `(0, 0)` at the lower left.
    ///
    /// Only a camera with a non-zero aperture draws from `rng`.
    pub fn get_ray<R: Rng + ?Sized>(&self, s: f32, t: f32, rng: &mut R) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * rand_vec3_in_unit_disk(rng);
            self.u * rd.x + self.v * rd.y
        } else {
            Vec3A::ZERO
        };

        let origin = self.origin + offset;
        Ray::new(
            origin,
            self.lower_left_corner + s * self.horizontal + t * self.vertical - origin,
        )
    }

    pub fn origin(&self) -> Vec3A {
        self.origin
    }

    /// Backward direction of the view, the opposite of where the camera looks.
    pub fn backward(&self) -> Vec3A {
        self.w
    }
}
