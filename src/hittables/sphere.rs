//! A sphere defined by its center and radius

use std::f32::consts::PI;

use glam::Vec3A;

use crate::{bounds::BoundingBox, hittables::HitRecord, material::MaterialId, ray::Ray};

#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    pub center: Vec3A,
    pub radius: f32,
    pub material: MaterialId,
}

impl Sphere {
    /// Creates a new sphere
    pub fn new(center: Vec3A, radius: f32, material: MaterialId) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }

    /// Returns the `(u, v)` coordinates of a point on the unit sphere.
    ///
    /// `u` is the angle around the Y axis measured from X=-1, `v` the angle from Y=-1 to Y=+1,
    /// both normalized to `[0, 1]`.
    pub fn uv(p: Vec3A) -> (f32, f32) {
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;
        (phi / (2.0 * PI), theta / PI)
    }

    pub fn hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<HitRecord> {
        let oc = ray.origin - self.center;
        let a = ray.direction.length_squared();
        let half_b = oc.dot(ray.direction);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrt_d = discriminant.sqrt();

        // nearest root in range, otherwise the far one
        let mut root = (-half_b - sqrt_d) / a;
        if root < t_min || root > t_max {
            root = (-half_b + sqrt_d) / a;
            if root < t_min || root > t_max {
                return None;
            }
        }

        let outward_normal = (ray.at(root) - self.center) / self.radius;
        Some(HitRecord::new(
            ray,
            root,
            outward_normal,
            self.material,
            Self::uv(outward_normal),
        ))
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let extent = Vec3A::splat(self.radius.abs());
        BoundingBox::new(self.center - extent, self.center + extent)
    }
}
