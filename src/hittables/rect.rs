//! Axis-aligned rectangles

use glam::{Vec2, Vec3A};

use crate::{bounds::BoundingBox, hittables::HitRecord, material::MaterialId, ray::Ray};

/// Thickness given to the flat side of a rectangle's box.
const BOX_PADDING: f32 = 1e-4;

/// Coordinate axis a rectangle is perpendicular to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The two in-plane axes, in `(u, v)` order.
    pub fn others(self) -> (usize, usize) {
        match self {
            Axis::X => (1, 2),
            Axis::Y => (0, 2),
            Axis::Z => (0, 1),
        }
    }

    pub fn unit(self) -> Vec3A {
        match self {
            Axis::X => Vec3A::X,
            Axis::Y => Vec3A::Y,
            Axis::Z => Vec3A::Z,
        }
    }
}

/// A rectangle lying on the plane `axis = k`.
#[derive(Debug, Clone, Copy)]
pub struct AxisRect {
    pub axis: Axis,
    pub k: f32,
    /// Lower corner in the in-plane axes
    pub min: Vec2,
    /// Upper corner in the in-plane axes
    pub max: Vec2,
    pub material: MaterialId,
}

impl AxisRect {
    /// Creates a rectangle on `axis = k`; the in-plane corners may be given in any order.
    pub fn new(axis: Axis, k: f32, corner0: Vec2, corner1: Vec2, material: MaterialId) -> Self {
        Self {
            axis,
            k,
            min: corner0.min(corner1),
            max: corner0.max(corner1),
            material,
        }
    }

    /// Rectangle on the plane `z = k`
    pub fn xy(x: (f32, f32), y: (f32, f32), k: f32, material: MaterialId) -> Self {
        Self::new(Axis::Z, k, Vec2::new(x.0, y.0), Vec2::new(x.1, y.1), material)
    }

    /// Rectangle on the plane `y = k`
    pub fn xz(x: (f32, f32), z: (f32, f32), k: f32, material: MaterialId) -> Self {
        Self::new(Axis::Y, k, Vec2::new(x.0, z.0), Vec2::new(x.1, z.1), material)
    }

    /// Rectangle on the plane `x = k`
    pub fn yz(y: (f32, f32), z: (f32, f32), k: f32, material: MaterialId) -> Self {
        Self::new(Axis::X, k, Vec2::new(y.0, z.0), Vec2::new(y.1, z.1), material)
    }

    pub fn hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<HitRecord> {
        let axis = self.axis.index();
        let (a_axis, b_axis) = self.axis.others();

        let t = (self.k - ray.origin[axis]) / ray.direction[axis];
        // also rejects the NaN of a ray lying in the plane
        if !(t >= t_min && t <= t_max) {
            return None;
        }

        let point = ray.at(t);
        let (a, b) = (point[a_axis], point[b_axis]);
        if a < self.min.x || a > self.max.x || b < self.min.y || b > self.max.y {
            return None;
        }

        let extent = self.max - self.min;
        let u = if extent.x > 0.0 { (a - self.min.x) / extent.x } else { 0.0 };
        let v = if extent.y > 0.0 { (b - self.min.y) / extent.y } else { 0.0 };

        Some(HitRecord::new(ray, t, self.axis.unit(), self.material, (u, v)))
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let axis = self.axis.index();
        let (a_axis, b_axis) = self.axis.others();

        let mut lo = Vec3A::ZERO;
        let mut hi = Vec3A::ZERO;
        lo[axis] = self.k - BOX_PADDING;
        hi[axis] = self.k + BOX_PADDING;
        lo[a_axis] = self.min.x;
        hi[a_axis] = self.max.x;
        lo[b_axis] = self.min.y;
        hi[b_axis] = self.max.y;

        BoundingBox::new(lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn hits_inside_bounds() {
        let rect = AxisRect::xy((0.0, 2.0), (0.0, 4.0), -1.0, MaterialId::from_raw(0));
        let ray = Ray::new(Vec3A::new(0.5, 1.0, 1.0), -Vec3A::Z);
        let rec = rect.hit(&ray, 0.001, f32::INFINITY).expect("ray aims at the rect");
        assert_abs_diff_eq!(rec.t, 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(rec.u, 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(rec.v, 0.25, epsilon = 1e-6);
        assert!(rec.front_face);
        assert_eq!(rec.normal, Vec3A::Z);
    }

    #[test]
    fn misses_outside_bounds_and_parallel_rays() {
        let rect = AxisRect::xz((0.0, 1.0), (0.0, 1.0), 0.0, MaterialId::from_raw(0));
        let outside = Ray::new(Vec3A::new(2.0, 1.0, 0.5), -Vec3A::Y);
        assert!(rect.hit(&outside, 0.001, f32::INFINITY).is_none());

        let parallel = Ray::new(Vec3A::new(0.5, 0.0, -1.0), Vec3A::Z);
        assert!(rect.hit(&parallel, 0.001, f32::INFINITY).is_none());
    }

    #[test]
    fn box_is_padded_on_plane_axis() {
        let rect = AxisRect::yz((1.0, 2.0), (3.0, 4.0), 5.0, MaterialId::from_raw(0));
        let bbox = rect.bounding_box();
        assert!(bbox.min.x < 5.0 && bbox.max.x > 5.0);
        assert_eq!((bbox.min.y, bbox.max.y), (1.0, 2.0));
        assert_eq!((bbox.min.z, bbox.max.z), (3.0, 4.0));
    }
}
