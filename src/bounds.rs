//! Implementation of bounding volumes

use glam::Vec3A;

use crate::ray::Ray;

/// An axis aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3A,
    pub max: Vec3A,
}

impl BoundingBox {
    /// Creates a new Axis aligned bounding box
    ///
    /// The corners may be given in any order; they are sorted componentwise.
    pub fn new(p0: Vec3A, p1: Vec3A) -> Self {
        Self {
            min: p0.min(p1),
            max: p0.max(p1),
        }
    }

    /// Creates a zero-extent box located at `point`.
    pub fn degenerate(point: Vec3A) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Returns whether or not the ray hits this bounding box.
    ///
    /// Checks for slab intersection in each of the 3 dimensions, tightening
    /// `[t_min, t_max]` axis by axis. A zero direction component yields infinite
    /// crossings, which the min/max ordering handles as-is.
    pub fn hit(&self, ray: &Ray, mut t_min: f32, mut t_max: f32) -> bool {
        let inverse_dir = ray.direction.recip();
        let diff0 = self.min - ray.origin;
        let diff1 = self.max - ray.origin;

        // Check for slab intersection in each dimension
        for axis_idx in 0..3 {
            let inverse_dir = inverse_dir[axis_idx];
            let t0 = diff0[axis_idx] * inverse_dir;
            let t1 = diff1[axis_idx] * inverse_dir;

            // swap if inverted
            let (t0, t1) = if inverse_dir < 0.0 {
                (t1, t0)
            } else {
                (t0, t1)
            };

            t_min = t0.max(t_min);
            t_max = t1.min(t_max);
            if t_max <= t_min {
                return false;
            }
        }

        true
    }

    /// Returns a bounding box enclosing this and the other box.
    ///
    /// In other words, combines the two boxes by taking:
    /// * the minimums of the two boxes' min members
    /// * the maximums of the two boxes' max members
    pub fn union(&self, other: BoundingBox) -> BoundingBox {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns a bounding box enclosing this box and `point`.
    pub fn add_point(&self, point: Vec3A) -> BoundingBox {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Grows the box by `delta` on every side.
    pub fn pad(&self, delta: f32) -> BoundingBox {
        Self {
            min: self.min - Vec3A::splat(delta),
            max: self.max + Vec3A::splat(delta),
        }
    }

    pub fn centroid(&self) -> Vec3A {
        0.5 * (self.min + self.max)
    }

    /// The eight corners of the box.
    pub fn corners(&self) -> [Vec3A; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3A::new(lo.x, lo.y, lo.z),
            Vec3A::new(lo.x, lo.y, hi.z),
            Vec3A::new(lo.x, hi.y, lo.z),
            Vec3A::new(lo.x, hi.y, hi.z),
            Vec3A::new(hi.x, lo.y, lo.z),
            Vec3A::new(hi.x, lo.y, hi.z),
            Vec3A::new(hi.x, hi.y, lo.z),
            Vec3A::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Returns whether `other` lies entirely inside this box (boundaries included).
    pub fn contains(&self, other: &Self) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    pub fn inside(&self, point: Vec3A) -> bool {
        self.max.cmpge(point).all() && self.min.cmple(point).all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    fn random_box(rng: &mut impl Rng) -> BoundingBox {
        let p0 = Vec3A::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0));
        let p1 = Vec3A::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0));
        BoundingBox::new(p0, p1)
    }

    #[test]
    fn new_orders_corners() {
        let b = BoundingBox::new(Vec3A::new(1.0, -1.0, 3.0), Vec3A::new(-1.0, 2.0, 0.0));
        assert!(b.min.cmple(b.max).all(), "min {} exceeds max {}", b.min, b.max);
    }

    #[test]
    fn union_properties() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..200 {
            let a = random_box(&mut rng);
            let b = random_box(&mut rng);
            let c = random_box(&mut rng);

            let ab = a.union(b);
            assert!(ab.contains(&a) && ab.contains(&b), "{ab:?} must contain {a:?} and {b:?}");
            assert_eq!(ab, b.union(a), "union must be commutative");
            assert_eq!(ab.union(c), a.union(b.union(c)), "union must be associative");
            assert_eq!(a.union(a), a, "union must be idempotent");
        }
    }

    #[test]
    fn hit_through_center() {
        let b = BoundingBox::new(Vec3A::splat(-1.0), Vec3A::splat(1.0));
        let r = Ray::new(Vec3A::new(0.0, 0.0, -5.0), Vec3A::Z);
        assert!(b.hit(&r, 0.0, f32::INFINITY));
        // interval ends before the box is reached
        assert!(!b.hit(&r, 0.0, 3.0));
        // interval starts after the box is left
        assert!(!b.hit(&r, 7.0, f32::INFINITY));
    }

    #[test]
    fn axis_parallel_ray() {
        let b = BoundingBox::new(Vec3A::splat(-1.0), Vec3A::splat(1.0));
        // zero x and y direction components produce infinite slab crossings
        let inside_slab = Ray::new(Vec3A::new(0.5, 0.5, -5.0), Vec3A::Z);
        let outside_slab = Ray::new(Vec3A::new(2.0, 0.5, -5.0), Vec3A::Z);
        assert!(b.hit(&inside_slab, 0.0, f32::INFINITY));
        assert!(!b.hit(&outside_slab, 0.0, f32::INFINITY));
    }

    #[test]
    fn tightening_carries_across_axes() {
        // ray enters the x slab only after it has left the y slab
        let b = BoundingBox::new(Vec3A::ZERO, Vec3A::ONE);
        let r = Ray::new(Vec3A::new(-2.0, 0.5, 0.5), Vec3A::new(1.0, 1.0, 0.0));
        assert!(!b.hit(&r, 0.0, f32::INFINITY));
    }

    #[test]
    fn corners_are_inside() {
        let b = BoundingBox::new(Vec3A::new(-1.0, 0.0, 2.0), Vec3A::new(3.0, 1.0, 4.0));
        for corner in b.corners() {
            assert!(b.inside(corner), "{corner} outside {b:?}");
        }
        assert_eq!(b.centroid(), Vec3A::new(1.0, 0.5, 3.0));
    }
}
