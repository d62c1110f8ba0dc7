//! Implementation of a 3-dimensional Ray.

use glam::Vec3A;

/// A 3-dimensional Ray
///
/// The crucial parts of the Ray are its origin and direction;
/// these two members are the primary way to determine an intersection with a [`Geometry`](crate::hittables::Geometry).
/// The direction is not required to be normalized.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ray {
    pub origin: Vec3A,
    pub direction: Vec3A,
}

impl std::fmt::Display for Ray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("({} -> {})", self.origin, self.direction))
    }
}

impl Ray {
    /// Creates a new Ray.
    pub fn new(origin: Vec3A, direction: Vec3A) -> Self {
        Self { origin, direction }
    }

    /// Returns a position in 3D space along the ray.
    ///
    /// Performs the following calculation: `position = origin + t * direction`
    pub fn at(&self, t: f32) -> Vec3A {
        self.origin + t * self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_distance() {
        let r = Ray::new(Vec3A::ZERO, Vec3A::Z);
        let result = r.at(0.0);
        assert_eq!(
            r.origin, result,
            "Ray starting at {} did not return {} when computing .at(0.0), position was {}",
            r.origin, r.origin, result
        )
    }

    #[test]
    fn scales_unnormalized_direction() {
        let r = Ray::new(Vec3A::ONE, Vec3A::new(0.0, 2.0, 0.0));
        assert_eq!(r.at(1.5), Vec3A::new(1.0, 4.0, 1.0));
    }
}
