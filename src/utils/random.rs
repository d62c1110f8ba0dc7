//! Miscelleanous utilities related to random number generation and random sampling
//!
//! Relies on the [rand] and [rand_distr] crates

use glam::Vec3A;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, UnitDisc, UnitSphere};

/// Generates a random [Vec3A] on the surface of the unit sphere (radius 1).
///
/// wrapper function around [UnitSphere]'s `sample` method
pub fn rand_vec3_on_unit_sphere<R: Rng + ?Sized>(rng: &mut R) -> Vec3A {
    Vec3A::from_array(UnitSphere.sample(rng))
}

/// Generates a random [Vec3A] within the unit disk (radius 1) on the xy-plane.
///
/// wrapper function around [UnitDisc]'s `sample` method.
pub fn rand_vec3_in_unit_disk<R: Rng + ?Sized>(rng: &mut R) -> Vec3A {
    let [x, y] = UnitDisc.sample(rng);
    Vec3A::new(x, y, 0.0)
}

/// Creates the generator for one scanline of a render.
///
/// Every row gets its own stream derived from the render seed, so the
/// sequence a pixel sees does not depend on which worker renders it.
pub fn row_rng(seed: u64, row: u32) -> rand::rngs::SmallRng {
    // seed_from_u64 scrambles its input, so neighbouring rows still get unrelated streams
    rand::rngs::SmallRng::seed_from_u64(seed ^ (u64::from(row) << 32))
}
