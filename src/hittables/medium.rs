//! Participating media of constant density

use glam::Vec3A;
use rand::Rng;
use rand_distr::{Distribution, Exp, ExpError};

use crate::{
    bounds::BoundingBox,
    hittables::{Geometry, GeometryId, HitRecord},
    material::MaterialId,
    ray::Ray,
    utils::arena::Arena,
};

/// Fog-like volume filling a closed boundary geometry.
///
/// Rays passing through are scattered after an exponentially distributed free path.
/// The path is measured in the medium's own space, so inside a scaling [Transform]
/// the density is per local unit rather than per world unit.
///
/// [Transform]: crate::hittables::Transform
#[derive(Debug, Clone)]
pub struct ConstantMedium {
    boundary: GeometryId,
    phase: MaterialId,
    density: f32,
    free_path: Exp<f32>,
}

impl ConstantMedium {
    /// Creates a medium inside `boundary`; `phase` should be an isotropic material.
    ///
    /// Fails for a negative or NaN density.
    pub fn new(boundary: GeometryId, density: f32, phase: MaterialId) -> Result<Self, ExpError> {
        Ok(Self {
            boundary,
            phase,
            density,
            free_path: Exp::new(density)?,
        })
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    pub fn hit<R: Rng + ?Sized>(
        &self,
        arena: &Arena<Geometry>,
        ray: &Ray,
        t_min: f32,
        t_max: f32,
        rng: &mut R,
    ) -> Option<HitRecord> {
        let boundary = arena.get(self.boundary)?;

        let enter = boundary.hit(arena, ray, f32::NEG_INFINITY, f32::INFINITY, rng)?;
        let exit = boundary.hit(arena, ray, enter.t + 1e-4, f32::INFINITY, rng)?;

        let t_enter = enter.t.max(t_min);
        let t_exit = exit.t.min(t_max);
        if t_enter >= t_exit {
            return None;
        }
        let t_enter = t_enter.max(0.0);

        let ray_length = ray.direction.length();
        let distance_inside = (t_exit - t_enter) * ray_length;
        let hit_distance = self.free_path.sample(rng);
        if hit_distance > distance_inside {
            return None;
        }

        let t = t_enter + hit_distance / ray_length;
        Some(HitRecord {
            point: ray.at(t),
            // arbitrary
            normal: Vec3A::X,
            material: self.phase,
            t,
            u: 0.0,
            v: 0.0,
            front_face: true,
        })
    }

    pub fn bounding_box(&self, arena: &Arena<Geometry>) -> Option<BoundingBox> {
        arena.get(self.boundary)?.bounding_box(arena)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittables::Sphere;
    use rand::{rngs::SmallRng, SeedableRng};

    fn fog(density: f32) -> (Arena<Geometry>, ConstantMedium) {
        let mut arena = Arena::new();
        let boundary = arena.add(Sphere::new(Vec3A::ZERO, 1.0, MaterialId::from_raw(0)).into());
        let medium = ConstantMedium::new(boundary, density, MaterialId::from_raw(1))
            .expect("density is positive");
        (arena, medium)
    }

    #[test]
    fn dense_medium_scatters_near_entry() {
        let (arena, medium) = fog(1e4);
        let mut rng = SmallRng::seed_from_u64(2);
        let ray = Ray::new(Vec3A::new(0.0, 0.0, -5.0), Vec3A::Z);
        let rec = medium
            .hit(&arena, &ray, 0.001, f32::INFINITY, &mut rng)
            .expect("a dense medium always scatters");
        assert!(rec.t >= 4.0 && rec.t < 4.01, "t = {}", rec.t);
        assert_eq!(rec.material, MaterialId::from_raw(1));
        assert!(rec.front_face);
    }

    #[test]
    fn thin_medium_mostly_lets_rays_through() {
        let (arena, medium) = fog(1e-3);
        let mut rng = SmallRng::seed_from_u64(2);
        let ray = Ray::new(Vec3A::new(0.0, 0.0, -5.0), Vec3A::Z);
        let scattered = (0..1000)
            .filter(|_| medium.hit(&arena, &ray, 0.001, f32::INFINITY, &mut rng).is_some())
            .count();
        // expected about 2 of 1000 over a path of length 2
        assert!(scattered < 20, "{scattered} scattered");
    }

    #[test]
    fn starts_inside_boundary() {
        let (arena, medium) = fog(1e4);
        let mut rng = SmallRng::seed_from_u64(4);
        let ray = Ray::new(Vec3A::ZERO, Vec3A::X);
        let rec = medium
            .hit(&arena, &ray, 0.001, f32::INFINITY, &mut rng)
            .expect("origin lies inside the fog");
        assert!(rec.t > 0.0 && rec.t < 0.01);
    }

    #[test]
    fn missing_ray_and_bad_density() {
        let (arena, medium) = fog(1.0);
        let mut rng = SmallRng::seed_from_u64(0);
        let ray = Ray::new(Vec3A::new(0.0, 5.0, -5.0), Vec3A::Z);
        assert!(medium.hit(&arena, &ray, 0.001, f32::INFINITY, &mut rng).is_none());
        assert!(medium.bounding_box(&arena).is_some());

        assert!(ConstantMedium::new(GeometryId::from_raw(0), -1.0, MaterialId::from_raw(0)).is_err());
    }

    #[test]
    fn free_path_scales_with_the_instance() {
        use crate::hittables::Transform;

        let (mut arena, medium) = fog(2.0);
        let fog_id = arena.add(medium.clone().into());
        let big = Transform::scaled(fog_id, Vec3A::splat(10.0)).expect("uniform scale is invertible");

        for seed in 0..32 {
            let near = Ray::new(Vec3A::new(0.0, 0.0, -5.0), Vec3A::Z);
            let local = medium.hit(&arena, &near, 0.001, f32::INFINITY, &mut SmallRng::seed_from_u64(seed));
            let far = Ray::new(Vec3A::new(0.0, 0.0, -50.0), Vec3A::Z);
            let scaled = big.hit(&arena, &far, 0.001, f32::INFINITY, &mut SmallRng::seed_from_u64(seed));

            match (local, scaled) {
                // the same sampled path reaches ten times as deep in world units
                (Some(a), Some(b)) => assert!((b.point.z - 10.0 * a.point.z).abs() < 1e-2, "seed {seed}"),
                (None, None) => {}
                (a, b) => panic!("seed {seed}: unscaled {:?} and scaled {:?} disagree", a.is_some(), b.is_some()),
            }
        }
    }
}
