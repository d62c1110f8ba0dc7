//! Light transport: estimating the radiance carried along a ray

use rand::Rng;

use crate::{
    color::{colors, Color},
    ray::Ray,
    world::World,
};

/// Smallest accepted hit distance, keeps bounced rays off their own surface.
pub const T_MIN: f32 = 0.001;

/// Estimates the radiance arriving along `ray` with at most `max_depth` bounces.
///
/// Each bounce adds the emission of the surface it hits, weighted by the
/// attenuation gathered so far; a ray that leaves the scene picks up the
/// background. Once the bounce budget is spent nothing more is added.
pub fn radiance_along<R: Rng + ?Sized>(ray: &Ray, world: &World, max_depth: u32, rng: &mut R) -> Color {
    let mut throughput = colors::WHITE;
    let mut accumulated = colors::BLACK;
    let mut ray = *ray;

    for _ in 0..max_depth {
        let Some(rec) = world.hit(&ray, T_MIN, f32::INFINITY, rng) else {
            accumulated += throughput * world.background(ray.direction);
            break;
        };

        let Some(material) = world.material(rec.material) else {
            log::warn!("Hit geometry with unknown material {:?}", rec.material);
            break;
        };

        accumulated += throughput * material.emit(rec.u, rec.v, rec.point, world.textures());

        match material.scatter(&ray, &rec, world.textures(), rng) {
            Some(scattered) => {
                throughput *= scattered.attenuation;
                ray = scattered.ray;
            }
            // absorbed
            None => break,
        }
    }

    accumulated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{hittables::Sphere, material::Material, world::WorldBuilder};
    use glam::Vec3A;
    use rand::{rngs::SmallRng, SeedableRng};

    fn sky_world(sky: Color) -> WorldBuilder {
        let mut builder = WorldBuilder::new();
        let texture = builder.add_texture(sky);
        builder.set_background(texture);
        builder
    }

    #[test]
    fn zero_depth_is_black() {
        let mut rng = SmallRng::seed_from_u64(0);
        let world = sky_world(colors::WHITE).build(&mut rng);
        let ray = Ray::new(Vec3A::ZERO, Vec3A::Z);
        assert_eq!(radiance_along(&ray, &world, 0, &mut rng), colors::BLACK);
    }

    #[test]
    fn empty_scene_returns_background() {
        let mut rng = SmallRng::seed_from_u64(0);
        let sky = Color::new(0.2, 0.4, 0.9);
        let world = sky_world(sky).build(&mut rng);
        let ray = Ray::new(Vec3A::ZERO, Vec3A::new(0.3, 1.0, -2.0));
        assert_eq!(radiance_along(&ray, &world, 1, &mut rng), sky);
        assert_eq!(radiance_along(&ray, &world, 50, &mut rng), sky);
    }

    #[test]
    fn light_emission_is_counted() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut builder = sky_world(colors::BLACK);
        let white = builder.add_texture(colors::WHITE);
        let strength = builder.add_texture(Color::splat(3.0));
        let lamp = builder.add_material(Material::DiffuseLight { emit: white, strength });
        builder.add_object(Sphere::new(Vec3A::new(0.0, 0.0, -5.0), 1.0, lamp));
        let world = builder.build(&mut rng);

        let ray = Ray::new(Vec3A::ZERO, -Vec3A::Z);
        // emission is collected even on the last allowed bounce
        assert_eq!(radiance_along(&ray, &world, 1, &mut rng), Color::splat(3.0));
    }

    #[test]
    fn diffuse_surface_under_uniform_sky_reflects_albedo() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut builder = sky_world(colors::WHITE);
        let grey = builder.add_texture(Color::splat(0.5));
        let matte = builder.add_material(Material::Lambertian { albedo: grey });
        builder.add_object(Sphere::new(Vec3A::ZERO, 1.0, matte));
        let world = builder.build(&mut rng);

        // a convex object never sees itself, so every path is one bounce
        let ray = Ray::new(Vec3A::new(0.0, 0.0, 5.0), -Vec3A::Z);
        for _ in 0..50 {
            let radiance = radiance_along(&ray, &world, 50, &mut rng);
            assert!((radiance - Color::splat(0.5)).length() < 1e-6, "{radiance}");
        }

        // a budget of one bounce ends on the surface without reaching the sky
        assert_eq!(radiance_along(&ray, &world, 1, &mut rng), colors::BLACK);
    }
}
