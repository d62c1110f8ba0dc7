//! Implementation of material types

use glam::Vec3A;
use rand::Rng;

use crate::{
    color::{colors, Color},
    hittables::HitRecord,
    ray::Ray,
    textures::{sample, Texture, TextureId},
    utils::{arena::Arena, random::rand_vec3_on_unit_sphere},
};

/// Handle to a [Material] stored in a [World](crate::world::World).
pub type MaterialId = crate::utils::arena::Id<Material>;

/// Scatter directions shorter than this in every component fall back to the normal.
const DEGENERATE_DIRECTION: f32 = 1e-8;

/// Returns a reflected ray direction based on the given normal
///
/// Performs the following computation: `v - 2 * v.dot(n) * n`
#[inline]
fn reflect(v: Vec3A, n: Vec3A) -> Vec3A {
    v - n * v.dot(n) * 2.0
}

/// Returns a refracted ray direction using the given normal
/// and the ratio between two refractive indices.
///
/// See [Shirley's RTiOW's section on Snell's Law](https://raytracing.github.io/books/RayTracingInOneWeekend.html#dielectrics/snell'slaw) for more information
#[inline]
fn refract(uv: Vec3A, n: Vec3A, eta_ratio: f32) -> Vec3A {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_perp = eta_ratio * (uv + cos_theta * n);
    let r_para = (1.0 - r_perp.length_squared()).abs().sqrt() * -1.0 * n;
    r_perp + r_para
}

/// Computes reflectance using Schlick's approximation
pub fn schlick(cosine: f32, ratio: f32) -> f32 {
    let r0 = (1.0 - ratio) / (1.0 + ratio);
    let r0 = r0 * r0;
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Enumeration of possible material types.
///
/// Colors are given as [TextureId]s into the world's texture arena. So are the
/// `roughness` and `strength` maps, read as the mean of their channels at the hit.
#[derive(Debug, Clone, Copy)]
pub enum Material {
    /// An approximation of a diffuse, or matte, material.
    ///
    /// See the [Wikipedia page on Lambertian reflectance](https://en.wikipedia.org/wiki/Lambertian_reflectance) for more information.
    Lambertian { albedo: TextureId },
    /// A metallic material that reflects rays based on the given roughness.
    Metal { albedo: TextureId, roughness: TextureId },
    /// A glass material that scatters rays based on the given refractive index.
    ///
    /// `roughness` blurs both the reflected and the refracted direction.
    Dielectric { refract_index: f32, roughness: f32 },
    /// A material scattering uniformly in every direction, used inside volumes
    Isotropic { albedo: TextureId },
    /// A material emitting diffuse light
    DiffuseLight { emit: TextureId, strength: TextureId },
    /// A mix of a metal and a lambertian lobe sharing `albedo`.
    ///
    /// The metal lobe is used where the `metallness` colour is longer than 0.5.
    Composite {
        albedo: TextureId,
        roughness: TextureId,
        metallness: TextureId,
    },
}

/// Set of data returned on a [Material]'s scattering
#[derive(Debug, Clone, Copy)]
pub struct ScatterRecord {
    /// The resultant ray for subsequent intersections
    pub ray: Ray,
    /// The attenuation at the point of intersection
    pub attenuation: Color,
}

fn scatter_lambertian(rec: &HitRecord, albedo: Color, rand_unit_v: Vec3A) -> ScatterRecord {
    let mut scatter_dir = rec.normal + rand_unit_v;

    // If the scatter direction is close to zero in all dimensions
    if scatter_dir.abs().cmplt(Vec3A::splat(DEGENERATE_DIRECTION)).all() {
        scatter_dir = rec.normal;
    }

    ScatterRecord {
        ray: Ray::new(rec.point, scatter_dir),
        attenuation: albedo,
    }
}

/// Reads a greyscale map as one value: the mean of the colour channels.
fn scalar(color: Color) -> f32 {
    (color.x + color.y + color.z) / 3.0
}

fn scatter_metal(
    normed_dir: Vec3A,
    rec: &HitRecord,
    albedo: Color,
    roughness: f32,
    rand_unit_v: Vec3A,
) -> Option<ScatterRecord> {
    let reflected = reflect(normed_dir, rec.normal);
    let scattered = Ray::new(rec.point, reflected + roughness * rand_unit_v);

    (scattered.direction.dot(rec.normal) > 0.0).then_some(ScatterRecord {
        ray: scattered,
        attenuation: albedo,
    })
}

impl Material {
    /// Returns a scattered ray and its attenuation based on the specific material type.
    ///
    /// Returns `None` if the material type computes a lack of scattering
    pub fn scatter<R: Rng + ?Sized>(
        &self,
        ray: &Ray,
        rec: &HitRecord,
        textures: &Arena<Texture>,
        rng: &mut R,
    ) -> Option<ScatterRecord> {
        // common calcs
        let normed_dir = ray.direction.normalize_or_zero();
        let rand_unit_v = rand_vec3_on_unit_sphere(rng);
        let lookup = |id| sample(textures, id, rec.u, rec.v, rec.point);
        let roughness_at = |id| scalar(lookup(id)).clamp(0.0, 1.0);

        match *self {
            Material::Isotropic { albedo } => {
                // returns a random unit direction
                Some(ScatterRecord {
                    ray: Ray::new(rec.point, rand_unit_v),
                    attenuation: lookup(albedo),
                })
            }
            Material::Lambertian { albedo } => Some(scatter_lambertian(rec, lookup(albedo), rand_unit_v)),
            Material::Metal { albedo, roughness } => {
                scatter_metal(normed_dir, rec, lookup(albedo), roughness_at(roughness), rand_unit_v)
            }
            Material::Dielectric {
                refract_index,
                roughness,
            } => {
                let refract_ratio = if rec.front_face {
                    1.0 / refract_index
                } else {
                    refract_index
                };

                let cos_theta = (-normed_dir).dot(rec.normal).min(1.0);
                let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

                let no_refract = refract_ratio * sin_theta > 1.0;
                let reflect_chance = schlick(cos_theta, refract_ratio);
                let do_reflect = reflect_chance > rng.gen();
                let direction = if no_refract || do_reflect {
                    // must reflect
                    reflect(normed_dir, rec.normal)
                } else {
                    // can refract
                    refract(normed_dir, rec.normal, refract_ratio)
                };

                Some(ScatterRecord {
                    ray: Ray::new(rec.point, direction + roughness.clamp(0.0, 1.0) * rand_unit_v),
                    attenuation: colors::WHITE,
                })
            }
            Material::DiffuseLight { .. } => None,
            Material::Composite {
                albedo,
                roughness,
                metallness,
            } => {
                let albedo = lookup(albedo);
                if lookup(metallness).length() > 0.5 {
                    scatter_metal(normed_dir, rec, albedo, roughness_at(roughness), rand_unit_v)
                } else {
                    Some(scatter_lambertian(rec, albedo, rand_unit_v))
                }
            }
        }
    }

    /// Returns the emitted color of light from the material, black for non-emitters.
    pub fn emit(&self, u: f32, v: f32, point: Vec3A, textures: &Arena<Texture>) -> Color {
        match *self {
            Material::DiffuseLight { emit, strength } => {
                scalar(sample(textures, strength, u, v, point)) * sample(textures, emit, u, v, point)
            }
            // Make emission explicit; nothing emits unless specifically implemented.
            _ => colors::BLACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::{rngs::SmallRng, SeedableRng};

    /// Red, white and black solids; white and black double as full and zero maps.
    fn textures() -> (Arena<Texture>, TextureId, TextureId, TextureId) {
        let mut textures = Arena::new();
        let red = textures.add(Texture::Solid(Color::new(0.8, 0.1, 0.1)));
        let on = textures.add(Texture::Solid(colors::WHITE));
        let off = textures.add(Texture::Solid(colors::BLACK));
        (textures, red, on, off)
    }

    /// A hit on the plane `y = 0` by a ray coming in at 45 degrees.
    fn floor_hit() -> (Ray, HitRecord) {
        let ray = Ray::new(Vec3A::new(-1.0, 1.0, 0.0), Vec3A::new(1.0, -1.0, 0.0));
        let rec = HitRecord::new(&ray, 1.0, Vec3A::Y, MaterialId::from_raw(0), (0.5, 0.5));
        (ray, rec)
    }

    #[test]
    fn schlick_limits() {
        let ratio: f32 = 1.0 / 1.5;
        let r0 = ((1.0 - ratio) / (1.0 + ratio)).powi(2);
        assert_abs_diff_eq!(schlick(1.0, ratio), r0, epsilon = 1e-6);
        assert_abs_diff_eq!(schlick(0.0, ratio), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn dielectric_never_tints() {
        let (textures, ..) = textures();
        let glass = Material::Dielectric {
            refract_index: 1.5,
            roughness: 0.0,
        };
        let (ray, rec) = floor_hit();
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..100 {
            let scattered = glass.scatter(&ray, &rec, &textures, &mut rng).expect("glass always scatters");
            assert_eq!(scattered.attenuation, colors::WHITE);
        }
    }

    #[test]
    fn dielectric_total_internal_reflection() {
        let (textures, ..) = textures();
        let glass = Material::Dielectric {
            refract_index: 1.5,
            roughness: 0.0,
        };
        // leaving the glass at a grazing angle
        let ray = Ray::new(Vec3A::new(-1.0, -0.2, 0.0), Vec3A::new(1.0, 0.2, 0.0));
        let rec = HitRecord::new(&ray, 1.0, Vec3A::Y, MaterialId::from_raw(0), (0.0, 0.0));
        assert!(!rec.front_face);

        let mut rng = SmallRng::seed_from_u64(2);
        let scattered = glass.scatter(&ray, &rec, &textures, &mut rng).expect("glass always scatters");
        assert!(scattered.ray.direction.y < 0.0, "expected a reflection back inside");
    }

    #[test]
    fn metal_absorbs_rays_below_the_surface() {
        let (textures, red, _, smooth) = textures();
        let metal = Material::Metal {
            albedo: red,
            roughness: smooth,
        };
        let mut rng = SmallRng::seed_from_u64(3);

        let (ray, rec) = floor_hit();
        let scattered = metal.scatter(&ray, &rec, &textures, &mut rng).expect("mirror reflection");
        assert!((scattered.ray.direction - Vec3A::new(1.0, 1.0, 0.0).normalize()).length() < 1e-6);
        assert_eq!(scattered.attenuation, Color::new(0.8, 0.1, 0.1));

        // a ray skimming along the surface reflects into it
        let grazing = Ray::new(Vec3A::new(-1.0, 0.0, 0.0), Vec3A::X);
        let rec = HitRecord::new(&grazing, 1.0, Vec3A::Y, MaterialId::from_raw(0), (0.0, 0.0));
        assert!(metal.scatter(&grazing, &rec, &textures, &mut rng).is_none());
    }

    #[test]
    fn lambertian_scatters_into_the_hemisphere() {
        let (textures, red, ..) = textures();
        let matte = Material::Lambertian { albedo: red };
        let (ray, rec) = floor_hit();
        let mut rng = SmallRng::seed_from_u64(4);
        for _ in 0..100 {
            let scattered = matte.scatter(&ray, &rec, &textures, &mut rng).expect("matte always scatters");
            assert!(scattered.ray.direction.dot(rec.normal) >= 0.0);
            assert_eq!(scattered.attenuation, Color::new(0.8, 0.1, 0.1));
        }
    }

    #[test]
    fn composite_picks_lobe_by_metallness() {
        let (textures, red, on, off) = textures();
        let (ray, rec) = floor_hit();
        let mirror = Vec3A::new(1.0, 1.0, 0.0).normalize();
        let mut rng = SmallRng::seed_from_u64(5);

        let metallic = Material::Composite {
            albedo: red,
            roughness: off,
            metallness: on,
        };
        for _ in 0..20 {
            let scattered = metallic.scatter(&ray, &rec, &textures, &mut rng).expect("metal lobe reflects");
            assert!((scattered.ray.direction - mirror).length() < 1e-6);
        }

        let matte = Material::Composite {
            albedo: red,
            roughness: off,
            metallness: off,
        };
        for _ in 0..20 {
            let scattered = matte.scatter(&ray, &rec, &textures, &mut rng).expect("diffuse lobe scatters");
            // normal plus a unit vector
            assert_abs_diff_eq!((scattered.ray.direction - rec.normal).length(), 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn only_lights_emit() {
        let (mut textures, red, ..) = textures();
        let four = textures.add(Texture::Solid(Color::splat(4.0)));
        let light = Material::DiffuseLight {
            emit: red,
            strength: four,
        };
        let (ray, rec) = floor_hit();
        let mut rng = SmallRng::seed_from_u64(6);
        assert!(light.scatter(&ray, &rec, &textures, &mut rng).is_none());
        assert_eq!(light.emit(0.0, 0.0, Vec3A::ZERO, &textures), Color::new(3.2, 0.4, 0.4));

        let matte = Material::Lambertian { albedo: red };
        assert_eq!(matte.emit(0.0, 0.0, Vec3A::ZERO, &textures), colors::BLACK);
    }

    #[test]
    fn roughness_map_blurs_only_where_it_is_bright() {
        use crate::textures::ImageMap;

        let (mut textures, red, ..) = textures();
        // smooth on the left half, fully rough on the right
        let map = image::RgbImage::from_fn(2, 1, |x, _| image::Rgb([if x == 0 { 0 } else { 255 }; 3]));
        let roughness = textures.add(Texture::Image(ImageMap::from_image(map)));
        let metal = Material::Metal { albedo: red, roughness };

        let (ray, _) = floor_hit();
        let mirror = Vec3A::new(1.0, 1.0, 0.0).normalize();
        let hit_at = |u| HitRecord::new(&ray, 1.0, Vec3A::Y, MaterialId::from_raw(0), (u, 0.5));
        let mut rng = SmallRng::seed_from_u64(7);

        let smooth = hit_at(0.1);
        for _ in 0..20 {
            let scattered = metal.scatter(&ray, &smooth, &textures, &mut rng).expect("mirror reflection");
            assert!((scattered.ray.direction - mirror).length() < 1e-6);
        }

        let rough = hit_at(0.9);
        let blurred = (0..20)
            .filter_map(|_| metal.scatter(&ray, &rough, &textures, &mut rng))
            .filter(|scattered| (scattered.ray.direction - mirror).length() > 1e-3)
            .count();
        assert!(blurred > 0, "the rough half never perturbed the reflection");
    }

    #[test]
    fn roughness_and_strength_read_the_channel_mean() {
        assert_abs_diff_eq!(scalar(Color::splat(0.3)), 0.3, epsilon = 1e-6);
        assert_abs_diff_eq!(scalar(Color::new(0.9, 0.0, 0.3)), 0.4, epsilon = 1e-6);

        let mut textures = Arena::new();
        let white = textures.add(Texture::Solid(colors::WHITE));
        let ramp = textures.add(Texture::Solid(Color::new(1.0, 2.0, 3.0)));
        let light = Material::DiffuseLight {
            emit: white,
            strength: ramp,
        };
        assert_eq!(light.emit(0.0, 0.0, Vec3A::ZERO, &textures), Color::splat(2.0));
    }
}
