//! Color lookups by surface coordinate

mod checkered;
mod image;

use std::f32::consts::PI;

use glam::Vec3A;

pub use self::checkered::Checkered;
pub use self::image::{EnvironmentMap, ImageMap};
use crate::{
    color::{colors, Color},
    utils::arena::Arena,
};

/// Handle to a [Texture] stored in a [crate::world::World].
pub type TextureId = crate::utils::arena::Id<Texture>;

/// Enumeration of possible texture types.
#[derive(Debug)]
pub enum Texture {
    /// The same color everywhere.
    Solid(Color),
    /// A 3D checkerboard alternating between two other textures.
    Checkered(Checkered),
    /// An 8-bit image indexed by `(u, v)`.
    Image(ImageMap),
    /// A floating-point latitude/longitude image, mainly used as a background.
    Environment(EnvironmentMap),
}

impl Texture {
    /// Returns the color of this texture at the surface coordinate `(u, v)` / point `point`.
    ///
    /// `textures` is the arena this texture lives in; composite textures look their parts up there.
    pub fn color(&self, textures: &Arena<Texture>, u: f32, v: f32, point: Vec3A) -> Color {
        match self {
            Texture::Solid(color) => *color,
            Texture::Checkered(checkered) => checkered.color(textures, u, v, point),
            Texture::Image(image) => image.color(u, v),
            Texture::Environment(env) => env.color(u, v),
        }
    }
}

impl From<Color> for Texture {
    fn from(color: Color) -> Self {
        Texture::Solid(color)
    }
}

/// Looks up the texture `id` at `(u, v)` / `point`.
///
/// A handle that does not belong to `textures` yields [colors::MISSING].
pub fn sample(textures: &Arena<Texture>, id: TextureId, u: f32, v: f32, point: Vec3A) -> Color {
    textures
        .get(id)
        .map_or(colors::MISSING, |texture| texture.color(textures, u, v, point))
}

/// Maps a direction to longitude/latitude texture coordinates.
///
/// `u` wraps around the vertical axis, `v` runs from straight up (0) to straight down (1).
pub fn direction_to_uv(direction: Vec3A) -> (f32, f32) {
    let d = direction.normalize_or_zero();
    let u = (d.z.atan2(d.x) + PI) / (2.0 * PI);
    let v = d.y.clamp(-1.0, 1.0).acos() / PI;
    (u, v)
}
