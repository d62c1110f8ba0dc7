//! A texture mapping alternating between two other Textures in a checkerboard fashion.

use glam::Vec3A;

use super::{sample, Texture, TextureId};
use crate::{color::Color, utils::arena::Arena};

/// A checkered texture alternating between two enclosed textures.
///
/// The pattern is solid (3D): it is decided by the hit point, not by `(u, v)`.
#[derive(Debug, Clone, Copy)]
pub struct Checkered {
    pub even: TextureId,
    pub odd: TextureId,
}

impl Checkered {
    /// Creates a new checkered texture
    pub fn new(even: TextureId, odd: TextureId) -> Self {
        Self { even, odd }
    }

    pub(super) fn color(&self, textures: &Arena<Texture>, u: f32, v: f32, point: Vec3A) -> Color {
        let sines = point * 10.0;
        let sines = sines.x.sin() * sines.y.sin() * sines.z.sin();

        let id = if sines < 0.0 { self.odd } else { self.even };
        sample(textures, id, u, v, point)
    }
}
