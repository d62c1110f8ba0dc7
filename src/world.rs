//! The scene as seen by the integrator: geometry, materials, textures and the
//! acceleration structure over them.

use glam::Vec3A;
use rand::Rng;

use crate::{
    bounds::BoundingBox,
    bvh::{Bvh, TraversalStats},
    color::{colors, Color},
    hittables::{Geometry, GeometryId, HitRecord},
    material::{Material, MaterialId},
    ray::Ray,
    textures::{direction_to_uv, sample, Texture, TextureId},
    utils::arena::Arena,
};

/// An immutable, fully built scene. Shared by reference between render workers.
#[derive(Debug)]
pub struct World {
    geometry: Arena<Geometry>,
    materials: Arena<Material>,
    textures: Arena<Texture>,
    bvh: Bvh<GeometryId>,
    background: TextureId,
}

impl World {
    /// Returns the closest intersection of `ray` with the scene in `[t_min, t_max]`.
    pub fn hit<R: Rng + ?Sized>(&self, ray: &Ray, t_min: f32, t_max: f32, rng: &mut R) -> Option<HitRecord> {
        self.bvh.hit(ray, t_min, t_max, |id, t_min, t_max| {
            self.geometry[id].hit(&self.geometry, ray, t_min, t_max, rng)
        })
    }

    /// [World::hit] that also reports how much of the hierarchy was visited.
    pub fn hit_counted<R: Rng + ?Sized>(
        &self,
        ray: &Ray,
        t_min: f32,
        t_max: f32,
        rng: &mut R,
        stats: &mut TraversalStats,
    ) -> Option<HitRecord> {
        self.bvh.hit_counted(
            ray,
            t_min,
            t_max,
            |id, t_min, t_max| self.geometry[id].hit(&self.geometry, ray, t_min, t_max, rng),
            stats,
        )
    }

    /// Radiance arriving from the environment along `direction`.
    pub fn background(&self, direction: Vec3A) -> Color {
        let (u, v) = direction_to_uv(direction);
        sample(&self.textures, self.background, u, v, direction)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn textures(&self) -> &Arena<Texture> {
        &self.textures
    }

    pub fn geometry(&self) -> &Arena<Geometry> {
        &self.geometry
    }

    /// Number of top-level objects.
    pub fn len(&self) -> usize {
        self.bvh.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bvh.is_empty()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bvh.bounding_box()
    }
}

/// Collects the parts of a [World] and builds its hierarchy once at the end.
///
/// Geometry added with [WorldBuilder::add_geometry] is only stored (e.g. as the
/// child of a transform); [WorldBuilder::add_object] also makes it visible.
#[derive(Debug, Default)]
pub struct WorldBuilder {
    geometry: Arena<Geometry>,
    materials: Arena<Material>,
    textures: Arena<Texture>,
    objects: Vec<GeometryId>,
    background: Option<TextureId>,
}

impl WorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_texture(&mut self, texture: impl Into<Texture>) -> TextureId {
        self.textures.add(texture.into())
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.add(material)
    }

    /// Stores geometry that is referenced by other geometry but not rendered on its own.
    pub fn add_geometry(&mut self, geometry: impl Into<Geometry>) -> GeometryId {
        self.geometry.add(geometry.into())
    }

    /// Stores geometry and places it in the scene.
    pub fn add_object(&mut self, geometry: impl Into<Geometry>) -> GeometryId {
        let id = self.add_geometry(geometry);
        self.objects.push(id);
        id
    }

    /// Places previously stored geometry in the scene.
    pub fn place(&mut self, id: GeometryId) {
        self.objects.push(id);
    }

    /// Uses `texture` for rays that leave the scene. Defaults to black.
    pub fn set_background(&mut self, texture: TextureId) {
        self.background = Some(texture);
    }

    pub fn textures(&self) -> &Arena<Texture> {
        &self.textures
    }

    pub fn geometry(&self) -> &Arena<Geometry> {
        &self.geometry
    }

    /// Builds the top-level BVH and freezes the scene.
    pub fn build<R: Rng + ?Sized>(mut self, rng: &mut R) -> World {
        let background = match self.background {
            Some(id) => id,
            None => self.textures.add(Texture::Solid(colors::BLACK)),
        };

        let items = self
            .objects
            .iter()
            .filter_map(|&id| match self.geometry.get(id) {
                Some(geometry) => Some((id, geometry.bounding_box(&self.geometry))),
                None => {
                    log::warn!("Ignoring object {id:?}, it was not added to this scene");
                    None
                }
            })
            .collect();
        let bvh = Bvh::build(items, rng);
        log::info!(
            "Built scene: {} objects, {} geometries, {} materials, {} textures, BVH depth {}",
            bvh.len(),
            self.geometry.len(),
            self.materials.len(),
            self.textures.len(),
            bvh.depth()
        );

        World {
            geometry: self.geometry,
            materials: self.materials,
            textures: self.textures,
            bvh,
            background,
        }
    }
}
