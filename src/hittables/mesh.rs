//! Triangle meshes with their own acceleration structure

use std::path::Path;

use glam::{Vec2, Vec3A};
use rand::Rng;

use crate::{
    bounds::BoundingBox,
    bvh::Bvh,
    hittables::{HitRecord, IndexedTriangle, Vertex},
    material::MaterialId,
    ray::Ray,
};

/// A list of mesh faces, searched through a [Bvh] over their indices.
#[derive(Debug, Clone)]
pub struct Mesh {
    triangles: Vec<IndexedTriangle>,
    bvh: Bvh<usize>,
}

impl Mesh {
    pub fn new<R: Rng + ?Sized>(triangles: Vec<IndexedTriangle>, rng: &mut R) -> Self {
        let items = triangles
            .iter()
            .enumerate()
            .map(|(idx, tri)| (idx, Some(tri.bounding_box())))
            .collect();
        let bvh = Bvh::build(items, rng);
        Self { triangles, bvh }
    }

    /// A mesh without faces. It has no box and is never hit.
    pub fn empty() -> Self {
        Self {
            triangles: Vec::new(),
            bvh: Bvh::empty(),
        }
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangles(&self) -> &[IndexedTriangle] {
        &self.triangles
    }

    pub fn hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<HitRecord> {
        self.bvh.hit(ray, t_min, t_max, |idx, t_min, t_max| {
            self.triangles[idx].hit(ray, t_min, t_max)
        })
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bvh.bounding_box()
    }
}

/// Reads mesh files into [Mesh]es.
///
/// Holds only the parser options, so one is created for each load.
#[derive(Debug)]
pub struct MeshImporter {
    options: tobj::LoadOptions,
}

impl Default for MeshImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshImporter {
    pub fn new() -> Self {
        Self {
            options: tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        }
    }

    /// Loads every model of the OBJ file at `path` into a single mesh.
    ///
    /// An unreadable file is logged and gives an empty mesh.
    pub fn load<R: Rng + ?Sized>(&self, path: impl AsRef<Path>, material: MaterialId, rng: &mut R) -> Mesh {
        let path = path.as_ref();
        match tobj::load_obj(path, &self.options) {
            Ok((models, _materials)) => {
                let triangles = triangles_of(&models, material);
                log::info!(
                    "Loaded mesh {} ({} models, {} triangles)",
                    path.display(),
                    models.len(),
                    triangles.len()
                );
                Mesh::new(triangles, rng)
            }
            Err(why) => {
                log::warn!("Could not load mesh {}: {why}; using an empty mesh", path.display());
                Mesh::empty()
            }
        }
    }
}

/// Turns single-indexed, triangulated models into mesh faces.
///
/// Missing normals are left at zero (the faces then shade flat) and missing
/// texture coordinates at `(0, 0)`.
fn triangles_of(models: &[tobj::Model], material: MaterialId) -> Vec<IndexedTriangle> {
    let mut triangles = Vec::new();

    for model in models {
        let mesh = &model.mesh;
        let vertex = |idx: u32| -> Option<Vertex> {
            let i = idx as usize;
            let position = mesh.positions.get(3 * i..3 * i + 3)?;
            let normal = mesh
                .normals
                .get(3 * i..3 * i + 3)
                .map_or(Vec3A::ZERO, Vec3A::from_slice);
            let uv = mesh
                .texcoords
                .get(2 * i..2 * i + 2)
                .map_or(Vec2::ZERO, Vec2::from_slice);
            Some(Vertex {
                position: Vec3A::from_slice(position),
                normal,
                uv,
            })
        };

        let mut skipped = 0usize;
        for face in mesh.indices.chunks_exact(3) {
            match (vertex(face[0]), vertex(face[1]), vertex(face[2])) {
                (Some(v0), Some(v1), Some(v2)) => {
                    triangles.push(IndexedTriangle::new([v0, v1, v2], material));
                }
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            log::warn!(
                "Model {:?} references missing vertices; skipped {skipped} faces",
                model.name
            );
        }
    }

    triangles
}
