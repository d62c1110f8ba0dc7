//! Triangles: flat single-sided ones and smooth-shaded mesh faces

use glam::{Vec2, Vec3A};

use crate::{bounds::BoundingBox, hittables::HitRecord, material::MaterialId, ray::Ray};

/// Padding applied to triangle boxes so axis-aligned faces keep a volume.
const BOX_PADDING: f32 = 1e-4;
/// Determinants below this are treated as parallel (or, for [Triangle], back-facing).
const PARALLEL_EPSILON: f32 = 1e-4;

/// Möller–Trumbore intersection. Returns `(t, u, v)` where `u`, `v` weight `v1` and `v2`.
#[inline]
fn intersect(
    ray: &Ray,
    [v0, v1, v2]: [Vec3A; 3],
    cull_back_faces: bool,
) -> Option<(f32, f32, f32)> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let p_vec = ray.direction.cross(edge2);
    let det = edge1.dot(p_vec);

    if (cull_back_faces && det < PARALLEL_EPSILON) || det.abs() < PARALLEL_EPSILON {
        return None;
    }
    let inv_det = det.recip();

    let t_vec = ray.origin - v0;
    let u = t_vec.dot(p_vec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q_vec = t_vec.cross(edge1);
    let v = ray.direction.dot(q_vec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    Some((edge2.dot(q_vec) * inv_det, u, v))
}

fn bounds_of([v0, v1, v2]: [Vec3A; 3]) -> BoundingBox {
    BoundingBox::new(v0.min(v1).min(v2), v0.max(v1).max(v2)).pad(BOX_PADDING)
}

/// A single-sided flat triangle. Rays approaching from the back never hit it.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub vertices: [Vec3A; 3],
    pub material: MaterialId,
}

impl Triangle {
    pub fn new(v0: Vec3A, v1: Vec3A, v2: Vec3A, material: MaterialId) -> Self {
        Self {
            vertices: [v0, v1, v2],
            material,
        }
    }

    pub fn hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<HitRecord> {
        let (t, u, v) = intersect(ray, self.vertices, true)?;
        if t < t_min || t > t_max {
            return None;
        }

        let [v0, v1, v2] = self.vertices;
        let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
        Some(HitRecord::new(ray, t, normal, self.material, (u, v)))
    }

    pub fn bounding_box(&self) -> BoundingBox {
        bounds_of(self.vertices)
    }
}

/// A vertex of a mesh face.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    pub position: Vec3A,
    pub normal: Vec3A,
    pub uv: Vec2,
}

/// A double-sided triangle with per-vertex normals and texture coordinates.
#[derive(Debug, Clone, Copy)]
pub struct IndexedTriangle {
    pub vertices: [Vertex; 3],
    pub material: MaterialId,
}

impl IndexedTriangle {
    pub fn new(vertices: [Vertex; 3], material: MaterialId) -> Self {
        Self { vertices, material }
    }

    fn positions(&self) -> [Vec3A; 3] {
        self.vertices.map(|vertex| vertex.position)
    }

    pub fn hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<HitRecord> {
        let (t, b1, b2) = intersect(ray, self.positions(), false)?;
        if t < t_min || t > t_max {
            return None;
        }
        let b0 = 1.0 - b1 - b2;
        let [v0, v1, v2] = self.vertices;

        let normal = (b0 * v0.normal + b1 * v1.normal + b2 * v2.normal).normalize_or_zero();
        // meshes without normals store zeros; shade those flat
        let normal = if normal == Vec3A::ZERO {
            (v1.position - v0.position)
                .cross(v2.position - v0.position)
                .normalize_or_zero()
        } else {
            normal
        };

        let uv = b0 * v0.uv + b1 * v1.uv + b2 * v2.uv;
        Some(HitRecord::new(ray, t, normal, self.material, (uv.x, uv.y)))
    }

    pub fn bounding_box(&self) -> BoundingBox {
        bounds_of(self.positions())
    }
}
