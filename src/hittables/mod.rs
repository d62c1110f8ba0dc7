//! Geometry that rays can intersect.
//!
//! Every kind of object is a variant of the closed [Geometry] enum. Objects
//! that wrap other objects ([Transform], [ConstantMedium]) refer to them by
//! [GeometryId] inside the same [Arena].

mod cuboid;
mod medium;
mod mesh;
mod rect;
mod sphere;
mod transform;
mod triangle;

use glam::Vec3A;
use rand::Rng;

pub use self::{
    cuboid::Cuboid,
    medium::ConstantMedium,
    mesh::{Mesh, MeshImporter},
    rect::{Axis, AxisRect},
    sphere::Sphere,
    transform::{euler_rotation, Transform},
    triangle::{IndexedTriangle, Triangle, Vertex},
};
use crate::{bounds::BoundingBox, material::MaterialId, ray::Ray, utils::arena::Arena};

/// Handle to a [Geometry] stored in an [Arena].
pub type GeometryId = crate::utils::arena::Id<Geometry>;

/// Set of data describing the closest intersection of a ray with some geometry.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord {
    /// Point of intersection
    pub point: Vec3A,
    /// Surface normal at `point`, always facing against the incoming ray
    pub normal: Vec3A,
    /// Material of the intersected surface
    pub material: MaterialId,
    /// Ray parameter of the intersection
    pub t: f32,
    /// Surface coordinates
    pub u: f32,
    pub v: f32,
    /// Whether the ray hit the outside of the surface
    pub front_face: bool,
}

impl HitRecord {
    /// Creates a record whose normal is oriented against `ray`.
    pub fn new(
        ray: &Ray,
        t: f32,
        outward_normal: Vec3A,
        material: MaterialId,
        (u, v): (f32, f32),
    ) -> Self {
        let mut rec = Self {
            point: ray.at(t),
            normal: outward_normal,
            material,
            t,
            u,
            v,
            front_face: true,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Orients the stored normal against the ray and records which side was hit.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3A) {
        self.front_face = ray.direction.dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Keeps whichever of the two records is closer.
#[inline]
pub(crate) fn closer(a: Option<HitRecord>, b: Option<HitRecord>) -> Option<HitRecord> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.t < a.t { b } else { a }),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Enumeration of possible geometry types.
#[derive(Debug)]
pub enum Geometry {
    Sphere(Sphere),
    Triangle(Triangle),
    IndexedTriangle(IndexedTriangle),
    Rect(AxisRect),
    Cuboid(Cuboid),
    Mesh(Mesh),
    Medium(ConstantMedium),
    Transform(Transform),
}

impl Geometry {
    /// Returns the closest intersection of `ray` with this geometry inside `[t_min, t_max]`.
    ///
    /// `arena` resolves child handles of wrapping geometry; `rng` is consumed only by volumes.
    pub fn hit<R: Rng + ?Sized>(
        &self,
        arena: &Arena<Geometry>,
        ray: &Ray,
        t_min: f32,
        t_max: f32,
        rng: &mut R,
    ) -> Option<HitRecord> {
        match self {
            Geometry::Sphere(s) => s.hit(ray, t_min, t_max),
            Geometry::Triangle(tri) => tri.hit(ray, t_min, t_max),
            Geometry::IndexedTriangle(tri) => tri.hit(ray, t_min, t_max),
            Geometry::Rect(rect) => rect.hit(ray, t_min, t_max),
            Geometry::Cuboid(cuboid) => cuboid.hit(ray, t_min, t_max),
            Geometry::Mesh(mesh) => mesh.hit(ray, t_min, t_max),
            Geometry::Medium(medium) => medium.hit(arena, ray, t_min, t_max, rng),
            Geometry::Transform(transform) => transform.hit(arena, ray, t_min, t_max, rng),
        }
    }

    /// Returns a box enclosing the whole geometry, or `None` if it has no extent.
    pub fn bounding_box(&self, arena: &Arena<Geometry>) -> Option<BoundingBox> {
        match self {
            Geometry::Sphere(s) => Some(s.bounding_box()),
            Geometry::Triangle(tri) => Some(tri.bounding_box()),
            Geometry::IndexedTriangle(tri) => Some(tri.bounding_box()),
            Geometry::Rect(rect) => Some(rect.bounding_box()),
            Geometry::Cuboid(cuboid) => Some(cuboid.bounding_box()),
            Geometry::Mesh(mesh) => mesh.bounding_box(),
            Geometry::Medium(medium) => medium.bounding_box(arena),
            Geometry::Transform(transform) => transform.bounding_box(arena),
        }
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Geometry {
                fn from(item: $ty) -> Self {
                    Geometry::$variant(item)
                }
            }
        )*
    };
}

impl_from_variant!(
    Sphere(Sphere),
    Triangle(Triangle),
    IndexedTriangle(IndexedTriangle),
    Rect(AxisRect),
    Cuboid(Cuboid),
    Mesh(Mesh),
    Medium(ConstantMedium),
    Transform(Transform),
);
