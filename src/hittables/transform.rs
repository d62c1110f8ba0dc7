//! Geometry seen through an affine transform

use glam::{Affine3A, Mat3A, Quat, Vec3, Vec3A};
use rand::Rng;

use crate::{
    bounds::BoundingBox,
    hittables::{Geometry, GeometryId, HitRecord},
    ray::Ray,
    utils::arena::Arena,
};

/// A geometry that undergoes an affine transform before and after being hit.
#[derive(Debug, Clone)]
pub struct Transform {
    child: GeometryId,
    transform: Affine3A,
    inv_transform: Affine3A,
    /// Inverse-transpose of the linear part, maps normals to world space
    normal_matrix: Mat3A,
}

/// Rotation by the given angles (in degrees) about X, then Y, then Z.
pub fn euler_rotation(degrees: Vec3A) -> Affine3A {
    let radians = degrees * (std::f32::consts::PI / 180.0);
    Affine3A::from_quat(
        Quat::from_rotation_z(radians.z) * Quat::from_rotation_y(radians.y) * Quat::from_rotation_x(radians.x),
    )
}

impl Transform {
    // creators

    /// Wraps `child` in `transform`.
    ///
    /// Returns `None` if the transform cannot be inverted (e.g. a zero scale factor).
    pub fn new(child: GeometryId, transform: Affine3A) -> Option<Self> {
        let det = transform.matrix3.determinant();
        if det == 0.0 || !det.is_finite() || !transform.translation.is_finite() {
            return None;
        }
        let inv_transform = transform.inverse();
        Some(Self {
            child,
            transform,
            inv_transform,
            normal_matrix: inv_transform.matrix3.transpose(),
        })
    }

    fn from_invertible(child: GeometryId, transform: Affine3A) -> Self {
        let inv_transform = transform.inverse();
        Self {
            child,
            transform,
            inv_transform,
            normal_matrix: inv_transform.matrix3.transpose(),
        }
    }

    /// Moves the object by `offset`.
    pub fn translated(child: GeometryId, offset: Vec3A) -> Self {
        Self::from_invertible(child, Affine3A::from_translation(Vec3::from(offset)))
    }

    /// Rotates the object about the origin by Euler angles in degrees, see [euler_rotation].
    pub fn rotated(child: GeometryId, degrees: Vec3A) -> Self {
        Self::from_invertible(child, euler_rotation(degrees))
    }

    /// Rotates the object about `axis` by `degrees`. A zero axis leaves it unrotated.
    pub fn rotated_about(child: GeometryId, axis: Vec3A, degrees: f32) -> Self {
        let rotation = match axis.try_normalize() {
            Some(axis) => Affine3A::from_axis_angle(Vec3::from(axis), degrees.to_radians()),
            None => Affine3A::IDENTITY,
        };
        Self::from_invertible(child, rotation)
    }

    /// Scales the object about the origin, `None` if a factor is zero.
    pub fn scaled(child: GeometryId, factors: Vec3A) -> Option<Self> {
        Self::new(child, Affine3A::from_scale(Vec3::from(factors)))
    }

    // builders

    /// Applies `next` after the current transform.
    pub fn then(self, next: Affine3A) -> Option<Self> {
        Self::new(self.child, next * self.transform)
    }

    pub fn child(&self) -> GeometryId {
        self.child
    }

    pub fn affine(&self) -> Affine3A {
        self.transform
    }

    pub fn hit<R: Rng + ?Sized>(
        &self,
        arena: &Arena<Geometry>,
        ray: &Ray,
        t_min: f32,
        t_max: f32,
        rng: &mut R,
    ) -> Option<HitRecord> {
        // an unnormalized local direction keeps `t` identical in both spaces
        let local_ray = Ray::new(
            self.inv_transform.transform_point3a(ray.origin),
            self.inv_transform.transform_vector3a(ray.direction),
        );

        let rec = arena.get(self.child)?.hit(arena, &local_ray, t_min, t_max, rng)?;

        let local_outward = if rec.front_face { rec.normal } else { -rec.normal };
        let outward = (self.normal_matrix * local_outward).normalize_or_zero();

        let mut world_rec = HitRecord {
            point: self.transform.transform_point3a(rec.point),
            ..rec
        };
        world_rec.set_face_normal(ray, outward);
        Some(world_rec)
    }

    pub fn bounding_box(&self, arena: &Arena<Geometry>) -> Option<BoundingBox> {
        let child_box = arena.get(self.child)?.bounding_box(arena)?;
        let [first, rest @ ..] = child_box.corners().map(|c| self.transform.transform_point3a(c));
        Some(
            rest.into_iter()
                .fold(BoundingBox::degenerate(first), |bbox, corner| bbox.add_point(corner)),
        )
    }
}
