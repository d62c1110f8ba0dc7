//! Axis-aligned box made of six rectangles

use glam::{Vec2, Vec3A};

use crate::{
    bounds::BoundingBox,
    hittables::{closer, Axis, AxisRect, HitRecord},
    material::MaterialId,
    ray::Ray,
};

const BOX_PADDING: f32 = 1e-4;

/// One face of a [Cuboid], with the sign of its outward normal along the face axis.
#[derive(Debug, Clone, Copy)]
struct Side {
    rect: AxisRect,
    outward: f32,
}

#[derive(Debug, Clone)]
pub struct Cuboid {
    min: Vec3A,
    max: Vec3A,
    sides: [Side; 6],
}

impl Cuboid {
    /// Creates a box spanning the two corners, in any order.
    pub fn new(p0: Vec3A, p1: Vec3A, material: MaterialId) -> Self {
        let (min, max) = (p0.min(p1), p0.max(p1));

        let side = |axis: Axis, at_max: bool| {
            let (a, b) = axis.others();
            let k = if at_max { max[axis.index()] } else { min[axis.index()] };
            Side {
                rect: AxisRect::new(
                    axis,
                    k,
                    Vec2::new(min[a], min[b]),
                    Vec2::new(max[a], max[b]),
                    material,
                ),
                outward: if at_max { 1.0 } else { -1.0 },
            }
        };

        Self {
            min,
            max,
            sides: [
                side(Axis::X, false),
                side(Axis::X, true),
                side(Axis::Y, false),
                side(Axis::Y, true),
                side(Axis::Z, false),
                side(Axis::Z, true),
            ],
        }
    }

    pub fn hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<HitRecord> {
        let mut closest = t_max;
        let mut result = None;

        for side in &self.sides {
            let hit = side.rect.hit(ray, t_min, closest).map(|mut rec| {
                rec.set_face_normal(ray, side.outward * side.rect.axis.unit());
                rec
            });
            result = closer(result, hit);
            if let Some(rec) = &result {
                closest = rec.t;
            }
        }

        result
    }

    /// The box spanned by the corners, with flat axes padded so slab tests can still hit it.
    pub fn bounding_box(&self) -> BoundingBox {
        let thin = (self.max - self.min).cmplt(Vec3A::splat(BOX_PADDING));
        let pad = Vec3A::select(thin, Vec3A::splat(BOX_PADDING), Vec3A::ZERO);
        BoundingBox::new(self.min - pad, self.max + pad)
    }
}
