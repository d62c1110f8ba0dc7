//! Bounding Volume Hierarchy
//!
//! Nodes live in a flat [Vec] and refer to each other by index. Leaves hold
//! items of type `I`, a small handle (a [GeometryId](crate::hittables::GeometryId)
//! for the world, a triangle index for a mesh) that the caller resolves while
//! traversing.

use std::cmp::Ordering;

use glam::Vec3A;
use rand::Rng;

use crate::{bounds::BoundingBox, hittables::HitRecord, ray::Ray};

/// One slot of a [BvhNode].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Child<I> {
    /// Index of another node in the same hierarchy
    Node(usize),
    /// A leaf item
    Item(I),
}

/// A node in the BVH.
///
/// Holds the bounding box that contains its two children. A leaf stores the
/// same item in both slots.
#[derive(Debug, Clone)]
pub struct BvhNode<I> {
    bbox: BoundingBox,
    left: Child<I>,
    right: Child<I>,
}

/// Counters collected by [Bvh::hit_counted].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Number of node boxes tested against the ray
    pub box_tests: usize,
    /// Number of leaf items handed to the item test
    pub item_tests: usize,
}

#[derive(Debug, Clone)]
pub struct Bvh<I> {
    /// All nodes, the root last
    nodes: Vec<BvhNode<I>>,
    /// Number of items the hierarchy was built from
    items: usize,
}

/// Orders two boxes by their minimum along `axis`.
fn box_cmp(a: &BoundingBox, b: &BoundingBox, axis: usize) -> Ordering {
    a.min[axis]
        .partial_cmp(&b.min[axis])
        .unwrap_or(Ordering::Equal)
}

impl<I> Bvh<I> {
    /// A hierarchy without items. Never reports a hit.
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            items: 0,
        }
    }
}

impl<I: Copy + PartialEq> Bvh<I> {
    /// Builds a hierarchy over `items`, each paired with its bounding box.
    ///
    /// The split axis of every node is chosen at random. Items that cannot
    /// report a box get a degenerate one at the origin.
    pub fn build<R: Rng + ?Sized>(items: Vec<(I, Option<BoundingBox>)>, rng: &mut R) -> Self {
        let mut boxed: Vec<(I, BoundingBox)> = items
            .into_iter()
            .enumerate()
            .map(|(idx, (item, bbox))| {
                let bbox = bbox.unwrap_or_else(|| {
                    log::warn!("BVH item #{idx} has no bounding box, using a point at the origin");
                    BoundingBox::degenerate(Vec3A::ZERO)
                });
                (item, bbox)
            })
            .collect();

        let mut bvh = Self {
            nodes: Vec::with_capacity(boxed.len().saturating_mul(2)),
            items: boxed.len(),
        };
        if !boxed.is_empty() {
            bvh.build_range(&mut boxed, rng);
        }
        bvh
    }

    /// Builds the subtree over `span` and returns the index of its root node.
    fn build_range<R: Rng + ?Sized>(&mut self, span: &mut [(I, BoundingBox)], rng: &mut R) -> usize {
        let axis = rng.gen_range(0..3);

        let (left, right, bbox) = match span.len() {
            1 => {
                let (item, bbox) = span[0];
                (Child::Item(item), Child::Item(item), bbox)
            }
            2 => {
                let (mut a, mut b) = (span[0], span[1]);
                if box_cmp(&b.1, &a.1, axis) == Ordering::Less {
                    std::mem::swap(&mut a, &mut b);
                }
                (Child::Item(a.0), Child::Item(b.0), a.1.union(b.1))
            }
            len => {
                span.sort_by(|a, b| box_cmp(&a.1, &b.1, axis));
                let (half0, half1) = span.split_at_mut(len / 2);

                let left = self.build_range(half0, rng);
                let right = self.build_range(half1, rng);
                let bbox = self.nodes[left].bbox.union(self.nodes[right].bbox);
                (Child::Node(left), Child::Node(right), bbox)
            }
        };

        self.nodes.push(BvhNode { bbox, left, right });
        self.nodes.len() - 1
    }

    /// Number of items in the hierarchy.
    pub fn len(&self) -> usize {
        self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items == 0
    }

    /// Box enclosing every item, `None` for an empty hierarchy.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.nodes.last().map(|root| root.bbox)
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let Some(root) = self.nodes.len().checked_sub(1) else {
            return 0;
        };

        let mut deepest = 0;
        let mut stack = vec![(root, 1)];
        while let Some((idx, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            let node = &self.nodes[idx];
            for child in [node.left, node.right] {
                if let Child::Node(child) = child {
                    stack.push((child, depth + 1));
                }
            }
        }
        deepest
    }

    /// Returns the closest hit along `ray` within `[t_min, t_max]`.
    ///
    /// `hit_item(item, t_min, t_max)` tests one leaf item; the upper bound it
    /// receives shrinks to the closest hit found so far.
    pub fn hit<F>(&self, ray: &Ray, t_min: f32, t_max: f32, hit_item: F) -> Option<HitRecord>
    where
        F: FnMut(I, f32, f32) -> Option<HitRecord>,
    {
        let mut stats = TraversalStats::default();
        self.hit_counted(ray, t_min, t_max, hit_item, &mut stats)
    }

    /// [Bvh::hit] that also records how much work the traversal did.
    pub fn hit_counted<F>(
        &self,
        ray: &Ray,
        t_min: f32,
        t_max: f32,
        mut hit_item: F,
        stats: &mut TraversalStats,
    ) -> Option<HitRecord>
    where
        F: FnMut(I, f32, f32) -> Option<HitRecord>,
    {
        let root = self.nodes.len().checked_sub(1)?;

        let mut closest = t_max;
        let mut result = None;
        let mut stack = Vec::with_capacity(64);
        stack.push(Child::Node(root));

        while let Some(child) = stack.pop() {
            match child {
                Child::Item(item) => {
                    stats.item_tests += 1;
                    if let Some(rec) = hit_item(item, t_min, closest) {
                        if rec.t <= closest {
                            closest = rec.t;
                            result = Some(rec);
                        }
                    }
                }
                Child::Node(idx) => {
                    let node = &self.nodes[idx];
                    stats.box_tests += 1;
                    if !node.bbox.hit(ray, t_min, closest) {
                        continue;
                    }
                    // right first so the left subtree is finished before it
                    if node.left != node.right {
                        stack.push(node.right);
                    }
                    stack.push(node.left);
                }
            }
        }

        result
    }
}
