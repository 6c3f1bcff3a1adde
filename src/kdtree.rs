//! An indexed kd-tree acceleration structure, offered as an alternative
//! to [`crate::bvh::BVH`]. Unlike the BVH's partition-based build, a
//! kd-tree splits space rather than the primitive list, so a primitive
//! whose bounds straddle a split plane is referenced from both children.
//! Leaf items are therefore stored indirectly through an index buffer
//! instead of being reordered in place.

use arrayvec::ArrayVec;
use bumpalo::Bump;

use crate::geometry::bounds::Bounds3f;
use crate::primitive::Primitive;
use crate::{Float, Point3f, Ray, SurfaceInteraction};

/// An unsigned integer a kd-tree node can pack its flags and payload
/// into. The low two bits of the "flags" word are reserved, so the
/// usable range of an index is `Self::MAX`.
pub trait KdIndex: Copy + Send + Sync + 'static {
    const MAX: usize;
    fn from_usize(v: usize) -> Self;
    fn as_usize(self) -> usize;
}

macro_rules! impl_kd_index {
    ($ty:ty) => {
        impl KdIndex for $ty {
            const MAX: usize = (<$ty>::MAX >> 2) as usize;

            fn from_usize(v: usize) -> Self {
                v as $ty
            }

            fn as_usize(self) -> usize {
                self as usize
            }
        }
    };
}

impl_kd_index!(u32);
impl_kd_index!(u64);

const LEAF_FLAG: usize = 0b11;

/// Single-item leaves store the item index directly in `word0` rather
/// than an offset into the shared indices buffer.
const SINGLE_ITEM_OPT: bool = true;

/// A kd-tree node packed into two machine words: a `Float`-sized word
/// holding either the split position or a leaf's item payload, and an
/// index-sized word whose low two bits are `0b00`/`0b01`/`0b10` for an
/// inner node split along x/y/z, or `0b11` for a leaf. The remaining
/// bits hold the positive child's node index (inner) or item count
/// (leaf).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IndexedKdtreeNode<Idx: KdIndex = u32> {
    word0: u32,
    word1: Idx,
}

impl<Idx: KdIndex> IndexedKdtreeNode<Idx> {
    fn make_inner(split_pos: Float, split_axis: usize, positive_child_index: usize) -> Self {
        debug_assert!(split_axis <= 2);
        debug_assert!(positive_child_index <= Idx::MAX);
        Self {
            word0: split_pos.to_bits(),
            word1: Idx::from_usize((positive_child_index << 2) | split_axis),
        }
    }

    fn make_leaf(item_indices: &[u32], indices_buf: &mut Vec<u32>) -> Self {
        let num_items = item_indices.len();
        debug_assert!(num_items <= Idx::MAX);
        let word1 = Idx::from_usize((num_items << 2) | LEAF_FLAG);

        let word0 = if SINGLE_ITEM_OPT && num_items == 1 {
            item_indices[0]
        } else {
            let offset = indices_buf.len() as u32;
            indices_buf.extend_from_slice(item_indices);
            offset
        };

        Self { word0, word1 }
    }

    fn is_leaf(&self) -> bool {
        (self.word1.as_usize() & 0b11) == LEAF_FLAG
    }

    fn split_axis(&self) -> usize {
        debug_assert!(!self.is_leaf());
        self.word1.as_usize() & 0b11
    }

    fn split_pos(&self) -> Float {
        debug_assert!(!self.is_leaf());
        Float::from_bits(self.word0)
    }

    fn positive_child_index(&self) -> usize {
        debug_assert!(!self.is_leaf());
        self.word1.as_usize() >> 2
    }

    fn num_items(&self) -> usize {
        debug_assert!(self.is_leaf());
        self.word1.as_usize() >> 2
    }

    fn single_item_index(&self) -> u32 {
        debug_assert!(self.is_leaf() && SINGLE_ITEM_OPT && self.num_items() == 1);
        self.word0
    }

    fn item_index_offset(&self) -> usize {
        debug_assert!(self.is_leaf() && !(SINGLE_ITEM_OPT && self.num_items() == 1));
        self.word0 as usize
    }
}

const MAX_PRIMS_PER_LEAF: usize = 4;
const MAX_DEPTH: usize = 32;

pub struct IndexedKdtree<P: AsRef<dyn Primitive> = Box<dyn Primitive>, Idx: KdIndex = u32> {
    pub prims: Vec<P>,
    pub bounds: Bounds3f,
    nodes: Vec<IndexedKdtreeNode<Idx>>,
    indices: Vec<u32>,
}

impl<P: AsRef<dyn Primitive>, Idx: KdIndex> IndexedKdtree<P, Idx> {
    pub fn build(prims: Vec<P>) -> Self {
        if prims.is_empty() {
            return Self { prims, bounds: Bounds3f::empty(), nodes: Vec::new(), indices: Vec::new() };
        }

        let bounds: Vec<Bounds3f> = prims.iter().map(|p| p.as_ref().world_bound()).collect();
        let world_bound = bounds.iter().fold(Bounds3f::empty(), |acc, b| acc.join(b));

        let item_indices: Vec<u32> = (0..prims.len() as u32).collect();

        let arena = Bump::new();
        let mut indices = Vec::new();
        let root = Self::recursive_build(&arena, &bounds, &item_indices, world_bound, 0, &mut indices);

        let mut nodes = Vec::with_capacity(prims.len());
        Self::flatten(&mut nodes, root, &mut indices);

        Self { prims, bounds: world_bound, nodes, indices }
    }

    fn recursive_build<'a>(
        arena: &'a Bump,
        bounds: &[Bounds3f],
        item_indices: &[u32],
        node_bounds: Bounds3f,
        depth: usize,
        indices_scratch: &mut Vec<u32>,
    ) -> &'a BuildNode<'a> {
        if item_indices.len() <= MAX_PRIMS_PER_LEAF || depth >= MAX_DEPTH {
            return arena.alloc(BuildNode::Leaf { items: item_indices.to_vec() });
        }

        let axis = node_bounds.maximum_extent() as usize;
        let split_pos = (node_bounds.min[axis] + node_bounds.max[axis]) / 2.0;

        let (left, right): (Vec<u32>, Vec<u32>) = item_indices.iter().fold((Vec::new(), Vec::new()), |(mut l, mut r), &i| {
            let b = bounds[i as usize];
            if b.min[axis] <= split_pos {
                l.push(i);
            }
            if b.max[axis] >= split_pos {
                r.push(i);
            }
            (l, r)
        });

        // Splitting failed to reduce the item count on either side (e.g. one
        // giant primitive spans the whole node): give up and make a leaf.
        if left.len() == item_indices.len() || right.len() == item_indices.len() {
            return arena.alloc(BuildNode::Leaf { items: item_indices.to_vec() });
        }

        let mut left_bounds = node_bounds;
        left_bounds.max[axis] = split_pos;
        let mut right_bounds = node_bounds;
        right_bounds.min[axis] = split_pos;

        let negative = Self::recursive_build(arena, bounds, &left, left_bounds, depth + 1, indices_scratch);
        let positive = Self::recursive_build(arena, bounds, &right, right_bounds, depth + 1, indices_scratch);

        arena.alloc(BuildNode::Inner { axis, split_pos, negative, positive })
    }

    fn flatten(flat: &mut Vec<IndexedKdtreeNode<Idx>>, node: &BuildNode, indices: &mut Vec<u32>) -> usize {
        match node {
            BuildNode::Leaf { items } => {
                flat.push(IndexedKdtreeNode::make_leaf(items, indices));
                1
            }
            BuildNode::Inner { axis, split_pos, negative, positive } => {
                flat.push(IndexedKdtreeNode::make_inner(*split_pos, *axis, 0));
                let my_idx = flat.len() - 1;
                let negative_len = Self::flatten(flat, negative, indices);
                let positive_idx = my_idx + negative_len + 1;
                flat[my_idx] = IndexedKdtreeNode::make_inner(*split_pos, *axis, positive_idx);
                let positive_len = Self::flatten(flat, positive, indices);
                negative_len + positive_len + 1
            }
        }
    }

    pub fn intersect(&self, ray: &mut Ray) -> Option<SurfaceInteraction> {
        if self.nodes.is_empty() {
            return None;
        }

        let (mut t_min, mut t_max) = self.bounds.intersect_test(ray)?;
        t_max = t_max.min(ray.t_max);

        let mut to_visit: ArrayVec<[(usize, Float, Float); MAX_DEPTH]> = ArrayVec::new();
        let mut node_idx = 0usize;
        let mut hit = None;

        loop {
            let node = self.nodes[node_idx];

            if ray.t_max < t_min {
                break;
            }

            if node.is_leaf() {
                if SINGLE_ITEM_OPT && node.num_items() == 1 {
                    let prim = &self.prims[node.single_item_index() as usize];
                    if let Some(isect) = prim.as_ref().intersect(ray) {
                        hit = Some(isect);
                    }
                } else {
                    let offset = node.item_index_offset();
                    for &i in &self.indices[offset..offset + node.num_items()] {
                        let prim = &self.prims[i as usize];
                        if let Some(isect) = prim.as_ref().intersect(ray) {
                            hit = Some(isect);
                        }
                    }
                }

                match to_visit.pop() {
                    Some((next, lo, hi)) => {
                        node_idx = next;
                        t_min = lo;
                        t_max = hi;
                    }
                    None => break,
                }
            } else {
                let axis = node.split_axis();
                let split = node.split_pos();
                let inv_dir = 1.0 / ray.dir[axis];
                let t_plane = (split - ray.origin[axis]) * inv_dir;

                let (first, second) = if ray.origin[axis] < split
                    || (ray.origin[axis] == split && ray.dir[axis] <= 0.0)
                {
                    (node_idx + 1, node.positive_child_index())
                } else {
                    (node.positive_child_index(), node_idx + 1)
                };

                if t_plane > t_max || t_plane <= 0.0 {
                    node_idx = first;
                } else if t_plane < t_min {
                    node_idx = second;
                } else {
                    to_visit.push((second, t_plane, t_max));
                    node_idx = first;
                    t_max = t_plane;
                }
            }
        }

        hit
    }

    pub fn intersect_test(&self, ray: &Ray) -> bool {
        // Conservative but simple: the occlusion path reuses full traversal
        // semantics via a scratch ray so `ray.t_max` is never mutated.
        let mut scratch = ray.clone();
        self.intersect(&mut scratch).is_some()
    }
}

enum BuildNode<'a> {
    Leaf {
        items: Vec<u32>,
    },
    Inner {
        axis: usize,
        split_pos: Float,
        negative: &'a BuildNode<'a>,
        positive: &'a BuildNode<'a>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_round_trips_inner() {
        let node = IndexedKdtreeNode::<u32>::make_inner(1.5, 1, 42);
        assert!(!node.is_leaf());
        assert_eq!(node.split_axis(), 1);
        assert_eq!(node.split_pos(), 1.5);
        assert_eq!(node.positive_child_index(), 42);
    }

    #[test]
    fn node_round_trips_single_item_leaf() {
        let mut indices = Vec::new();
        let node = IndexedKdtreeNode::<u32>::make_leaf(&[7], &mut indices);
        assert!(node.is_leaf());
        assert_eq!(node.num_items(), 1);
        assert_eq!(node.single_item_index(), 7);
        assert!(indices.is_empty());
    }

    #[test]
    fn node_round_trips_multi_item_leaf() {
        let mut indices = Vec::new();
        let node = IndexedKdtreeNode::<u32>::make_leaf(&[3, 4, 5], &mut indices);
        assert!(node.is_leaf());
        assert_eq!(node.num_items(), 3);
        assert_eq!(&indices[node.item_index_offset()..node.item_index_offset() + 3], &[3, 4, 5]);
    }

    #[test]
    fn empty_tree_has_no_hit() {
        let prims: Vec<&dyn Primitive> = Vec::new();
        let tree: IndexedKdtree<&dyn Primitive> = IndexedKdtree::build(prims);
        let mut ray = Ray::new(Point3f::new(0.0, 0.0, 0.0), crate::Vec3f::new(0.0, 0.0, 1.0));
        assert!(tree.intersect(&mut ray).is_none());
        assert!(!tree.intersect_test(&ray));
    }
}
