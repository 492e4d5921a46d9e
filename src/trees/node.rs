use glam::Vec3;

use crate::utilities::BoundingBox;

/// A child of a tree node: its bounds, what it points at, and how many leaves lie beneath it.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeChild {
    /// Minimum bounds of the child's bounding box.
    pub min: Vec3,
    /// Index of the child node if non-negative, otherwise an encoded leaf index. See `Tree::encode`.
    pub index: i32,
    /// Maximum bounds of the child's bounding box.
    pub max: Vec3,
    /// Number of leaves under this child. Zero marks an unoccupied slot.
    pub leaf_count: i32,
}

impl NodeChild {
    #[inline(always)]
    pub fn new(bounds: BoundingBox, index: i32, leaf_count: i32) -> Self {
        Self {
            min: bounds.min,
            index,
            max: bounds.max,
            leaf_count,
        }
    }

    #[inline(always)]
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.min, self.max)
    }

    #[inline(always)]
    pub fn is_leaf(&self) -> bool {
        self.index < 0
    }
}

/// 2-wide tree node.
///
/// The node stores the bounds of its children rather than its own; the root's bounds are the merge of its children.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Node {
    pub a: NodeChild,
    pub b: NodeChild,
}

impl Node {
    #[inline(always)]
    pub fn child(&self, child_index: usize) -> &NodeChild {
        debug_assert!(child_index < 2, "Binary tree nodes only have children 0 and 1.");
        if child_index == 0 {
            &self.a
        } else {
            &self.b
        }
    }
}
