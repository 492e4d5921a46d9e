use crate::utilities::BoundingBox;

use super::leaf::Leaf;
use super::node::Node;

/// A binary bounding volume tree.
///
/// Node 0 is the root. Internal children point at other nodes; leaf children hold `Tree::encode(leaf_index)`.
#[derive(Clone, Debug, Default)]
pub struct Tree {
    pub nodes: Vec<Node>,
    /// Location of every leaf, indexed by leaf index.
    pub leaves: Vec<Leaf>,
}

impl Tree {
    /// Encodes a leaf index into the negative-index form used by node children. The encoding is its own inverse.
    #[inline(always)]
    pub fn encode(index: i32) -> i32 {
        -1 - index
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline(always)]
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Bounds of everything in the tree. Empty for an empty tree.
    pub fn root_bounds(&self) -> BoundingBox {
        let mut bounds = BoundingBox::empty();
        if let Some(root) = self.nodes.first() {
            for child in [&root.a, &root.b] {
                if child.leaf_count > 0 {
                    bounds.merge(&child.bounds());
                }
            }
        }
        bounds
    }
}
