use std::debug_assert;

/// Pointer to a leaf's tree location.
///
/// The identity of a leaf is implicit in its position within the leaf array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Leaf {
    packed: u32,
}

impl Leaf {
    /// Gets the index of the node that the leaf is directly held by.
    #[inline(always)]
    pub fn node_index(&self) -> usize {
        (self.packed & 0x7FFF_FFFF) as usize
    }

    /// Gets which child within the owning node the leaf is in.
    #[inline(always)]
    pub fn child_index(&self) -> usize {
        (self.packed >> 31) as usize
    }

    #[inline(always)]
    pub fn new(node_index: usize, child_index: usize) -> Self {
        debug_assert!(
            child_index & !1 == 0,
            "Binary trees can't have children in slots other than 0 and 1!"
        );
        debug_assert!(node_index <= 0x7FFF_FFFF, "Node index doesn't fit in a leaf pointer.");
        Self {
            packed: (node_index as u32 & 0x7FFF_FFFF) | ((child_index as u32) << 31),
        }
    }
}
