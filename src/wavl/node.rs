//! Node and link primitives for the WAVL tree.
//!
//! The tree is arena-backed ([Vec]-indexed) rather than pointer-linked: absence
//! of a child or parent is `None` rather than a distinguished sentinel value,
//! which keeps the rank arithmetic in [crate::wavl::tree] branch-free at the
//! fringe without the upkeep of an actual shared sentinel node.

/// Rank parity. Only the parity (low bit) of a node's rank is ever stored;
/// the WAVL rebalancing protocol only consults rank *differences*, which are
/// fully determined by comparing parities of adjacent nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Parity {
    Zero,
    One,
}
impl Parity {
    /// Promote/demote both flip the parity bit; the direction (rank +1 or -1)
    /// is implied entirely by the caller's context.
    pub(crate) fn flip(self) -> Parity {
        match self {
            Parity::Zero => Parity::One,
            Parity::One => Parity::Zero,
        }
    }
}

/// A child branch, used both to describe which side a node occupies under
/// its parent and which side of a would-be parent a vacant slot sits at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}
impl Side {
    pub(crate) fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A live tree node. A "removed" node is represented one level up: the
/// arena slot holding this node becomes `None` the instant
/// it's detached (see [crate::wavl::tree::Tree::remove_node]), rather than a
/// flag on the node itself. Cursors check liveness by indexing the arena and
/// testing for `None`, not by reading a field here — there's no way to hold
/// a `Node` that has been removed.
#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) parity: Parity,
    pub(crate) parent: Option<usize>,
    pub(crate) left: Option<usize>,
    pub(crate) right: Option<usize>,
}
impl<K, V> Node<K, V> {
    pub(crate) fn leaf(key: K, value: V, parent: Option<usize>) -> Self {
        Node {
            key,
            value,
            parity: Parity::Zero,
            parent,
            left: None,
            right: None,
        }
    }

    pub(crate) fn child(&self, side: Side) -> Option<usize> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) fn set_child(&mut self, side: Side, idx: Option<usize>) {
        match side {
            Side::Left => self.left = idx,
            Side::Right => self.right = idx,
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}
