/*! A safe, arena-backed (indexed) weak AVL (WAVL) tree

# About
A weak AVL tree is a binary search tree balanced through per-node *rank
parities* rather than full heights or AVL-style balance factors. Rebalancing
after insert or delete costs at most two rotations, and rank bookkeeping is a
single bit per node (the parity of its rank) rather than an integer.

# Design
This tree stores nodes in a flat `Vec<Option<Node<K, V>>>` addressed by
`usize` index, in an arena/`Vec`-indexed, iterative style, rather than
linking nodes through `Box`/`Rc`. Absence of a parent/child is `None`,
playing the role of a sentinel node without actually allocating one:
reading the parity of a `None` link as [Parity::One] (rank -1) keeps the
rank arithmetic uniform at the fringe.

Deleted slots are never reused. This isn't a missed optimization — cursors
identify a node purely by its arena index plus a liveness check, so an
index must keep denoting either the same logical node or a permanent hole;
recycling a freed index for an unrelated key would let a stale cursor
silently read someone else's entry instead of failing validation.
*/

#![allow(dead_code)]

use std::cmp::Ordering;

use super::node::{Node, Parity, Side};

/// Result of descending the tree looking for a key.
pub(crate) enum Slot {
    /// The key is present at this arena index.
    Hit(usize),
    /// The key is absent; it would be grafted as `parent`'s `side` child.
    /// `parent` is `None` only when the tree itself is empty.
    Miss { parent: Option<usize>, side: Side },
}

/// The core WAVL tree: search, navigation, rotations, and the insert/remove
/// rebalancing engine. Keys are never duplicated; a comparator of sign
/// `Ordering` totally orders them. See the [module-level documentation](self)
/// for the arena representation.
pub struct Tree<K, V> {
    pub(crate) arena: Vec<Option<Node<K, V>>>,
    pub(crate) root: Option<usize>,
    pub(crate) size: usize,
    pub(crate) cmp: Box<dyn Fn(&K, &K) -> Ordering>,
}

impl<K, V> Tree<K, V> {
    pub(crate) fn new(cmp: Box<dyn Fn(&K, &K) -> Ordering>) -> Self {
        Tree {
            arena: Vec::new(),
            root: None,
            size: 0,
            cmp,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.size
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub(crate) fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.size = 0;
    }

    // -- Accessors --------------------------------------------------------

    /// Immutable node accessor. Panics if `idx` names a tombstoned or
    /// out-of-range slot; every live structural link in the tree only ever
    /// points at a live slot, so this should never actually fire outside of
    /// a corrupted tree.
    pub(crate) fn node(&self, idx: usize) -> &Node<K, V> {
        self.arena[idx]
            .as_ref()
            .expect("wavl_map: indexed a removed or invalid node")
    }

    pub(crate) fn node_mut(&mut self, idx: usize) -> &mut Node<K, V> {
        self.arena[idx]
            .as_mut()
            .expect("wavl_map: indexed a removed or invalid node")
    }

    /// Used by cursors to check staleness without panicking on a tombstoned index.
    pub(crate) fn is_live(&self, idx: usize) -> bool {
        self.arena[idx].is_some()
    }

    pub(crate) fn key(&self, idx: usize) -> &K {
        &self.node(idx).key
    }

    pub(crate) fn value(&self, idx: usize) -> &V {
        &self.node(idx).value
    }

    pub(crate) fn value_mut(&mut self, idx: usize) -> &mut V {
        &mut self.node_mut(idx).value
    }

    pub(crate) fn side_of(&self, parent: usize, child: usize) -> Side {
        if self.node(parent).left == Some(child) {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Rank parity of a link; an absent child/parent reads as [Parity::One],
    /// i.e. rank -1, matching the sentinel convention this tree never
    /// materializes as an actual node.
    pub(crate) fn parity_of(&self, link: Option<usize>) -> Parity {
        match link {
            Some(idx) => self.node(idx).parity,
            None => Parity::One,
        }
    }

    // -- Search -------------------------------------------------------------

    pub(crate) fn search_slot(&self, key: &K) -> Slot {
        let Some(root) = self.root else {
            return Slot::Miss {
                parent: None,
                side: Side::Left,
            };
        };
        let mut current = root;
        loop {
            match (self.cmp)(key, &self.node(current).key) {
                Ordering::Equal => return Slot::Hit(current),
                Ordering::Less => match self.node(current).left {
                    Some(l) => current = l,
                    None => {
                        return Slot::Miss {
                            parent: Some(current),
                            side: Side::Left,
                        }
                    }
                },
                Ordering::Greater => match self.node(current).right {
                    Some(r) => current = r,
                    None => {
                        return Slot::Miss {
                            parent: Some(current),
                            side: Side::Right,
                        }
                    }
                },
            }
        }
    }

    pub(crate) fn search(&self, key: &K) -> Option<usize> {
        match self.search_slot(key) {
            Slot::Hit(idx) => Some(idx),
            Slot::Miss { .. } => None,
        }
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    pub(crate) fn get(&self, key: &K) -> Option<&V> {
        self.search(key).map(|idx| self.value(idx))
    }

    pub(crate) fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = self.search(key)?;
        Some(self.value_mut(idx))
    }

    /// Descends to the minimum-keyed node of the subtree rooted at `idx`.
    pub(crate) fn min_of(&self, mut idx: usize) -> usize {
        while let Some(l) = self.node(idx).left {
            idx = l;
        }
        idx
    }

    /// Descends to the maximum-keyed node of the subtree rooted at `idx`.
    pub(crate) fn max_of(&self, mut idx: usize) -> usize {
        while let Some(r) = self.node(idx).right {
            idx = r;
        }
        idx
    }

    pub(crate) fn predecessor(&self, idx: usize) -> Option<usize> {
        if let Some(l) = self.node(idx).left {
            return Some(self.max_of(l));
        }
        let mut cur = idx;
        let mut parent = self.node(idx).parent;
        while let Some(p) = parent {
            if self.node(p).right == Some(cur) {
                return Some(p);
            }
            cur = p;
            parent = self.node(p).parent;
        }
        None
    }

    pub(crate) fn successor(&self, idx: usize) -> Option<usize> {
        if let Some(r) = self.node(idx).right {
            return Some(self.min_of(r));
        }
        let mut cur = idx;
        let mut parent = self.node(idx).parent;
        while let Some(p) = parent {
            if self.node(p).left == Some(cur) {
                return Some(p);
            }
            cur = p;
            parent = self.node(p).parent;
        }
        None
    }

    // -- Rotations (pure structure, no rank bookkeeping) ---------------------

    /// Rotates the subtree rooted at `root_idx`, bringing its `side` child up
    /// to take its place. Relinks parent/child pointers on both sides,
    /// updating `self.root` when `root_idx` was the tree's root. Leaves rank
    /// parities untouched — the caller applies whatever promotes/demotes the
    /// rebalancing step calls for.
    fn rotate(&mut self, root_idx: usize, side: Side) -> usize {
        let child_idx = self
            .node(root_idx)
            .child(side)
            .expect("rotation requires a child on the given side");

        let migrating = self.node(child_idx).child(side.opposite());
        self.node_mut(root_idx).set_child(side, migrating);
        if let Some(m) = migrating {
            self.node_mut(m).parent = Some(root_idx);
        }

        let parent_idx = self.node(root_idx).parent;
        self.node_mut(child_idx).parent = parent_idx;
        match parent_idx {
            Some(p) => {
                let pside = self.side_of(p, root_idx);
                self.node_mut(p).set_child(pside, Some(child_idx));
            }
            None => self.root = Some(child_idx),
        }

        self.node_mut(child_idx).set_child(side.opposite(), Some(root_idx));
        self.node_mut(root_idx).parent = Some(child_idx);
        child_idx
    }

    fn rotate_left(&mut self, x: usize) -> usize {
        self.rotate(x, Side::Right)
    }

    fn rotate_right(&mut self, x: usize) -> usize {
        self.rotate(x, Side::Left)
    }

    /// Double rotation with `x` as `p`'s left child: `rotate_left(x)` then
    /// `rotate_right(p)`.
    fn rotate_left_right(&mut self, p: usize, x: usize) -> usize {
        self.rotate_left(x);
        self.rotate_right(p)
    }

    /// Mirror of [Self::rotate_left_right] for `x` as `p`'s right child.
    fn rotate_right_left(&mut self, p: usize, x: usize) -> usize {
        self.rotate_right(x);
        self.rotate_left(p)
    }

    // -- Rank maintenance -----------------------------------------------------

    fn promote(&mut self, idx: usize) {
        let n = self.node_mut(idx);
        n.parity = n.parity.flip();
    }

    fn demote(&mut self, idx: usize) {
        let n = self.node_mut(idx);
        n.parity = n.parity.flip();
    }

    // -- Insertion ------------------------------------------------------------

    /// Grafts a new leaf as `parent`'s `side` child (or as the root, when
    /// `parent` is `None`), running insert-fixup if needed, and returns the
    /// new node's arena index. Used directly by the cursor API, which already
    /// knows the slot and would otherwise have to re-search for it.
    pub(crate) fn insert_at_slot(&mut self, parent: Option<usize>, side: Side, key: K, value: V) -> usize {
        let idx = self.arena.len();
        self.arena.push(Some(Node::leaf(key, value, parent)));
        match parent {
            Some(p) => {
                let was_leaf = self.node(p).is_leaf();
                self.node_mut(p).set_child(side, Some(idx));
                if was_leaf {
                    self.insert_fixup(p);
                }
            }
            None => self.root = Some(idx),
        }
        self.size += 1;
        idx
    }

    /// Inserts `key`/`value`, replacing and returning the old value if the
    /// key was already present (no structural change in that case).
    pub(crate) fn insert_or_replace(&mut self, key: K, value: V) -> Option<V> {
        match self.search_slot(&key) {
            Slot::Hit(idx) => Some(std::mem::replace(&mut self.node_mut(idx).value, value)),
            Slot::Miss { parent, side } => {
                self.insert_at_slot(parent, side, key, value);
                None
            }
        }
    }

    /// Restores the WAVL rank rule after grafting a new `Zero`-parity leaf
    /// onto `parent`, which was a leaf before the graft (hence the new
    /// `0`-child edge). Promotes `parent` first, then cascades promotions or
    /// performs a single/double rotation up the ancestor chain.
    fn insert_fixup(&mut self, parent: usize) {
        self.promote(parent);
        let mut x = parent;
        loop {
            let Some(p) = self.node(x).parent else { break };
            if self.node(p).parity != self.node(x).parity {
                break; // rank difference is 1: legal, done
            }
            let side = self.side_of(p, x);
            let sibling = self.node(p).child(side.opposite());
            if self.parity_of(sibling) != self.node(p).parity {
                // sibling is a 1-child of p: promote p and keep climbing
                self.promote(p);
                x = p;
                continue;
            }
            // sibling is a 2-child of p: one rotation ends the fixup
            let c = self.node(x).child(side.opposite());
            if self.parity_of(c) == self.node(x).parity {
                // aligned: single rotation
                self.rotate(p, side);
                self.demote(p);
            } else {
                // zig-zag: double rotation
                let c_idx = c.expect("zig-zag fixup requires a real pivot child");
                match side {
                    Side::Left => self.rotate_left_right(p, x),
                    Side::Right => self.rotate_right_left(p, x),
                };
                self.demote(p);
                self.demote(x);
                self.promote(c_idx);
            }
            break;
        }
    }

    // -- Deletion ---------------------------------------------------------------

    /// Detaches the node at `idx`, returning its key and value. Tombstones
    /// the slot so any cursor holding `idx` fails validation from then on.
    /// See the module docs for why the two-children case moves the
    /// *predecessor*'s node identity into the removed node's structural
    /// position rather than copying key/value in place: a cursor that was
    /// watching `idx` must observe a tombstone, not a silently different key.
    pub(crate) fn remove_node(&mut self, idx: usize) -> (K, V) {
        let has_left = self.node(idx).left.is_some();
        let has_right = self.node(idx).right.is_some();

        if has_left && has_right {
            self.remove_two_children(idx)
        } else {
            self.remove_at_most_one_child(idx)
        }
    }

    fn remove_at_most_one_child(&mut self, idx: usize) -> (K, V) {
        let parent = self.node(idx).parent;
        let side = parent.map(|p| self.side_of(p, idx));

        let taken = self.arena[idx].take().expect("remove_node on a removed node");
        let child = taken.left.or(taken.right);

        match parent {
            Some(p) => self.node_mut(p).set_child(side.unwrap(), child),
            None => self.root = child,
        }
        if let Some(c) = child {
            self.node_mut(c).parent = parent;
        }

        if let Some(p) = parent {
            self.remove_fixup(p, side.unwrap());
        }
        self.size -= 1;
        (taken.key, taken.value)
    }

    fn remove_two_children(&mut self, idx: usize) -> (K, V) {
        let left = self.node(idx).left.unwrap();
        let m = self.max_of(left); // predecessor, left-biased per spec
        let m_parent = self.node(m).parent.unwrap();
        let b = self.node(m).left; // predecessor's only possible child

        // Splice m out of its own position first.
        if m_parent != idx {
            self.node_mut(m_parent).right = b;
            if let Some(b_idx) = b {
                self.node_mut(b_idx).parent = Some(m_parent);
            }
        }

        // Tombstone idx, taking its old structural links for m to inherit.
        let removed = self.arena[idx].take().expect("remove_node on a removed node");
        let n_parent = removed.parent;
        let n_side = n_parent.map(|p| self.side_of(p, idx));

        {
            let m_node = self.arena[m].as_mut().unwrap();
            m_node.parity = removed.parity;
            m_node.parent = removed.parent;
            m_node.left = if m_parent == idx { b } else { removed.left };
            m_node.right = removed.right;
        }
        if let Some(right_idx) = removed.right {
            self.node_mut(right_idx).parent = Some(m);
        }
        if let Some(left_idx) = self.node(m).left {
            self.node_mut(left_idx).parent = Some(m);
        }
        match n_parent {
            Some(p) => self.node_mut(p).set_child(n_side.unwrap(), Some(m)),
            None => self.root = Some(m),
        }

        let (fixup_parent, fixup_side) = if m_parent == idx {
            (m, Side::Left)
        } else {
            (m_parent, Side::Right)
        };
        self.remove_fixup(fixup_parent, fixup_side);
        self.size -= 1;
        (removed.key, removed.value)
    }

    /// Repairs the rank rule after deletion. `parent.child(side)` is the
    /// (possibly absent) replacement that now sits where the removed node's
    /// subtree used to be.
    fn remove_fixup(&mut self, mut parent: usize, mut side: Side) {
        // Special start case: a freshly emptied parent that's become a
        // 2,2-leaf (rank 1 with both children sentinel) violates the leaf
        // rule even though its individual rank differences are legal.
        if self.node(parent).child(side).is_none()
            && self.node(parent).child(side.opposite()).is_none()
            && self.node(parent).parity == Parity::One
        {
            self.demote(parent);
            match self.node(parent).parent {
                None => return,
                Some(pp) => {
                    side = self.side_of(pp, parent);
                    parent = pp;
                }
            }
        }

        loop {
            let node_parity = self.parity_of(self.node(parent).child(side));
            let p_parity = self.node(parent).parity;
            if p_parity != node_parity {
                break; // legal rank difference, done
            }

            let sibling = self
                .node(parent)
                .child(side.opposite())
                .expect("remove-fixup requires a sibling to exist");
            let sib_parity = self.node(sibling).parity;

            if sib_parity == p_parity {
                // 2,2-parent: demote and keep climbing
                self.demote(parent);
                match self.node(parent).parent {
                    None => break,
                    Some(pp) => {
                        side = self.side_of(pp, parent);
                        parent = pp;
                        continue;
                    }
                }
            }

            let near = self.node(sibling).child(side);
            let far = self.node(sibling).child(side.opposite());
            let far_parity = self.parity_of(far);

            if far_parity == sib_parity {
                let near_parity = self.parity_of(near);
                if near_parity == sib_parity {
                    // both nephews are 2-children: demote sibling and parent, climb
                    self.demote(sibling);
                    self.demote(parent);
                    match self.node(parent).parent {
                        None => break,
                        Some(pp) => {
                            side = self.side_of(pp, parent);
                            parent = pp;
                            continue;
                        }
                    }
                } else {
                    // near nephew is a 1-child: double rotation pulls it up
                    match side {
                        Side::Left => self.rotate_right_left(parent, sibling),
                        Side::Right => self.rotate_left_right(parent, sibling),
                    };
                    self.demote(sibling);
                    // The new top (the former near nephew) keeps a parity
                    // congruent to its old one (a rank change of exactly 2 is
                    // invisible to a single stored bit); `parent` is now its
                    // child and must be demoted so the two ranks differ.
                    self.demote(parent);
                    break;
                }
            } else {
                // far nephew is a 1-child: single rotation brings sibling up
                self.rotate(parent, side.opposite());
                self.promote(sibling);
                if !self.node(parent).is_leaf() {
                    self.demote(parent);
                }
                break;
            }
        }
    }

    /// Recomputes every node's rank bottom-up from its children's
    /// already-verified ranks plus its own stored parity bit, panicking if
    /// the WAVL rank rule is violated anywhere in the tree: a node's rank
    /// must be both `rank(left)+1` or `rank(left)+2` *and* `rank(right)+1`
    /// or `rank(right)+2`, with the surviving candidate's parity matching
    /// the stored bit (§3 invariant 4); every leaf must land at rank 0 (§3
    /// invariant 5). `O(n)`; a diagnostic for the test suite, not part of
    /// ordinary map operation.
    pub(crate) fn assert_rank_rule(&self) {
        wavl_rank(self, self.root);
    }
}

fn wavl_rank<K, V>(tree: &Tree<K, V>, idx: Option<usize>) -> i64 {
    let Some(idx) = idx else { return -1 };
    let node = tree.node(idx);
    let rl = wavl_rank(tree, node.left);
    let rr = wavl_rank(tree, node.right);
    let parity_bit = match node.parity {
        Parity::Zero => 0,
        Parity::One => 1,
    };
    let r = [rl + 1, rl + 2]
        .into_iter()
        .find(|r| matches!(r - rr, 1 | 2) && r.rem_euclid(2) == parity_bit)
        .unwrap_or_else(|| {
            panic!("rank rule violated at node {idx}: left rank {rl}, right rank {rr}, parity {parity_bit}")
        });
    if node.left.is_none() && node.right.is_none() {
        assert_eq!(r, 0, "leaf at {idx} must have rank 0");
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ascending_tree() -> Tree<i32, &'static str> {
        Tree::new(Box::new(|a: &i32, b: &i32| a.cmp(b)))
    }

    fn in_order(tree: &Tree<i32, &'static str>) -> Vec<i32> {
        fn walk(tree: &Tree<i32, &'static str>, idx: Option<usize>, out: &mut Vec<i32>) {
            let Some(idx) = idx else { return };
            walk(tree, tree.node(idx).left, out);
            out.push(*tree.key(idx));
            walk(tree, tree.node(idx).right, out);
        }
        let mut out = Vec::new();
        walk(tree, tree.root, &mut out);
        out
    }

    /// Delegates to [Tree::assert_rank_rule], which recomputes every node's
    /// rank bottom-up from its children's ranks and stored parity bit and
    /// panics if any parent/child difference falls outside `{1,2}`. This
    /// actually exercises "every rank difference is 1 or 2" end to end,
    /// rather than only confirming that two adjacent parities differ (which
    /// a 3-difference would too).
    fn assert_rank_rule(tree: &Tree<i32, &'static str>) {
        tree.assert_rank_rule();
    }

    #[test]
    fn insert_keeps_sorted_order() {
        let mut tree = ascending_tree();
        for k in [5, 3, 8, 1, 4, 7, 9, 2, 6] {
            tree.insert_or_replace(k, "v");
        }
        assert_eq!(in_order(&tree), vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(tree.len(), 9);
        assert_rank_rule(&tree);
    }

    #[test]
    fn insert_replaces_existing_value() {
        let mut tree = ascending_tree();
        assert_eq!(tree.insert_or_replace(1, "one"), None);
        assert_eq!(tree.insert_or_replace(1, "uno"), Some("one"));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(&1), Some(&"uno"));
    }

    #[test]
    fn remove_preserves_order_and_rank_rule() {
        let mut tree = ascending_tree();
        for k in 0..50 {
            tree.insert_or_replace(k, "v");
        }
        for k in (0..50).step_by(2) {
            let idx = tree.search(&k).unwrap();
            tree.remove_node(idx);
        }
        assert_eq!(tree.len(), 25);
        assert_eq!(in_order(&tree), (1..50).step_by(2).collect::<Vec<_>>());
        assert_rank_rule(&tree);
    }

    #[test]
    fn remove_leaf_then_its_sibling_produces_2_2_leaf_fixup() {
        let mut tree = ascending_tree();
        for k in [2, 1, 3] {
            tree.insert_or_replace(k, "v");
        }
        let one = tree.search(&1).unwrap();
        tree.remove_node(one);
        assert_rank_rule(&tree);
        assert_eq!(in_order(&tree), vec![2, 3]);
    }

    #[test]
    fn two_child_removal_keeps_successor_cursor_index_valid() {
        let mut tree = ascending_tree();
        for k in [4, 2, 6, 1, 3, 5, 7] {
            tree.insert_or_replace(k, "v");
        }
        let four = tree.search(&4).unwrap();
        let succ = tree.successor(four).unwrap();
        assert_eq!(*tree.key(succ), 5);
        tree.remove_node(four);
        // The successor's arena slot must still be live and unchanged.
        assert!(tree.is_live(succ));
        assert_eq!(*tree.key(succ), 5);
        assert_rank_rule(&tree);
    }

    #[test]
    fn predecessor_and_successor_walk() {
        let mut tree = ascending_tree();
        for k in [5, 3, 8, 1, 4, 7, 9] {
            tree.insert_or_replace(k, "v");
        }
        let five = tree.search(&5).unwrap();
        let pred = tree.predecessor(five).unwrap();
        let succ = tree.successor(five).unwrap();
        assert_eq!(*tree.key(pred), 4);
        assert_eq!(*tree.key(succ), 7);
    }

    /// Regression for an insert-fixup case analysis that was inverted: three
    /// ascending inserts triggering a single-rotation fixup used to leave the
    /// root at a rank-difference-3 edge over its sentinel child instead of
    /// rotating into a balanced 3-node tree.
    #[test]
    fn ascending_triple_insert_rotates_into_balanced_tree() {
        let mut tree = ascending_tree();
        for k in [1, 2, 3] {
            tree.insert_or_replace(k, "v");
        }
        assert_eq!(in_order(&tree), vec![1, 2, 3]);
        assert_rank_rule(&tree);
        let root = tree.root.unwrap();
        assert_eq!(*tree.key(root), 2, "balanced insert should root at the median key");
    }

    /// Randomized insert/remove soak exercising the rank rule itself (not
    /// just ordering/size), over many sequences and tree shapes, so a
    /// balance-breaking fixup defect can't hide behind a small deterministic
    /// case.
    #[test]
    fn randomized_operations_preserve_rank_rule() {
        use rand::Rng;
        use std::collections::BTreeSet;

        let mut rng = rand::rng();
        for _trial in 0..20 {
            let mut tree = ascending_tree();
            let mut live: BTreeSet<i32> = BTreeSet::new();
            for _step in 0..300 {
                let key = rng.random_range(0..100);
                if rng.random_bool(0.65) {
                    tree.insert_or_replace(key, "v");
                    live.insert(key);
                } else if let Some(idx) = tree.search(&key) {
                    tree.remove_node(idx);
                    live.remove(&key);
                }
                assert_eq!(tree.len(), live.len());
            }
            assert_eq!(in_order(&tree), live.into_iter().collect::<Vec<_>>());
            assert_rank_rule(&tree);
        }
    }
}
