//! Resolves a `(start?, end?, exclusive)` request into a concrete
//! `[lower..upper]` node-index slice, classified by [RangeKind].
//!
//! Kept as its own module (rather than folded into [crate::wavl::range])
//! because the classification state machine has nothing to do with how a
//! resolved range is later walked or consumed.

use std::cmp::Ordering;

use super::error::WavlError;
use super::tree::{Slot, Tree};

/// Classification of a resolved range. Only `Default` denotes a non-empty
/// slice; the others all describe degenerate (empty) ranges that still carry
/// enough information for [crate::wavl::range::Range::first]/`last` to
/// locate the correct insertion gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RangeKind {
    Default,
    Exclusive,
    Before,
    After,
    Removed,
}

pub(crate) struct Resolved {
    pub(crate) lower: Option<usize>,
    pub(crate) upper: Option<usize>,
    pub(crate) kind: RangeKind,
}

fn empty(kind: RangeKind) -> Resolved {
    Resolved {
        lower: None,
        upper: None,
        kind,
    }
}

pub(crate) fn search_range<K, V>(
    tree: &Tree<K, V>,
    start: Option<&K>,
    end: Option<&K>,
    exclusive: bool,
) -> Result<Resolved, WavlError> {
    if let (Some(s), Some(e)) = (start, end) {
        if (tree.cmp)(s, e) == Ordering::Greater {
            return Err(WavlError::InvalidRange);
        }
    }

    if tree.is_empty() {
        return Ok(empty(RangeKind::Before));
    }

    // -- Resolve lower --------------------------------------------------
    // `lower_had_exclusive_hit` distinguishes "start was an exclusive Hit
    // whose predecessor doesn't exist" (lower is the tree minimum) from
    // "we never looked for a predecessor at all" (start absent or a Miss),
    // since both leave `predecessor_of_lower` at `None`.
    let mut lower_had_exclusive_hit = false;
    let mut predecessor_of_lower = None;
    let lower = match start {
        None => tree.min_of(tree.root.unwrap()),
        Some(s) => match tree.search_slot(s) {
            Slot::Hit(idx) => {
                if exclusive {
                    lower_had_exclusive_hit = true;
                    predecessor_of_lower = tree.predecessor(idx);
                }
                idx
            }
            Slot::Miss { parent, side } => {
                use super::node::Side;
                let parent = parent.expect("non-empty tree always has a search parent");
                match side {
                    Side::Left => parent,
                    Side::Right => match tree.successor(parent) {
                        Some(s) => s,
                        None => return Ok(empty(RangeKind::After)),
                    },
                }
            }
        },
    };

    // -- Resolve upper ----------------------------------------------------
    // `end_decremented_from_hit` marks the one branch where `upper` was
    // pulled back a step from an exact key match on `end`; that's the only
    // place resolving `end` can walk back down onto `lower` itself.
    let mut end_decremented_from_hit = false;
    let upper = match end {
        None => tree.max_of(tree.root.unwrap()),
        Some(e) => match tree.search_slot(e) {
            Slot::Hit(idx) => {
                if exclusive {
                    if lower == idx {
                        return Ok(Resolved {
                            lower: Some(idx),
                            upper: Some(idx),
                            kind: RangeKind::Exclusive,
                        });
                    }
                    end_decremented_from_hit = true;
                    match tree.predecessor(idx) {
                        Some(p) => p,
                        None => return Ok(empty(RangeKind::Before)),
                    }
                } else {
                    idx
                }
            }
            Slot::Miss { parent, side } => {
                use super::node::Side;
                let parent = parent.expect("non-empty tree always has a search parent");
                match side {
                    Side::Right => parent,
                    Side::Left => match tree.predecessor(parent) {
                        Some(p) => p,
                        None => return Ok(empty(RangeKind::Before)),
                    },
                }
            }
        },
    };

    // The range collapses between two tree-adjacent keys whenever `upper`
    // walked back down onto `lower`'s own predecessor — or, when `lower` has
    // no predecessor at all (it's the tree minimum), back onto `lower`
    // itself, which is the degenerate case `predecessor_of_lower == Some(_)`
    // can never express since `None` compares unequal to every `Some(_)`.
    let collapses = match predecessor_of_lower {
        Some(p) => p == upper,
        None => lower_had_exclusive_hit && end_decremented_from_hit && upper == lower,
    };
    if exclusive && collapses {
        return Ok(Resolved {
            lower: Some(upper),
            upper: Some(lower),
            kind: RangeKind::Exclusive,
        });
    }

    Ok(Resolved {
        lower: Some(lower),
        upper: Some(upper),
        kind: RangeKind::Default,
    })
}
