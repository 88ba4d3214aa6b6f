//! A bounded, possibly-consumed view over a contiguous key interval.
//!
//! `Range` is produced by [crate::wavl::map::WavlMap::range] and stays
//! index-based like everything else here: it borrows the map explicitly on
//! every call rather than owning or aliasing it, so a caller can freely
//! interleave range operations with other map mutations between calls.

use super::cursor::Cursor;
use super::error::WavlError;
use super::map::WavlMap;
use super::node::Side;
use super::range_search::{search_range, RangeKind};
use super::tree::Tree;

pub struct Range {
    lower: Option<usize>,
    upper: Option<usize>,
    kind: RangeKind,
}

impl Range {
    pub(crate) fn resolve<K, V>(
        tree: &Tree<K, V>,
        start: Option<&K>,
        end: Option<&K>,
        exclusive: bool,
    ) -> Result<Range, WavlError> {
        let resolved = search_range(tree, start, end, exclusive)?;
        Ok(Range {
            lower: resolved.lower,
            upper: resolved.upper,
            kind: resolved.kind,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.kind != RangeKind::Default
    }

    /// Walks the slice counting nodes. `O(k)` in the size of the range.
    pub fn count<K, V>(&self, map: &WavlMap<K, V>) -> usize {
        if self.kind != RangeKind::Default {
            return 0;
        }
        let (Some(lower), Some(upper)) = (self.lower, self.upper) else {
            return 0;
        };
        let tree = &map.tree;
        let mut n = 0;
        let mut cur = Some(lower);
        while let Some(idx) = cur {
            n += 1;
            if idx == upper {
                break;
            }
            cur = tree.successor(idx);
        }
        n
    }

    pub fn first<K, V>(&self, map: &WavlMap<K, V>) -> Result<Cursor, WavlError> {
        match self.kind {
            RangeKind::Default => Ok(Cursor::occupied(self.lower.unwrap())),
            RangeKind::Exclusive => self.exclusive_gap_cursor(map),
            RangeKind::Before | RangeKind::After => Ok(Cursor::vacant(
                map.tree.root.map(|r| map.tree.min_of(r)),
                Side::Left,
            )),
            RangeKind::Removed => Err(WavlError::ConsumedRange),
        }
    }

    pub fn last<K, V>(&self, map: &WavlMap<K, V>) -> Result<Cursor, WavlError> {
        match self.kind {
            RangeKind::Default => Ok(Cursor::occupied(self.upper.unwrap())),
            RangeKind::Exclusive => self.exclusive_gap_cursor(map),
            RangeKind::Before | RangeKind::After => Ok(Cursor::vacant(
                map.tree.root.map(|r| map.tree.max_of(r)),
                Side::Right,
            )),
            RangeKind::Removed => Err(WavlError::ConsumedRange),
        }
    }

    /// The gap between `lower` and `upper` when they denote adjacent keys
    /// with nothing strictly between them: a Vacant cursor anchored at the
    /// min of `lower`'s right subtree, or at `lower` itself (branch Right)
    /// when it has no right child — and symmetrically through `upper`'s
    /// left side.
    fn exclusive_gap_cursor<K, V>(&self, map: &WavlMap<K, V>) -> Result<Cursor, WavlError> {
        let tree = &map.tree;
        let lower = self.lower.expect("Exclusive range always carries lower/upper");
        let upper = self.upper.expect("Exclusive range always carries lower/upper");
        if let Some(r) = tree.node(lower).right {
            return Ok(Cursor::vacant(Some(tree.min_of(r)), Side::Left));
        }
        if tree.node(upper).left.is_some() {
            let l = tree.node(upper).left.unwrap();
            return Ok(Cursor::vacant(Some(tree.max_of(l)), Side::Right));
        }
        Ok(Cursor::vacant(Some(lower), Side::Right))
    }

    /// Removes every node in `[lower..upper]`, returning the count removed.
    /// Transitions to `Removed`; a second call returns 0 without touching
    /// the map.
    pub fn delete<K, V>(&mut self, map: &mut WavlMap<K, V>) -> usize {
        self.drain(map).len()
    }

    /// Identical to [Self::delete] but returns the removed pairs in order.
    pub fn remove<K, V>(&mut self, map: &mut WavlMap<K, V>) -> Vec<(K, V)> {
        self.drain(map)
    }

    fn drain<K, V>(&mut self, map: &mut WavlMap<K, V>) -> Vec<(K, V)> {
        if self.kind != RangeKind::Default {
            return Vec::new();
        }
        let (Some(lower), Some(upper)) = (self.lower, self.upper) else {
            self.kind = RangeKind::Removed;
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut cur = Some(lower);
        while let Some(idx) = cur {
            // Pre-fetch next before removing: removal invalidates `idx`.
            let next = if idx == upper { None } else { map.tree.successor(idx) };
            out.push(map.tree.remove_node(idx));
            cur = next;
        }
        self.kind = RangeKind::Removed;
        out
    }

    fn in_order<K, V>(&self, map: &WavlMap<K, V>) -> Vec<usize> {
        if self.kind != RangeKind::Default {
            return Vec::new();
        }
        let (Some(lower), Some(upper)) = (self.lower, self.upper) else {
            return Vec::new();
        };
        let tree = &map.tree;
        let mut out = Vec::new();
        let mut cur = Some(lower);
        while let Some(idx) = cur {
            out.push(idx);
            if idx == upper {
                break;
            }
            cur = tree.successor(idx);
        }
        out
    }

    /// Empty (rather than an error) when this range's `kind` isn't
    /// `Default` — includes once `kind` has become `Removed`.
    pub fn keys<K, V>(&self, map: &WavlMap<K, V>) -> Vec<&K> {
        self.in_order(map).into_iter().map(|i| map.tree.key(i)).collect()
    }

    pub fn keys_rev<K, V>(&self, map: &WavlMap<K, V>) -> Vec<&K> {
        let mut idxs = self.in_order(map);
        idxs.reverse();
        idxs.into_iter().map(|i| map.tree.key(i)).collect()
    }

    pub fn values<K, V>(&self, map: &WavlMap<K, V>) -> Vec<&V> {
        self.in_order(map).into_iter().map(|i| map.tree.value(i)).collect()
    }

    pub fn values_rev<K, V>(&self, map: &WavlMap<K, V>) -> Vec<&V> {
        let mut idxs = self.in_order(map);
        idxs.reverse();
        idxs.into_iter().map(|i| map.tree.value(i)).collect()
    }

    pub fn entries<K, V>(&self, map: &WavlMap<K, V>) -> Vec<(&K, &V)> {
        self.in_order(map)
            .into_iter()
            .map(|i| (map.tree.key(i), map.tree.value(i)))
            .collect()
    }

    pub fn entries_rev<K, V>(&self, map: &WavlMap<K, V>) -> Vec<(&K, &V)> {
        let mut idxs = self.in_order(map);
        idxs.reverse();
        idxs.into_iter()
            .map(|i| (map.tree.key(i), map.tree.value(i)))
            .collect()
    }

    /// `f` is given the key, the value, and a back-reference to the owning
    /// map as its third argument.
    pub fn for_each<K, V>(&self, map: &WavlMap<K, V>, mut f: impl FnMut(&K, &V, &WavlMap<K, V>)) {
        for idx in self.in_order(map) {
            f(map.tree.key(idx), map.tree.value(idx), map);
        }
    }

    pub fn for_each_rev<K, V>(&self, map: &WavlMap<K, V>, mut f: impl FnMut(&K, &V, &WavlMap<K, V>)) {
        let mut idxs = self.in_order(map);
        idxs.reverse();
        for idx in idxs {
            f(map.tree.key(idx), map.tree.value(idx), map);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wavl::map::WavlMap;

    fn map_with(keys: &[i32]) -> WavlMap<i32, i32> {
        let mut map = WavlMap::new();
        for k in keys {
            map.insert(*k, *k * 10);
        }
        map
    }

    #[test]
    fn inclusive_and_exclusive_entries() {
        let map = map_with(&[1, 2, 3, 4, 5]);
        let inclusive = map.range(Some(&2), Some(&4), false).unwrap();
        assert_eq!(inclusive.entries(&map), vec![(&2, &20), (&3, &30), (&4, &40)]);
        let exclusive = map.range(Some(&2), Some(&4), true).unwrap();
        assert_eq!(exclusive.entries(&map), vec![(&2, &20), (&3, &30)]);
    }

    #[test]
    fn count_matches_entries_len() {
        let map = map_with(&[1, 2, 3, 4, 5]);
        let range = map.range(Some(&1), Some(&5), false).unwrap();
        assert_eq!(range.count(&map), range.entries(&map).len());
    }

    #[test]
    fn remove_leaves_only_keys_outside_range() {
        let mut map = map_with(&[1, 2, 3, 4, 5]);
        let mut range = map.range(Some(&2), Some(&4), false).unwrap();
        let removed = range.remove(&mut map);
        assert_eq!(removed, vec![(2, 20), (3, 30), (4, 40)]);
        assert!(range.is_empty());
        assert_eq!(range.delete(&mut map), 0);
    }

    #[test]
    fn first_last_raise_consumed_range_after_removal() {
        let mut map = map_with(&[1, 2, 3]);
        let mut range = map.range(Some(&1), Some(&3), false).unwrap();
        range.delete(&mut map);
        assert!(matches!(range.first(&map), Err(WavlError::ConsumedRange)));
        assert!(matches!(range.last(&map), Err(WavlError::ConsumedRange)));
    }
}
