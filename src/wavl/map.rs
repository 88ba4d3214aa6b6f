/*! An ordered key-value map backed by a weak AVL tree

# About
`WavlMap` is the public façade over the crate's internal `Tree`: a sorted
associative container with `O(log n)` search/insert/delete, cursor-based
positional editing, and bounded range views, built for ordered traversal and
stable positional handles rather than simple key lookup.

# Example
```rust
use wavl_map::WavlMap;

let mut map = WavlMap::new();
map.insert(2, "two");
map.insert(1, "one");
map.insert(3, "three");

assert_eq!(map.get(&2), Some(&"two"));
assert_eq!(map.keys(), vec![&1, &2, &3]);

map.delete(&2);
assert!(!map.has(&2));
```
*/

use std::cmp::Ordering;
use std::fmt;

use super::comparator::ascending;
use super::cursor::{Cursor, KeyedCursor};
use super::error::WavlError;
use super::node::Side;
use super::range::Range;
use super::tree::{Slot, Tree};

pub struct WavlMap<K, V> {
    pub(crate) tree: Tree<K, V>,
}

impl<K: Ord, V> Default for WavlMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> WavlMap<K, V> {
    /// An empty map ordered by [ascending].
    pub fn new() -> Self {
        Self::with_comparator(Box::new(ascending))
    }

    /// Builds a map from an iterable of pairs, inserted in iteration order
    /// (later duplicates overwrite earlier ones), ordered by [ascending].
    pub fn from_iter(iter: impl IntoIterator<Item = (K, V)>) -> Self {
        Self::from_iter_with(iter, Box::new(ascending))
    }
}

impl<K, V> WavlMap<K, V> {
    /// An empty map ordered by `cmp`, a pure total-order function that must
    /// stay consistent across the map's lifetime.
    pub fn with_comparator(cmp: Box<dyn Fn(&K, &K) -> Ordering>) -> Self {
        WavlMap { tree: Tree::new(cmp) }
    }

    pub fn from_iter_with(iter: impl IntoIterator<Item = (K, V)>, cmp: Box<dyn Fn(&K, &K) -> Ordering>) -> Self {
        let mut map = Self::with_comparator(cmp);
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }

    pub fn size(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn compare(&self, a: &K, b: &K) -> Ordering {
        (self.tree.cmp)(a, b)
    }

    pub fn has(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.tree.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.tree.get_mut(key)
    }

    /// Builder-style insert: always succeeds, returns `self` for chaining.
    pub fn set(&mut self, key: K, value: V) -> &mut Self {
        self.tree.insert_or_replace(key, value);
        self
    }

    /// Inserts `key`/`value`, returning the replaced value if present.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.tree.insert_or_replace(key, value)
    }

    /// Removes `key`, returning whether it was present.
    pub fn delete(&mut self, key: &K) -> bool {
        match self.tree.search(key) {
            Some(idx) => {
                self.tree.remove_node(idx);
                true
            }
            None => false,
        }
    }

    /// Removes `key`, returning its value if present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.tree.search(key)?;
        Some(self.tree.remove_node(idx).1)
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub fn first(&self) -> Cursor {
        match self.tree.root {
            Some(r) => Cursor::occupied(self.tree.min_of(r)),
            None => Cursor::vacant(None, Side::Left),
        }
    }

    pub fn last(&self) -> Cursor {
        match self.tree.root {
            Some(r) => Cursor::occupied(self.tree.max_of(r)),
            None => Cursor::vacant(None, Side::Right),
        }
    }

    /// A keyed cursor at `key`: Occupied if present, Vacant (carrying `key`
    /// as its insertion hint) otherwise.
    pub fn entry(&self, key: K) -> KeyedCursor<K> {
        match self.tree.search_slot(&key) {
            Slot::Hit(idx) => KeyedCursor::occupied(idx),
            Slot::Miss { parent, side } => KeyedCursor::vacant(parent, side, key),
        }
    }

    pub fn range(&self, start: Option<&K>, end: Option<&K>, exclusive: bool) -> Result<Range, WavlError> {
        Range::resolve(&self.tree, start, end, exclusive)
    }

    fn full_range(&self) -> Range {
        Range::resolve(&self.tree, None, None, false)
            .expect("omitting both start and end never raises InvalidRange")
    }

    pub fn keys(&self) -> Vec<&K> {
        self.full_range().keys(self)
    }

    pub fn keys_rev(&self) -> Vec<&K> {
        self.full_range().keys_rev(self)
    }

    pub fn values(&self) -> Vec<&V> {
        self.full_range().values(self)
    }

    pub fn values_rev(&self) -> Vec<&V> {
        self.full_range().values_rev(self)
    }

    pub fn entries(&self) -> Vec<(&K, &V)> {
        self.full_range().entries(self)
    }

    pub fn entries_rev(&self) -> Vec<(&K, &V)> {
        self.full_range().entries_rev(self)
    }

    pub fn for_each(&self, f: impl FnMut(&K, &V, &WavlMap<K, V>)) {
        self.full_range().for_each(self, f);
    }

    pub fn for_each_rev(&self, f: impl FnMut(&K, &V, &WavlMap<K, V>)) {
        self.full_range().for_each_rev(self, f);
    }

    /// JSON materialisation as an array of `[key, value]` pairs.
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> serde_json::Value
    where
        K: serde::Serialize,
        V: serde::Serialize,
    {
        serde_json::to_value(self.entries()).expect("an in-memory map always serializes")
    }

    /// Recomputes the WAVL rank of every node bottom-up and panics if the
    /// rank rule (§3 invariant 4: every parent/child rank difference is 1 or
    /// 2; §3 invariant 5: every leaf is at rank 0) is violated anywhere in
    /// the tree. `O(n)`. A diagnostic hook for the test suite to verify
    /// balance is actually maintained across randomized operation sequences,
    /// not part of ordinary map use.
    #[doc(hidden)]
    pub fn assert_wavl_invariant(&self) {
        self.tree.assert_rank_rule();
    }
}

impl<'a, K, V> IntoIterator for &'a WavlMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = std::vec::IntoIter<(&'a K, &'a V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries().into_iter()
    }
}

/// Consumes the map, yielding every `(K, V)` pair in ascending `cmp` order.
impl<K, V> IntoIterator for WavlMap<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(mut self) -> Self::IntoIter {
        let mut range = self.full_range();
        range.remove(&mut self).into_iter()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for WavlMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        WavlMap::from_iter(iter)
    }
}

impl<K: Ord, V> Extend<(K, V)> for WavlMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V> fmt::Debug for WavlMap<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::comparator::descending;

    #[test]
    fn scenario_a_basic_crud() {
        let mut map = WavlMap::new();
        map.insert(1, "one");
        map.insert(2, "two");
        map.insert(3, "three");
        assert_eq!(map.get(&2), Some(&"two"));
        assert!(map.delete(&2));
        assert!(!map.has(&2));
        assert_eq!(map.size(), 2);
    }

    #[test]
    fn scenario_b_cursor_positional_insert() {
        let mut map: WavlMap<i32, &'static str> = WavlMap::new();
        map.entry(1).insert(&mut map, "one").unwrap();
        map.entry(2).insert(&mut map, "two").unwrap();
        map.entry(3).insert(&mut map, "three").unwrap();

        let one = map.entry(1).as_cursor();
        one.insert_before(&mut map, 0, "zero").unwrap();
        let three = map.entry(3).as_cursor();
        three.insert_after(&mut map, 4, "four").unwrap();

        let one = map.entry(1).as_cursor();
        assert_eq!(*one.prev(&map).unwrap().key(&map).unwrap().unwrap(), 0);
        assert_eq!(*one.next(&map).unwrap().key(&map).unwrap().unwrap(), 2);

        let removed = map.first().remove(&mut map).unwrap();
        assert_eq!(removed, (0, "zero"));
        assert_eq!(map.keys(), vec![&1, &2, &3, &4]);

        assert!(map.entry(2).as_cursor().delete(&mut map).unwrap());
        assert!(!map.entry(2).as_cursor().delete(&mut map).unwrap());
    }

    #[test]
    fn scenario_d_range_inclusive_exclusive() {
        let map = WavlMap::from_iter((1..=5).map(|k| (k, k)));
        let inclusive = map.range(Some(&2), Some(&4), false).unwrap();
        assert_eq!(inclusive.keys(&map), vec![&2, &3, &4]);
        let exclusive = map.range(Some(&2), Some(&4), true).unwrap();
        assert_eq!(exclusive.keys(&map), vec![&2, &3]);
    }

    #[test]
    fn scenario_f_descending_comparator() {
        let map = WavlMap::from_iter_with([(1, "a"), (2, "b"), (3, "c")], Box::new(descending));
        assert_eq!(map.keys(), vec![&3, &2, &1]);
        assert_eq!(*map.first().key(&map).unwrap().unwrap(), 3);
    }

    #[test]
    fn scenario_g_stale_cursor() {
        let mut map: WavlMap<i32, &'static str> = WavlMap::new();
        for k in 1..=9 {
            map.insert(k, "v");
        }
        let e = map.entry(5).as_cursor();
        map.delete(&5);
        let err = e.next(&map).unwrap_err();
        assert!(matches!(err, WavlError::StaleCursor));
    }

    #[test]
    fn round_trip_through_entries_preserves_order() {
        let map = WavlMap::from_iter([(3, "c"), (1, "a"), (2, "b")]);
        let rebuilt = WavlMap::from_iter(map.entries().into_iter().map(|(k, v)| (*k, *v)));
        assert_eq!(map.entries(), rebuilt.entries());
    }

    #[test]
    fn owned_into_iter_drains_in_order() {
        let map = WavlMap::from_iter([(3, "c"), (1, "a"), (2, "b")]);
        let collected: Vec<_> = map.into_iter().collect();
        assert_eq!(collected, vec![(1, "a"), (2, "b"), (3, "c")]);
    }

    #[test]
    fn extend_inserts_all_pairs() {
        let mut map = WavlMap::new();
        map.extend([(2, "two"), (1, "one")]);
        assert_eq!(map.keys(), vec![&1, &2]);
    }

    #[test]
    fn debug_prints_sorted_entries() {
        let map = WavlMap::from_iter([(2, "b"), (1, "a")]);
        let rendered = format!("{:?}", map);
        assert_eq!(rendered, r#"{1: "a", 2: "b"}"#);
    }

    #[cfg(feature = "json")]
    #[test]
    fn to_json_materializes_sorted_kv_pairs() {
        let map = WavlMap::from_iter([(2, "two"), (1, "one"), (3, "three")]);
        assert_eq!(
            map.to_json(),
            serde_json::json!([[1, "one"], [2, "two"], [3, "three"]])
        );
    }
}
