/*! # About
`wavl_map` is an ordered key-value map backed by a weak AVL (WAVL) tree: a
binary search tree balanced through per-node rank parities, rebalanced with
at most two rotations per update. Unlike a hash table, it keeps keys in
sorted order at all times, which is what buys it logarithmic positional
navigation (cursors) and bounded range views (inclusive/exclusive slices
with bulk delete/extract) on top of ordinary key lookup.

# Surfaces
- A basic dictionary API: [`WavlMap::get`]/[`WavlMap::insert`]/
  [`WavlMap::delete`]/[`WavlMap::remove`].
- A cursor/entry API ([`wavl::cursor`]) for `prev`/`next` navigation,
  positional `insert_before`/`insert_after`, and in-place deletion, with
  staleness detection after structural mutation.
- A range API ([`wavl::range`]) that selects a contiguous key interval and
  supports iteration, bulk delete, and bulk extract.

# Example
```rust
use wavl_map::WavlMap;

let mut map = WavlMap::from_iter([(1, "one"), (2, "two"), (3, "three")]);
assert_eq!(map.get(&2), Some(&"two"));

let mut range = map.range(Some(&1), Some(&2), false).unwrap();
assert_eq!(range.remove(&mut map), vec![(1, "one"), (2, "two")]);
assert_eq!(map.keys(), vec![&3]);
```

See [`wavl::map::WavlMap`] for the full façade.
*/

pub mod wavl;

pub use wavl::{ascending, descending, Cursor, KeyedCursor, Range, WavlError, WavlMap};
