//! Positional handles into a [WavlMap]: a live node ([State::Occupied]) or an
//! insertion slot ([State::Vacant]).
//!
//! Unlike a pointer-based cursor that borrows its container for the cursor's
//! entire lifetime and leans on `unsafe` raw pointers to dodge the aliasing
//! that borrow implies, a cursor here is nothing but a couple of `usize`s: an
//! arena index, or an anchor index plus a side. It carries no reference to
//! the map at all, so holding
//! one places no borrow-checker constraint on the map — every method takes
//! the map it operates on as an explicit argument, the same way a
//! `generational-arena`/`slotmap` key works. That's what lets a caller hold
//! a cursor across an unrelated mutation performed directly through the map
//! and have the cursor correctly detect its own staleness on next use,
//! rather than simply failing to compile.

use std::cmp::Ordering;

use super::error::WavlError;
use super::map::WavlMap;
use super::node::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Occupied(usize),
    Vacant { anchor: Option<usize>, side: Side },
}

/// A handle to a tree position. See the [module docs](self) for why this
/// carries no map reference of its own.
#[derive(Debug, Clone, Copy)]
pub struct Cursor {
    state: State,
}

impl Cursor {
    pub(crate) fn occupied(idx: usize) -> Self {
        Cursor {
            state: State::Occupied(idx),
        }
    }

    pub(crate) fn vacant(anchor: Option<usize>, side: Side) -> Self {
        Cursor {
            state: State::Vacant { anchor, side },
        }
    }

    fn validate<K, V>(&self, map: &WavlMap<K, V>) -> Result<(), WavlError> {
        match self.state {
            State::Occupied(idx) if !map.tree.is_live(idx) => Err(WavlError::StaleCursor),
            State::Vacant { anchor: Some(idx), .. } if !map.tree.is_live(idx) => {
                Err(WavlError::StaleCursor)
            }
            _ => Ok(()),
        }
    }

    pub fn is_empty<K, V>(&self, map: &WavlMap<K, V>) -> Result<bool, WavlError> {
        self.validate(map)?;
        Ok(matches!(self.state, State::Vacant { .. }))
    }

    pub fn key<'a, K, V>(&self, map: &'a WavlMap<K, V>) -> Result<Option<&'a K>, WavlError> {
        self.validate(map)?;
        Ok(match self.state {
            State::Occupied(idx) => Some(map.tree.key(idx)),
            State::Vacant { .. } => None,
        })
    }

    pub fn value<'a, K, V>(&self, map: &'a WavlMap<K, V>) -> Result<Option<&'a V>, WavlError> {
        self.validate(map)?;
        Ok(match self.state {
            State::Occupied(idx) => Some(map.tree.value(idx)),
            State::Vacant { .. } => None,
        })
    }

    pub fn entry<'a, K, V>(&self, map: &'a WavlMap<K, V>) -> Result<Option<(&'a K, &'a V)>, WavlError> {
        self.validate(map)?;
        Ok(match self.state {
            State::Occupied(idx) => Some((map.tree.key(idx), map.tree.value(idx))),
            State::Vacant { .. } => None,
        })
    }

    pub fn prev<K, V>(&self, map: &WavlMap<K, V>) -> Result<Cursor, WavlError> {
        self.validate(map)?;
        let tree = &map.tree;
        match self.state {
            State::Occupied(idx) => {
                if let Some(l) = tree.node(idx).left {
                    return Ok(Cursor::occupied(tree.max_of(l)));
                }
                let mut cur = idx;
                let mut parent = tree.node(idx).parent;
                while let Some(p) = parent {
                    if tree.node(p).right == Some(cur) {
                        return Ok(Cursor::occupied(p));
                    }
                    cur = p;
                    parent = tree.node(p).parent;
                }
                Ok(Cursor::vacant(Some(idx), Side::Left))
            }
            State::Vacant { anchor, side } => match anchor {
                None => Ok(Cursor::vacant(None, Side::Left)),
                Some(a) => match side {
                    Side::Right => Ok(Cursor::occupied(a)),
                    Side::Left => match tree.predecessor(a) {
                        Some(p) => Ok(Cursor::occupied(p)),
                        None => Ok(*self), // already first
                    },
                },
            },
        }
    }

    pub fn next<K, V>(&self, map: &WavlMap<K, V>) -> Result<Cursor, WavlError> {
        self.validate(map)?;
        let tree = &map.tree;
        match self.state {
            State::Occupied(idx) => {
                if let Some(r) = tree.node(idx).right {
                    return Ok(Cursor::occupied(tree.min_of(r)));
                }
                let mut cur = idx;
                let mut parent = tree.node(idx).parent;
                while let Some(p) = parent {
                    if tree.node(p).left == Some(cur) {
                        return Ok(Cursor::occupied(p));
                    }
                    cur = p;
                    parent = tree.node(p).parent;
                }
                Ok(Cursor::vacant(Some(idx), Side::Right))
            }
            State::Vacant { anchor, side } => match anchor {
                None => Ok(Cursor::vacant(None, Side::Right)),
                Some(a) => match side {
                    Side::Left => Ok(Cursor::occupied(a)),
                    Side::Right => match tree.successor(a) {
                        Some(s) => Ok(Cursor::occupied(s)),
                        None => Ok(*self), // already last
                    },
                },
            },
        }
    }

    pub fn insert_before<K, V>(
        &self,
        map: &mut WavlMap<K, V>,
        key: K,
        value: V,
    ) -> Result<Cursor, WavlError> {
        self.validate(map)?;
        match self.state {
            State::Occupied(idx) => {
                let prev = map.tree.predecessor(idx);
                if let Some(p) = prev {
                    if (map.tree.cmp)(map.tree.key(p), &key) != Ordering::Less {
                        return Err(WavlError::KeyOrderViolation);
                    }
                }
                if (map.tree.cmp)(&key, map.tree.key(idx)) != Ordering::Less {
                    return Err(WavlError::KeyOrderViolation);
                }
                let new_idx = if map.tree.node(idx).left.is_none() {
                    map.tree.insert_at_slot(Some(idx), Side::Left, key, value)
                } else {
                    let p = prev.expect("a node with a left child has a predecessor");
                    map.tree.insert_at_slot(Some(p), Side::Right, key, value)
                };
                Ok(Cursor::occupied(new_idx))
            }
            State::Vacant { anchor, side } => {
                self.check_bounds_for_vacant_insert(map, &key)?;
                let new_idx = map.tree.insert_at_slot(anchor, side, key, value);
                Ok(Cursor::occupied(new_idx))
            }
        }
    }

    pub fn insert_after<K, V>(
        &self,
        map: &mut WavlMap<K, V>,
        key: K,
        value: V,
    ) -> Result<Cursor, WavlError> {
        self.validate(map)?;
        match self.state {
            State::Occupied(idx) => {
                let next = map.tree.successor(idx);
                if (map.tree.cmp)(map.tree.key(idx), &key) != Ordering::Less {
                    return Err(WavlError::KeyOrderViolation);
                }
                if let Some(n) = next {
                    if (map.tree.cmp)(&key, map.tree.key(n)) != Ordering::Less {
                        return Err(WavlError::KeyOrderViolation);
                    }
                }
                let new_idx = if map.tree.node(idx).right.is_none() {
                    map.tree.insert_at_slot(Some(idx), Side::Right, key, value)
                } else {
                    let n = next.expect("a node with a right child has a successor");
                    map.tree.insert_at_slot(Some(n), Side::Left, key, value)
                };
                Ok(Cursor::occupied(new_idx))
            }
            State::Vacant { anchor, side } => {
                self.check_bounds_for_vacant_insert(map, &key)?;
                let new_idx = map.tree.insert_at_slot(anchor, side, key, value);
                Ok(Cursor::occupied(new_idx))
            }
        }
    }

    /// A vacant slot has exactly one legal insertion point, bounded by the
    /// keys its own `prev`/`next` would resolve to.
    fn check_bounds_for_vacant_insert<K, V>(&self, map: &WavlMap<K, V>, key: &K) -> Result<(), WavlError> {
        if let Some(pk) = self.prev(map)?.key(map)? {
            if (map.tree.cmp)(pk, key) != Ordering::Less {
                return Err(WavlError::KeyOrderViolation);
            }
        }
        if let Some(nk) = self.next(map)?.key(map)? {
            if (map.tree.cmp)(key, nk) != Ordering::Less {
                return Err(WavlError::KeyOrderViolation);
            }
        }
        Ok(())
    }

    pub fn delete<K, V>(&self, map: &mut WavlMap<K, V>) -> Result<bool, WavlError> {
        self.validate(map)?;
        match self.state {
            State::Occupied(idx) => {
                map.tree.remove_node(idx);
                Ok(true)
            }
            State::Vacant { .. } => Ok(false),
        }
    }

    pub fn remove<K, V>(&self, map: &mut WavlMap<K, V>) -> Result<Option<(K, V)>, WavlError> {
        self.validate(map)?;
        match self.state {
            State::Occupied(idx) => Ok(Some(map.tree.remove_node(idx))),
            State::Vacant { .. } => Ok(None),
        }
    }
}

/// A cursor produced by a keyed lookup ([crate::wavl::map::WavlMap::entry]).
/// Adds `insert`/`set`, which morph a vacant cursor into an occupied one in
/// place so chained calls on the same handle see the newly inserted node.
pub struct KeyedCursor<K> {
    cursor: Cursor,
    key_hint: Option<K>,
}

impl<K> KeyedCursor<K> {
    pub(crate) fn occupied(idx: usize) -> Self {
        KeyedCursor {
            cursor: Cursor::occupied(idx),
            key_hint: None,
        }
    }

    pub(crate) fn vacant(anchor: Option<usize>, side: Side, key: K) -> Self {
        KeyedCursor {
            cursor: Cursor::vacant(anchor, side),
            key_hint: Some(key),
        }
    }

    pub fn as_cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn is_empty<V>(&self, map: &WavlMap<K, V>) -> Result<bool, WavlError> {
        self.cursor.is_empty(map)
    }

    pub fn key<'a, V>(&'a self, map: &'a WavlMap<K, V>) -> Result<&'a K, WavlError> {
        self.cursor.validate(map)?;
        Ok(match self.cursor.state {
            State::Occupied(idx) => map.tree.key(idx),
            State::Vacant { .. } => self
                .key_hint
                .as_ref()
                .expect("a keyed cursor always carries its hint while vacant"),
        })
    }

    pub fn value<'a, V>(&self, map: &'a WavlMap<K, V>) -> Result<Option<&'a V>, WavlError> {
        self.cursor.value(map)
    }

    pub fn entry<'a, V>(&'a self, map: &'a WavlMap<K, V>) -> Result<Option<(&'a K, &'a V)>, WavlError> {
        self.cursor.entry(map)
    }

    pub fn prev<V>(&self, map: &WavlMap<K, V>) -> Result<Cursor, WavlError> {
        self.cursor.prev(map)
    }

    pub fn next<V>(&self, map: &WavlMap<K, V>) -> Result<Cursor, WavlError> {
        self.cursor.next(map)
    }

    pub fn delete<V>(&self, map: &mut WavlMap<K, V>) -> Result<bool, WavlError> {
        self.cursor.delete(map)
    }

    pub fn remove<V>(&self, map: &mut WavlMap<K, V>) -> Result<Option<(K, V)>, WavlError> {
        self.cursor.remove(map)
    }

    /// Inserts `value` at the known slot (morphing Vacant into Occupied) or
    /// replaces the existing value, returning the value that was displaced.
    pub fn insert<V>(&mut self, map: &mut WavlMap<K, V>, value: V) -> Result<Option<V>, WavlError> {
        self.cursor.validate(map)?;
        match self.cursor.state {
            State::Occupied(idx) => Ok(Some(std::mem::replace(map.tree.value_mut(idx), value))),
            State::Vacant { anchor, side } => {
                let key = self
                    .key_hint
                    .take()
                    .expect("a keyed cursor always carries its hint while vacant");
                let idx = map.tree.insert_at_slot(anchor, side, key, value);
                self.cursor = Cursor::occupied(idx);
                Ok(None)
            }
        }
    }

    /// Builder-style sibling of [Self::insert]: same effect, returns `self`.
    pub fn set<V>(&mut self, map: &mut WavlMap<K, V>, value: V) -> Result<&mut Self, WavlError> {
        self.insert(map, value)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wavl::map::WavlMap;

    fn map_with(keys: &[i32]) -> WavlMap<i32, &'static str> {
        let mut map = WavlMap::new();
        for k in keys {
            map.insert(*k, "v");
        }
        map
    }

    #[test]
    fn prev_next_walk_matches_sorted_order() {
        let map = map_with(&[3, 1, 2]);
        let cursor = map.entry(2).as_cursor();
        assert_eq!(*cursor.prev(&map).unwrap().key(&map).unwrap().unwrap(), 1);
        assert_eq!(*cursor.next(&map).unwrap().key(&map).unwrap().unwrap(), 3);
    }

    #[test]
    fn stale_cursor_after_removal_raises() {
        let mut map = map_with(&[1, 2, 3]);
        let cursor = map.entry(2).as_cursor();
        map.delete(&2);
        let err = cursor.next(&map).unwrap_err();
        assert!(matches!(err, WavlError::StaleCursor));
    }

    #[test]
    fn insert_before_rejects_out_of_order_key() {
        let mut map = map_with(&[1, 2, 3]);
        let cursor = map.entry(2).as_cursor();
        let err = cursor.insert_before(&mut map, 2, "x").unwrap_err();
        assert!(matches!(err, WavlError::KeyOrderViolation));
    }

    #[test]
    fn keyed_cursor_insert_morphs_vacant_to_occupied() {
        let mut map: WavlMap<i32, &'static str> = WavlMap::new();
        let mut kc = map.entry(1);
        assert_eq!(kc.insert(&mut map, "one").unwrap(), None);
        assert_eq!(*kc.key(&map).unwrap(), 1);
        assert_eq!(kc.insert(&mut map, "uno").unwrap(), Some("one"));
    }
}
