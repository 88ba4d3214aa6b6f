//! Errors surfaced at the map/cursor/range boundary.
//!
//! These are all programmer errors — misuse of a stale handle or an
//! out-of-order argument — not conditions callers are expected to recover
//! from in the ordinary course of using the map. They're still plain values
//! rather than panics so callers can choose to `match` on them (tests in
//! particular want to assert on the exact variant).

use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavlError {
    /// A cursor or keyed cursor was operated on after the node it pointed at
    /// was removed from the tree.
    StaleCursor,
    /// `insert_before`/`insert_after` was given a key outside the open
    /// interval between the cursor's neighbors.
    KeyOrderViolation,
    /// `range(start, end, ..)` was called with `start > end`.
    InvalidRange,
    /// `first()`/`last()` was called on a range object after a destructive
    /// `delete()`/`remove()` already consumed it.
    ConsumedRange,
}

impl fmt::Display for WavlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            WavlError::StaleCursor => "cursor refers to a node that has been removed",
            WavlError::KeyOrderViolation => "key is outside the required ordering interval",
            WavlError::InvalidRange => "range start is greater than range end",
            WavlError::ConsumedRange => "range has already been consumed by delete/remove",
        };
        f.write_str(msg)
    }
}

impl Error for WavlError {}
