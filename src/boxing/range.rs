//! Token ranges
//!
//! Ranges index into one specific token snapshot. Once tokens are inserted or removed, ranges
//! computed before the edit are stale, which is why the engine applies edits from the highest
//! index down.

use serde::Serialize;
use std::fmt;

/// Inclusive `[start, end]` token indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TokenRange {
    pub start: usize,
    pub end: usize,
}

impl TokenRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "range start {start} after end {end}");
        Self { start, end }
    }
}

impl fmt::Display for TokenRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Which half of a wrapper a match belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// A wrapper half found in a token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ToggleRange {
    pub side: Side,
    pub range: TokenRange,
}

impl ToggleRange {
    pub fn new(side: Side, start: usize, end: usize) -> Self {
        Self {
            side,
            range: TokenRange::new(start, end),
        }
    }
}
