//! Position ordinals for task ordering within a column.

use serde::{Deserialize, Serialize};

/// An ordinal establishing total order within one column. Values are spaced
/// in steps of 1000 so tasks can be inserted between neighbors without
/// renumbering the column; they are signed so head inserts never run out of
/// room, and they are never required to be contiguous.
///
/// Ordinals are not comparable across columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(i64);

impl Position {
    /// Spacing between freshly assigned positions
    pub const STEP: i64 = 1000;

    /// Wrap a raw ordinal value
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// The raw ordinal value
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Position assigned to the first task of an empty column.
    ///
    /// This is the documented empty-column convention: 1000, one step above
    /// zero, so an insert before it lands at 0 rather than going negative
    /// immediately.
    pub fn first() -> Self {
        Self(Self::STEP)
    }

    /// Position one step after this one
    pub fn after(&self) -> Self {
        Self(self.0.saturating_add(Self::STEP))
    }

    /// Position one step before this one
    pub fn before(&self) -> Self {
        Self(self.0.saturating_sub(Self::STEP))
    }

    /// Integer midpoint strictly between two positions, or `None` when the
    /// gap is exhausted and the column needs renumbering.
    pub fn between(prev: Position, next: Position) -> Option<Position> {
        let (lo, hi) = if prev.0 <= next.0 {
            (prev.0, next.0)
        } else {
            (next.0, prev.0)
        };
        let gap = (hi as i128) - (lo as i128);
        if gap < 2 {
            return None;
        }
        Some(Self(lo + (gap / 2) as i64))
    }

    /// Canonical position for the task at `index` after a renumbering pass:
    /// `(index + 1) * STEP`, restoring full spacing across the column.
    pub fn rebalanced(index: usize) -> Self {
        let ordinal = (index as i64).saturating_add(1);
        Self(ordinal.saturating_mul(Self::STEP))
    }
}
