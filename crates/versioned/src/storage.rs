//! Backing storage for a versioned wrapper
//!
//! A wrapper either borrows storage the caller controls or owns a heap cell
//! it allocated itself. The two cases are a tagged variant so that release is
//! decided by the type, not by a flag: owned storage is a `Box` dropped exactly
//! once with the wrapper, borrowed storage has no release path at all.

use std::cell::Cell;
use std::fmt;

/// Where the value behind a wrapper lives.
pub(crate) enum Storage<'a, T> {
    /// Heap cell allocated for, and released with, the wrapper
    Owned(Box<Cell<T>>),

    /// Caller-owned cell; outlives the wrapper by construction
    Borrowed(&'a Cell<T>),
}

impl<'a, T> Storage<'a, T> {
    /// Allocate a fresh cell holding `value`.
    pub(crate) fn allocate(value: T) -> Self {
        Storage::Owned(Box::new(Cell::new(value)))
    }

    /// The live cell, whichever variant holds it.
    pub(crate) fn cell(&self) -> &Cell<T> {
        match self {
            Storage::Owned(cell) => cell.as_ref(),
            Storage::Borrowed(cell) => *cell,
        }
    }

    pub(crate) fn is_owned(&self) -> bool {
        matches!(self, Storage::Owned(_))
    }
}

impl<T> fmt::Debug for Storage<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Storage::Owned(_) => f.write_str("Owned"),
            Storage::Borrowed(_) => f.write_str("Borrowed"),
        }
    }
}
