//! The version-counting wrapper
//!
//! `Versioned` sits on top of one value record and counts the mutations made
//! through it. It never copies the record into itself when binding to caller
//! storage, so `peek()` always reflects the live value, including writes made
//! through other wrappers bound to the same cell.

use std::cell::Cell;
use std::fmt;
use std::ops::Shl;

use crate::storage::Storage;

/// A value record paired with a mutation counter.
///
/// The counter starts at zero and grows by exactly one per [`update`] call,
/// whatever the mutation does (including nothing at all). It counts calls,
/// not changed fields.
///
/// # Storage
///
/// - [`bind`] and [`bind_cell`] borrow caller-owned storage. The borrow
///   checker keeps the storage alive for as long as the wrapper is.
/// - [`owned`] moves the value into a heap cell that the wrapper owns and
///   releases exactly once when it is dropped.
///
/// # Reentrancy
///
/// `update` takes `&mut self`, so a mutation cannot call back into the same
/// wrapper. A mutation that updates the same cell through a *different*
/// wrapper is unsupported: the outer mutation stores its own result last,
/// overwriting the inner write (the inner wrapper's counter still advances).
///
/// # Example
///
/// ```
/// use versioned::Versioned;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// struct Point { x: i32, y: i32 }
///
/// let mut point = Point { x: 0, y: 0 };
/// let mut tracked = Versioned::bind(&mut point);
///
/// tracked.update(|p| p.x = 3);
/// tracked.update(|p| p.y += 4);
///
/// assert_eq!(tracked.peek(), Point { x: 3, y: 4 });
/// assert_eq!(tracked.version(), 2);
/// ```
///
/// [`update`]: Versioned::update
/// [`bind`]: Versioned::bind
/// [`bind_cell`]: Versioned::bind_cell
/// [`owned`]: Versioned::owned
pub struct Versioned<'a, T> {
    /// Where the record lives
    storage: Storage<'a, T>,

    /// Number of `update` calls made through this wrapper
    version: u64,
}

impl<'a, T: Copy> Versioned<'a, T> {
    /// Bind to caller-owned storage.
    ///
    /// The wrapper starts at version 0 and writes go straight to `storage`.
    pub fn bind(storage: &'a mut T) -> Self {
        Self::bind_cell(Cell::from_mut(storage))
    }

    /// Bind to a caller-owned cell.
    ///
    /// Unlike [`bind`](Versioned::bind), several wrappers may share one cell.
    /// Each keeps its own counter while observing the others' writes. Elements
    /// of a caller-owned slice can be wrapped via `Cell::as_slice_of_cells`.
    pub fn bind_cell(storage: &'a Cell<T>) -> Self {
        Self {
            storage: Storage::Borrowed(storage),
            version: 0,
        }
    }

    /// Take ownership of `value` in freshly allocated storage.
    pub fn owned(value: T) -> Self {
        Self {
            storage: Storage::allocate(value),
            version: 0,
        }
    }

    /// Snapshot of the current value.
    pub fn peek(&self) -> T {
        self.storage.cell().get()
    }

    /// Apply `mutation` to the live value, then bump the version.
    ///
    /// The mutation always completes before the counter moves.
    pub fn update<F>(&mut self, mutation: F)
    where
        F: FnOnce(&mut T),
    {
        let cell = self.storage.cell();
        let mut value = cell.get();
        mutation(&mut value);
        cell.set(value);
        self.version += 1;
    }

    /// [`update`](Versioned::update), returning the wrapper for chaining.
    ///
    /// ```
    /// use versioned::Versioned;
    ///
    /// let mut tracked = Versioned::owned(10u32);
    /// tracked.then(|n| *n -= 2).then(|n| *n -= 3);
    /// assert_eq!(tracked.peek(), 5);
    /// assert_eq!(tracked.version(), 2);
    /// ```
    pub fn then<F>(&mut self, mutation: F) -> &mut Self
    where
        F: FnOnce(&mut T),
    {
        self.update(mutation);
        self
    }

    /// Number of updates applied through this wrapper.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether this wrapper allocated (and will release) its storage.
    pub fn owns_storage(&self) -> bool {
        self.storage.is_owned()
    }

    /// Consume the wrapper, returning the current value.
    ///
    /// Owned storage is released here; borrowed storage keeps the value.
    pub fn into_value(self) -> T {
        self.peek()
    }
}

/// Operator form of [`Versioned::then`].
///
/// ```
/// use versioned::Versioned;
///
/// let mut count = 0u8;
/// let mut tracked = Versioned::bind(&mut count);
/// let _ = &mut tracked << (|n: &mut u8| *n += 1) << (|n: &mut u8| *n *= 10);
/// assert_eq!(tracked.peek(), 10);
/// assert_eq!(tracked.version(), 2);
/// ```
impl<'w, 'a, T, F> Shl<F> for &'w mut Versioned<'a, T>
where
    T: Copy,
    F: FnOnce(&mut T),
{
    type Output = &'w mut Versioned<'a, T>;

    fn shl(self, mutation: F) -> Self::Output {
        self.then(mutation)
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for Versioned<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Versioned")
            .field("value", &self.peek())
            .field("version", &self.version)
            .field("storage", &self.storage)
            .finish()
    }
}
