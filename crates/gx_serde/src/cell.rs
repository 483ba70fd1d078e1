//! Shared, freezable instances.
//!
//! Graph instances are handled as [`Shared<T>`], a reference-counted
//! [`GraphCell`]. The cell is the "shell" a per-node deserializer registers
//! before populating any field: mutable while the graph is under
//! construction, and optionally frozen once every deferred patch has been
//! applied. `Rc` (not `Arc`) on purpose — a context and the instances it
//! produces belong to one single-threaded call tree.

use alloc::rc::Rc;
use core::cell::{Cell, Ref, RefCell, RefMut};
use core::{error, fmt};

/// A reference-counted handle to a graph instance.
pub type Shared<T> = Rc<GraphCell<T>>;

/// Creates a new [`Shared`] instance.
#[inline]
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(GraphCell::new(value))
}

// -----------------------------------------------------------------------------
// GraphCell

/// An interior-mutable cell with a one-way frozen flag.
///
/// Freezing is permanent for the lifetime of the cell: once
/// [`freeze`](Freeze::freeze) has run, every mutable borrow is rejected.
///
/// # Examples
///
/// ```
/// use gx_serde::cell::{Freeze, shared};
///
/// let cell = shared(1);
/// *cell.borrow_mut() += 1;
///
/// cell.freeze();
/// assert_eq!(*cell.borrow(), 2);
/// assert!(cell.try_borrow_mut().is_err());
/// ```
#[derive(Debug)]
pub struct GraphCell<T> {
    frozen: Cell<bool>,
    value: RefCell<T>,
}

impl<T> GraphCell<T> {
    /// Creates an unfrozen cell.
    #[inline]
    pub const fn new(value: T) -> Self {
        Self {
            frozen: Cell::new(false),
            value: RefCell::new(value),
        }
    }

    /// Immutably borrows the value.
    ///
    /// # Panics
    ///
    /// Panics if the value is currently mutably borrowed.
    #[inline]
    pub fn borrow(&self) -> Ref<'_, T> {
        self.value.borrow()
    }

    /// Mutably borrows the value.
    ///
    /// # Panics
    ///
    /// Panics if the cell is frozen, or if the value is already borrowed.
    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        match self.try_borrow_mut() {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        }
    }

    /// Mutably borrows the value, rejecting the borrow if the cell is
    /// frozen.
    ///
    /// # Panics
    ///
    /// Panics if the value is already borrowed; freezing is the only
    /// condition reported through the `Result`.
    pub fn try_borrow_mut(&self) -> Result<RefMut<'_, T>, FrozenError> {
        if self.frozen.get() {
            Err(FrozenError)
        } else {
            Ok(self.value.borrow_mut())
        }
    }

    /// Consumes the cell, returning the wrapped value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

// -----------------------------------------------------------------------------
// Freeze

/// Object-safe freezing, so a deserialize context can hold one freeze list
/// over instances of many concrete types.
pub trait Freeze {
    /// Permanently rejects further mutable borrows.
    fn freeze(&self);

    /// Whether [`freeze`](Self::freeze) has run.
    fn is_frozen(&self) -> bool;
}

impl<T> Freeze for GraphCell<T> {
    #[inline]
    fn freeze(&self) {
        self.frozen.set(true);
    }

    #[inline]
    fn is_frozen(&self) -> bool {
        self.frozen.get()
    }
}

// -----------------------------------------------------------------------------
// FrozenError

/// Rejected mutable borrow of a frozen [`GraphCell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrozenError;

impl fmt::Display for FrozenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("instance is frozen and can no longer be mutated")
    }
}

impl error::Error for FrozenError {}

// -----------------------------------------------------------------------------
// Tests
