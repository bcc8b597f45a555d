use std::fmt::Debug;
use std::num::NonZero;
use std::ptr::NonNull;

use crate::PlacementPolicy;

/// A fixed-capacity pool of uniformly sized slots for values of type `T`.
///
/// This is the contract through which a [`PoolChain`][1] drives its member pools. The crate's
/// [`Pool`][2] is the standard implementation; a custom implementation can be plugged into a
/// chain via [`PoolChainBuilder::pool_type()`][3], for example to wrap [`Pool`][2] with extra
/// bookkeeping.
///
/// A pool never relocates its storage, so pointers it returns stay valid until the pool itself
/// is dropped. The pool does not track values stored in its slots and never drops them.
///
/// [1]: crate::PoolChain
/// [2]: crate::Pool
/// [3]: crate::PoolChainBuilder::pool_type
pub trait SlotPool<T>: Debug {
    /// Creates a pool with `capacity` slots, all of them free.
    #[must_use]
    fn with_capacity(capacity: NonZero<usize>, policy: PlacementPolicy) -> Self
    where
        Self: Sized;

    /// Reserves a run of `count` contiguous slots chosen by the active placement policy and
    /// returns a pointer to its lowest slot.
    ///
    /// Returns `None` if `count` is zero or if no qualifying run exists. A failed call leaves
    /// the pool unchanged.
    #[must_use]
    fn allocate(&mut self, count: usize) -> Option<NonNull<T>>;

    /// Marks the `count` slots starting at `ptr` as free again.
    ///
    /// Pointers that do not identify a slot of this pool are ignored.
    fn deallocate(&mut self, ptr: NonNull<T>, count: usize);

    /// Whether the run of `count` elements starting at `ptr` lies entirely inside the storage
    /// of this pool.
    #[must_use]
    fn contains(&self, ptr: NonNull<T>, count: usize) -> bool;

    /// The number of slots in the pool, fixed at creation.
    #[must_use]
    fn total_count(&self) -> usize;

    /// The number of slots that are currently free.
    #[must_use]
    fn free_count(&self) -> usize;

    /// Whether [`allocate(count)`][Self::allocate] would currently succeed.
    #[must_use]
    fn is_free(&self, count: usize) -> bool;

    /// The placement policy used for subsequent allocations.
    #[must_use]
    fn policy(&self) -> PlacementPolicy;

    /// Changes the placement policy used for subsequent allocations.
    fn set_policy(&mut self, policy: PlacementPolicy);

    /// One marker per slot, `*` for used and `_` for free, rendered from the highest slot index
    /// down to slot 0.
    #[must_use]
    fn occupancy(&self) -> String;

    /// Marks every slot as used, locking the pool against further allocations until slots are
    /// explicitly deallocated.
    ///
    /// This does not return the pool to its empty state.
    fn reset(&mut self);
}
