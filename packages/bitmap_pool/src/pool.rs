use std::alloc::{Layout, alloc, dealloc};
use std::any::type_name;
use std::fmt;
use std::num::NonZero;
use std::ptr::NonNull;

use num_integer::Integer;

use crate::{FreeMap, PlacementPolicy, SlotPool};

/// A fixed-capacity pool of slots for values of type `T`, tracked by a bitmap of free flags.
///
/// The pool owns one contiguous heap block holding `capacity` slots, each sized and aligned for
/// one `T`. The block is allocated when the pool is created and released when it is dropped;
/// allocating and deallocating slots never touches the heap.
///
/// Slot `index` lives at `base + index * size_of::<T>()`. A run of several slots is handed out
/// as a pointer to its lowest slot, like an array.
///
/// # Out of band access
///
/// The pool never reads or writes the slots and never creates references to them. What is
/// stored in a slot is entirely the caller's business, including dropping it before the slot
/// is deallocated or the pool is dropped.
///
/// # Examples
///
/// ```
/// use bitmap_pool::{PlacementPolicy, Pool, SlotPool};
/// use new_zealand::nz;
///
/// let mut pool = Pool::<u64>::new(nz!(4), PlacementPolicy::FirstFit);
///
/// let ptr = pool.allocate(2).unwrap();
/// assert_eq!(pool.occupancy(), "__**");
///
/// // SAFETY: The slots were just allocated for us and are valid for writes.
/// unsafe {
///     ptr.write(1);
///     ptr.add(1).write(2);
/// }
///
/// pool.deallocate(ptr, 2);
/// assert_eq!(pool.occupancy(), "____");
/// ```
pub struct Pool<T> {
    /// Lowest slot of the storage block. Never changes for the lifetime of the pool.
    first_slot_ptr: NonNull<T>,

    capacity: NonZero<usize>,

    free_map: FreeMap,

    policy: PlacementPolicy,
}

impl<T> Pool<T> {
    /// Creates a standalone pool with `capacity` slots, all of them free.
    ///
    /// This is the same as [`SlotPool::with_capacity()`] but does not need the trait in scope.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitmap_pool::{PlacementPolicy, Pool};
    /// use new_zealand::nz;
    ///
    /// let pool = Pool::<u32>::new(nz!(8), PlacementPolicy::LastFit);
    ///
    /// assert_eq!(pool.to_string(), "________");
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized or if the storage block cannot be allocated.
    #[must_use]
    pub fn new(capacity: NonZero<usize>, policy: PlacementPolicy) -> Self {
        <Self as SlotPool<T>>::with_capacity(capacity, policy)
    }

    #[must_use]
    fn layout(capacity: NonZero<usize>) -> Layout {
        Layout::array::<T>(capacity.get()).expect("simple flat array layout must be calculable")
    }

    /// The slot index `ptr` points to, if it points exactly at one of our slots.
    #[must_use]
    fn slot_index(&self, ptr: NonNull<T>) -> Option<usize> {
        if !self.contains(ptr, 1) {
            return None;
        }

        // Cannot wrap because `contains()` guarantees `ptr` is at or above the base.
        let offset = ptr
            .addr()
            .get()
            .wrapping_sub(self.first_slot_ptr.addr().get());

        let (index, misalignment) = offset.div_rem(&size_of::<T>());

        (misalignment == 0).then_some(index)
    }

    /// The byte address one past the end of the storage block.
    #[must_use]
    fn end_address(&self) -> usize {
        // Cannot overflow because the whole block was successfully allocated.
        self.first_slot_ptr
            .addr()
            .get()
            .wrapping_add(Self::layout(self.capacity).size())
    }

    #[must_use]
    fn find_placement(&self, count: usize) -> Option<usize> {
        match self.policy {
            PlacementPolicy::FirstFit => self.free_map.find_first_fit(count),
            PlacementPolicy::LastFit => self.free_map.find_last_fit(count),
        }
    }
}

impl<T> SlotPool<T> for Pool<T> {
    /// Creates a pool with `capacity` slots, all of them free.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized or if the storage block cannot be allocated.
    fn with_capacity(capacity: NonZero<usize>, policy: PlacementPolicy) -> Self {
        assert!(size_of::<T>() > 0, "Pool must have non-zero item size");

        // SAFETY: The layout is valid for the target type (calculated by `Layout::array`) and
        // not zero-sized (both capacity and item size are non-zero as guarded above).
        let ptr = NonNull::new(unsafe { alloc(Self::layout(capacity)) }).expect(
            "we do not intend to handle allocation failure as a real possibility - OOM is panic",
        );

        Self {
            first_slot_ptr: ptr.cast::<T>(),
            capacity,
            free_map: FreeMap::new(capacity),
            policy,
        }
    }

    fn allocate(&mut self, count: usize) -> Option<NonNull<T>> {
        if count == 0 || count > self.free_count() {
            return None;
        }

        let index = self.find_placement(count)?;
        self.free_map.mark_used(index, count);

        // SAFETY: The placement search only returns indexes of runs that lie entirely inside
        // the storage block, so the offset stays within the allocation.
        Some(unsafe { self.first_slot_ptr.add(index) })
    }

    fn deallocate(&mut self, ptr: NonNull<T>, count: usize) {
        if let Some(index) = self.slot_index(ptr) {
            self.free_map.mark_free(index, count);
        }
    }

    fn contains(&self, ptr: NonNull<T>, count: usize) -> bool {
        let Some(length_bytes) = count.checked_mul(size_of::<T>()) else {
            return false;
        };

        let start = ptr.addr().get();

        let Some(end) = start.checked_add(length_bytes) else {
            return false;
        };

        self.first_slot_ptr.addr().get() <= start && end <= self.end_address()
    }

    fn total_count(&self) -> usize {
        self.capacity.get()
    }

    #[cfg_attr(test, mutants::skip)] // Can be mutated to make the chain grow forever.
    fn free_count(&self) -> usize {
        self.free_map.free_count()
    }

    fn is_free(&self, count: usize) -> bool {
        count != 0 && self.find_placement(count).is_some()
    }

    fn policy(&self) -> PlacementPolicy {
        self.policy
    }

    fn set_policy(&mut self, policy: PlacementPolicy) {
        self.policy = policy;
    }

    fn occupancy(&self) -> String {
        self.free_map.render()
    }

    fn reset(&mut self) {
        self.free_map.mark_all_used();
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("first_slot_ptr", &self.first_slot_ptr)
            .field("capacity", &self.capacity)
            .field("policy", &self.policy)
            .field("occupancy", &format_args!("{}", self.free_map.render()))
            .finish()
    }
}

impl<T> fmt::Display for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.free_map.render())
    }
}

impl<T> Drop for Pool<T> {
    fn drop(&mut self) {
        // SAFETY: The block was allocated in `with_capacity()` with exactly this layout and is
        // released only here.
        unsafe {
            dealloc(self.first_slot_ptr.as_ptr().cast(), Self::layout(self.capacity));
        }
    }
}
