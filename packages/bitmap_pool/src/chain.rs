use std::fmt;
use std::marker::PhantomData;
use std::num::NonZero;
use std::ptr::NonNull;

use tracing::{debug, trace};

use crate::{Error, PlacementPolicy, Pool, PoolChainBuilder, Result, SlotPool};

/// A growable sequence of [`SlotPool`]s that allocates runs of slots for values of type `T`.
///
/// The chain starts without any pools. Whenever no existing pool can hold a request, the chain
/// creates one more pool, twice the size of the previous one: `base`, `2 * base`, `4 * base`
/// and so on, up to a configurable number of pools. Pools are never removed or shrunk; they
/// are all released together when the chain is dropped.
///
/// Requests are routed to the newest (largest) pool first. A run of slots always comes from a
/// single pool, it never spans two.
///
/// # Out of band access
///
/// Like the pools it is made of, the chain never touches the contents of the slots. Use
/// [`construct()`][Self::construct] and [`destroy()`][Self::destroy] (or plain pointer
/// operations) to manage values in allocated slots. Values still present when the chain is
/// dropped are not dropped.
///
/// # Examples
///
/// ```
/// use bitmap_pool::PoolChain;
/// use new_zealand::nz;
///
/// let mut chain = PoolChain::<u64>::builder().base_capacity(nz!(4)).build();
///
/// let ptr = chain.allocate(1)?;
/// assert_eq!(chain.occupancy(), "___*\n");
///
/// // SAFETY: The slot was just allocated for us and is valid for writes.
/// unsafe { PoolChain::construct(ptr, 42) };
/// // SAFETY: The slot holds a value we constructed above.
/// unsafe { PoolChain::destroy(ptr) };
///
/// chain.deallocate(ptr, 1)?;
/// assert_eq!(chain.free_count(), 4);
/// # Ok::<(), bitmap_pool::Error>(())
/// ```
pub struct PoolChain<T, P = Pool<T>> {
    /// The pools in order of creation. Pool `k` has `base_capacity * 2^k` slots, so the newest
    /// and largest pool is the last one.
    pools: Vec<P>,

    base_capacity: NonZero<usize>,

    max_growth_steps: NonZero<u32>,

    /// Capacity of the largest pool the chain may ever create.
    capacity_ceiling: usize,

    /// Policy applied to newly created pools.
    policy: PlacementPolicy,

    _item: PhantomData<T>,
}

impl<T> PoolChain<T> {
    /// Creates a new [`PoolChain`] with the default configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitmap_pool::PoolChain;
    ///
    /// let chain = PoolChain::<String>::new();
    ///
    /// assert_eq!(chain.pool_count(), 0);
    /// assert_eq!(chain.total_count(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a new [`PoolChain`].
    ///
    /// Use this when you want to customize the chain configuration beyond the defaults.
    pub fn builder() -> PoolChainBuilder<T> {
        PoolChainBuilder::new()
    }

    /// Writes `value` into the slot at `ptr` without reading or dropping its previous contents.
    ///
    /// This does not depend on the pool type, so it also serves chains built with a custom
    /// [`pool_type()`][PoolChainBuilder::pool_type]: call it as `PoolChain::<T>::construct()`.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a slot allocated from this chain that is not currently holding a
    /// live value.
    pub unsafe fn construct(ptr: NonNull<T>, value: T) {
        // SAFETY: Forwarding safety requirements to the caller.
        unsafe { ptr.write(value) };
    }

    /// Drops the value in the slot at `ptr` in place, leaving the slot allocated.
    ///
    /// Like [`construct()`][Self::construct], this serves chains of any pool type.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a slot allocated from this chain that holds a live value, and the
    /// value must not be used afterwards.
    pub unsafe fn destroy(ptr: NonNull<T>) {
        // SAFETY: Forwarding safety requirements to the caller.
        unsafe { ptr.drop_in_place() };
    }
}

impl<T> Default for PoolChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P> PoolChain<T, P>
where
    P: SlotPool<T>,
{
    /// # Panics
    ///
    /// Panics if the capacity of the largest pool does not fit in `usize`.
    #[must_use]
    pub(crate) fn new_inner(
        base_capacity: NonZero<usize>,
        max_growth_steps: NonZero<u32>,
        policy: PlacementPolicy,
    ) -> Self {
        // The last growth step has index `max_growth_steps - 1`.
        let last_step = max_growth_steps.get().wrapping_sub(1);

        let capacity_ceiling = Self::step_capacity(base_capacity, last_step)
            .expect("capacity of the largest pool in the chain must fit in usize");

        Self {
            pools: Vec::new(),
            base_capacity,
            max_growth_steps,
            capacity_ceiling: capacity_ceiling.get(),
            policy,
            _item: PhantomData,
        }
    }

    /// Capacity of the pool created by growth step `step`, if it is representable.
    fn step_capacity(base_capacity: NonZero<usize>, step: u32) -> Option<NonZero<usize>> {
        1_usize
            .checked_shl(step)
            .and_then(|multiplier| base_capacity.checked_mul(NonZero::new(multiplier)?))
    }

    /// Allocates a run of `count` contiguous slots and returns a pointer to the lowest one.
    ///
    /// Existing pools are tried newest first. If none of them can hold the run, the chain grows
    /// by one pool and tries only that pool.
    ///
    /// # Panics
    ///
    /// Panics if the chain grows and the storage block of the new pool cannot be allocated.
    /// Allocation failure is not reported as [`Error::OutOfMemory`].
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidSize`] if `count` is zero.
    /// * [`Error::OutOfMemory`] if `count` exceeds the [capacity ceiling][Self::capacity_ceiling],
    ///   if the chain has already created its maximum number of pools, or if the newly created
    ///   pool cannot hold the run either.
    pub fn allocate(&mut self, count: usize) -> Result<NonNull<T>> {
        if count == 0 {
            return Err(Error::InvalidSize);
        }

        if count > self.capacity_ceiling {
            debug!(
                count,
                ceiling = self.capacity_ceiling,
                "request exceeds the largest pool the chain can create"
            );
            return Err(Error::OutOfMemory { requested: count });
        }

        if let Some(ptr) = self
            .pools
            .iter_mut()
            .rev()
            .find_map(|pool| pool.allocate(count))
        {
            trace!(count, address = ptr.addr().get(), "allocated from existing pool");
            return Ok(ptr);
        }

        if !self.grow() {
            debug!(
                count,
                pool_count = self.pools.len(),
                "pool limit reached, cannot grow"
            );
            return Err(Error::OutOfMemory { requested: count });
        }

        let pool = self
            .pools
            .last_mut()
            .expect("we just appended a pool to the chain");

        if let Some(ptr) = pool.allocate(count) {
            trace!(count, address = ptr.addr().get(), "allocated from new pool");
            Ok(ptr)
        } else {
            debug!(count, "new pool cannot hold the request");
            Err(Error::OutOfMemory { requested: count })
        }
    }

    /// Returns a run of `count` slots starting at `ptr` to the pool that owns it.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPointer`] if no pool of the chain contains the whole run.
    pub fn deallocate(&mut self, ptr: NonNull<T>, count: usize) -> Result<()> {
        let Some(pool) = self
            .pools
            .iter_mut()
            .rev()
            .find(|pool| pool.contains(ptr, count))
        else {
            debug!(
                count,
                address = ptr.addr().get(),
                "deallocation target is not owned by the chain"
            );
            return Err(Error::InvalidPointer {
                address: ptr.addr().get(),
                count,
            });
        };

        pool.deallocate(ptr, count);
        trace!(count, address = ptr.addr().get(), "deallocated");

        Ok(())
    }

    /// Appends the next pool in the growth sequence, unless the chain is at its pool limit.
    ///
    /// Returns whether a pool was appended.
    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    fn grow(&mut self) -> bool {
        let Ok(step) = u32::try_from(self.pools.len()) else {
            return false;
        };

        if step >= self.max_growth_steps.get() {
            return false;
        }

        let capacity = Self::step_capacity(self.base_capacity, step)
            .expect("every step below the limit was validated when the chain was built");

        debug!(
            pool_index = step,
            capacity = capacity.get(),
            "growing pool chain"
        );

        self.pools.push(P::with_capacity(capacity, self.policy));
        true
    }

    /// Changes the placement policy of every existing pool and of pools created later.
    pub fn set_policy(&mut self, policy: PlacementPolicy) {
        self.policy = policy;

        for pool in &mut self.pools {
            pool.set_policy(policy);
        }
    }

    /// The placement policy that newly created pools start with.
    #[must_use]
    pub fn policy(&self) -> PlacementPolicy {
        self.policy
    }

    /// The total number of slots across all pools created so far.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.pools.iter().map(P::total_count).sum()
    }

    /// The number of free slots across all pools created so far.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    pub fn free_count(&self) -> usize {
        self.pools.iter().map(P::free_count).sum()
    }

    /// The number of pools created so far.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// The largest run of slots the chain can ever allocate: the capacity of the last pool the
    /// chain is allowed to create.
    #[must_use]
    pub fn capacity_ceiling(&self) -> usize {
        self.capacity_ceiling
    }

    /// The occupancy markers of every pool, newest pool first, each followed by a newline.
    ///
    /// An empty chain renders as an empty string.
    #[must_use]
    pub fn occupancy(&self) -> String {
        self.pools
            .iter()
            .rev()
            .map(|pool| {
                let mut line = pool.occupancy();
                line.push('\n');
                line
            })
            .collect()
    }
}

impl<T, P> fmt::Debug for PoolChain<T, P>
where
    P: SlotPool<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolChain")
            .field("pools", &self.pools)
            .field("base_capacity", &self.base_capacity)
            .field("max_growth_steps", &self.max_growth_steps)
            .field("capacity_ceiling", &self.capacity_ceiling)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<T, P> fmt::Display for PoolChain<T, P>
where
    P: SlotPool<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.occupancy())
    }
}
