use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::num::NonZero;

use new_zealand::nz;

use crate::{PlacementPolicy, Pool, PoolChain, SlotPool};

/// Capacity of the first pool in a chain unless configured otherwise. One pool of this size
/// matches the bit width of a machine word.
pub(crate) const DEFAULT_BASE_CAPACITY: NonZero<usize> = nz!(64);

/// Maximum number of pools a chain creates unless configured otherwise.
pub(crate) const DEFAULT_MAX_GROWTH_STEPS: NonZero<u32> = nz!(5);

/// Builder for creating an instance of [`PoolChain`].
///
/// You only need to use this builder if you want to customize the chain configuration.
/// The default configuration used by [`PoolChain::new()`][1] starts with a 64-slot pool and
/// allows five growth steps, for a ceiling of 1024 contiguous slots.
///
/// # Examples
///
/// ```
/// use bitmap_pool::{PlacementPolicy, PoolChain};
/// use new_zealand::nz;
///
/// let chain = PoolChain::<u64>::builder()
///     .base_capacity(nz!(16))
///     .max_growth_steps(nz!(3))
///     .placement_policy(PlacementPolicy::LastFit)
///     .build();
///
/// assert_eq!(chain.capacity_ceiling(), 64);
/// ```
///
/// [1]: PoolChain::new
#[must_use]
pub struct PoolChainBuilder<T, P = Pool<T>> {
    base_capacity: NonZero<usize>,
    max_growth_steps: NonZero<u32>,
    policy: PlacementPolicy,

    _item: PhantomData<T>,
    _pool: PhantomData<P>,
}

impl<T, P> fmt::Debug for PoolChainBuilder<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolChainBuilder")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("pool_type", &format_args!("{}", type_name::<P>()))
            .field("base_capacity", &self.base_capacity)
            .field("max_growth_steps", &self.max_growth_steps)
            .field("policy", &self.policy)
            .finish()
    }
}

impl<T> PoolChainBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            base_capacity: DEFAULT_BASE_CAPACITY,
            max_growth_steps: DEFAULT_MAX_GROWTH_STEPS,
            policy: PlacementPolicy::default(),
            _item: PhantomData,
            _pool: PhantomData,
        }
    }
}

impl<T, P> PoolChainBuilder<T, P>
where
    P: SlotPool<T>,
{
    /// Sets the number of slots in the first pool. Every later pool doubles the capacity of
    /// its predecessor.
    pub fn base_capacity(mut self, capacity: NonZero<usize>) -> Self {
        self.base_capacity = capacity;
        self
    }

    /// Sets how many pools the chain may create in total. Once that many pools exist, a
    /// request that none of them can hold fails with [`Error::OutOfMemory`][crate::Error].
    pub fn max_growth_steps(mut self, steps: NonZero<u32>) -> Self {
        self.max_growth_steps = steps;
        self
    }

    /// Sets the [placement policy][PlacementPolicy] that new pools start with.
    pub fn placement_policy(mut self, policy: PlacementPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Uses a custom [`SlotPool`] implementation for the pools of the chain.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitmap_pool::{Pool, PoolChain};
    ///
    /// let chain = PoolChain::<u32>::builder().pool_type::<Pool<u32>>().build();
    /// assert_eq!(chain.pool_count(), 0);
    /// ```
    pub fn pool_type<Q>(self) -> PoolChainBuilder<T, Q>
    where
        Q: SlotPool<T>,
    {
        PoolChainBuilder {
            base_capacity: self.base_capacity,
            max_growth_steps: self.max_growth_steps,
            policy: self.policy,
            _item: PhantomData,
            _pool: PhantomData,
        }
    }

    /// Builds the pool chain with the specified configuration. No pools are created until the
    /// first allocation.
    ///
    /// # Panics
    ///
    /// Panics if the capacity of the largest pool the chain could create does not fit in
    /// `usize`.
    #[must_use]
    pub fn build(self) -> PoolChain<T, P> {
        PoolChain::new_inner(self.base_capacity, self.max_growth_steps, self.policy)
    }
}
