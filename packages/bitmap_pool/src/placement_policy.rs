/// Determines which run of free slots a pool picks when more than one could hold a request.
///
/// The policy can be changed at any time via [`SlotPool::set_policy()`][1]. Changing it has no
/// effect on slots that are already allocated.
///
/// # Examples
///
/// ```
/// use bitmap_pool::{PlacementPolicy, Pool, SlotPool};
/// use new_zealand::nz;
///
/// let mut pool = Pool::<u64>::with_capacity(nz!(4), PlacementPolicy::LastFit);
/// pool.set_policy(PlacementPolicy::FirstFit);
/// assert_eq!(pool.policy(), PlacementPolicy::FirstFit);
/// ```
///
/// [1]: crate::SlotPool::set_policy
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum PlacementPolicy {
    /// Scans from the lowest slot index upward and takes the lowest slots of the first free run
    /// that is long enough. This is the default.
    ///
    /// Fills the pool from the bottom and finds room whenever any sufficient run exists.
    #[default]
    FirstFit,

    /// Only considers the run of free slots anchored at the highest slot index, taking the slots
    /// of that run that sit directly above the topmost used slot.
    ///
    /// This is the fastest policy for tight allocate/free cycles but it gives up as soon as the
    /// top run is too short, even if a long enough run exists lower in the pool.
    LastFit,
}
