//! Basic usage of the `bitmap_pool` crate:
//!
//! * Creating a pool chain.
//! * Allocating single slots and runs of slots.
//! * Watching the chain grow.
//! * Returning slots to the chain.

use bitmap_pool::{PlacementPolicy, PoolChain};
use new_zealand::nz;

fn main() -> Result<(), bitmap_pool::Error> {
    let mut chain = PoolChain::<u64>::builder()
        .base_capacity(nz!(4))
        .max_growth_steps(nz!(3))
        .placement_policy(PlacementPolicy::FirstFit)
        .build();

    println!(
        "Empty chain has {} pools and can hold runs of up to {} slots",
        chain.pool_count(),
        chain.capacity_ceiling()
    );

    let single = chain.allocate(1)?;

    // SAFETY: The slot was just allocated for us and holds no value.
    unsafe { PoolChain::construct(single, 1234) };

    let run = chain.allocate(3)?;
    println!("After filling the first pool:\n{chain}");

    // The first pool is full, so the next request makes the chain grow.
    let wide = chain.allocate(6)?;
    println!("After growing once:\n{chain}");

    // Requests larger than the largest pool the chain may create fail immediately.
    if let Err(error) = chain.allocate(100) {
        println!("Large request rejected: {error}");
    }

    // SAFETY: The slot holds the value constructed above.
    println!("Stored value: {}", unsafe { single.read() });

    chain.deallocate(wide, 6)?;
    chain.deallocate(run, 3)?;
    chain.deallocate(single, 1)?;

    println!(
        "All {} slots in {} pools are free again:\n{chain}",
        chain.free_count(),
        chain.pool_count()
    );

    Ok(())
}
