#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Fixed-capacity slot pools tracked by a bitmap, and a chain of such pools that grows on demand.
//!
//! This crate allocates storage for small, uniformly sized objects (list nodes, tree nodes and
//! similar) without a heap allocation per object:
//!
//! - [`Pool`] owns one contiguous block of slots for values of type `T` plus one free/used bit
//!   per slot. It hands out runs of contiguous slots chosen by a [`PlacementPolicy`].
//! - [`PoolChain`] owns a growing sequence of pools. When no pool can hold a request, it
//!   creates a new pool twice the size of the previous one, up to a configurable limit.
//!
//! Both types work with raw pointers and never touch the contents of the slots. They are meant
//! as the backing store of allocator-aware data structures that manage their values through
//! unsafe code.
//!
//! # Examples
//!
//! ```
//! use bitmap_pool::{PlacementPolicy, PoolChain};
//! use new_zealand::nz;
//!
//! let mut chain = PoolChain::<u64>::builder()
//!     .base_capacity(nz!(4))
//!     .placement_policy(PlacementPolicy::FirstFit)
//!     .build();
//!
//! let a = chain.allocate(1)?;
//! let b = chain.allocate(3)?;
//! assert_eq!(chain.occupancy(), "****\n");
//!
//! // The first pool is full, so the chain grows by a pool with twice the capacity.
//! let c = chain.allocate(2)?;
//! assert_eq!(chain.occupancy(), "______**\n****\n");
//!
//! chain.deallocate(b, 3)?;
//! chain.deallocate(a, 1)?;
//! chain.deallocate(c, 2)?;
//! assert_eq!(chain.free_count(), chain.total_count());
//! # Ok::<(), bitmap_pool::Error>(())
//! ```
//!
//! # Occupancy markers
//!
//! Pools render their state as one character per slot, `*` for used and `_` for free, from the
//! highest slot index down to slot 0. A chain renders one such line per pool, newest first.
//!
//! # Thread safety
//!
//! Pools and chains are single-threaded: they are neither [`Send`] nor [`Sync`].

mod builder;
mod chain;
mod error;
mod free_map;
mod placement_policy;
mod pool;
mod slot_pool;

pub use builder::*;
pub use chain::*;
pub use error::Error;
pub(crate) use error::Result;
pub(crate) use free_map::*;
pub use placement_policy::*;
pub use pool::*;
pub use slot_pool::*;
