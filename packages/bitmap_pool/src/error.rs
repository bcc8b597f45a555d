use thiserror::Error;

/// Errors that can occur when allocating from or returning memory to a [`PoolChain`][1].
///
/// A pool that merely lacks space for a request is not an error: [`SlotPool::allocate()`][2]
/// reports that as `None` and the chain resolves it internally by trying other pools or by
/// growing. Only the conditions below reach the caller.
///
/// [1]: crate::PoolChain
/// [2]: crate::SlotPool::allocate
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The caller asked for zero slots.
    #[error("cannot allocate a run of zero slots")]
    InvalidSize,

    /// No pool can hold the requested run and the chain is not allowed to grow any further,
    /// or the request is larger than the largest pool the chain could ever create.
    #[error("out of memory: no pool in the chain can provide {requested} contiguous slots")]
    OutOfMemory {
        /// The number of contiguous slots that was requested.
        requested: usize,
    },

    /// The memory being returned was not handed out by any pool of the chain.
    #[error("pointer {address:#x} with length {count} is not owned by any pool in the chain")]
    InvalidPointer {
        /// Address of the first slot that the caller attempted to return.
        address: usize,

        /// The number of slots the caller attempted to return.
        count: usize,
    },
}

/// A specialized `Result` type for pool chain operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug, Clone);

    #[test]
    fn messages_name_the_failing_request() {
        assert_eq!(
            Error::OutOfMemory { requested: 17 }.to_string(),
            "out of memory: no pool in the chain can provide 17 contiguous slots"
        );

        assert_eq!(
            Error::InvalidPointer {
                address: 0x1000,
                count: 2
            }
            .to_string(),
            "pointer 0x1000 with length 2 is not owned by any pool in the chain"
        );
    }
}
