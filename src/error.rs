use std::collections::TryReserveError;
use thiserror::Error;

/// Errors reported by `TwoThreeSet` operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Node storage for the operation could not be reserved.
    /// The set is left exactly as it was before the call
    #[error("failed to reserve node storage: {0}")]
    AllocationFailed(#[from] TryReserveError),

    /// The cursor was created before the last mutation of the set
    #[error("cursor was invalidated by a mutation of the set")]
    StaleCursor,

    /// The end cursor does not point to any value
    #[error("cursor points past the last value")]
    EndCursor,

    /// A structural invariant does not hold (only reported by `validate`)
    #[error("invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, Error>;
