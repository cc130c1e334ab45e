//! Error type shared by construction and insertion.

use std::collections::TryReserveError;

/// Failures reported by the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A required constructor argument was missing or unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// An allocation for the bucket array or a key copy failed.
    #[error("out of memory")]
    OutOfMemory,
}

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

pub type Result<T> = std::result::Result<T, Error>;
