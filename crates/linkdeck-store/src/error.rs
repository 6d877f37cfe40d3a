//! Error types for store operations.

use thiserror::Error;

use crate::mutation::MutationKind;

/// Errors that can occur while committing to or reading from the store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An index-based mutation referenced a position past the end of the
    /// link collection.
    #[error("{op}: index {index} out of range for {len} links")]
    IndexOutOfRange {
        op: MutationKind,
        index: usize,
        len: usize,
    },

    /// A thread panicked while holding the state lock.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Convenience type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
