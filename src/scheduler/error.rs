//! Error types for the scheduler module

use thiserror::Error;

use crate::storage::StorageError;

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Scheduler-specific errors
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// The catalog produced no pairs, so nothing can ever be picked
    #[error("Question catalog is empty: no (topic, item) pairs to schedule")]
    EmptyUniverse,

    /// Persisting the pool failed; the in-memory pool is still valid
    #[error("Failed to persist pool state: {0}")]
    Storage(#[from] StorageError),
}

impl SchedulerError {
    /// A failed save is retried by the next commit; an empty universe is
    /// a configuration problem
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_empty_universe_error() {
        let err = SchedulerError::EmptyUniverse;
        assert!(err.to_string().contains("empty"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_storage_error_is_recoverable() {
        let err: SchedulerError = StorageError::io(
            "write",
            PathBuf::from("state.json"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        )
        .into();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("denied"));
    }
}
