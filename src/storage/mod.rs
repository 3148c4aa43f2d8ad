//! Persistence for the rotation pool
//!
//! The pool is stored as a single JSON document so that an interrupted
//! session resumes where it left off and no question repeats until the whole
//! bank has been served.
//!
//! - [`state`] - State file format, loading with fallback, atomic saves

pub mod state;

use std::path::PathBuf;
use thiserror::Error;

pub use state::{PersistedState, StateStore};

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by the state store
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem operation failed
    #[error("I/O error during '{operation}' on {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// State file is not a valid state document
    #[error("Malformed state file: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl StorageError {
    /// Create an I/O error with context
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
