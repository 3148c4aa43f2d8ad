//! Unified error handling for the askloop crate
//!
//! Each module defines its own error enum; this module wraps them in a single
//! [`Error`] so callers crossing module boundaries can use one type while
//! keeping the detailed cause.
//!
//! # Usage
//!
//! ```rust,ignore
//! use askloop::error::{AskloopErrorTrait, Error};
//!
//! fn handle_error(err: Error) {
//!     if err.is_recoverable() {
//!         eprintln!("Will retry on the next question: {err}");
//!     } else {
//!         eprintln!("Fatal {:?} error: {err}", err.category());
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

pub use crate::catalog::CatalogError;
pub use crate::scheduler::SchedulerError;
pub use crate::session::SessionError;
pub use crate::storage::StorageError;

/// Common trait for all askloop error types
pub trait AskloopErrorTrait: std::error::Error {
    /// Check if this error is recoverable (the session can carry on)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Question bank loading and lookup
    Catalog,
    /// State file and other I/O
    Storage,
    /// Scheduler construction
    Scheduler,
    /// Question delivery
    Output,
    /// Configuration and validation
    Config,
}

impl ErrorCategory {
    /// Short description for user-facing messages
    pub fn description(&self) -> &'static str {
        match self {
            Self::Catalog => "question bank error",
            Self::Storage => "storage error",
            Self::Scheduler => "scheduler error",
            Self::Output => "output error",
            Self::Config => "configuration error",
        }
    }
}

/// Unified error type for the askloop crate
#[derive(Error, Debug)]
pub enum Error {
    /// Question bank errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// State persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Scheduler errors
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Session errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

impl AskloopErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Catalog(e) => e.is_recoverable(),
            Self::Storage(_) => true,
            Self::Scheduler(e) => e.is_recoverable(),
            Self::Session(SessionError::Scheduler(e)) => e.is_recoverable(),
            Self::Session(SessionError::Delivery { .. }) => false,
            Self::Io(_) => true,
            Self::Config(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Catalog(_) => ErrorCategory::Catalog,
            Self::Storage(_) | Self::Io(_) => ErrorCategory::Storage,
            Self::Scheduler(SchedulerError::EmptyUniverse)
            | Self::Session(SessionError::Scheduler(SchedulerError::EmptyUniverse)) => {
                ErrorCategory::Scheduler
            }
            Self::Scheduler(SchedulerError::Storage(_))
            | Self::Session(SessionError::Scheduler(SchedulerError::Storage(_))) => {
                ErrorCategory::Storage
            }
            Self::Session(SessionError::Delivery { .. }) => ErrorCategory::Output,
            Self::Config(_) => ErrorCategory::Config,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type alias using the unified error
pub type Result<T> = std::result::Result<T, Error>;
