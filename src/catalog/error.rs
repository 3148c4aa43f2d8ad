//! Error types for the catalog module

use std::path::PathBuf;
use thiserror::Error;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised while loading a question bank or resolving a question
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Question bank file could not be read
    #[error("Failed to read question bank {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Question bank is not valid TOML or has the wrong shape
    #[error("Failed to parse question bank: {0}")]
    Parse(#[from] toml::de::Error),

    /// Topic not present in the bank
    #[error("Unknown topic: '{0}'")]
    UnknownTopic(String),

    /// Item key is not a numeric index
    #[error("Item key must be a numeric index, got: '{0}'")]
    InvalidKey(String),

    /// Item index past the end of the topic's question list
    #[error("Index {index} out of range for topic '{topic}' (has {len} questions)")]
    OutOfRange {
        topic: String,
        index: usize,
        len: usize,
    },

    /// Question text is empty after trimming
    #[error("Question {topic} > {item} is empty")]
    EmptyQuestion { topic: String, item: String },
}

impl CatalogError {
    /// Create an out-of-range error
    pub fn out_of_range(topic: impl Into<String>, index: usize, len: usize) -> Self {
        Self::OutOfRange {
            topic: topic.into(),
            index,
            len,
        }
    }

    /// Lookup failures only affect a single question; load failures are fatal
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownTopic(_)
                | Self::InvalidKey(_)
                | Self::OutOfRange { .. }
                | Self::EmptyQuestion { .. }
        )
    }
}
