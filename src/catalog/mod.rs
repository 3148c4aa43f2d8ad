//! Question bank
//!
//! The catalog maps each topic name to an ordered list of prepared question
//! texts. It is loaded once at startup, either from the bank compiled into
//! the binary or from an external TOML file:
//!
//! ```toml
//! [topics]
//! react_internals = [
//!     "Why does every UserContext consumer re-render ...",
//! ]
//! ```
//!
//! The scheduler never sees question text. It works with item keys (the
//! zero-padded index of a question within its topic), and the session
//! resolves a picked pair back to text through [`Catalog::resolve`].

pub mod error;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub use error::{CatalogError, CatalogResult};

use crate::scheduler::pair::{item_key, Pair};

/// Question bank shipped with the binary
const BUILTIN_BANK: &str = include_str!("../../data/questions.toml");

/// Topic name -> ordered question texts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    topics: BTreeMap<String, Vec<String>>,
}

impl Catalog {
    /// Load the bank compiled into the binary
    pub fn builtin() -> CatalogResult<Self> {
        Self::from_toml_str(BUILTIN_BANK)
    }

    /// Load a bank from a TOML file
    pub fn from_file(path: &Path) -> CatalogResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let catalog = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            topics = catalog.topic_count(),
            questions = catalog.len(),
            "Question bank loaded"
        );
        Ok(catalog)
    }

    /// Parse a bank from TOML text
    ///
    /// Fails with [`CatalogError::EmptyQuestion`] if any question is blank.
    pub fn from_toml_str(content: &str) -> CatalogResult<Self> {
        let catalog: Self = toml::from_str(content)?;
        catalog.validated()
    }

    /// Build a catalog from in-memory topic lists
    ///
    /// Fails with [`CatalogError::EmptyQuestion`] if any question is blank.
    pub fn from_topics<I, T, Q>(topics: I) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = (T, Vec<Q>)>,
        T: Into<String>,
        Q: Into<String>,
    {
        Self {
            topics: topics
                .into_iter()
                .map(|(topic, questions)| {
                    (topic.into(), questions.into_iter().map(Into::into).collect())
                })
                .collect(),
        }
        .validated()
    }

    /// Every pair built from the catalog must resolve
    fn validated(self) -> CatalogResult<Self> {
        for (topic, questions) in &self.topics {
            if let Some(index) = questions.iter().position(|q| q.trim().is_empty()) {
                return Err(CatalogError::EmptyQuestion {
                    topic: topic.clone(),
                    item: item_key(index),
                });
            }
        }
        Ok(self)
    }

    /// Topic names in sorted order
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }

    /// Number of topics
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// Number of questions in a topic, if the topic exists
    pub fn question_count(&self, topic: &str) -> Option<usize> {
        self.topics.get(topic).map(Vec::len)
    }

    /// Item keys for a topic (`"00"`, `"01"`, ...); empty for unknown topics
    pub fn item_keys(&self, topic: &str) -> Vec<String> {
        (0..self.question_count(topic).unwrap_or(0))
            .map(item_key)
            .collect()
    }

    /// Total number of questions across all topics
    pub fn len(&self) -> usize {
        self.topics.values().map(Vec::len).sum()
    }

    /// True when no topic holds a question
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a pair to its question text, trimmed of surrounding whitespace
    pub fn resolve(&self, pair: &Pair) -> CatalogResult<String> {
        let questions = self
            .topics
            .get(pair.topic())
            .ok_or_else(|| CatalogError::UnknownTopic(pair.topic().to_string()))?;

        let index: usize = pair
            .item()
            .parse()
            .map_err(|_| CatalogError::InvalidKey(pair.item().to_string()))?;

        let text = questions
            .get(index)
            .ok_or_else(|| CatalogError::out_of_range(pair.topic(), index, questions.len()))?
            .trim();

        if text.is_empty() {
            return Err(CatalogError::EmptyQuestion {
                topic: pair.topic().to_string(),
                item: pair.item().to_string(),
            });
        }

        Ok(text.to_string())
    }
}
