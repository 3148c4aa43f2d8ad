//! Question pairs and the pair universe
//!
//! A [`Pair`] identifies one prepared question by its topic and a
//! catalog-local item key. The [`PairUniverse`] is every pair the loaded
//! catalog can produce; it is computed once at startup and never changes for
//! the lifetime of the process.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::catalog::Catalog;

// ============================================================================
// Pair
// ============================================================================

/// A `(topic, item)` question identifier
///
/// Serialized as a 2-element JSON array `[topic, item]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Pair {
    topic: String,
    item: String,
}

impl Pair {
    /// Create a new pair
    pub fn new(topic: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            item: item.into(),
        }
    }

    /// Topic name
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Catalog-local item key
    pub fn item(&self) -> &str {
        &self.item
    }
}

impl From<(String, String)> for Pair {
    fn from((topic, item): (String, String)) -> Self {
        Self { topic, item }
    }
}

impl From<Pair> for (String, String) {
    fn from(pair: Pair) -> Self {
        (pair.topic, pair.item)
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} > {}", self.topic, self.item)
    }
}

/// Format an item index as a catalog-local key (`0` -> `"00"`)
pub fn item_key(index: usize) -> String {
    format!("{index:02}")
}

// ============================================================================
// Pair Universe
// ============================================================================

/// Every pair derivable from a catalog
#[derive(Debug, Clone, Default)]
pub struct PairUniverse {
    pairs: Vec<Pair>,
    index: HashSet<Pair>,
}

impl PairUniverse {
    /// Build the universe from a loaded catalog
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self::from_topics(
            catalog
                .topics()
                .map(|topic| (topic.to_string(), catalog.item_keys(topic))),
        )
    }

    /// Build the universe from `(topic, item keys)` entries
    ///
    /// Repeated pairs are collapsed; the first occurrence keeps its position.
    pub fn from_topics<I, K>(topics: I) -> Self
    where
        I: IntoIterator<Item = (String, K)>,
        K: IntoIterator<Item = String>,
    {
        let mut pairs = Vec::new();
        let mut index = HashSet::new();

        for (topic, items) in topics {
            for item in items {
                let pair = Pair::new(topic.clone(), item);
                if index.insert(pair.clone()) {
                    pairs.push(pair);
                }
            }
        }

        Self { pairs, index }
    }

    /// Number of pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when the catalog produced no pairs
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Check membership
    pub fn contains(&self, pair: &Pair) -> bool {
        self.index.contains(pair)
    }

    /// Pairs in catalog order
    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    /// Distinct topics that contribute at least one pair
    pub fn topic_count(&self) -> usize {
        self.pairs
            .iter()
            .map(Pair::topic)
            .collect::<HashSet<_>>()
            .len()
    }
}
