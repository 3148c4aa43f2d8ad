//! Mutable pool state owned by the rotation scheduler

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use super::pair::{Pair, PairUniverse};

/// Pairs still to serve this cycle, pairs already served, and the last topic
///
/// `available` and `used` never share a pair, and neither holds duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolState {
    available: Vec<Pair>,
    used: HashSet<Pair>,
    last_topic: Option<String>,
}

impl PoolState {
    /// Full universe in random order with nothing used
    pub fn fresh<R: Rng + ?Sized>(universe: &PairUniverse, rng: &mut R) -> Self {
        let mut pool = Self::default();
        pool.start_cycle(universe, rng);
        pool
    }

    /// Assemble a pool from already validated parts
    ///
    /// Pairs listed in `used` are removed from `available`, and repeated
    /// pairs keep their first position.
    pub fn from_parts(
        available: impl IntoIterator<Item = Pair>,
        used: impl IntoIterator<Item = Pair>,
        last_topic: Option<String>,
    ) -> Self {
        let used: HashSet<Pair> = used.into_iter().collect();
        let mut seen = HashSet::new();
        let available = available
            .into_iter()
            .filter(|pair| !used.contains(pair) && seen.insert(pair.clone()))
            .collect();

        Self {
            available,
            used,
            last_topic,
        }
    }

    /// Begin a new cycle: reshuffle the full universe and clear `used`
    ///
    /// `last_topic` is kept so the first pick of the new cycle still avoids
    /// the topic served last.
    pub fn start_cycle<R: Rng + ?Sized>(&mut self, universe: &PairUniverse, rng: &mut R) {
        let mut available = universe.pairs().to_vec();
        available.shuffle(rng);
        self.available = available;
        self.used.clear();
    }

    /// Record a served pair
    pub fn mark(&mut self, pair: &Pair) {
        self.available.retain(|p| p != pair);
        self.used.insert(pair.clone());
        self.last_topic = Some(pair.topic().to_string());
    }

    /// Indices into `available` eligible for the next pick
    ///
    /// Excludes pairs sharing the last served topic unless nothing else is
    /// left.
    pub fn candidates(&self) -> Vec<usize> {
        self.candidates_excluding(&HashSet::new())
    }

    /// Like [`candidates`](Self::candidates), never offering a pair in
    /// `excluded`
    ///
    /// Empty when every available pair is excluded.
    pub fn candidates_excluding(&self, excluded: &HashSet<Pair>) -> Vec<usize> {
        let eligible: Vec<usize> = self
            .available
            .iter()
            .enumerate()
            .filter(|(_, pair)| !excluded.contains(*pair))
            .map(|(i, _)| i)
            .collect();

        let preferred: Vec<usize> = eligible
            .iter()
            .copied()
            .filter(|&i| Some(self.available[i].topic()) != self.last_topic.as_deref())
            .collect();

        if preferred.is_empty() {
            eligible
        } else {
            preferred
        }
    }

    /// Pairs not yet served this cycle, in shuffle order
    pub fn available(&self) -> &[Pair] {
        &self.available
    }

    /// Pairs served this cycle
    pub fn used(&self) -> &HashSet<Pair> {
        &self.used
    }

    /// Topic of the most recently served pair
    pub fn last_topic(&self) -> Option<&str> {
        self.last_topic.as_deref()
    }

    /// True at a cycle boundary
    pub fn is_exhausted(&self) -> bool {
        self.available.is_empty()
    }

    pub(crate) fn set_last_topic(&mut self, topic: Option<String>) {
        self.last_topic = topic;
    }
}

/// Progress summary for the current cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Pairs served this cycle
    pub used: usize,
    /// Size of the pair universe
    pub total: usize,
    /// Pairs still available this cycle
    pub remaining: usize,
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} questions asked this cycle ({} remaining)",
            self.used, self.total, self.remaining
        )
    }
}
