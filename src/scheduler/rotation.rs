//! Persisted rotation over the question pool
//!
//! This module implements the rotation that ensures:
//! - No pair is served twice within a cycle
//! - Two consecutive questions come from different topics whenever possible
//! - Progress survives restarts through the [`StateStore`]
//! - A new cycle starts automatically once every pair has been served

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

use super::error::{SchedulerError, SchedulerResult};
use super::pair::{Pair, PairUniverse};
use super::pool::{PoolState, PoolStats};
use crate::storage::StateStore;

// ============================================================================
// Rotation Scheduler
// ============================================================================

/// Scheduler for non-repeating question rotation
///
/// [`pick`](Self::pick) proposes a pair without consuming it;
/// [`mark_used`](Self::mark_used) commits it and persists the pool.
#[derive(Debug)]
pub struct RotationScheduler {
    universe: PairUniverse,
    store: StateStore,
    pool: PoolState,
    rng: ChaCha8Rng,
    cycle: u64,
}

impl RotationScheduler {
    /// Open a scheduler with an entropy-seeded random source
    ///
    /// Restores the pool from `store`, or shuffles a fresh one.
    pub fn open(universe: PairUniverse, store: StateStore) -> SchedulerResult<Self> {
        Self::with_rng(universe, store, ChaCha8Rng::from_entropy())
    }

    /// Open a scheduler whose shuffles and picks are reproducible
    ///
    /// # Example
    /// ```no_run
    /// use askloop::scheduler::{PairUniverse, RotationScheduler};
    /// use askloop::storage::StateStore;
    ///
    /// let universe = PairUniverse::from_topics(vec![
    ///     ("css".to_string(), vec!["00".to_string(), "01".to_string()]),
    ///     ("testing".to_string(), vec!["00".to_string()]),
    /// ]);
    /// let mut scheduler =
    ///     RotationScheduler::open_seeded(universe, StateStore::new("state.json"), 42)?;
    /// let pair = scheduler.pick();
    /// scheduler.mark_used(&pair)?;
    /// # Ok::<(), askloop::scheduler::SchedulerError>(())
    /// ```
    pub fn open_seeded(
        universe: PairUniverse,
        store: StateStore,
        seed: u64,
    ) -> SchedulerResult<Self> {
        Self::with_rng(universe, store, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(
        universe: PairUniverse,
        store: StateStore,
        mut rng: ChaCha8Rng,
    ) -> SchedulerResult<Self> {
        if universe.is_empty() {
            return Err(SchedulerError::EmptyUniverse);
        }

        let pool = store.load(&universe, &mut rng);

        Ok(Self {
            universe,
            store,
            pool,
            rng,
            cycle: 1,
        })
    }

    /// Choose the next pair to serve
    ///
    /// Starts a new cycle first if the pool is exhausted. Prefers pairs whose
    /// topic differs from the last served one, falling back to any remaining
    /// pair. The pool itself is left untouched until [`mark_used`](Self::mark_used).
    pub fn pick(&mut self) -> Pair {
        if self.pool.is_exhausted() {
            self.next_cycle();
            tracing::info!(
                cycle = self.cycle,
                total = self.universe.len(),
                "Full cycle complete, starting a new cycle"
            );
        }

        let candidates = self.pool.candidates();
        self.choose(&candidates)
    }

    /// Choose the next pair, never offering one in `excluded`
    ///
    /// Used to skip pairs that could not be served earlier in a session. If
    /// every pair left in the cycle is excluded while others have already
    /// been served, a new cycle starts early. Returns `None` only when the
    /// whole universe is excluded.
    pub fn pick_excluding(&mut self, excluded: &HashSet<Pair>) -> Option<Pair> {
        if self.pool.is_exhausted() {
            self.next_cycle();
            tracing::info!(
                cycle = self.cycle,
                total = self.universe.len(),
                "Full cycle complete, starting a new cycle"
            );
        }

        let mut candidates = self.pool.candidates_excluding(excluded);
        if candidates.is_empty() && !self.pool.used().is_empty() {
            self.next_cycle();
            tracing::warn!(
                cycle = self.cycle,
                excluded = excluded.len(),
                "Only excluded pairs left this cycle, starting a new cycle early"
            );
            candidates = self.pool.candidates_excluding(excluded);
        }

        if candidates.is_empty() {
            return None;
        }
        Some(self.choose(&candidates))
    }

    fn next_cycle(&mut self) {
        self.pool.start_cycle(&self.universe, &mut self.rng);
        self.cycle += 1;
    }

    /// Uniform choice among non-empty `candidates`
    fn choose(&mut self, candidates: &[usize]) -> Pair {
        let index = candidates[self.rng.gen_range(0..candidates.len())];
        let pair = self.pool.available()[index].clone();

        tracing::debug!(
            topic = pair.topic(),
            item = pair.item(),
            candidates = candidates.len(),
            "Picked pair"
        );
        pair
    }

    /// Commit `pair` as served and persist the pool
    ///
    /// Any pair is accepted; one missing from the pool is still recorded as
    /// used and becomes the last topic. If saving fails the error is returned
    /// and the in-memory pool keeps the mutation, so the next successful save
    /// includes it.
    pub fn mark_used(&mut self, pair: &Pair) -> SchedulerResult<()> {
        self.pool.mark(pair);
        self.store.save(&self.pool)?;
        Ok(())
    }

    /// Progress of the current cycle
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            used: self.pool.used().len(),
            total: self.universe.len(),
            remaining: self.pool.available().len(),
        }
    }

    /// Forget all progress: delete the state file and reshuffle
    pub fn reset(&mut self) -> SchedulerResult<()> {
        let existed = self.store.delete()?;
        self.pool = PoolState::fresh(&self.universe, &mut self.rng);
        self.cycle = 1;

        tracing::info!(existed, path = %self.store.path().display(), "Pool reset");
        Ok(())
    }

    /// Current pool
    pub fn pool(&self) -> &PoolState {
        &self.pool
    }

    /// Pair universe this scheduler rotates over
    pub fn universe(&self) -> &PairUniverse {
        &self.universe
    }

    /// Topic of the most recently served pair
    pub fn last_topic(&self) -> Option<&str> {
        self.pool.last_topic()
    }

    /// Cycles started by this scheduler instance, counting the first as 1
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Backing state store
    pub fn store(&self) -> &StateStore {
        &self.store
    }
}

// ============================================================================
// Tests
// ============================================================================
