//! Common test utilities

use askloop::scheduler::pair::item_key;
use askloop::scheduler::{PairUniverse, RotationScheduler};
use askloop::storage::StateStore;
use std::path::PathBuf;
use tempfile::TempDir;

/// Universe with `n` items for each named topic
pub fn universe(topics: &[(&str, usize)]) -> PairUniverse {
    PairUniverse::from_topics(
        topics
            .iter()
            .map(|(topic, n)| (topic.to_string(), (0..*n).map(item_key).collect::<Vec<_>>())),
    )
}

/// State file path inside a temp directory
pub fn state_path(dir: &TempDir) -> PathBuf {
    dir.path().join("session_state.json")
}

/// Seeded scheduler over `topics` backed by a state file in `dir`
pub fn open_scheduler(dir: &TempDir, topics: &[(&str, usize)], seed: u64) -> RotationScheduler {
    RotationScheduler::open_seeded(universe(topics), StateStore::new(state_path(dir)), seed)
        .unwrap()
}

/// Pick and commit one pair
#[allow(dead_code)]
pub fn serve(scheduler: &mut RotationScheduler) -> askloop::Pair {
    let pair = scheduler.pick();
    scheduler.mark_used(&pair).unwrap();
    pair
}
