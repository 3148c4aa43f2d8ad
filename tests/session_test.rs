//! End-to-end session tests against real catalog and state files

mod common;

use askloop::catalog::Catalog;
use askloop::config::SessionConfig;
use askloop::scheduler::{PairUniverse, RotationScheduler};
use askloop::session::{DryRunSink, SessionRunner};
use askloop::storage::StateStore;
use std::collections::HashSet;
use tempfile::TempDir;

use common::state_path;

fn dry_config(questions: usize) -> SessionConfig {
    SessionConfig {
        max_questions: questions,
        countdown_secs: 0,
        ..SessionConfig::default()
    }
}

async fn run_session(catalog: &Catalog, dir: &TempDir, questions: usize, seed: u64) -> Vec<String> {
    let universe = PairUniverse::from_catalog(catalog);
    let mut scheduler =
        RotationScheduler::open_seeded(universe, StateStore::new(state_path(dir)), seed).unwrap();
    let mut runner = SessionRunner::new(
        &mut scheduler,
        catalog,
        DryRunSink::new(Vec::new()),
        dry_config(questions),
    );
    let report = runner.run().await.unwrap();
    assert_eq!(report.asked.len(), questions);
    report.asked.iter().map(|pair| pair.to_string()).collect()
}

#[tokio::test]
async fn test_builtin_bank_sessions_resume_across_restarts() {
    let dir = TempDir::new().unwrap();
    let catalog = Catalog::builtin().unwrap();
    let total = catalog.len();

    let first = run_session(&catalog, &dir, 10, 1).await;
    let second = run_session(&catalog, &dir, total - 10, 2).await;

    let asked: HashSet<String> = first.iter().chain(second.iter()).cloned().collect();
    assert_eq!(asked.len(), total);
}

#[tokio::test]
async fn test_dry_run_prints_question_text() {
    let dir = TempDir::new().unwrap();
    let catalog = Catalog::from_topics([("only", vec!["What is a fiber?"])]).unwrap();
    let universe = PairUniverse::from_catalog(&catalog);
    let mut scheduler =
        RotationScheduler::open_seeded(universe, StateStore::new(state_path(&dir)), 0).unwrap();

    let mut runner = SessionRunner::new(
        &mut scheduler,
        &catalog,
        DryRunSink::new(Vec::new()),
        dry_config(1),
    );
    runner.run().await.unwrap();

    let output = String::from_utf8(runner.into_sink().into_inner()).unwrap();
    assert_eq!(output, "\nWhat is a fiber?\n\n");
}

#[tokio::test]
async fn test_catalog_file_edit_between_runs() {
    let dir = TempDir::new().unwrap();
    let bank = dir.path().join("bank.toml");

    std::fs::write(
        &bank,
        "[topics]\nalpha = [\"a1\", \"a2\", \"a3\"]\nbeta = [\"b1\", \"b2\"]\n",
    )
    .unwrap();
    let catalog = Catalog::from_file(&bank).unwrap();
    run_session(&catalog, &dir, 3, 4).await;

    std::fs::write(&bank, "[topics]\nbeta = [\"b1\", \"b2\"]\n").unwrap();
    let shrunk = Catalog::from_file(&bank).unwrap();
    let universe = PairUniverse::from_catalog(&shrunk);
    let scheduler =
        RotationScheduler::open_seeded(universe, StateStore::new(state_path(&dir)), 5).unwrap();

    for pair in scheduler
        .pool()
        .available()
        .iter()
        .chain(scheduler.pool().used().iter())
    {
        assert_eq!(pair.topic(), "beta");
    }
    assert!(scheduler.stats().total <= 2);
}

#[tokio::test]
async fn test_corrupted_state_file_starts_fresh() {
    let dir = TempDir::new().unwrap();
    std::fs::write(state_path(&dir), "{ not json").unwrap();

    let catalog = Catalog::from_topics([("a", vec!["q1", "q2"]), ("b", vec!["q3"])]).unwrap();
    let asked = run_session(&catalog, &dir, 3, 8).await;

    assert_eq!(asked.iter().collect::<HashSet<_>>().len(), 3);
    let persisted = StateStore::new(state_path(&dir)).read().unwrap().unwrap();
    assert_eq!(persisted.used.len(), 3);
    assert!(persisted.available.is_empty());
}
