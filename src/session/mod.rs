//! Question session loop
//!
//! A session asks a fixed number of questions. For each one the runner picks
//! a pair from the [`RotationScheduler`], resolves its text through the
//! [`Catalog`], hands it to a [`QuestionSink`], and commits the pair with
//! `mark_used`, which persists progress.
//!
//! # Mark policy
//!
//! When a picked pair cannot be resolved to text, [`MarkPolicy`] decides
//! whether it is consumed anyway. [`MarkPolicy::Always`] (the default)
//! guarantees forward progress: a broken question is skipped for the rest of
//! the cycle. [`MarkPolicy::OnSuccess`] leaves it in the pool, so it can be
//! picked again later in the same session. Either way, a pair whose delivery
//! fails with an I/O error is not consumed.

pub mod pacing;
pub mod sink;
pub mod typing;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::SessionConfig;
use crate::scheduler::{Pair, RotationScheduler, SchedulerError};

pub use pacing::Pacer;
pub use sink::{DryRunSink, QuestionSink, TypingSink};
pub use typing::{HumanTyper, Keyboard, TerminalKeyboard};

const SEP: &str = "============================================================";
const DIV: &str = "------------------------------------------------------------";

// ============================================================================
// Policy and Labels
// ============================================================================

/// Whether an unresolvable question is consumed
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum MarkPolicy {
    /// Mark every picked pair used, even if its text fails to resolve
    #[default]
    Always,
    /// Mark a pair used only after its question was delivered
    OnSuccess,
}

impl MarkPolicy {
    /// Policy ID as used in config files and flags
    pub fn id(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::OnSuccess => "on-success",
        }
    }
}

impl fmt::Display for MarkPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for MarkPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "on-success" | "on_success" | "onsuccess" => Ok(Self::OnSuccess),
            other => Err(format!(
                "Invalid mark policy '{other}'. Valid options: always, on-success"
            )),
        }
    }
}

/// Cosmetic difficulty label shown in the session banner
pub fn difficulty_label(level: u8) -> &'static str {
    match level {
        1 => "Senior Debugging",
        2 => "Senior Architecture",
        3 => "Staff-Level Design",
        4 => "Principal Tradeoffs",
        5 => "Principal + Scale",
        _ => "Unknown",
    }
}

// ============================================================================
// Session Types
// ============================================================================

/// A resolved question ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// 1-based position in the session
    pub number: usize,
    /// Questions in the session
    pub total: usize,
    /// Scheduler pair the text was resolved from
    pub pair: Pair,
    /// Question text
    pub text: String,
}

/// A question that could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedQuestion {
    pub pair: Pair,
    pub error: String,
    /// Whether the pair was consumed despite the failure
    pub consumed: bool,
}

/// Outcome of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    /// Pairs delivered, in order
    pub asked: Vec<Pair>,
    pub failed: Vec<FailedQuestion>,
}

impl SessionReport {
    fn start(session_id: Uuid) -> Self {
        Self {
            session_id,
            started_at: Local::now(),
            finished_at: None,
            asked: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Wall-clock length of the session, once finished
    pub fn elapsed(&self) -> Option<Duration> {
        self.finished_at
            .and_then(|end| (end - self.started_at).to_std().ok())
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[DONE] Session complete - {} question(s) sent",
            self.asked.len()
        )?;
        if !self.failed.is_empty() {
            write!(f, ", {} failed", self.failed.len())?;
        }
        if let Some(elapsed) = self.elapsed() {
            write!(f, " in {}s", elapsed.as_secs())?;
        }
        Ok(())
    }
}

/// Errors that end a session early
#[derive(Error, Debug)]
pub enum SessionError {
    /// Committing a pair failed to persist
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// The sink could not deliver a question
    #[error("Failed to deliver question {pair}: {source}")]
    Delivery {
        pair: Pair,
        #[source]
        source: std::io::Error,
    },
}

/// Session banner shown before the first question
pub fn banner(config: &SessionConfig, live: bool) -> String {
    let mode = if live {
        "LIVE (simulated typing)"
    } else {
        "DRY RUN (no typing)"
    };

    format!(
        "{SEP}\n  [*] Question Rotation Session\n  Mode      : {mode}\n  Questions : {}\n  Difficulty: {} - {}\n  Countdown : {}s\n{SEP}",
        config.max_questions,
        config.difficulty,
        difficulty_label(config.difficulty),
        config.countdown_secs,
    )
}

// ============================================================================
// Session Runner
// ============================================================================

/// Drives a session: pick, resolve, deliver, commit
pub struct SessionRunner<'a, S: QuestionSink> {
    scheduler: &'a mut RotationScheduler,
    catalog: &'a Catalog,
    sink: S,
    config: SessionConfig,
    pacer: Pacer,
}

impl<'a, S: QuestionSink> SessionRunner<'a, S> {
    /// Create a runner
    pub fn new(
        scheduler: &'a mut RotationScheduler,
        catalog: &'a Catalog,
        sink: S,
        config: SessionConfig,
    ) -> Self {
        let pacer = Pacer::new(config.wait_min_secs, config.wait_max_secs);
        Self {
            scheduler,
            catalog,
            sink,
            config,
            pacer,
        }
    }

    /// Replace the inter-question pacer
    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    /// Consume the runner, returning the sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Run the session to completion
    pub async fn run(&mut self) -> Result<SessionReport, SessionError> {
        let session_id = Uuid::new_v4();
        let span = tracing::info_span!("session", %session_id);
        self.run_inner(session_id).instrument(span).await
    }

    async fn run_inner(&mut self, session_id: Uuid) -> Result<SessionReport, SessionError> {
        let total = self.config.max_questions;
        let mut report = SessionReport::start(session_id);

        tracing::info!(
            questions = total,
            live = self.sink.is_live(),
            mark_policy = %self.config.mark_policy,
            cycle = self.scheduler.cycle(),
            "Session starting"
        );

        if self.sink.is_live() {
            pacing::countdown(self.config.countdown_secs).await;
        }

        // unresolvable pairs left in the pool are not offered again this session
        let mut skipped: HashSet<Pair> = HashSet::new();

        for number in 1..=total {
            let Some(pair) = self.scheduler.pick_excluding(&skipped) else {
                println!("  [ERROR] No question left that can be generated. Stopping.");
                tracing::warn!(
                    skipped = skipped.len(),
                    "Every remaining question failed to resolve"
                );
                break;
            };

            println!("{DIV}");
            println!(
                "  Q{number:02}/{total:02} | Theme: {} > {}",
                pair.topic(),
                pair.item()
            );
            println!("  [Memory] {}", self.scheduler.stats());
            println!("{DIV}");

            let text = match self.catalog.resolve(&pair) {
                Ok(text) => text,
                Err(e) => {
                    let consumed = self.config.mark_policy == MarkPolicy::Always;
                    println!("  [ERROR] Failed to generate question: {e}");
                    tracing::warn!(
                        topic = pair.topic(),
                        item = pair.item(),
                        error = %e,
                        consumed,
                        "Question could not be resolved"
                    );
                    if consumed {
                        self.scheduler.mark_used(&pair)?;
                    } else {
                        skipped.insert(pair.clone());
                    }
                    report.failed.push(FailedQuestion {
                        pair,
                        error: e.to_string(),
                        consumed,
                    });
                    continue;
                }
            };

            let question = Question {
                number,
                total,
                pair,
                text,
            };

            self.sink
                .deliver(&question)
                .await
                .map_err(|source| SessionError::Delivery {
                    pair: question.pair.clone(),
                    source,
                })?;

            self.scheduler.mark_used(&question.pair)?;
            report.asked.push(question.pair);

            if self.sink.is_live() && number < total {
                self.pacer.idle().await;
            }
        }

        report.finished_at = Some(Local::now());
        tracing::info!(
            asked = report.asked.len(),
            failed = report.failed.len(),
            stats = %self.scheduler.stats(),
            "Session finished"
        );
        Ok(report)
    }
}
