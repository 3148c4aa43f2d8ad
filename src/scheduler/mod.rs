//! Question rotation scheduling
//!
//! This module decides which prepared question is asked next. It tracks every
//! `(topic, item)` pair served in the current cycle, never repeats one before
//! the cycle ends, avoids asking two questions from the same topic back to
//! back, and persists its progress after every committed question.
//!
//! # Overview
//!
//! ```text
//!   Catalog ──► PairUniverse ──► RotationScheduler ◄──► StateStore
//!                                   │    ▲               (JSON file)
//!                            pick() │    │ mark_used()
//!                                   ▼    │
//!                                 Session runner
//! ```
//!
//! # Cycle lifecycle
//!
//! - **Mid-cycle**: pairs remain available; [`RotationScheduler::pick`]
//!   chooses uniformly among those whose topic differs from the last one.
//! - **Cycle boundary**: nothing is available; the next `pick` reshuffles the
//!   full universe, clears the used set and keeps the last topic so the
//!   boundary does not produce a same-topic repeat either.
//!
//! # Modules
//!
//! - [`pair`] - `Pair` identifiers and the `PairUniverse` builder
//! - [`pool`] - Mutable pool state and progress stats
//! - [`rotation`] - The rotation scheduler
//! - [`error`] - Scheduler errors
//!
//! # Quick Start
//!
//! ```ignore
//! use askloop::catalog::Catalog;
//! use askloop::scheduler::{PairUniverse, RotationScheduler};
//! use askloop::storage::StateStore;
//!
//! let catalog = Catalog::builtin()?;
//! let universe = PairUniverse::from_catalog(&catalog);
//! let mut scheduler = RotationScheduler::open(universe, StateStore::default())?;
//!
//! let pair = scheduler.pick();
//! println!("{}", catalog.resolve(&pair)?);
//! scheduler.mark_used(&pair)?;
//! println!("{}", scheduler.stats());
//! ```

pub mod error;
pub mod pair;
pub mod pool;
pub mod rotation;

// Re-export main types
pub use error::{SchedulerError, SchedulerResult};
pub use pair::{Pair, PairUniverse};
pub use pool::{PoolState, PoolStats};
pub use rotation::RotationScheduler;
