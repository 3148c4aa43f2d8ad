//! askloop - Non-repeating question rotation for automated chat sessions
//!
//! Picks prepared questions so that none repeats until the whole bank has
//! been asked, never serves two questions from the same topic back to back
//! when it can avoid it, and remembers its progress across restarts.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`catalog`] - Question bank loading and text lookup
//! - [`scheduler`] - Pair universe and the persisted rotation scheduler
//! - [`storage`] - JSON state file with fallback loading and atomic saves
//! - [`session`] - Session loop, output sinks and human-paced typing
//! - [`config`] - Configuration management and settings
//! - [`error`] - Unified error type
//!
//! # Example
//!
//! ```no_run
//! use askloop::catalog::Catalog;
//! use askloop::scheduler::{PairUniverse, RotationScheduler};
//! use askloop::storage::StateStore;
//!
//! fn main() -> anyhow::Result<()> {
//!     let catalog = Catalog::builtin()?;
//!     let universe = PairUniverse::from_catalog(&catalog);
//!     let mut scheduler = RotationScheduler::open(universe, StateStore::default())?;
//!
//!     let pair = scheduler.pick();
//!     println!("{}", catalog.resolve(&pair)?);
//!     scheduler.mark_used(&pair)?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod session;
pub mod storage;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::catalog::Catalog;
    pub use crate::config::Config;
    pub use crate::error::{AskloopErrorTrait, Error, ErrorCategory, Result};
    pub use crate::scheduler::{Pair, PairUniverse, PoolStats, RotationScheduler};
    pub use crate::session::{DryRunSink, MarkPolicy, SessionRunner, TypingSink};
    pub use crate::storage::StateStore;
}

// Direct re-exports for convenience
pub use scheduler::{Pair, PairUniverse, RotationScheduler};
