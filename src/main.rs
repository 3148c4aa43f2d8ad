use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use askloop::catalog::Catalog;
use askloop::config::Config;
use askloop::scheduler::{PairUniverse, RotationScheduler};
use askloop::session::{
    self, DryRunSink, HumanTyper, MarkPolicy, Pacer, QuestionSink, SessionReport, SessionRunner,
    TerminalKeyboard, TypingSink,
};
use askloop::storage::StateStore;

const SEP: &str = "============================================================";

#[derive(Parser)]
#[command(
    name = "askloop",
    version,
    about = "Ask prepared questions in a non-repeating rotation that survives restarts",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file (environment variables are used otherwise)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Question bank TOML file (defaults to the built-in bank)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// State file tracking rotation progress
    #[arg(long, global = true)]
    state_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a question session
    Run {
        /// Number of questions to send
        #[arg(short, long)]
        questions: Option<usize>,

        /// Seconds to wait before the first keystroke
        #[arg(short, long)]
        countdown: Option<u64>,

        /// Question difficulty label 1-5 (1=senior debug, 5=principal design)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        difficulty: Option<u8>,

        /// Print questions to the console only, no simulated typing
        #[arg(long, default_value = "false")]
        dry_run: bool,

        /// Delete saved session state and start a fresh question cycle
        #[arg(short, long, default_value = "false")]
        reset: bool,

        /// Seed for reproducible picks and pacing
        #[arg(long)]
        seed: Option<u64>,

        /// Whether a question that fails to render is still consumed
        #[arg(long, value_enum)]
        mark_policy: Option<MarkPolicy>,
    },

    /// Show progress through the current cycle
    Stats,

    /// Delete saved session state
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config.as_deref() {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    if let Some(catalog) = cli.catalog {
        config.storage.catalog = Some(catalog);
    }
    if let Some(state_file) = cli.state_file {
        config.storage.state_file = state_file;
    }

    setup_tracing(&config.logging.format, &config.logging.level, cli.verbose)?;

    match cli.command {
        Commands::Run {
            questions,
            countdown,
            difficulty,
            dry_run,
            reset,
            seed,
            mark_policy,
        } => {
            if let Some(questions) = questions {
                config.session.max_questions = questions;
            }
            if let Some(countdown) = countdown {
                config.session.countdown_secs = countdown;
            }
            if let Some(difficulty) = difficulty {
                config.session.difficulty = difficulty;
            }
            if let Some(mark_policy) = mark_policy {
                config.session.mark_policy = mark_policy;
            }
            config.validate()?;

            tracing::info!(
                questions = config.session.max_questions,
                dry_run,
                reset,
                seed = ?seed,
                state_file = %config.storage.state_file.display(),
                "Starting run command"
            );
            run(config, dry_run, reset, seed).await?;
        }

        Commands::Stats => {
            config.validate()?;
            stats(&config)?;
        }

        Commands::Reset => {
            reset_state(&StateStore::new(&config.storage.state_file))?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("askloop=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("askloop={level},warn"))
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let catalog = match path {
        Some(path) => Catalog::from_file(path)
            .with_context(|| format!("Failed to load question bank: {}", path.display()))?,
        None => Catalog::builtin().context("Built-in question bank is invalid")?,
    };

    tracing::info!(
        topics = catalog.topic_count(),
        questions = catalog.len(),
        "Question bank ready"
    );
    Ok(catalog)
}

fn open_scheduler(
    catalog: &Catalog,
    store: StateStore,
    seed: Option<u64>,
) -> Result<RotationScheduler> {
    let universe = PairUniverse::from_catalog(catalog);
    let scheduler = match seed {
        Some(seed) => RotationScheduler::open_seeded(universe, store, seed),
        None => RotationScheduler::open(universe, store),
    };
    scheduler.context("Failed to open rotation scheduler")
}

fn reset_state(store: &StateStore) -> Result<()> {
    let existed = store
        .delete()
        .with_context(|| format!("Failed to delete {}", store.path().display()))?;

    if existed {
        println!("[*] Session state wiped. Starting a fresh question cycle.\n");
    } else {
        println!("[*] No saved state found - already starting fresh.\n");
    }
    Ok(())
}

async fn run(config: Config, dry_run: bool, reset: bool, seed: Option<u64>) -> Result<()> {
    let store = StateStore::new(&config.storage.state_file);
    if reset {
        reset_state(&store)?;
    }

    let catalog = load_catalog(config.storage.catalog.as_deref())?;
    let mut scheduler = open_scheduler(&catalog, store, seed)?;

    println!("{}", session::banner(&config.session, !dry_run));

    let pacer = match seed {
        Some(seed) => Pacer::seeded(config.session.wait_min_secs, config.session.wait_max_secs, seed),
        None => Pacer::new(config.session.wait_min_secs, config.session.wait_max_secs),
    };

    let report = if dry_run {
        println!("\n[DRY RUN] No keyboard actions will be taken.\n");
        let runner = SessionRunner::new(
            &mut scheduler,
            &catalog,
            DryRunSink::stdout(),
            config.session.clone(),
        )
        .with_pacer(pacer);
        run_until_interrupted(runner).await?
    } else {
        let typer = match seed {
            Some(seed) => HumanTyper::seeded(config.typing.clone(), seed),
            None => HumanTyper::new(config.typing.clone()),
        };
        let sink = TypingSink::new(TerminalKeyboard::stdout(), typer);
        let runner = SessionRunner::new(&mut scheduler, &catalog, sink, config.session.clone())
            .with_pacer(pacer);
        run_until_interrupted(runner).await?
    };

    if let Some(report) = report {
        println!("\n{SEP}");
        println!("  {report}");
        println!("{SEP}\n");
        tracing::debug!(
            report = %serde_json::to_string(&report).context("Failed to serialize report")?,
            "Session report"
        );
    }

    Ok(())
}

/// Run a session, stopping cleanly on Ctrl-C
///
/// Returns `None` when interrupted; progress up to the last committed
/// question is already on disk.
async fn run_until_interrupted<S: QuestionSink>(
    mut runner: SessionRunner<'_, S>,
) -> Result<Option<SessionReport>> {
    tokio::select! {
        result = runner.run() => {
            let report = result.context("Session aborted")?;
            Ok(Some(report))
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\n\n[STOP] Interrupted by user. Exiting.");
            tracing::info!("Session interrupted");
            Ok(None)
        }
    }
}

fn stats(config: &Config) -> Result<()> {
    let catalog = load_catalog(config.storage.catalog.as_deref())?;
    let store = StateStore::new(&config.storage.state_file);
    let saved = store.exists();
    let scheduler = open_scheduler(&catalog, store, None)?;

    let mut remaining_by_topic: BTreeMap<&str, usize> =
        catalog.topics().map(|topic| (topic, 0)).collect();
    for pair in scheduler.pool().available() {
        if let Some(count) = remaining_by_topic.get_mut(pair.topic()) {
            *count += 1;
        }
    }

    println!("{SEP}");
    println!("  [Memory] {}", scheduler.stats());
    println!(
        "  State file : {}{}",
        scheduler.store().path().display(),
        if saved { "" } else { " (not created yet)" }
    );
    println!(
        "  Last topic : {}",
        scheduler.last_topic().unwrap_or("none")
    );
    println!("{SEP}");
    for (topic, remaining) in remaining_by_topic {
        let total = catalog.question_count(topic).unwrap_or(0);
        println!("  {topic:<20} {remaining:>3}/{total:<3} remaining");
    }

    Ok(())
}
