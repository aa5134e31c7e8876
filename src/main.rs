//! Crawl Frontier main entry point
//!
//! This is the command-line interface for seeding, crawling and completing a
//! crawl frontier.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use crawl_frontier::config::{load_config_with_hash, Config};
use crawl_frontier::crawler::Coordinator;
use crawl_frontier::output::{load_statistics, print_statistics};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Crawl Frontier: URL discovery and visit-state tracking
///
/// Keeps one entry per discovered URL, hands out bounded batches of
/// unvisited URLs, follows redirect chains within a hop budget and records
/// how every URL was resolved.
#[derive(Parser, Debug)]
#[command(name = "crawl-frontier")]
#[command(version)]
#[command(about = "URL frontier and visit-state tracker", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enqueue every URL in a seed table
    Seed {
        /// Comma-delimited file with a header row
        #[arg(value_name = "CSV")]
        path: PathBuf,
    },

    /// Visit pending URLs until the frontier is exhausted
    Crawl,

    /// Print one batch of pending URLs without visiting them
    Batch {
        /// Number of URLs to request (capped by parallel-urls-to-sync)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show frontier statistics
    Stats,

    /// Tear the frontier down if nothing is pending
    Complete,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    match cli.command {
        Command::Seed { path } => handle_seed(config, path).await,
        Command::Crawl => handle_crawl(config).await,
        Command::Batch { limit } => handle_batch(config, limit).await,
        Command::Stats => handle_stats(config).await,
        Command::Complete => handle_complete(config).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawl_frontier=info,warn"),
            1 => EnvFilter::new("crawl_frontier=debug,info"),
            2 => EnvFilter::new("crawl_frontier=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open_coordinator(config: Config) -> anyhow::Result<Coordinator> {
    let path = config.frontier.database_path.clone();
    Coordinator::open(config).with_context(|| format!("Failed to open frontier at {}", path))
}

async fn handle_seed(config: Config, path: PathBuf) -> anyhow::Result<()> {
    let coordinator = open_coordinator(config)?;

    let report = coordinator
        .seed_from_file(&path)
        .await
        .with_context(|| format!("Failed to read seeds from {}", path.display()))?;

    println!(
        "Seeded {} new URLs ({} already known, {} dropped)",
        report.inserted, report.already_known, report.dropped
    );
    Ok(())
}

async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let coordinator = open_coordinator(config)?;

    let summary = match coordinator.run().await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if summary.exhausted {
        coordinator.complete().await?;
        println!(
            "Crawl complete: {} visits over {} rounds",
            summary.visits, summary.rounds
        );
    } else {
        println!(
            "Stopped after {} rounds with URLs still pending ({} visits)",
            summary.rounds, summary.visits
        );
    }
    Ok(())
}

async fn handle_batch(config: Config, limit: Option<usize>) -> anyhow::Result<()> {
    let limit = limit.unwrap_or(config.batch.parallel_urls_to_sync);
    let coordinator = open_coordinator(config)?;

    let urls = coordinator.reader().read_unresolved(limit).await?;
    if urls.is_empty() {
        println!("No pending URLs; the frontier is exhausted.");
    }
    for url in urls {
        println!("{}", url);
    }
    Ok(())
}

async fn handle_stats(config: Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.frontier.database_path);

    let max_hops = config.frontier.max_hops;
    let coordinator = open_coordinator(config)?;
    let stats = load_statistics(coordinator.store().as_ref(), max_hops).await?;

    print_statistics(&stats);
    Ok(())
}

async fn handle_complete(config: Config) -> anyhow::Result<()> {
    let coordinator = open_coordinator(config)?;

    if !coordinator.complete().await? {
        bail!("Frontier still has pending entries; run `crawl` first");
    }

    println!("✓ Frontier torn down");
    Ok(())
}
