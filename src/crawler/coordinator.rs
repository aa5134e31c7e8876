//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives a crawl from seeds to completion:
//! - Seeding the frontier from a seed table
//! - Reading bounded batches of pending URLs
//! - Visiting each batch concurrently
//! - Detecting completion and tearing the frontier down

use crate::config::Config;
use crate::crawler::batch::BatchReader;
use crate::crawler::enqueuer::{EnqueueReport, Enqueuer};
use crate::crawler::fetcher::{build_http_client, visit_url, VisitOutcome};
use crate::crawler::tracker::VisitTracker;
use crate::seeds::load_seed_urls;
use crate::storage::{open_frontier, FrontierStore};
use crate::Result;
use futures::future::join_all;
use reqwest::Client;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Totals for one crawl run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Rounds that visited at least one URL
    pub rounds: u32,

    /// URLs handed to the fetch worker, across all rounds
    pub visits: u64,

    /// Visits that resolved their URL
    pub resolved: u64,

    /// Visits that left their URL pending
    pub still_pending: u64,

    /// Visits skipped after a request or store failure
    pub skipped: u64,

    /// True when the run ended because no pending entries remained
    pub exhausted: bool,
}

impl CrawlSummary {
    fn record(&mut self, outcome: &VisitOutcome) {
        self.visits += 1;
        match outcome {
            VisitOutcome::Resolved { .. } | VisitOutcome::AlreadyResolved => self.resolved += 1,
            VisitOutcome::Pending { .. } => self.still_pending += 1,
            VisitOutcome::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    store: Arc<dyn FrontierStore>,
    enqueuer: Enqueuer,
    reader: BatchReader,
    tracker: VisitTracker,
    client: Client,
}

impl Coordinator {
    /// Creates a new coordinator over an already opened store
    ///
    /// # Arguments
    ///
    /// * `config` - The frontier configuration
    /// * `store` - The frontier store shared by every component
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(FrontierError)` - The HTTP client could not be built
    pub fn new(config: Config, store: Arc<dyn FrontierStore>) -> Result<Self> {
        let client = build_http_client(&config.user_agent, config.fetch.timeout_secs)?;

        let enqueuer = Enqueuer::new(store.clone(), config.enqueue.group_size);
        let reader = BatchReader::new(
            store.clone(),
            config.batch.page_size,
            config.batch.parallel_urls_to_sync,
        );
        let tracker = VisitTracker::new(store.clone(), config.frontier.max_hops);

        Ok(Self {
            config: Arc::new(config),
            store,
            enqueuer,
            reader,
            tracker,
            client,
        })
    }

    /// Opens the store named in the configuration and creates a coordinator
    pub fn open(config: Config) -> Result<Self> {
        let store = open_frontier(Path::new(&config.frontier.database_path))?;
        Self::new(config, Arc::new(store))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn FrontierStore> {
        self.store.clone()
    }

    pub fn enqueuer(&self) -> &Enqueuer {
        &self.enqueuer
    }

    pub fn reader(&self) -> &BatchReader {
        &self.reader
    }

    pub fn tracker(&self) -> &VisitTracker {
        &self.tracker
    }

    /// Enqueues every URL in a seed table
    pub async fn seed_from_file(&self, path: &Path) -> Result<EnqueueReport> {
        let urls = load_seed_urls(path, &self.config.seeds.url_field)?;
        Ok(self.enqueuer.queue_many(&urls).await)
    }

    /// Reads one batch and visits it concurrently
    ///
    /// Returns the outcome of every visit, in batch order. An empty result
    /// means the frontier is exhausted.
    pub async fn run_round(&self) -> Result<Vec<(String, VisitOutcome)>> {
        self.run_round_excluding(&HashSet::new()).await
    }

    /// Reads one batch that leaves out `exclude` and visits it concurrently
    ///
    /// An empty result means every pending URL is in `exclude`.
    pub async fn run_round_excluding(
        &self,
        exclude: &HashSet<String>,
    ) -> Result<Vec<(String, VisitOutcome)>> {
        let batch = self
            .reader
            .read_unresolved_excluding(self.config.batch.parallel_urls_to_sync, exclude)
            .await?;

        let visits = batch.iter().map(|url| async move {
            let outcome = match visit_url(&self.client, &self.tracker, url).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Error visiting {}: {}", url, e);
                    VisitOutcome::Skipped {
                        reason: e.to_string(),
                    }
                }
            };
            (url.clone(), outcome)
        });

        Ok(join_all(visits).await)
    }

    /// Runs rounds until no pending entries remain
    ///
    /// A URL skipped after a failed request stays pending but is not offered
    /// again during this run; later rounds read past it. The loop stops early
    /// when a non-zero `max-rounds` is reached, or when every remaining
    /// pending URL has been skipped. The frontier is then left as is for a
    /// later run to pick up.
    pub async fn run(&self) -> Result<CrawlSummary> {
        let max_rounds = self.config.fetch.max_rounds;
        let start_time = Instant::now();
        let mut summary = CrawlSummary::default();
        let mut skipped: HashSet<String> = HashSet::new();

        loop {
            if max_rounds > 0 && summary.rounds >= max_rounds {
                tracing::info!("Stopping after {} rounds", summary.rounds);
                break;
            }

            let results = self.run_round_excluding(&skipped).await?;
            if results.is_empty() {
                if skipped.is_empty() {
                    tracing::info!("Frontier is exhausted, crawl complete");
                    summary.exhausted = true;
                } else {
                    tracing::warn!(
                        "Only skipped URLs remain, stopping with {} URLs pending",
                        skipped.len()
                    );
                }
                break;
            }

            summary.rounds += 1;
            for (url, outcome) in &results {
                summary.record(outcome);
                if matches!(outcome, VisitOutcome::Skipped { .. }) {
                    skipped.insert(url.clone());
                }
            }

            tracing::info!(
                "Round {}: visited {} URLs ({} resolved, {} pending, {} skipped so far), {:.2} URLs/sec",
                summary.rounds,
                results.len(),
                summary.resolved,
                summary.still_pending,
                summary.skipped,
                summary.visits as f64 / start_time.elapsed().as_secs_f64().max(f64::EPSILON)
            );
        }

        tracing::info!(
            "Crawl finished: {} visits over {} rounds in {:?}",
            summary.visits,
            summary.rounds,
            start_time.elapsed()
        );

        Ok(summary)
    }

    /// Returns true when no pending entries remain
    pub async fn is_exhausted(&self) -> Result<bool> {
        self.reader.is_exhausted().await
    }

    /// Tears the frontier down if the crawl is complete
    ///
    /// Returns false, leaving the store untouched, while entries are pending.
    pub async fn complete(&self) -> Result<bool> {
        if !self.is_exhausted().await? {
            tracing::warn!("Frontier still has pending entries, not tearing down");
            return Ok(false);
        }

        self.store.teardown().await?;
        tracing::info!("Frontier torn down");
        Ok(true)
    }
}

/// Runs the main crawl operation
///
/// Opens the configured store, drains the frontier and tears it down once
/// nothing is pending.
///
/// # Example
///
/// ```no_run
/// use crawl_frontier::config::load_config;
/// use crawl_frontier::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("frontier.toml"))?;
/// let summary = run_crawl(config).await?;
/// println!("{} visits", summary.visits);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlSummary> {
    let coordinator = Coordinator::open(config)?;
    let summary = coordinator.run().await?;

    if summary.exhausted {
        coordinator.complete().await?;
    }

    Ok(summary)
}
