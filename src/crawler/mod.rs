//! Crawler module for frontier traversal
//!
//! This module contains the components that move URLs through the frontier:
//! - Bounded-concurrency enqueueing of discovered URLs
//! - Batch reads of pending URLs through the resolution-state index
//! - Per-URL redirect tracking with a hop budget
//! - HTTP fetching with manual redirect handling
//! - Overall crawl coordination

mod batch;
mod coordinator;
mod enqueuer;
mod fetcher;
mod tracker;

pub use batch::BatchReader;
pub use coordinator::{run_crawl, Coordinator, CrawlSummary};
pub use enqueuer::{EnqueueOutcome, EnqueueReport, Enqueuer, DEFAULT_GROUP_SIZE};
pub use fetcher::{build_http_client, user_agent_string, visit_url, VisitOutcome};
pub use tracker::{HopReport, Transition, VisitTracker};
