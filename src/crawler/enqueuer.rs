//! Best-effort insertion of newly discovered URLs
//!
//! Enqueueing never fails the caller. A URL that cannot be written is logged
//! and dropped; it will simply not be visited. Bulk inserts are split into
//! fixed-size groups: members of a group are written concurrently, groups one
//! after another, which bounds the peak number of in-flight writes against
//! the store.

use crate::state::FrontierEntry;
use crate::storage::FrontierStore;
use futures::future::join_all;
use std::sync::Arc;

/// Default number of concurrent writes per group
pub const DEFAULT_GROUP_SIZE: usize = 20;

/// What happened to a single URL handed to the enqueuer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// A new pending entry was written
    Inserted,

    /// The URL was already in the frontier; nothing was written
    AlreadyKnown,

    /// The store could not be reached; the URL was dropped
    Dropped,
}

/// Tally of a bulk enqueue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnqueueReport {
    pub inserted: usize,
    pub already_known: usize,
    pub dropped: usize,
}

impl EnqueueReport {
    fn record(&mut self, outcome: EnqueueOutcome) {
        match outcome {
            EnqueueOutcome::Inserted => self.inserted += 1,
            EnqueueOutcome::AlreadyKnown => self.already_known += 1,
            EnqueueOutcome::Dropped => self.dropped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.inserted + self.already_known + self.dropped
    }
}

/// Inserts discovered URLs into the frontier
pub struct Enqueuer {
    store: Arc<dyn FrontierStore>,
    group_size: usize,
}

impl Enqueuer {
    /// Creates an enqueuer writing to `store` in groups of `group_size`
    pub fn new(store: Arc<dyn FrontierStore>, group_size: usize) -> Self {
        Self {
            store,
            group_size: group_size.max(1),
        }
    }

    /// Adds one URL to the frontier if it is not already there
    ///
    /// The existence check and the insert are separate store calls. Two
    /// concurrent calls for the same URL may both insert; the store collapses
    /// them into one entry.
    pub async fn queue_one(&self, url: &str) -> EnqueueOutcome {
        match self.store.get(url).await {
            Ok(Some(_)) => return EnqueueOutcome::AlreadyKnown,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Unable to queue {}: {}", url, e);
                return EnqueueOutcome::Dropped;
            }
        }

        match self.store.put(&FrontierEntry::pending(url)).await {
            Ok(()) => {
                tracing::debug!("Queued {}", url);
                EnqueueOutcome::Inserted
            }
            Err(e) => {
                tracing::warn!("Unable to queue {}: {}", url, e);
                EnqueueOutcome::Dropped
            }
        }
    }

    /// Adds many URLs, one bounded group at a time
    pub async fn queue_many<S: AsRef<str>>(&self, urls: &[S]) -> EnqueueReport {
        let mut report = EnqueueReport::default();

        for group in urls.chunks(self.group_size) {
            let outcomes = join_all(group.iter().map(|url| self.queue_one(url.as_ref()))).await;
            for outcome in outcomes {
                report.record(outcome);
            }
        }

        tracing::info!(
            inserted = report.inserted,
            already_known = report.already_known,
            dropped = report.dropped,
            "Enqueued {} URLs",
            report.total()
        );

        report
    }
}
