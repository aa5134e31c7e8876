//! Per-URL redirect and visit tracking
//!
//! The fetch worker reports every response it observes for a URL, in order,
//! as `(status, hop_index, redirect_target)`. The tracker records the hop and
//! decides whether the URL is now resolved:
//!
//! | Status        | Hop recorded        | Result                                   |
//! |---------------|---------------------|------------------------------------------|
//! | 200           | only if index > 0   | Resolved                                 |
//! | 404           | yes                 | Resolved                                 |
//! | anything else | yes                 | Resolved at the last hop, else Pending   |
//!
//! Reports against an entry that is already resolved are ignored, and a hop
//! index that skips ahead or falls behind the recorded chain is rejected.

use crate::state::{FrontierEntry, HopRecord, Outcome};
use crate::storage::FrontierStore;
use crate::{FrontierError, Result};
use std::sync::Arc;

/// One observed response in a URL's navigation chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopReport {
    pub status: u16,
    pub hop_index: u32,
    pub redirect_target: Option<String>,
}

impl HopReport {
    pub fn new(status: u16, hop_index: u32, redirect_target: Option<String>) -> Self {
        Self {
            status,
            hop_index,
            redirect_target,
        }
    }
}

/// What the tracker decided after a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The URL is still pending; the next report must carry this index
    FollowRedirect { next_hop_index: u32 },

    /// The URL reached a terminal state
    Resolved { final_status: u16, outcome: Outcome },

    /// The URL was resolved before this report arrived; nothing was written
    AlreadyResolved,
}

/// Records hops and resolves frontier entries
pub struct VisitTracker {
    store: Arc<dyn FrontierStore>,
    max_hops: u32,
}

impl VisitTracker {
    pub fn new(store: Arc<dyn FrontierStore>, max_hops: u32) -> Self {
        Self {
            store,
            max_hops: max_hops.max(1),
        }
    }

    /// Returns the index the next report for `url` must carry
    ///
    /// `None` means the URL is already resolved. An unknown URL starts at 0.
    /// A pending entry that already holds a full chain (its final write was
    /// lost) is resolved here with its last observed status.
    pub async fn next_hop_index(&self, url: &str) -> Result<Option<u32>> {
        let Some(entry) = self.store.get(url).await? else {
            return Ok(Some(0));
        };

        if entry.resolution.is_resolved() {
            return Ok(None);
        }

        let next = entry.next_hop_index();
        if next >= self.max_hops {
            let final_status = entry.final_status.unwrap_or(0);
            tracing::warn!(
                "Resolving {} with a full chain of {} hops left pending",
                url,
                next
            );
            self.store.mark_resolved(url, final_status).await?;
            return Ok(None);
        }

        Ok(Some(next))
    }

    /// Applies one observed response to the URL's entry
    ///
    /// # Errors
    ///
    /// * `OutOfOrderHop` - the index is not the next one in the recorded chain
    /// * `HopBudgetExceeded` - the index is past the last allowed hop
    /// * `Storage` - a write failed; nothing from this report was written
    pub async fn record(&self, url: &str, report: HopReport) -> Result<Transition> {
        let entry = self.store.get(url).await?;

        if let Some(entry) = entry.as_ref().filter(|e| e.resolution.is_resolved()) {
            tracing::debug!(
                "Ignoring hop {} for {}: already {}",
                report.hop_index,
                url,
                entry.resolution
            );
            return Ok(Transition::AlreadyResolved);
        }

        if report.hop_index >= self.max_hops {
            return Err(FrontierError::HopBudgetExceeded {
                url: url.to_string(),
                hop_index: report.hop_index,
                max_hops: self.max_hops,
            });
        }

        let expected = entry.as_ref().map_or(0, FrontierEntry::next_hop_index);
        if report.hop_index != expected {
            return Err(FrontierError::OutOfOrderHop {
                url: url.to_string(),
                expected,
                got: report.hop_index,
            });
        }

        let HopReport {
            status,
            hop_index,
            redirect_target,
        } = report;

        tracing::debug!(
            "Hop {} for {}: {} -> {}",
            hop_index,
            url,
            status,
            redirect_target.as_deref().unwrap_or("-")
        );

        let hop = HopRecord::new(hop_index, status, redirect_target);
        match status {
            200 if hop_index == 0 => self.resolve(url, status, None, 0).await,
            200 | 404 => self.resolve(url, status, Some(&hop), hop_index + 1).await,
            _ if hop_index + 1 < self.max_hops => {
                self.store.update_hop(url, &hop).await?;
                Ok(Transition::FollowRedirect {
                    next_hop_index: hop_index + 1,
                })
            }
            _ => {
                tracing::warn!(
                    "Giving up on {} after {} hops (last status {})",
                    url,
                    self.max_hops,
                    status
                );
                self.resolve(url, status, Some(&hop), hop_index + 1).await
            }
        }
    }

    /// Marks a URL visited with no hop bookkeeping
    pub async fn mark_visited(&self, url: &str, status: u16) -> Result<()> {
        self.store.mark_resolved(url, status).await?;
        tracing::debug!("Marked {} visited ({})", url, status);
        Ok(())
    }

    /// Resolves the entry, writing its terminal hop in the same store call
    async fn resolve(
        &self,
        url: &str,
        final_status: u16,
        hop: Option<&HopRecord>,
        hop_count: u32,
    ) -> Result<Transition> {
        match hop {
            Some(hop) => self.store.resolve_with_hop(url, hop).await?,
            None => self.store.mark_resolved(url, final_status).await?,
        }
        Ok(Transition::Resolved {
            final_status,
            outcome: Outcome::classify(final_status, hop_count, self.max_hops),
        })
    }
}
