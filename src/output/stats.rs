//! Statistics generation from the frontier store
//!
//! This module provides functionality for extracting and displaying
//! frontier statistics from the storage layer.

use crate::state::Outcome;
use crate::storage::FrontierStore;
use crate::Result;
use std::collections::HashMap;

/// Frontier statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontierStatistics {
    /// Entries still awaiting a visit
    pub pending: u64,

    /// Entries in the terminal state
    pub resolved: u64,

    /// Resolved entries split by how they were resolved
    pub outcomes: HashMap<Outcome, u64>,
}

impl FrontierStatistics {
    pub fn total(&self) -> u64 {
        self.pending + self.resolved
    }

    /// Number of resolved entries with the given outcome
    pub fn outcome_count(&self, outcome: Outcome) -> u64 {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// True when nothing is left to visit
    pub fn is_exhausted(&self) -> bool {
        self.pending == 0
    }
}

/// Loads statistics from the store
///
/// # Arguments
///
/// * `store` - The frontier store to query
/// * `max_hops` - Hop budget used to recognise exhausted redirect chains
pub async fn load_statistics(
    store: &dyn FrontierStore,
    max_hops: u32,
) -> Result<FrontierStatistics> {
    let counts = store.count_by_resolution().await?;
    let outcomes = store.outcome_breakdown(max_hops).await?;

    Ok(FrontierStatistics {
        pending: counts.pending,
        resolved: counts.resolved,
        outcomes,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &FrontierStatistics) {
    println!("=== Frontier Statistics ===\n");

    println!("Overview:");
    println!("  Total URLs: {}", stats.total());
    println!("  Pending: {}", stats.pending);
    println!("  Resolved: {}", stats.resolved);
    println!();

    if stats.resolved > 0 {
        println!("Resolved by Outcome:");
        for outcome in [
            Outcome::Ok,
            Outcome::NotFound,
            Outcome::HopBudgetExhausted,
            Outcome::Other,
        ] {
            let count = stats.outcome_count(outcome);
            let percentage = (count as f64 / stats.resolved as f64) * 100.0;
            println!("  {}: {} ({:.1}%)", outcome.as_str(), count, percentage);
        }
        println!();
    }

    if stats.is_exhausted() {
        println!("Frontier is exhausted; the crawl can be completed.");
    } else {
        println!("{} URLs remain to be visited.", stats.pending);
    }
}
