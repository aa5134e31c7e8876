//! Storage traits and error types
//!
//! This module defines the trait interface for frontier store backends and
//! associated error types.

use crate::pagination::{Page, PageRequest};
use crate::state::{FrontierEntry, HopRecord, Outcome};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt frontier row for {url}: {message}")]
    Corrupt { url: String, message: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// One page request against the resolution-state index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    /// Maximum number of URLs per page
    pub page_size: usize,

    /// Resume after this URL; `None` starts at the beginning of the index
    pub exclusive_start: Option<String>,
}

impl PendingQuery {
    pub fn first_page(page_size: usize) -> Self {
        Self {
            page_size,
            exclusive_start: None,
        }
    }
}

impl PageRequest for PendingQuery {
    type Cursor = String;

    fn with_cursor(&self, cursor: String) -> Self {
        Self {
            page_size: self.page_size,
            exclusive_start: Some(cursor),
        }
    }
}

/// Entry counts split by resolution state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionCounts {
    pub pending: u64,
    pub resolved: u64,
}

impl ResolutionCounts {
    pub fn total(&self) -> u64 {
        self.pending + self.resolved
    }
}

/// Trait for frontier store backends
///
/// One entry per URL. Every write is an independent upsert; nothing here
/// coordinates concurrent writers beyond the backend's own per-key ordering.
/// Implementations must be shareable across tasks.
#[async_trait]
pub trait FrontierStore: Send + Sync {
    // ===== Entry Access =====

    /// Gets the entry for a URL, with its hops in index order
    async fn get(&self, url: &str) -> StorageResult<Option<FrontierEntry>>;

    /// Writes an entry, replacing a pending entry with the same URL
    ///
    /// An existing resolved entry is left untouched, so a late insert can
    /// never move an entry back to pending.
    async fn put(&self, entry: &FrontierEntry) -> StorageResult<()>;

    /// Records one hop and updates the entry's last observed status
    ///
    /// Creates a pending entry if the URL is not yet known.
    async fn update_hop(&self, url: &str, hop: &HopRecord) -> StorageResult<()>;

    /// Marks an entry resolved with the given terminal status
    ///
    /// Creates the entry if the URL is not yet known.
    async fn mark_resolved(&self, url: &str, status: u16) -> StorageResult<()>;

    /// Records a terminal hop and resolves the entry with its status
    ///
    /// Both writes land together or not at all. Creates the entry if the
    /// URL is not yet known.
    async fn resolve_with_hop(&self, url: &str, hop: &HopRecord) -> StorageResult<()>;

    // ===== Index Queries =====

    /// Reads one page of pending URLs from the resolution-state index
    async fn query_pending(&self, query: PendingQuery) -> StorageResult<Page<String, String>>;

    // ===== Statistics =====

    /// Counts entries by resolution state
    async fn count_by_resolution(&self) -> StorageResult<ResolutionCounts>;

    /// Counts resolved entries by how they were resolved
    async fn outcome_breakdown(&self, max_hops: u32) -> StorageResult<HashMap<Outcome, u64>>;

    // ===== Lifecycle =====

    /// Removes every entry; used once the crawl is complete
    async fn teardown(&self) -> StorageResult<()>;
}
