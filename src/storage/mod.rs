//! Storage module for persisting the frontier
//!
//! This module handles all database operations for the frontier, including:
//! - SQLite database initialization and schema management
//! - Entry and hop persistence
//! - Paging through pending entries via the resolution-state index
//! - Whole-store teardown at crawl completion

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteFrontier;
pub use traits::{
    FrontierStore, PendingQuery, ResolutionCounts, StorageError, StorageResult,
};

use std::path::Path;

/// Opens the frontier store at the given path, creating it if needed
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteFrontier)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_frontier(path: &Path) -> StorageResult<SqliteFrontier> {
    SqliteFrontier::open(path)
}
