//! Crawl Frontier: URL discovery and visit-state tracking for a web crawl
//!
//! This crate keeps one entry per discovered URL in a shared store, hands
//! bounded batches of unvisited URLs to a fetch worker, and records each
//! observed response (success, redirect hop, or terminal failure) back into
//! the store until the frontier is exhausted.

pub mod config;
pub mod crawler;
pub mod output;
pub mod pagination;
pub mod seeds;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for frontier operations
#[derive(Debug, Error)]
pub enum FrontierError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Out-of-order hop for {url}: expected index {expected}, got {got}")]
    OutOfOrderHop { url: String, expected: u32, got: u32 },

    #[error("Hop index {hop_index} for {url} exceeds the budget of {max_hops} hops")]
    HopBudgetExceeded {
        url: String,
        hop_index: u32,
        max_hops: u32,
    },

    #[error("Seed ingestion error: {0}")]
    Seed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for frontier operations
pub type Result<T> = std::result::Result<T, FrontierError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use state::{FrontierEntry, HopRecord, Resolution, MAX_HOPS};
pub use storage::{FrontierStore, SqliteFrontier};
