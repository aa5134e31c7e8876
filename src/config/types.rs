use crate::state::MAX_HOPS;
use serde::Deserialize;

/// Main configuration structure for the frontier
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub frontier: FrontierConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub enqueue: EnqueueConfig,
    #[serde(default)]
    pub seeds: SeedConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// Frontier store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FrontierConfig {
    /// Path to the SQLite database holding the frontier
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Maximum number of hops recorded per URL before it is forced resolved
    #[serde(rename = "max-hops", default = "default_max_hops")]
    pub max_hops: u32,
}

/// Batch reader configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Hard cap on the number of URLs handed out per round
    #[serde(
        rename = "parallel-urls-to-sync",
        default = "default_parallel_urls_to_sync"
    )]
    pub parallel_urls_to_sync: usize,

    /// Number of entries read from the index per page
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            parallel_urls_to_sync: default_parallel_urls_to_sync(),
            page_size: default_page_size(),
        }
    }
}

/// Enqueuer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EnqueueConfig {
    /// Number of URLs written concurrently; groups run one after another
    #[serde(rename = "group-size", default = "default_group_size")]
    pub group_size: usize,
}

impl Default for EnqueueConfig {
    fn default() -> Self {
        Self {
            group_size: default_group_size(),
        }
    }
}

/// Seed ingestion configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    /// Column of the seed table that holds the URL
    #[serde(rename = "url-field", default = "default_url_field")]
    pub url_field: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            url_field: default_url_field(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Fetch worker configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Upper bound on crawl rounds; 0 runs until the frontier is exhausted
    #[serde(rename = "max-rounds", default)]
    pub max_rounds: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_rounds: 0,
        }
    }
}

fn default_max_hops() -> u32 {
    MAX_HOPS
}

fn default_parallel_urls_to_sync() -> usize {
    10
}

fn default_page_size() -> usize {
    5
}

fn default_group_size() -> usize {
    20
}

fn default_url_field() -> String {
    "url".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
