//! HTTP fetch worker
//!
//! This module visits frontier URLs and reports every response to the
//! tracker:
//! - Building HTTP clients with proper user agent strings
//! - Following redirects manually, one request per hop
//! - Resuming hop numbering for URLs revisited while still pending
//! - Skipping URLs whose requests fail outright

use crate::config::UserAgentConfig;
use crate::crawler::tracker::{HopReport, Transition, VisitTracker};
use crate::Result;
use reqwest::{header::LOCATION, redirect::Policy, Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Result of visiting one frontier URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitOutcome {
    /// The URL reached a terminal state during this visit
    Resolved {
        /// Status of the last response observed
        final_status: u16,
    },

    /// The chain stopped without resolving; the URL stays in the frontier
    Pending {
        /// Total hops recorded for the URL so far
        hops_recorded: u32,
    },

    /// Another worker resolved the URL first
    AlreadyResolved,

    /// The request could not be made; the URL is retried next round
    Skipped {
        /// Error description
        reason: String,
    },
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are never followed by the client; each hop is requested and
/// reported separately.
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout_secs` - Per-request timeout
///
/// # Example
///
/// ```no_run
/// use crawl_frontier::config::UserAgentConfig;
/// use crawl_frontier::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "FrontierBot".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, 30).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout_secs: u64,
) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Formats the user agent: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Visits a URL and reports each response to the tracker
///
/// # Request Flow
///
/// 1. Ask the tracker where the URL's chain stands; resolved URLs are skipped
/// 2. Request the URL
/// 3. A first-attempt 200 is marked visited directly
/// 4. Every other response is reported as the next hop
/// 5. While the tracker keeps the URL pending and the response names a
///    `Location`, request that target as the next hop
///
/// A URL revisited while pending continues numbering after its recorded
/// hops, so a URL that keeps answering with errors still runs out of budget.
///
/// # Errors
///
/// Tracker and store failures are returned. Request failures are not: they
/// produce [`VisitOutcome::Skipped`].
pub async fn visit_url(client: &Client, tracker: &VisitTracker, url: &str) -> Result<VisitOutcome> {
    let Some(mut hop_index) = tracker.next_hop_index(url).await? else {
        return Ok(VisitOutcome::AlreadyResolved);
    };

    let mut current = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Skipping unparseable URL {}: {}", url, e);
            return Ok(VisitOutcome::Skipped {
                reason: format!("Invalid URL: {}", e),
            });
        }
    };

    loop {
        let response = match client.get(current.as_str()).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Request for {} failed: {}", current, e);
                return Ok(VisitOutcome::Skipped {
                    reason: e.to_string(),
                });
            }
        };

        let status = response.status();
        let location = redirect_target(&current, &response);

        if hop_index == 0 && status == StatusCode::OK {
            tracker.mark_visited(url, status.as_u16()).await?;
            return Ok(VisitOutcome::Resolved {
                final_status: status.as_u16(),
            });
        }

        let report = HopReport::new(
            status.as_u16(),
            hop_index,
            location.as_ref().map(Url::to_string),
        );

        match tracker.record(url, report).await? {
            Transition::Resolved { final_status, .. } => {
                return Ok(VisitOutcome::Resolved { final_status });
            }
            Transition::AlreadyResolved => return Ok(VisitOutcome::AlreadyResolved),
            Transition::FollowRedirect { next_hop_index } => match location {
                Some(target) => {
                    hop_index = next_hop_index;
                    current = target;
                }
                None => {
                    tracing::debug!(
                        "{} answered {} with no Location, leaving pending",
                        current,
                        status
                    );
                    return Ok(VisitOutcome::Pending {
                        hops_recorded: next_hop_index,
                    });
                }
            },
        }
    }
}

/// Resolves a response's `Location` header against the URL that produced it
fn redirect_target(base: &Url, response: &reqwest::Response) -> Option<Url> {
    let raw = response.headers().get(LOCATION)?.to_str().ok()?;

    match base.join(raw) {
        Ok(target) => Some(target),
        Err(e) => {
            tracing::debug!("Ignoring bad Location '{}' from {}: {}", raw, base, e);
            None
        }
    }
}
