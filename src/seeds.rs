//! Seed ingestion from flat comma-delimited tables
//!
//! A seed file is a header row of column names followed by one row per seed.
//! Each row becomes a map from column name to cell value. Rows are never
//! rejected: a short row yields a sparse map, empty cells are left out, and
//! cells beyond the header are ignored. Only rows that carry the configured
//! URL column become enqueue candidates.

use crate::{FrontierError, Result};
use std::collections::HashMap;
use std::path::Path;

/// One parsed seed row: column name to cell value
pub type SeedRow = HashMap<String, String>;

/// Parses seed table text into one map per data row
///
/// Lines may end in `\n`, `\r\n`, or a bare `\r`. Blank lines are skipped.
///
/// # Examples
///
/// ```
/// use crawl_frontier::seeds::parse_seed_table;
///
/// let rows = parse_seed_table("url,title\nhttps://a.example/,A\nhttps://b.example/");
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[1].get("url").map(String::as_str), Some("https://b.example/"));
/// assert!(rows[1].get("title").is_none());
/// ```
pub fn parse_seed_table(text: &str) -> Vec<SeedRow> {
    let mut lines = text
        .split(|c: char| c == '\r' || c == '\n')
        .filter(|line| !line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };

    let headers: Vec<&str> = header_line.split(',').map(str::trim).collect();

    lines
        .map(|line| {
            headers
                .iter()
                .zip(line.split(','))
                .filter(|(header, cell)| !header.is_empty() && !cell.trim().is_empty())
                .map(|(header, cell)| (header.to_string(), cell.trim().to_string()))
                .collect()
        })
        .collect()
}

/// Extracts the URL of every row that has one
///
/// Rows without the URL column are dropped with a debug log. Every other
/// column is discarded; frontier entries are keyed by URL alone.
pub fn seed_urls(rows: &[SeedRow], url_field: &str) -> Vec<String> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| match row.get(url_field) {
            Some(url) => Some(url.clone()),
            None => {
                tracing::debug!(
                    "Seed row {} has no '{}' column, skipping",
                    index + 1,
                    url_field
                );
                None
            }
        })
        .collect()
}

/// Reads a seed file and returns the URLs to enqueue
///
/// # Errors
///
/// Fails if the file cannot be read or its header has no `url_field`
/// column. Individual rows never cause an error.
pub fn load_seed_urls(path: &Path, url_field: &str) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;

    let has_url_column = text
        .split(|c: char| c == '\r' || c == '\n')
        .find(|line| !line.trim().is_empty())
        .is_some_and(|header| header.split(',').any(|name| name.trim() == url_field));
    if !has_url_column {
        return Err(FrontierError::Seed(format!(
            "{} has no '{}' column",
            path.display(),
            url_field
        )));
    }

    let rows = parse_seed_table(&text);
    let urls = seed_urls(&rows, url_field);

    tracing::info!(
        "Parsed {} seed rows from {}, {} with a '{}' column",
        rows.len(),
        path.display(),
        urls.len(),
        url_field
    );

    Ok(urls)
}
