//! Batch reader for pending frontier entries

use crate::pagination::paginate;
use crate::storage::{FrontierStore, PendingQuery, StorageError};
use crate::Result;
use std::collections::HashSet;
use std::sync::Arc;

/// Pulls bounded batches of unvisited URLs from the resolution-state index
pub struct BatchReader {
    store: Arc<dyn FrontierStore>,
    page_size: usize,
    max_batch: usize,
}

impl BatchReader {
    /// Creates a reader
    ///
    /// # Arguments
    ///
    /// * `store` - The frontier store to read from
    /// * `page_size` - Number of entries read from the index per request
    /// * `max_batch` - Hard cap on any single batch, whatever the caller asks for
    pub fn new(store: Arc<dyn FrontierStore>, page_size: usize, max_batch: usize) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
            max_batch,
        }
    }

    /// Returns up to `min(limit, max_batch)` URLs that are still pending
    ///
    /// An empty result means no pending entries remain and the crawl is
    /// complete. The order is the index's native order; nothing guarantees
    /// that entries written after the read started are seen.
    pub async fn read_unresolved(&self, limit: usize) -> Result<Vec<String>> {
        self.read_unresolved_excluding(limit, &HashSet::new()).await
    }

    /// Like [`read_unresolved`](Self::read_unresolved), but pages past the
    /// URLs in `exclude`
    ///
    /// Excluded URLs do not count towards the cap, so a batch is only short
    /// when the index runs out of pending URLs outside `exclude`.
    pub async fn read_unresolved_excluding(
        &self,
        limit: usize,
        exclude: &HashSet<String>,
    ) -> Result<Vec<String>> {
        let cap = limit.min(self.max_batch);
        let store = &self.store;

        let urls = paginate(
            |query| async move {
                let mut page = store.query_pending(query).await?;
                page.items.retain(|url| !exclude.contains(url));
                Ok::<_, StorageError>(page)
            },
            PendingQuery::first_page(self.page_size),
            Some(cap),
        )
        .await?;

        tracing::debug!(
            "Read {} pending URLs (cap {}, {} excluded)",
            urls.len(),
            cap,
            exclude.len()
        );
        Ok(urls)
    }

    /// Returns true when no pending entries remain
    pub async fn is_exhausted(&self) -> Result<bool> {
        Ok(self.read_unresolved(1).await?.is_empty())
    }
}
