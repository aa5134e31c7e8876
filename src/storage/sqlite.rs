//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the FrontierStore
//! trait. The connection sits behind a mutex so one store can be shared by
//! every task in a worker; each trait call takes the lock for the duration of
//! a single statement group and never across an await.

use crate::pagination::Page;
use crate::state::{FrontierEntry, HopRecord, Outcome, Resolution};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{
    FrontierStore, PendingQuery, ResolutionCounts, StorageError, StorageResult,
};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const PENDING: &str = "pending";
const RESOLVED: &str = "resolved";

/// SQLite frontier backend
pub struct SqliteFrontier {
    conn: Mutex<Connection>,
}

impl SqliteFrontier {
    /// Opens or creates a frontier database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteFrontier)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Several workers may share one file
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory frontier (for tests and dry runs)
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Database("frontier connection lock poisoned".to_string()))
    }

    fn get_entry(&self, url: &str) -> StorageResult<Option<FrontierEntry>> {
        let conn = self.lock()?;

        let row: Option<(String, Option<u16>)> = conn
            .query_row(
                "SELECT resolution_state, final_status FROM frontier WHERE url = ?1",
                params![url],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((state, final_status)) = row else {
            return Ok(None);
        };

        let resolution =
            Resolution::from_db_parts(&state, final_status).ok_or_else(|| StorageError::Corrupt {
                url: url.to_string(),
                message: format!("unknown resolution state '{}'", state),
            })?;

        let mut stmt = conn.prepare(
            "SELECT hop_index, status, redirect_target FROM frontier_hops
             WHERE url = ?1 ORDER BY hop_index ASC",
        )?;
        let hops = stmt
            .query_map(params![url], |row| {
                Ok(HopRecord {
                    hop_index: row.get(0)?,
                    status: row.get(1)?,
                    redirect_target: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(FrontierEntry {
            url: url.to_string(),
            resolution,
            hops,
            final_status,
        }))
    }

    fn put_entry(&self, entry: &FrontierEntry) -> StorageResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        let final_status = match entry.resolution {
            Resolution::Resolved { final_status } => Some(final_status),
            Resolution::Pending => entry.final_status,
        };

        let written = tx.execute(
            "INSERT INTO frontier (url, resolution_state, final_status, discovered_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(url) DO UPDATE SET
                resolution_state = excluded.resolution_state,
                final_status = excluded.final_status,
                updated_at = excluded.updated_at
             WHERE frontier.resolution_state = 'pending'",
            params![
                entry.url,
                entry.resolution.to_db_string(),
                final_status,
                now
            ],
        )?;

        // The existing row is resolved; it keeps its state and hops
        if written == 0 {
            return Ok(());
        }

        tx.execute(
            "DELETE FROM frontier_hops WHERE url = ?1",
            params![entry.url],
        )?;
        for hop in &entry.hops {
            tx.execute(
                "INSERT INTO frontier_hops (url, hop_index, status, redirect_target, recorded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    entry.url,
                    hop.hop_index,
                    hop.status,
                    hop.redirect_target,
                    now
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn record_hop(&self, url: &str, hop: &HopRecord) -> StorageResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        tx.execute(
            "INSERT INTO frontier (url, resolution_state, final_status, discovered_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(url) DO UPDATE SET
                final_status = excluded.final_status,
                updated_at = excluded.updated_at",
            params![url, PENDING, hop.status, now],
        )?;

        tx.execute(
            "INSERT OR REPLACE INTO frontier_hops (url, hop_index, status, redirect_target, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![url, hop.hop_index, hop.status, hop.redirect_target, now],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn record_final_hop(&self, url: &str, hop: &HopRecord) -> StorageResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        tx.execute(
            "INSERT OR REPLACE INTO frontier_hops (url, hop_index, status, redirect_target, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![url, hop.hop_index, hop.status, hop.redirect_target, now],
        )?;

        tx.execute(
            "INSERT INTO frontier (url, resolution_state, final_status, discovered_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(url) DO UPDATE SET
                resolution_state = excluded.resolution_state,
                final_status = excluded.final_status,
                updated_at = excluded.updated_at",
            params![url, RESOLVED, hop.status, now],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn resolve(&self, url: &str, status: u16) -> StorageResult<()> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO frontier (url, resolution_state, final_status, discovered_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(url) DO UPDATE SET
                resolution_state = excluded.resolution_state,
                final_status = excluded.final_status,
                updated_at = excluded.updated_at",
            params![url, RESOLVED, status, now],
        )?;
        Ok(())
    }

    fn pending_page(&self, query: &PendingQuery) -> StorageResult<Page<String, String>> {
        let conn = self.lock()?;

        // One extra row tells us whether another page exists
        let fetch = query.page_size as i64 + 1;

        let mut urls = match &query.exclusive_start {
            None => {
                let mut stmt = conn.prepare(
                    "SELECT url FROM frontier WHERE resolution_state = ?1
                     ORDER BY url ASC LIMIT ?2",
                )?;
                let rows = stmt
                    .query_map(params![PENDING, fetch], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            Some(start) => {
                let mut stmt = conn.prepare(
                    "SELECT url FROM frontier WHERE resolution_state = ?1 AND url > ?2
                     ORDER BY url ASC LIMIT ?3",
                )?;
                let rows = stmt
                    .query_map(params![PENDING, start, fetch], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };

        let cursor = if urls.len() > query.page_size {
            urls.truncate(query.page_size);
            urls.last().cloned()
        } else {
            None
        };

        Ok(Page::new(urls, cursor))
    }

    fn counts(&self) -> StorageResult<ResolutionCounts> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT resolution_state, COUNT(*) FROM frontier GROUP BY resolution_state")?;

        let mut counts = ResolutionCounts::default();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        for row in rows {
            let (state, count) = row?;
            match state.as_str() {
                PENDING => counts.pending = count as u64,
                RESOLVED => counts.resolved = count as u64,
                other => tracing::warn!("Ignoring unknown resolution state '{}'", other),
            }
        }

        Ok(counts)
    }

    fn outcomes(&self, max_hops: u32) -> StorageResult<HashMap<Outcome, u64>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT f.final_status, COUNT(h.hop_index)
             FROM frontier f
             LEFT JOIN frontier_hops h ON h.url = f.url
             WHERE f.resolution_state = ?1
             GROUP BY f.url",
        )?;

        let rows = stmt.query_map(params![RESOLVED], |row| {
            Ok((row.get::<_, Option<u16>>(0)?, row.get::<_, u32>(1)?))
        })?;

        let mut breakdown = HashMap::new();
        for row in rows {
            let (final_status, hop_count) = row?;
            let outcome = Outcome::classify(final_status.unwrap_or(0), hop_count, max_hops);
            *breakdown.entry(outcome).or_insert(0) += 1;
        }

        Ok(breakdown)
    }

    fn clear(&self) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            DELETE FROM frontier_hops;
            DELETE FROM frontier;
        ",
        )?;
        Ok(())
    }
}

#[async_trait]
impl FrontierStore for SqliteFrontier {
    async fn get(&self, url: &str) -> StorageResult<Option<FrontierEntry>> {
        self.get_entry(url)
    }

    async fn put(&self, entry: &FrontierEntry) -> StorageResult<()> {
        self.put_entry(entry)
    }

    async fn update_hop(&self, url: &str, hop: &HopRecord) -> StorageResult<()> {
        self.record_hop(url, hop)
    }

    async fn mark_resolved(&self, url: &str, status: u16) -> StorageResult<()> {
        self.resolve(url, status)
    }

    async fn resolve_with_hop(&self, url: &str, hop: &HopRecord) -> StorageResult<()> {
        self.record_final_hop(url, hop)
    }

    async fn query_pending(&self, query: PendingQuery) -> StorageResult<Page<String, String>> {
        self.pending_page(&query)
    }

    async fn count_by_resolution(&self) -> StorageResult<ResolutionCounts> {
        self.counts()
    }

    async fn outcome_breakdown(&self, max_hops: u32) -> StorageResult<HashMap<Outcome, u64>> {
        self.outcomes(max_hops)
    }

    async fn teardown(&self) -> StorageResult<()> {
        self.clear()
    }
}
