//! Database schema definitions
//!
//! This module contains the SQL schema for the frontier database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per discovered URL
CREATE TABLE IF NOT EXISTS frontier (
    url TEXT PRIMARY KEY,
    resolution_state TEXT NOT NULL,
    final_status INTEGER,
    discovered_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Secondary index used to page through pending entries without a full scan
CREATE INDEX IF NOT EXISTS idx_frontier_resolution ON frontier(resolution_state, url);

-- Ordered redirect hops per URL
CREATE TABLE IF NOT EXISTS frontier_hops (
    url TEXT NOT NULL REFERENCES frontier(url),
    hop_index INTEGER NOT NULL,
    status INTEGER NOT NULL,
    redirect_target TEXT,
    recorded_at TEXT NOT NULL,
    PRIMARY KEY (url, hop_index)
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
