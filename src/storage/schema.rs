//! Database schema definitions
//!
//! This module contains the SQL schema for the frontier store.

/// SQL schema for the database
///
/// `rowid` doubles as the discovery order used when a crawl is resumed.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS urls (
    hash TEXT PRIMARY KEY,
    url TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_urls_completed ON urls(completed);
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
