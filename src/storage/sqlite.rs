//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the FrontierStore trait.

use crate::state::UrlRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{FrontierStore, StorageError, StorageResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::warn;

/// SQLite frontier store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Creates a new SqliteStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database, or the file is not one
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn completed_flag(hash: &str, value: i64) -> StorageResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StorageError::CorruptRecord {
            hash: hash.to_string(),
            reason: format!("completed flag is {}", other),
        }),
    }
}

impl FrontierStore for SqliteStore {
    fn get(&self, hash: &str) -> StorageResult<Option<UrlRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT url, completed FROM urls WHERE hash = ?1",
                params![hash],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        match row {
            Some((url, completed)) => Ok(Some(UrlRecord {
                url,
                completed: completed_flag(hash, completed)?,
            })),
            None => Ok(None),
        }
    }

    fn put(&mut self, hash: &str, record: &UrlRecord) -> StorageResult<()> {
        // upsert keeps the rowid, so resume order stays discovery order
        self.conn.execute(
            "INSERT INTO urls (hash, url, completed) VALUES (?1, ?2, ?3)
             ON CONFLICT(hash) DO UPDATE SET url = excluded.url, completed = excluded.completed",
            params![hash, record.url, record.completed as i64],
        )?;
        Ok(())
    }

    fn iter_all(&self) -> StorageResult<Vec<(String, UrlRecord)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT hash, url, completed FROM urls ORDER BY rowid")?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (hash, url, completed) = match row {
                Ok(row) => row,
                Err(
                    e @ (rusqlite::Error::InvalidColumnType(..)
                    | rusqlite::Error::FromSqlConversionFailure(..)),
                ) => {
                    warn!("Skipping unreadable frontier record: {}", e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            match completed_flag(&hash, completed) {
                Ok(completed) => records.push((hash, UrlRecord { url, completed })),
                Err(e) => warn!("Skipping frontier record: {}", e),
            }
        }
        Ok(records)
    }

    fn sync(&mut self) -> StorageResult<()> {
        // the pragma reports its result as a row
        self.conn
            .query_row("PRAGMA wal_checkpoint(PASSIVE)", [], |_| Ok(()))
            .optional()?;
        Ok(())
    }

    fn len(&self) -> StorageResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM urls", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn count_completed(&self) -> StorageResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM urls WHERE completed = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
