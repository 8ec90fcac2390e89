//! Storage traits and error types
//!
//! This module defines the trait interface for frontier store backends and
//! associated error types.

use crate::state::UrlRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt record {hash}: {reason}")]
    CorruptRecord { hash: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable map from URL hash to [`UrlRecord`]
///
/// The frontier calls every method while holding its own lock, so
/// implementations only need to be `Send`.
pub trait FrontierStore: Send {
    /// Looks up a record by URL hash
    fn get(&self, hash: &str) -> StorageResult<Option<UrlRecord>>;

    /// Inserts or overwrites the record stored under `hash`
    ///
    /// Overwriting keeps the record's original position in [`iter_all`](Self::iter_all).
    fn put(&mut self, hash: &str, record: &UrlRecord) -> StorageResult<()>;

    /// Returns every `(hash, record)` pair in insertion order
    fn iter_all(&self) -> StorageResult<Vec<(String, UrlRecord)>>;

    /// Flushes pending writes to durable storage
    fn sync(&mut self) -> StorageResult<()>;

    /// Total number of records
    fn len(&self) -> StorageResult<usize>;

    /// Number of records marked completed
    fn count_completed(&self) -> StorageResult<usize>;

    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}
