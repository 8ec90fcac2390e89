//! Store wrappers for exercising write failures

use crate::state::UrlRecord;
use crate::storage::{FrontierStore, SqliteStore, StorageError, StorageResult};

/// In-memory store that starts failing writes once its budget is spent
pub struct FailingStore {
    inner: SqliteStore,
    puts_left: usize,
    fail_sync: bool,
}

impl FailingStore {
    /// Allows `puts` successful writes, then reports a full disk
    pub fn after_puts(puts: usize) -> Self {
        Self {
            inner: SqliteStore::new_in_memory().unwrap(),
            puts_left: puts,
            fail_sync: false,
        }
    }

    /// Accepts every write but fails every sync
    pub fn failing_sync() -> Self {
        Self {
            inner: SqliteStore::new_in_memory().unwrap(),
            puts_left: usize::MAX,
            fail_sync: true,
        }
    }
}

impl FrontierStore for FailingStore {
    fn get(&self, hash: &str) -> StorageResult<Option<UrlRecord>> {
        self.inner.get(hash)
    }

    fn put(&mut self, hash: &str, record: &UrlRecord) -> StorageResult<()> {
        if self.puts_left == 0 {
            return Err(StorageError::Database("disk full".to_string()));
        }
        self.puts_left -= 1;
        self.inner.put(hash, record)
    }

    fn iter_all(&self) -> StorageResult<Vec<(String, UrlRecord)>> {
        self.inner.iter_all()
    }

    fn sync(&mut self) -> StorageResult<()> {
        if self.fail_sync {
            return Err(StorageError::Database("sync failed".to_string()));
        }
        self.inner.sync()
    }

    fn len(&self) -> StorageResult<usize> {
        self.inner.len()
    }

    fn count_completed(&self) -> StorageResult<usize> {
        self.inner.count_completed()
    }
}
