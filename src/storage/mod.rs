//! Storage module for persisting the frontier
//!
//! Every discovered URL is recorded under the hash of its normalized form,
//! together with a completion flag. The store is what lets a crawl resume
//! after the process is stopped.

mod schema;
mod sqlite;
mod stats;
mod traits;

#[cfg(test)]
pub mod testing;

pub use sqlite::SqliteStore;
pub use stats::{
    format_statistics, load_statistics, print_statistics, AuthorityCounts, FrontierStatistics,
};
pub use traits::{FrontierStore, StorageError, StorageResult};

use std::path::{Path, PathBuf};
use tracing::info;

/// Opens (or creates) the SQLite frontier store at `path`
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStore)` - Successfully opened store
/// * `Err(StorageError)` - The file could not be opened as a frontier store
pub fn open_store(path: &Path) -> StorageResult<SqliteStore> {
    SqliteStore::new(path)
}

/// Deletes a store file and its WAL side files
///
/// Returns `true` if the main file existed.
pub fn remove_store(path: &Path) -> StorageResult<bool> {
    let existed = path.exists();
    if existed {
        info!("Found save file {}, deleting it.", path.display());
        std::fs::remove_file(path)?;
    }

    for suffix in ["-wal", "-shm"] {
        let side = side_file(path, suffix);
        if side.exists() {
            std::fs::remove_file(&side)?;
        }
    }

    Ok(existed)
}

fn side_file(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}
