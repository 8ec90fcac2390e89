//! Human-readable log of every page that made it into the statistics
//!
//! Writes are best effort: a failing log never interrupts the crawl.

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Append-only activity log guarded by its own lock
pub struct ActivityLog {
    file: Mutex<Option<File>>,
}

impl ActivityLog {
    /// Truncates `path` and writes the start banner
    ///
    /// If the file cannot be created the log is disabled and every later
    /// write is a no-op.
    pub fn create(path: &Path) -> Self {
        let file = match Self::open(path) {
            Ok(file) => Some(file),
            Err(e) => {
                debug!("Activity log {} unavailable: {}", path.display(), e);
                None
            }
        };

        Self {
            file: Mutex::new(file),
        }
    }

    fn open(path: &Path) -> io::Result<File> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        writeln!(
            file,
            "Crawl started at {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(file, "{}\n", "=".repeat(80))?;
        file.flush()?;

        Ok(file)
    }

    /// Appends one entry for a recorded page
    pub fn page(&self, page_count: usize, word_count: usize, subdomain: &str, url: &str) {
        let mut guard = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(file) = guard.as_mut() else {
            return;
        };

        let entry = format!(
            "[{}] Pages: {} | Words: {} | {}\n  {}\n\n",
            Local::now().format("%H:%M:%S"),
            page_count,
            word_count,
            subdomain,
            url
        );

        if let Err(e) = file.write_all(entry.as_bytes()).and_then(|_| file.flush()) {
            debug!("Failed to write activity log entry for {}: {}", url, e);
        }
    }
}
