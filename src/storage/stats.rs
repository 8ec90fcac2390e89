//! Statistics over a saved frontier
//!
//! Backs the `--stats` command, which inspects a frontier store without
//! starting a crawl.

use crate::storage::traits::{FrontierStore, StorageResult};
use crate::url::extract_authority;
use std::collections::HashMap;
use url::Url;

/// Discovered and completed counts for one authority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthorityCounts {
    pub discovered: usize,
    pub completed: usize,
}

/// Frontier statistics summary
#[derive(Debug, Clone, Default)]
pub struct FrontierStatistics {
    /// Total number of URLs discovered
    pub total_urls: usize,

    /// URLs already downloaded
    pub completed_urls: usize,

    /// Counts per network authority
    pub by_authority: HashMap<String, AuthorityCounts>,

    /// Records whose URL no longer parses
    pub unparsable: usize,
}

impl FrontierStatistics {
    /// URLs discovered but not yet downloaded
    pub fn pending_urls(&self) -> usize {
        self.total_urls - self.completed_urls
    }
}

/// Loads statistics from a frontier store
///
/// # Arguments
///
/// * `store` - The store to scan
///
/// # Returns
///
/// * `Ok(FrontierStatistics)` - Successfully scanned every record
/// * `Err(StorageError)` - The store could not be read
pub fn load_statistics(store: &dyn FrontierStore) -> StorageResult<FrontierStatistics> {
    let mut stats = FrontierStatistics::default();

    for (_, record) in store.iter_all()? {
        stats.total_urls += 1;
        if record.completed {
            stats.completed_urls += 1;
        }

        let authority = Url::parse(&record.url)
            .ok()
            .and_then(|u| extract_authority(&u));
        match authority {
            Some(authority) => {
                let counts = stats.by_authority.entry(authority).or_default();
                counts.discovered += 1;
                if record.completed {
                    counts.completed += 1;
                }
            }
            None => stats.unparsable += 1,
        }
    }

    Ok(stats)
}

/// Formats statistics for display
///
/// Authorities are listed by discovered count, largest first.
pub fn format_statistics(stats: &FrontierStatistics) -> String {
    let mut out = String::from("=== Frontier Statistics ===\n\n");

    out.push_str("Overview:\n");
    out.push_str(&format!("  Total urls discovered: {}\n", stats.total_urls));
    out.push_str(&format!("  Completed: {}\n", stats.completed_urls));
    out.push_str(&format!("  Pending: {}\n", stats.pending_urls()));
    out.push_str(&format!("  Authorities: {}\n", stats.by_authority.len()));
    if stats.unparsable > 0 {
        out.push_str(&format!("  Unparsable records: {}\n", stats.unparsable));
    }
    out.push('\n');

    let mut authorities: Vec<_> = stats.by_authority.iter().collect();
    authorities.sort_by(|a, b| b.1.discovered.cmp(&a.1.discovered).then_with(|| a.0.cmp(b.0)));

    if !authorities.is_empty() {
        out.push_str("Urls by Authority:\n");
        for (authority, counts) in authorities {
            out.push_str(&format!(
                "  {}: {} discovered, {} completed\n",
                authority, counts.discovered, counts.completed
            ));
        }
        out.push('\n');
    }

    let progress = if stats.total_urls > 0 {
        (stats.completed_urls as f64 / stats.total_urls as f64) * 100.0
    } else {
        0.0
    };
    out.push_str(&format!("Progress: {:.1}%\n", progress));

    out
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &FrontierStatistics) {
    print!("{}", format_statistics(stats));
}
