//! Content analytics aggregated across the crawl
//!
//! Every successfully downloaded HTML page is offered to [`Analytics::record`].
//! Pages with enough visible text contribute to:
//! - the set of unique pages
//! - the longest page by token count
//! - global word frequencies (each page adds at most 10 per word)
//! - unique pages per subdomain under the configured suffix
//!
//! [`Analytics::flush`] writes the JSON report, its text mirror and a console
//! summary. It can be called any number of times, including from a signal
//! handler while workers are still running.

mod activity_log;
mod report;
mod text;

pub use activity_log::ActivityLog;
pub use report::{
    format_console_summary, format_text_report, write_json_report, write_text_report,
    LongestPage, Report, ReportError, ReportResult, TOP_WORDS,
};
pub use text::{tokenize, visible_text, word_frequencies, MIN_PAGE_TOKENS, PER_PAGE_WORD_CAP};

use crate::config::AnalyticsConfig;
use crate::crawler::Document;
use crate::url::{defragment, matches_suffix};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};
use url::Url;

/// Running totals behind the statistics lock
#[derive(Debug, Default)]
struct PageStats {
    unique_pages: HashSet<String>,
    word_frequency: HashMap<String, usize>,
    longest_page: LongestPage,
    subdomain_pages: HashMap<String, HashSet<String>>,
}

impl PageStats {
    fn report(&self) -> Report {
        let mut words: Vec<(String, usize)> = self
            .word_frequency
            .iter()
            .map(|(word, count)| (word.clone(), *count))
            .collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words.truncate(TOP_WORDS);

        let subdomains: BTreeMap<String, usize> = self
            .subdomain_pages
            .iter()
            .map(|(host, pages)| (host.clone(), pages.len()))
            .collect();

        Report {
            unique_pages_count: self.unique_pages.len(),
            longest_page: self.longest_page.clone(),
            top_50_words: words,
            subdomains,
        }
    }
}

/// Thread-safe analytics aggregator shared by all workers
pub struct Analytics {
    stats: Mutex<PageStats>,
    log: ActivityLog,
    domain_suffix: String,
    report_path: PathBuf,
    text_report_path: PathBuf,
}

impl Analytics {
    /// Creates an empty aggregator and starts a fresh activity log
    pub fn new(config: &AnalyticsConfig) -> Self {
        Self {
            stats: Mutex::new(PageStats::default()),
            log: ActivityLog::create(Path::new(&config.log_path)),
            domain_suffix: config.domain_suffix.to_ascii_lowercase(),
            report_path: PathBuf::from(&config.report_path),
            text_report_path: PathBuf::from(&config.text_report_path),
        }
    }

    fn stats(&self) -> MutexGuard<'_, PageStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Folds one downloaded page into the statistics
    ///
    /// The document is stripped of non-content markup in place, so links must
    /// be extracted before calling this.
    ///
    /// # Returns
    ///
    /// `true` if the page had enough text to be counted, `false` if it was
    /// discarded.
    pub fn record(&self, url: &str, document: &mut Document) -> bool {
        let clean_url = defragment(url);

        let tokens = tokenize(&visible_text(document));
        if tokens.len() < MIN_PAGE_TOKENS {
            debug!(
                "Skipping analytics for {}: only {} tokens",
                clean_url,
                tokens.len()
            );
            return false;
        }

        let hostname = Url::parse(clean_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
            .unwrap_or_default();

        let word_count = tokens.len();
        let page_frequencies = word_frequencies(&tokens);

        let page_count = {
            let mut stats = self.stats();

            stats.unique_pages.insert(clean_url.to_string());

            if matches_suffix(&self.domain_suffix, &hostname) {
                stats
                    .subdomain_pages
                    .entry(hostname.clone())
                    .or_default()
                    .insert(clean_url.to_string());
            }

            if word_count > stats.longest_page.word_count {
                stats.longest_page = LongestPage {
                    url: clean_url.to_string(),
                    word_count,
                };
            }

            for (word, count) in page_frequencies {
                *stats.word_frequency.entry(word).or_insert(0) += count.min(PER_PAGE_WORD_CAP);
            }

            stats.unique_pages.len()
        };

        self.log.page(page_count, word_count, &hostname, clean_url);
        true
    }

    /// Takes a consistent copy of the current statistics
    pub fn snapshot(&self) -> Report {
        self.stats().report()
    }

    /// Writes the JSON report and text mirror, then prints the summary
    ///
    /// Each call overwrites the previous reports.
    ///
    /// # Errors
    ///
    /// Returns a `ReportError` if either report cannot be serialized or written.
    pub fn flush(&self) -> ReportResult<()> {
        let report = self.snapshot();

        write_json_report(&report, &self.report_path)?;
        write_text_report(&report, &self.text_report_path)?;
        print!("{}", format_console_summary(&report));

        info!(
            "Wrote analytics for {} pages to {} and {}",
            report.unique_pages_count,
            self.report_path.display(),
            self.text_report_path.display()
        );
        Ok(())
    }
}
