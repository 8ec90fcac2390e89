//! Final crawl report generation
//!
//! A `Report` is a point-in-time copy of the aggregated page statistics. It is
//! written twice on every flush: as pretty-printed JSON for tooling and as a
//! plain-text mirror for people.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Number of words listed in a report
pub const TOP_WORDS: usize = 50;

/// Errors that can occur while writing reports
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for report operations
pub type ReportResult<T> = std::result::Result<T, ReportError>;

/// The page with the most tokens seen so far
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LongestPage {
    pub url: String,
    pub word_count: usize,
}

/// Aggregated crawl analytics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub unique_pages_count: usize,
    pub longest_page: LongestPage,

    /// Most frequent words, count descending then word ascending
    pub top_50_words: Vec<(String, usize)>,

    /// Unique page count per subdomain, alphabetical
    pub subdomains: BTreeMap<String, usize>,
}

/// Writes the report as pretty-printed JSON
pub fn write_json_report(report: &Report, output_path: &Path) -> ReportResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    write_file(output_path, json.as_bytes())
}

/// Writes the plain-text mirror of the report
pub fn write_text_report(report: &Report, output_path: &Path) -> ReportResult<()> {
    write_file(output_path, format_text_report(report).as_bytes())
}

fn write_file(path: &Path, contents: &[u8]) -> ReportResult<()> {
    let to_error = |source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(path).map_err(to_error)?;
    file.write_all(contents).map_err(to_error)?;
    file.flush().map_err(to_error)
}

/// Formats the report as the plain-text mirror
pub fn format_text_report(report: &Report) -> String {
    let mut text = String::new();

    text.push_str(&format!("Unique pages: {}\n", report.unique_pages_count));
    text.push_str(&format!("Longest page: {}\n", report.longest_page.url));
    text.push_str(&format!(
        "Longest page word count: {}\n\n",
        report.longest_page.word_count
    ));

    text.push_str("Top 50 words (stopwords removed):\n");
    for (word, count) in &report.top_50_words {
        text.push_str(&format!("{}\t{}\n", word, count));
    }

    text.push_str("\nSubdomains (alphabetical) with unique page counts:\n");
    for (subdomain, count) in &report.subdomains {
        text.push_str(&format!("{}, {}\n", subdomain, count));
    }

    text
}

/// Formats the summary printed to the console when the crawl ends
pub fn format_console_summary(report: &Report) -> String {
    let rule = "=".repeat(50);
    let mut text = String::new();

    text.push_str(&format!("\n{}\nFINAL CRAWL ANALYTICS\n{}\n", rule, rule));
    text.push_str(&format!("Unique pages: {}\n", report.unique_pages_count));
    text.push_str(&format!("Longest page: {}\n", report.longest_page.url));
    text.push_str(&format!(
        "Longest page word count: {}\n",
        report.longest_page.word_count
    ));

    text.push_str("\nTop 50 words (stopwords removed):\n");
    for (word, count) in &report.top_50_words {
        text.push_str(&format!("  {}\t{}\n", word, count));
    }

    text.push_str(&format!(
        "\nSubdomains ({} total, alphabetical):\n",
        report.subdomains.len()
    ));
    for (subdomain, count) in &report.subdomains {
        text.push_str(&format!("  {}, {}\n", subdomain, count));
    }

    text
}
