use crate::traps::TrapRules;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for the crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub traps: TrapRules,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of worker threads
    #[serde(rename = "threads-count")]
    pub threads_count: usize,

    /// Minimum time between requests to the same authority (milliseconds)
    #[serde(rename = "politeness-delay", default = "default_politeness_delay")]
    pub politeness_delay: u64,

    /// URLs the crawl starts from when there is nothing to resume
    #[serde(rename = "seed-urls")]
    pub seed_urls: Vec<String>,

    /// Domain suffixes the crawl is allowed to visit (e.g. ".ics.uci.edu")
    #[serde(rename = "allowed-domains")]
    pub allowed_domains: Vec<String>,
}

impl CrawlerConfig {
    /// Returns the politeness delay as a `Duration`
    pub fn politeness(&self) -> Duration {
        Duration::from_millis(self.politeness_delay)
    }
}

fn default_politeness_delay() -> u64 {
    500
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Value sent in the `User-Agent` header
    pub name: String,
}

/// Frontier persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite frontier store
    #[serde(rename = "save-file")]
    pub save_file: String,
}

/// Analytics output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Hostnames equal to or under this suffix are counted per subdomain
    #[serde(rename = "domain-suffix")]
    pub domain_suffix: String,

    /// Path of the machine-readable JSON report
    #[serde(rename = "report-path")]
    pub report_path: String,

    /// Path of the plain-text report mirror
    #[serde(rename = "text-report-path")]
    pub text_report_path: String,

    /// Path of the append-only activity log
    #[serde(rename = "log-path")]
    pub log_path: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            domain_suffix: "uci.edu".to_string(),
            report_path: "report.json".to_string(),
            text_report_path: "final_report_stats.txt".to_string(),
            log_path: "crawl_log.txt".to_string(),
        }
    }
}
