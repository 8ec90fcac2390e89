//! Integration tests for the crawler
//!
//! The deterministic tests drive the full worker pool with an in-process
//! `Fetcher`. The HTTP tests use wiremock to serve pages to the real
//! `HttpFetcher`.

use ics_crawler::analytics::Analytics;
use ics_crawler::config::{AnalyticsConfig, Config, CrawlerConfig, StorageConfig, UserAgentConfig};
use ics_crawler::crawler::{Crawler, FetchError, Fetcher, Frontier, HttpFetcher, Response};
use ics_crawler::traps::{TrapDetector, TrapRules};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::{tempdir, TempDir};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves canned HTML pages keyed by URL and records what was requested
struct MockFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    fn new(pages: &[(&str, String)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, body)| (url.to_string(), body.clone()))
                .collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Fetcher for MockFetcher {
    fn fetch(&self, url: &str) -> Result<Response, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        let body = self.pages.get(url).cloned().unwrap_or_default();
        let status = if self.pages.contains_key(url) { 200 } else { 404 };

        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "text/html; charset=utf-8".to_string());
        Ok(Response {
            status,
            url: url.to_string(),
            body: body.into_bytes(),
            headers,
        })
    }
}

/// Creates a test configuration whose files all live in `dir`
fn create_test_config(dir: &Path, seeds: Vec<String>, allowed: Vec<String>) -> Config {
    let file = |name: &str| dir.join(name).to_string_lossy().into_owned();
    Config {
        crawler: CrawlerConfig {
            threads_count: 1,
            politeness_delay: 10, // Very short for testing
            seed_urls: seeds,
            allowed_domains: allowed,
        },
        user_agent: UserAgentConfig {
            name: "IR UW25 TestBot".to_string(),
        },
        storage: StorageConfig {
            save_file: file("frontier.db"),
        },
        analytics: AnalyticsConfig {
            domain_suffix: "uci.edu".to_string(),
            report_path: file("report.json"),
            text_report_path: file("final_report_stats.txt"),
            log_path: file("crawl_log.txt"),
        },
        traps: TrapRules::default(),
    }
}

fn ics_config() -> (Config, TempDir) {
    let dir = tempdir().unwrap();
    let config = create_test_config(
        dir.path(),
        vec!["https://www.ics.uci.edu/".to_string()],
        vec![".ics.uci.edu".to_string()],
    );
    (config, dir)
}

fn paragraph(words: usize) -> String {
    vec!["informatics research"; words / 2].join(" ")
}

#[test]
fn test_end_to_end_with_trapped_link() {
    let (config, _dir) = ics_config();

    let fetcher = Arc::new(MockFetcher::new(&[
        (
            "https://www.ics.uci.edu/",
            format!(
                r#"<html><body><main><p>{}</p>
                <a href="/about">About</a>
                <a href="https://vision.ics.uci.edu/people/">People</a>
                <a href="/events/calendar/2024-05/">Calendar</a>
                </main></body></html>"#,
                paragraph(60)
            ),
        ),
        ("https://www.ics.uci.edu/about", "<p>about</p>".to_string()),
        ("https://vision.ics.uci.edu/people", "<p>people</p>".to_string()),
    ]));

    let analytics = Arc::new(Analytics::new(&config.analytics));
    let crawler =
        Crawler::from_config(&config, false, fetcher.clone(), Some(Arc::clone(&analytics))).unwrap();
    crawler.start().unwrap();

    let frontier = crawler.frontier();
    assert!(!frontier.has_pending_work());
    assert_eq!(frontier.in_flight(), 0);
    assert!(frontier.is_completed("https://www.ics.uci.edu/").unwrap());
    assert!(frontier.is_completed("https://www.ics.uci.edu/about").unwrap());
    assert!(frontier.is_completed("https://vision.ics.uci.edu/people/").unwrap());
    assert!(!frontier
        .contains("https://www.ics.uci.edu/events/calendar/2024-05/")
        .unwrap());
    assert_eq!(frontier.discovered_count().unwrap(), 3);
    assert_eq!(fetcher.requests().len(), 3);

    // only the seed page has enough text to count
    let report = analytics.snapshot();
    assert_eq!(report.unique_pages_count, 1);
    assert_eq!(report.longest_page.url, "https://www.ics.uci.edu/");
    assert_eq!(report.subdomains.get("www.ics.uci.edu"), Some(&1));
}

#[test]
fn test_not_found_pages_complete_without_links() {
    let (config, _dir) = ics_config();

    let fetcher = Arc::new(MockFetcher::new(&[(
        "https://www.ics.uci.edu/",
        r#"<a href="/missing">gone</a>"#.to_string(),
    )]));

    let crawler = Crawler::from_config(&config, false, fetcher.clone(), None).unwrap();
    crawler.start().unwrap();

    let frontier = crawler.frontier();
    assert!(frontier.is_completed("https://www.ics.uci.edu/missing").unwrap());
    assert_eq!(frontier.completed_count().unwrap(), 2);
    assert!(!frontier.has_pending_work());
}

#[test]
fn test_many_workers_share_frontier() {
    let (mut config, _dir) = ics_config();
    config.crawler.threads_count = 8;
    config.crawler.politeness_delay = 0;

    let hosts = ["www", "vision", "cml", "sdcl", "mondego"];
    let seed_links: String = hosts
        .iter()
        .flat_map(|host| {
            (0..5).map(move |i| format!(r#"<a href="https://{}.ics.uci.edu/p{}">x</a>"#, host, i))
        })
        .collect();

    let fetcher = Arc::new(MockFetcher::new(&[("https://www.ics.uci.edu/", seed_links)]));
    let crawler = Crawler::from_config(&config, false, fetcher.clone(), None).unwrap();
    crawler.start().unwrap();

    let frontier = crawler.frontier();
    assert_eq!(frontier.discovered_count().unwrap(), 26);
    assert_eq!(frontier.completed_count().unwrap(), 26);

    // every URL is downloaded exactly once
    let mut requests = fetcher.requests();
    assert_eq!(requests.len(), 26);
    requests.sort();
    requests.dedup();
    assert_eq!(requests.len(), 26);
}

#[test]
fn test_resume_replays_incomplete_urls() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("frontier.db");
    let detector = TrapDetector::new(vec![".ics.uci.edu".to_string()], TrapRules::default());
    let seeds = vec!["https://www.ics.uci.edu/".to_string()];

    {
        let frontier =
            Frontier::initialize(&seeds, &store, false, Duration::ZERO, &detector).unwrap();
        let seed = frontier.get_next_url().unwrap();
        frontier.add_url("https://www.ics.uci.edu/a").unwrap();
        frontier.add_url("https://www.ics.uci.edu/b").unwrap();
        frontier.add_url("https://cml.ics.uci.edu/").unwrap();
        frontier.mark_complete(&seed).unwrap();

        let next = frontier.get_next_url().unwrap();
        assert_eq!(next, "https://www.ics.uci.edu/a");
        frontier.mark_complete(&next).unwrap();
        // process stops here with b and cml still queued
    }

    let frontier = Frontier::initialize(&seeds, &store, false, Duration::ZERO, &detector).unwrap();
    assert_eq!(frontier.pending_count(), 2);
    assert_eq!(frontier.discovered_count().unwrap(), 4);
    assert_eq!(frontier.completed_count().unwrap(), 2);

    let mut resumed = Vec::new();
    while let Some(url) = frontier.get_next_url() {
        resumed.push(url.clone());
        frontier.mark_complete(&url).unwrap();
    }
    resumed.sort();
    assert_eq!(
        resumed,
        vec!["https://cml.ics.uci.edu/", "https://www.ics.uci.edu/b"]
    );
    assert!(!frontier.has_pending_work());
}

#[test]
fn test_resume_skips_urls_now_trapped() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("frontier.db");
    let seeds = vec!["https://www.ics.uci.edu/".to_string()];

    let permissive = TrapDetector::new(vec![".uci.edu".to_string()], TrapRules::default());
    {
        let frontier =
            Frontier::initialize(&seeds, &store, false, Duration::ZERO, &permissive).unwrap();
        frontier.add_url("https://www.stat.uci.edu/").unwrap();
    }

    let strict = TrapDetector::new(vec![".ics.uci.edu".to_string()], TrapRules::default());
    let frontier = Frontier::initialize(&seeds, &store, false, Duration::ZERO, &strict).unwrap();

    assert_eq!(frontier.pending_count(), 1);
    assert_eq!(frontier.get_next_url().unwrap(), "https://www.ics.uci.edu/");
    // the record itself is kept
    assert!(frontier.contains("https://www.stat.uci.edu/").unwrap());
}

#[test]
fn test_restart_discards_save_file() {
    let (config, _dir) = ics_config();
    let store = Path::new(&config.storage.save_file);
    let detector = TrapDetector::new(
        config.crawler.allowed_domains.clone(),
        TrapRules::default(),
    );

    {
        let frontier = Frontier::initialize(
            &config.crawler.seed_urls,
            store,
            false,
            Duration::ZERO,
            &detector,
        )
        .unwrap();
        frontier.add_url("https://www.ics.uci.edu/old").unwrap();
    }

    let frontier = Frontier::initialize(
        &config.crawler.seed_urls,
        store,
        true,
        Duration::ZERO,
        &detector,
    )
    .unwrap();
    assert_eq!(frontier.discovered_count().unwrap(), 1);
    assert!(!frontier.contains("https://www.ics.uci.edu/old").unwrap());
}

#[test]
fn test_corrupt_save_file_falls_back_to_seeds() {
    let (config, _dir) = ics_config();
    std::fs::write(
        &config.storage.save_file,
        "definitely not a sqlite database, but long enough to look like one",
    )
    .unwrap();

    let fetcher = Arc::new(MockFetcher::new(&[(
        "https://www.ics.uci.edu/",
        "<html><body>home</body></html>".to_string(),
    )]));
    let crawler = Crawler::from_config(&config, false, fetcher.clone(), None).unwrap();

    let frontier = crawler.frontier();
    assert_eq!(frontier.discovered_count().unwrap(), 1);
    assert_eq!(frontier.pending_count(), 1);

    crawler.start().unwrap();
    assert!(frontier.is_completed("https://www.ics.uci.edu/").unwrap());
    assert_eq!(fetcher.requests(), vec!["https://www.ics.uci.edu/"]);
}

#[test]
fn test_resume_skips_corrupt_records() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("frontier.db");
    let detector = TrapDetector::new(vec![".ics.uci.edu".to_string()], TrapRules::default());
    let seeds = vec!["https://www.ics.uci.edu/".to_string()];

    {
        let frontier =
            Frontier::initialize(&seeds, &store, false, Duration::ZERO, &detector).unwrap();
        frontier.add_url("https://www.ics.uci.edu/a").unwrap();
    }

    {
        let conn = rusqlite::Connection::open(&store).unwrap();
        conn.execute(
            "INSERT INTO urls (hash, url, completed) VALUES ('broken', 'https://www.ics.uci.edu/z', 7)",
            [],
        )
        .unwrap();
    }

    let frontier = Frontier::initialize(&seeds, &store, false, Duration::ZERO, &detector).unwrap();
    assert_eq!(frontier.pending_count(), 2);
    assert!(frontier.contains("https://www.ics.uci.edu/a").unwrap());
}

#[test]
fn test_resume_with_only_corrupt_records_seeds() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("frontier.db");
    let detector = TrapDetector::new(vec![".ics.uci.edu".to_string()], TrapRules::default());
    let seeds = vec!["https://www.ics.uci.edu/".to_string()];

    {
        Frontier::initialize(&[], &store, false, Duration::ZERO, &detector).unwrap();
        let conn = rusqlite::Connection::open(&store).unwrap();
        conn.execute(
            "INSERT INTO urls (hash, url, completed) VALUES ('broken', 'https://www.ics.uci.edu/z', 'yes')",
            [],
        )
        .unwrap();
    }

    let frontier = Frontier::initialize(&seeds, &store, false, Duration::ZERO, &detector).unwrap();
    assert_eq!(frontier.pending_count(), 1);
    assert_eq!(
        frontier.get_next_url().as_deref(),
        Some("https://www.ics.uci.edu/")
    );
}

#[tokio::test]
async fn test_full_crawl_over_http() {
    // Start a mock server
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let words = paragraph(80);
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    format!(
                        r#"<html><body><article><p>{}</p>
                        <a href="/page1">Page 1</a>
                        <a href="{}/page2#section">Page 2</a>
                        <a href="/wp-login.php">Login</a>
                        </article></body></html>"#,
                        words, base_url
                    ),
                    "text/html",
                ),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<html><body><a href="/">Home</a></body></html>"#, "text/html"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"just text, <a href="/page3">not html</a>"#, "text/plain"),
        )
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let config = create_test_config(
        dir.path(),
        vec![format!("{}/", base_url)],
        vec!["127.0.0.1".to_string()],
    );

    let report_path = config.analytics.report_path.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let analytics = Arc::new(Analytics::new(&config.analytics));
        let fetcher = HttpFetcher::new(&config.user_agent).unwrap();
        let crawler =
            Crawler::from_config(&config, false, Arc::new(fetcher), Some(Arc::clone(&analytics)))
                .unwrap();
        crawler.start().unwrap();
        analytics.flush().unwrap();

        let frontier = crawler.frontier();
        (
            frontier.discovered_count().unwrap(),
            frontier.completed_count().unwrap(),
            frontier.has_pending_work(),
        )
    })
    .await
    .unwrap();

    // seed, page1, page2; the login link is trapped and page3 is never seen
    assert_eq!(outcome, (3, 3, false));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(report_path).unwrap()).unwrap();
    assert_eq!(report["unique_pages_count"], 1);
    // the paragraph plus the anchor texts "Page 1", "Page 2" and "Login"
    assert_eq!(report["longest_page"]["word_count"], 85);
    // 127.0.0.1 is not under uci.edu
    assert!(report["subdomains"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn test_http_fetcher_reports_final_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new/"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<a href='child'>c</a>", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let base_url = mock_server.uri();
    let response = tokio::task::spawn_blocking(move || {
        let fetcher = HttpFetcher::new(&UserAgentConfig {
            name: "IR UW25 TestBot".to_string(),
        })
        .unwrap();
        fetcher.fetch(&format!("{}/old", base_url))
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.url, format!("{}/new/", mock_server.uri()));
    assert!(response.is_html());

    let links = ics_crawler::crawler::extract(&response, &response.url, None);
    assert_eq!(links, vec![format!("{}/new/child", mock_server.uri())]);
}

#[tokio::test]
async fn test_http_fetcher_sends_user_agent() {
    use wiremock::matchers::header;

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "IR UW25 TestBot"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/", mock_server.uri());
    let status = tokio::task::spawn_blocking(move || {
        let fetcher = HttpFetcher::new(&UserAgentConfig {
            name: "IR UW25 TestBot".to_string(),
        })
        .unwrap();
        fetcher.fetch(&url).map(|r| r.status)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_http_fetcher_connection_error() {
    // bind a port, then free it so nothing is listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);

    let result = tokio::task::spawn_blocking(move || {
        let fetcher = HttpFetcher::new(&UserAgentConfig {
            name: "IR UW25 TestBot".to_string(),
        })
        .unwrap();
        fetcher.fetch(&url)
    })
    .await
    .unwrap();

    assert!(matches!(result, Err(FetchError::Connect { .. })));
}
