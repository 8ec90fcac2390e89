//! Crawler trap detection
//!
//! A [`TrapDetector`] decides whether a discovered link is worth crawling.
//! It is a pure predicate over the URL string: no network access and no
//! shared mutable state, so one instance is shared by every worker.

mod rules;

pub use rules::TrapRules;

use crate::url::matches_suffix;
use crate::UrlError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use url::Url;

// `cal` only counts as a whole segment
static DATE_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(calendar|date|event)|(^|/)cal(/|$)").expect("Invalid date keyword regex")
});

static DATE_STAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}[-/]\d{2}").expect("Invalid date stamp regex"));

// Apache directory listings: ?C=N;O=A
static SORT_PARAMS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[&;])(C|O)=").expect("Invalid sort parameter regex"));

/// Outcome of classifying a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Crawlable,
    Rejected(RejectReason),
}

/// Why a URL was kept out of the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    UnsupportedScheme(String),
    MissingHost,
    DomainNotAllowed(String),
    QueryMarker(String),
    Feed,
    XmlDocument,
    PathMarker(String),
    DeniedHost(String),
    NonHtmlExtension(String),
    DateArchive,
    RecursiveSegment(String),
    TooLong(usize),
    TooDeep(usize),
    RepeatedSegment(String),
    SortParameters,
    LoginOrAction(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::UnsupportedScheme(s) => write!(f, "unsupported scheme '{}'", s),
            RejectReason::MissingHost => write!(f, "missing host"),
            RejectReason::DomainNotAllowed(h) => write!(f, "host '{}' is not allowed", h),
            RejectReason::QueryMarker(m) => write!(f, "query contains '{}'", m),
            RejectReason::Feed => write!(f, "syndication feed"),
            RejectReason::XmlDocument => write!(f, "xml document"),
            RejectReason::PathMarker(m) => write!(f, "path contains '{}'", m),
            RejectReason::DeniedHost(m) => write!(f, "host contains '{}'", m),
            RejectReason::NonHtmlExtension(e) => write!(f, "non-html extension '.{}'", e),
            RejectReason::DateArchive => write!(f, "date archive"),
            RejectReason::RecursiveSegment(s) => write!(f, "'{}' repeats in path", s),
            RejectReason::TooLong(n) => write!(f, "url is {} characters long", n),
            RejectReason::TooDeep(n) => write!(f, "path has {} segments", n),
            RejectReason::RepeatedSegment(s) => write!(f, "segment '{}' repeats", s),
            RejectReason::SortParameters => write!(f, "directory listing sort parameters"),
            RejectReason::LoginOrAction(m) => write!(f, "login or action page ('{}')", m),
        }
    }
}

/// Rule-based filter that keeps the crawl space finite
///
/// Rules are applied in a fixed order and the first failing rule decides
/// the rejection reason:
///
/// 1. Scheme is http or https and a host is present
/// 2. Host equals or falls under an allowed domain suffix
/// 3. Query markers (comment permalinks, wiki actions, faceted filters)
/// 4. Feeds, XML documents and API/upload paths
/// 5. Denylisted hosts
/// 6. Non-HTML file extensions
/// 7. Calendar/date archives
/// 8. Recursive loop segments
/// 9. Overlong URLs
/// 10. Overly deep paths and repeated path segments
/// 11. Directory listing sort parameters
/// 12. Login and action pages
///
/// # Examples
///
/// ```
/// use ics_crawler::traps::{TrapDetector, TrapRules};
///
/// let detector = TrapDetector::new(vec![".ics.uci.edu".to_string()], TrapRules::default());
/// assert!(detector.is_crawlable("https://www.ics.uci.edu/people/").unwrap());
/// assert!(!detector.is_crawlable("https://www.ics.uci.edu/paper.pdf").unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct TrapDetector {
    allowed_domains: Vec<String>,
    rules: TrapRules,
    extensions: HashSet<String>,
}

impl TrapDetector {
    /// Creates a detector for the given allow-list and rule set
    pub fn new(allowed_domains: Vec<String>, rules: TrapRules) -> Self {
        let allowed_domains = allowed_domains
            .into_iter()
            .map(|d| d.trim().to_lowercase())
            .collect();
        let extensions = rules
            .non_html_extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();

        Self {
            allowed_domains,
            rules,
            extensions,
        }
    }

    /// Returns `Ok(true)` if the URL passes every rule
    ///
    /// Fails only when the input cannot be parsed as an absolute URL.
    pub fn is_crawlable(&self, url: &str) -> Result<bool, UrlError> {
        Ok(self.classify(url)? == Verdict::Crawlable)
    }

    /// Classifies a URL, naming the first rule it fails
    pub fn classify(&self, url: &str) -> Result<Verdict, UrlError> {
        let parsed = Url::parse(url).map_err(|e| UrlError::Parse {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(match self.first_violation(url, &parsed) {
            Some(reason) => Verdict::Rejected(reason),
            None => Verdict::Crawlable,
        })
    }

    fn first_violation(&self, raw: &str, parsed: &Url) -> Option<RejectReason> {
        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            return Some(RejectReason::UnsupportedScheme(scheme.to_string()));
        }

        let hostname = match parsed.host_str() {
            Some(h) if !h.is_empty() => h.to_lowercase(),
            _ => return Some(RejectReason::MissingHost),
        };

        if !self
            .allowed_domains
            .iter()
            .any(|suffix| matches_suffix(suffix, &hostname))
        {
            return Some(RejectReason::DomainNotAllowed(hostname));
        }

        let path = parsed.path();
        let path_lower = path.to_lowercase();
        let query = parsed.query().unwrap_or("");
        let query_lower = query.to_lowercase();

        if let Some(marker) = first_contained(&self.rules.query_markers, &query_lower) {
            return Some(RejectReason::QueryMarker(marker));
        }

        if path_lower.ends_with("/feed") || path_lower.contains("/feed/") {
            return Some(RejectReason::Feed);
        }
        if path_lower.ends_with(".xml") {
            return Some(RejectReason::XmlDocument);
        }
        if let Some(marker) = first_contained(&self.rules.path_markers, &path_lower) {
            return Some(RejectReason::PathMarker(marker));
        }

        if let Some(marker) = first_contained(&self.rules.host_denylist, &hostname) {
            return Some(RejectReason::DeniedHost(marker));
        }

        if let Some((_, ext)) = path_lower.rsplit_once('.') {
            if self.extensions.contains(ext) {
                return Some(RejectReason::NonHtmlExtension(ext.to_string()));
            }
        }

        if DATE_KEYWORD.is_match(&path_lower) && DATE_STAMP.is_match(path) {
            return Some(RejectReason::DateArchive);
        }

        for segment in &self.rules.loop_segments {
            if !segment.is_empty() && path_lower.matches(segment.as_str()).count() > 1 {
                return Some(RejectReason::RecursiveSegment(segment.clone()));
            }
        }

        if raw.len() > self.rules.max_url_length {
            return Some(RejectReason::TooLong(raw.len()));
        }

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() > self.rules.max_path_segments {
            return Some(RejectReason::TooDeep(segments.len()));
        }
        if let Some(repeated) = first_repeated(&segments) {
            return Some(RejectReason::RepeatedSegment(repeated.to_string()));
        }

        if SORT_PARAMS.is_match(query) {
            return Some(RejectReason::SortParameters);
        }

        let url_lower = raw.to_lowercase();
        if let Some(marker) = first_contained(&self.rules.login_markers, &url_lower) {
            return Some(RejectReason::LoginOrAction(marker));
        }

        None
    }
}

fn first_contained(markers: &[String], haystack: &str) -> Option<String> {
    markers
        .iter()
        .find(|m| !m.is_empty() && haystack.contains(m.to_lowercase().as_str()))
        .cloned()
}

fn first_repeated<'a>(segments: &[&'a str]) -> Option<&'a str> {
    let mut seen = HashSet::with_capacity(segments.len());
    segments.iter().copied().find(|s| !seen.insert(*s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> TrapDetector {
        TrapDetector::new(
            vec![
                ".ics.uci.edu".to_string(),
                ".cs.uci.edu".to_string(),
                ".informatics.uci.edu".to_string(),
                ".stat.uci.edu".to_string(),
            ],
            TrapRules::default(),
        )
    }

    fn rejected(url: &str) -> RejectReason {
        match detector().classify(url).unwrap() {
            Verdict::Rejected(reason) => reason,
            Verdict::Crawlable => panic!("expected {} to be rejected", url),
        }
    }

    #[test]
    fn test_accepts_regular_page() {
        let d = detector();
        assert!(d.is_crawlable("https://www.ics.uci.edu/people/").unwrap());
        assert!(d.is_crawlable("https://ics.uci.edu").unwrap());
        assert!(d.is_crawlable("http://vision.ics.uci.edu/papers/index.html").unwrap());
        assert!(d.is_crawlable("https://www.stat.uci.edu/?p=12").unwrap());
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert_eq!(
            rejected("ftp://www.ics.uci.edu/pub"),
            RejectReason::UnsupportedScheme("ftp".to_string())
        );
    }

    #[test]
    fn test_rejects_domains_outside_allow_list() {
        assert!(matches!(
            rejected("https://physics.uci.edu/"),
            RejectReason::DomainNotAllowed(_)
        ));
        assert!(matches!(
            rejected("https://www.google.com/"),
            RejectReason::DomainNotAllowed(_)
        ));
    }

    #[test]
    fn test_rejects_gitlab_hosts() {
        assert_eq!(
            rejected("http://x.gitlab.ics.uci.edu/foo"),
            RejectReason::DeniedHost("gitlab".to_string())
        );
    }

    #[test]
    fn test_rejects_non_html_extensions() {
        assert_eq!(
            rejected("https://x.ics.uci.edu/a.pdf"),
            RejectReason::NonHtmlExtension("pdf".to_string())
        );
        assert!(matches!(
            rejected("https://x.ics.uci.edu/files/archive.TAR.GZ"),
            RejectReason::NonHtmlExtension(_)
        ));
        assert!(detector()
            .is_crawlable("https://x.ics.uci.edu/v1.2/readme")
            .unwrap());
    }

    #[test]
    fn test_rejects_date_archives() {
        assert_eq!(
            rejected("https://x.ics.uci.edu/cal/2023-05/"),
            RejectReason::DateArchive
        );
        assert_eq!(
            rejected("https://www.ics.uci.edu/events/2021/03/talk"),
            RejectReason::DateArchive
        );
        // a date without a calendar keyword is fine
        assert!(detector()
            .is_crawlable("https://www.ics.uci.edu/news/2021-03")
            .unwrap());
        assert!(detector()
            .is_crawlable("https://www.ics.uci.edu/local/2021-03")
            .unwrap());
    }

    #[test]
    fn test_rejects_repeated_segments() {
        assert_eq!(
            rejected("https://x.ics.uci.edu/a/b/a/b"),
            RejectReason::RepeatedSegment("a".to_string())
        );
    }

    #[test]
    fn test_rejects_recursive_loop_segment() {
        assert!(matches!(
            rejected("https://www.ics.uci.edu/seminar-series/x/seminar-series-2020"),
            RejectReason::RecursiveSegment(_)
        ));
    }

    #[test]
    fn test_rejects_long_urls() {
        let url = format!("https://www.ics.uci.edu/{}", "a".repeat(226));
        assert_eq!(url.len(), 250);
        assert_eq!(rejected(&url), RejectReason::TooLong(250));
    }

    #[test]
    fn test_rejects_deep_paths() {
        assert_eq!(
            rejected("https://www.ics.uci.edu/1/2/3/4/5/6/7/8/9/10/11"),
            RejectReason::TooDeep(11)
        );
        assert!(detector()
            .is_crawlable("https://www.ics.uci.edu/1/2/3/4/5/6/7/8/9/10")
            .unwrap());
    }

    #[test]
    fn test_rejects_query_markers() {
        assert_eq!(
            rejected("https://x.ics.uci.edu/?do=media"),
            RejectReason::QueryMarker("do=media".to_string())
        );
        assert!(matches!(
            rejected("https://www.ics.uci.edu/post?replytocom=42"),
            RejectReason::QueryMarker(_)
        ));
        assert!(matches!(
            rejected("https://www.ics.uci.edu/list?FILTER%5Bcat%5D=1"),
            RejectReason::QueryMarker(_)
        ));
    }

    #[test]
    fn test_rejects_feeds_and_xml() {
        assert_eq!(rejected("https://www.ics.uci.edu/feed"), RejectReason::Feed);
        assert_eq!(
            rejected("https://www.ics.uci.edu/news/feed/atom"),
            RejectReason::Feed
        );
        assert_eq!(
            rejected("https://www.ics.uci.edu/sitemap.xml"),
            RejectReason::XmlDocument
        );
    }

    #[test]
    fn test_rejects_api_paths() {
        assert_eq!(
            rejected("https://www.ics.uci.edu/wp-json/wp/v2/posts"),
            RejectReason::PathMarker("/wp-json/".to_string())
        );
    }

    #[test]
    fn test_rejects_sort_parameters() {
        assert_eq!(
            rejected("https://www.ics.uci.edu/pub/?C=N;O=D"),
            RejectReason::SortParameters
        );
        assert_eq!(
            rejected("https://www.ics.uci.edu/pub/?x=1&O=A"),
            RejectReason::SortParameters
        );
    }

    #[test]
    fn test_rejects_login_and_action_pages() {
        assert_eq!(
            rejected("https://www.ics.uci.edu/wp-login.php"),
            RejectReason::LoginOrAction("login".to_string())
        );
        assert!(matches!(
            rejected("https://wiki.ics.uci.edu/page?action=edit"),
            RejectReason::LoginOrAction(_)
        ));
    }

    #[test]
    fn test_custom_rules() {
        let rules = TrapRules {
            host_denylist: vec!["github".to_string()],
            ..TrapRules::default()
        };
        let d = TrapDetector::new(vec!["ics.uci.edu".to_string()], rules);
        assert!(d.is_crawlable("https://gitlab.ics.uci.edu/").unwrap());
        assert!(!d.is_crawlable("https://github.ics.uci.edu/").unwrap());
    }

    #[test]
    fn test_malformed_url_is_an_error() {
        let result = detector().classify("/relative/path");
        assert!(matches!(result, Err(UrlError::Parse { .. })));
    }
}
