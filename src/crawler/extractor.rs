//! Turns a downloaded response into outbound links and page analytics

use crate::analytics::Analytics;
use crate::crawler::fetcher::Response;
use crate::crawler::parser::Document;
use tracing::debug;
use url::Url;

/// Extracts the absolute, fragment-free links of an HTML response
///
/// Only a 200 response with a non-empty `text/html` body yields links;
/// anything else returns an empty list. Relative links resolve against the
/// final URL after redirects, falling back to `requested_url` if the final
/// URL cannot be parsed.
///
/// When `analytics` is given, the page is recorded after its links have
/// been read, since recording strips the document down to its content.
pub fn extract(
    response: &Response,
    requested_url: &str,
    analytics: Option<&Analytics>,
) -> Vec<String> {
    if !response.is_html() {
        debug!(
            "No links from {} (status {}, content type '{}')",
            requested_url,
            response.status,
            response.content_type()
        );
        return Vec::new();
    }

    let base = match Url::parse(&response.url).or_else(|_| Url::parse(requested_url)) {
        Ok(base) => base,
        Err(e) => {
            debug!("Cannot resolve links of {}: {}", requested_url, e);
            return Vec::new();
        }
    };

    let mut document = Document::parse(&response.body);
    let links = document.links(&base);

    if let Some(analytics) = analytics {
        analytics.record(base.as_str(), &mut document);
    }

    links
}
