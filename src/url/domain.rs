use url::Url;

/// Extracts the network authority (`host[:port]`) used to key domain queues
///
/// The host is lower-cased and the port only appears when it is not the
/// scheme's default.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use ics_crawler::url::extract_authority;
///
/// let url = Url::parse("https://WWW.ICS.UCI.EDU/path").unwrap();
/// assert_eq!(extract_authority(&url), Some("www.ics.uci.edu".to_string()));
///
/// let url = Url::parse("http://localhost:8080/").unwrap();
/// assert_eq!(extract_authority(&url), Some("localhost:8080".to_string()));
/// ```
pub fn extract_authority(url: &Url) -> Option<String> {
    let host = extract_hostname(url)?;
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Extracts the lower-cased hostname of a URL, without any port
pub fn extract_hostname(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}

/// Removes the `#fragment` suffix from a URL string
pub fn defragment(url: &str) -> &str {
    match url.find('#') {
        Some(idx) => &url[..idx],
        None => url,
    }
}
