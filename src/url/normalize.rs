use crate::UrlError;
use url::Url;

/// Canonicalizes a URL before it is hashed and queued
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or host-less
/// 2. Scheme and host are lower-cased and default ports dropped (by the parser)
/// 3. Dot segments are resolved (by the parser)
/// 4. Remove fragment (everything after #)
/// 5. Remove a trailing slash from the path, except for the root `/`
///
/// The query string is kept verbatim; the trap detector inspects it.
///
/// # Examples
///
/// ```
/// use ics_crawler::url::normalize_url;
///
/// let url = normalize_url("HTTPS://WWW.ICS.UCI.EDU:443/people/#staff").unwrap();
/// assert_eq!(url, "https://www.ics.uci.edu/people");
/// ```
pub fn normalize_url(url_str: &str) -> Result<String, UrlError> {
    let trimmed = url_str.trim();
    let mut url = Url::parse(trimmed).map_err(|e| UrlError::Parse {
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost(trimmed.to_string()));
    }

    url.set_fragment(None);

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let stripped = path.trim_end_matches('/');
        let stripped = if stripped.is_empty() { "/" } else { stripped };
        url.set_path(&stripped.to_string());
    }

    Ok(url.to_string())
}
