/// Checks if a hostname falls under an allowed domain suffix
///
/// The suffix may be written with or without a leading dot. A hostname
/// matches when it equals the bare suffix or ends with it on a label
/// boundary:
/// - ".ics.uci.edu" matches "ics.uci.edu"
/// - ".ics.uci.edu" matches "www.ics.uci.edu" and "a.b.ics.uci.edu"
/// - ".ics.uci.edu" does not match "physics.uci.edu"
///
/// Both arguments are expected to be lower-case already.
///
/// # Examples
///
/// ```
/// use ics_crawler::url::matches_suffix;
///
/// assert!(matches_suffix(".ics.uci.edu", "www.ics.uci.edu"));
/// assert!(matches_suffix(".ics.uci.edu", "ics.uci.edu"));
/// assert!(!matches_suffix(".ics.uci.edu", "physics.uci.edu"));
/// ```
pub fn matches_suffix(suffix: &str, hostname: &str) -> bool {
    let base = suffix.strip_prefix('.').unwrap_or(suffix);
    if base.is_empty() || hostname.is_empty() {
        return false;
    }

    hostname == base
        || (hostname.len() > base.len()
            && hostname.ends_with(base)
            && hostname.as_bytes()[hostname.len() - base.len() - 1] == b'.')
}
