//! URL handling module
//!
//! This module provides URL normalization, authority extraction, domain
//! suffix matching and the stable URL hash used as the frontier store key.

mod domain;
mod matcher;
mod normalize;

use sha2::{Digest, Sha256};

// Re-export main functions
pub use domain::{defragment, extract_authority, extract_hostname};
pub use matcher::matches_suffix;
pub use normalize::normalize_url;

/// Computes the stable key of a normalized URL: hex-encoded SHA-256
///
/// # Examples
///
/// ```
/// use ics_crawler::url::url_hash;
///
/// let hash = url_hash("https://www.ics.uci.edu/");
/// assert_eq!(hash.len(), 64);
/// assert_eq!(hash, url_hash("https://www.ics.uci.edu/"));
/// ```
pub fn url_hash(normalized_url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized_url.as_bytes());
    hex::encode(hasher.finalize())
}
