/// A discovered URL and whether it has been downloaded
///
/// Records are keyed in the frontier store by the hash of `url`, which is
/// always in normalized form. They are created when a URL is first added
/// and only ever flipped to `completed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub url: String,
    pub completed: bool,
}

impl UrlRecord {
    /// Creates a record for a freshly discovered URL
    pub fn pending(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            completed: false,
        }
    }

    /// Creates a record for a downloaded URL
    pub fn completed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            completed: true,
        }
    }
}
