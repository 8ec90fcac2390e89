use serde::Deserialize;

/// Tunable marker lists and limits used by the trap detector
///
/// Every field has a default, so a `[traps]` section only needs to name
/// the lists it replaces.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrapRules {
    /// Substrings of the lower-cased query that mark a generated page
    #[serde(rename = "query-markers")]
    pub query_markers: Vec<String>,

    /// Substrings of the lower-cased path that mark API or upload areas
    #[serde(rename = "path-markers")]
    pub path_markers: Vec<String>,

    /// Substrings of the hostname that are never crawled
    #[serde(rename = "host-denylist")]
    pub host_denylist: Vec<String>,

    /// File extensions (without the dot) that never hold HTML
    #[serde(rename = "non-html-extensions")]
    pub non_html_extensions: Vec<String>,

    /// Path fragments that signal a recursion loop when seen twice
    #[serde(rename = "loop-segments")]
    pub loop_segments: Vec<String>,

    /// Substrings of the lower-cased URL for login and action pages
    #[serde(rename = "login-markers")]
    pub login_markers: Vec<String>,

    #[serde(rename = "max-url-length")]
    pub max_url_length: usize,

    #[serde(rename = "max-path-segments")]
    pub max_path_segments: usize,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for TrapRules {
    fn default() -> Self {
        Self {
            query_markers: strings(&[
                // comment and share permalinks
                "replytocom=",
                "share=",
                // metadata endpoints
                "oembed",
                "format=xml",
                // wiki actions
                "do=media",
                "tab_files=",
                "tab_details=",
                "do=revisions",
                "do=backlink",
                "do=recent",
                "do=index",
                // faceted filters
                "filter%5b",
                "filter[",
            ]),
            path_markers: strings(&["/wp-json/", "/wp-content/uploads/"]),
            host_denylist: strings(&["gitlab"]),
            non_html_extensions: strings(&[
                "css", "js", "bmp", "gif", "jpg", "jpeg", "ico", "png", "tif", "tiff",
                "mid", "mp2", "mp3", "mp4", "wav", "avi", "mov", "mpeg", "ram", "m4v",
                "mkv", "ogg", "ogv", "pdf", "ps", "eps", "tex", "ppt", "pptx", "doc",
                "docx", "xls", "xlsx", "zip", "rar", "gz", "bz2", "tar", "7z", "tgz",
                "exe", "msi", "bin", "dll", "dmg", "iso", "apk", "c", "cc", "cpp", "h",
                "hpp", "java", "py", "r", "m", "mat", "o", "names", "data", "dat", "psd",
                "epub", "cnf", "sha1", "thmx", "mso", "arff", "rtf", "jar", "csv", "rm",
                "smil", "wmv", "swf", "wma", "img", "sql", "ppsx", "odc", "war", "db",
                "lif",
            ]),
            loop_segments: strings(&["seminar-series"]),
            login_markers: strings(&["login", "logout", "wp-admin", "wp-login", "action="]),
            max_url_length: 200,
            max_path_segments: 10,
        }
    }
}
