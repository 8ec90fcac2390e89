//! Visible-text extraction and tokenization
//!
//! Strips non-content markup from a page, narrows it to the main content
//! region and turns what remains into lower-case ASCII tokens.

use crate::crawler::Document;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;
use std::collections::{HashMap, HashSet};

/// Pages with fewer tokens than this are ignored entirely
pub const MIN_PAGE_TOKENS: usize = 50;

/// Largest amount a single page adds to any word's global count
pub const PER_PAGE_WORD_CAP: usize = 10;

const MIN_WORD_LEN: usize = 2;
const MAX_WORD_LEN: usize = 30;

static NON_CONTENT: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("script, style, noscript, svg, iframe, form, meta, link")
        .expect("Invalid non-content selector")
});

// Tried in order; the first match is the content region
static CONTENT_REGIONS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "main",
        "article",
        "#content",
        "#main",
        ".content",
        ".entry-content",
        ".post-content",
        ".page-content",
        ".site-content",
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("Invalid content region selector"))
    .collect()
});

static BOILERPLATE_TAGS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("header, footer, nav, aside").expect("Invalid boilerplate selector")
});

static BOILERPLATE_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(menu|nav|footer|header|sidebar|breadcrumb|cookie|popup)")
        .expect("Invalid boilerplate attribute regex")
});

// English stopwords from https://www.ranks.nl/stopwords
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any",
        "are", "aren't", "as", "at", "be", "because", "been", "before", "being", "below",
        "between", "both", "but", "by", "can't", "cannot", "could", "couldn't", "did",
        "didn't", "do", "does", "doesn't", "doing", "don't", "down", "during", "each", "few",
        "for", "from", "further", "had", "hadn't", "has", "hasn't", "have", "haven't",
        "having", "he", "he'd", "he'll", "he's", "her", "here", "here's", "hers", "herself",
        "him", "himself", "his", "how", "how's", "i", "i'd", "i'll", "i'm", "i've", "if", "in",
        "into", "is", "isn't", "it", "it's", "its", "itself", "let's", "me", "more", "most",
        "mustn't", "my", "myself", "no", "nor", "not", "of", "off", "on", "once", "only", "or",
        "other", "ought", "our", "ours", "ourselves", "out", "over", "own", "same", "shan't",
        "she", "she'd", "she'll", "she's", "should", "shouldn't", "so", "some", "such", "than",
        "that", "that's", "the", "their", "theirs", "them", "themselves", "then", "there",
        "there's", "these", "they", "they'd", "they'll", "they're", "they've", "this",
        "those", "through", "to", "too", "under", "until", "up", "very", "was", "wasn't", "we",
        "we'd", "we'll", "we're", "we've", "were", "weren't", "what", "what's", "when",
        "when's", "where", "where's", "which", "while", "who", "who's", "whom", "why", "why's",
        "with", "won't", "would", "wouldn't", "you", "you'd", "you'll", "you're", "you've",
        "your", "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

// Markup and URL artifacts that survive text extraction
static JUNK_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "html", "update", "automatic", "markdown", "rmd", "git", "file", "files", "store", "ds",
        "href", "https", "http", "www", "nbsp", "amp", "quot", "lt", "gt",
    ]
    .into_iter()
    .collect()
});

/// Extracts the main visible text of a page
///
/// # Steps
///
/// 1. Remove scripts, styles, embedded media, forms and metadata
/// 2. Pick the first content region (`main`, `article`, `#content`, ...),
///    falling back to `<body>`
/// 3. Inside it, remove header/footer/nav/aside and elements whose class
///    or id looks like navigation chrome
/// 4. Collapse whitespace
///
/// The document is modified in place.
pub fn visible_text(document: &mut Document) -> String {
    document.remove(&NON_CONTENT);

    let region = CONTENT_REGIONS
        .iter()
        .find_map(|selector| document.select_first(selector))
        .unwrap_or_else(|| document.body_or_root());

    document.remove_within(region, &BOILERPLATE_TAGS);
    document.remove_where(region, |el| {
        let value = el.value();
        value
            .attr("class")
            .map_or(false, |c| BOILERPLATE_ATTR.is_match(c))
            || value.id().map_or(false, |id| BOILERPLATE_ATTR.is_match(id))
    });

    document.text_of(region)
}

/// Splits text into maximal runs of ASCII alphanumerics, lower-cased
///
/// # Examples
///
/// ```
/// use ics_crawler::analytics::tokenize;
///
/// assert_eq!(tokenize("Hello, World! CS-121"), vec!["hello", "world", "cs", "121"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
        .collect()
}

/// Counts the tokens that are worth reporting
///
/// Drops tokens outside 2..=30 characters, stopwords and markup junk.
pub fn word_frequencies(tokens: &[String]) -> HashMap<String, usize> {
    let mut frequencies = HashMap::new();
    for token in tokens {
        if is_reportable(token) {
            *frequencies.entry(token.clone()).or_insert(0) += 1;
        }
    }
    frequencies
}

fn is_reportable(token: &str) -> bool {
    (MIN_WORD_LEN..=MAX_WORD_LEN).contains(&token.len())
        && !STOP_WORDS.contains(token)
        && !JUNK_WORDS.contains(token)
}
