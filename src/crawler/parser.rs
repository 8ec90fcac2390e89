//! HTML document wrapper used for link extraction and text analytics
//!
//! Wraps a `scraper::Html` tree and adds the handful of operations the
//! crawler needs: subtree removal, selector lookup, anchor enumeration
//! and whitespace-normalized text.

use crate::url::defragment;
use ego_tree::NodeId;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("Invalid anchor selector"));

static BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("Invalid body selector"));

/// A parsed HTML page
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses raw response bytes; invalid UTF-8 is replaced, never rejected
    pub fn parse(bytes: &[u8]) -> Self {
        let source = String::from_utf8_lossy(bytes);
        Self {
            html: Html::parse_document(&source),
        }
    }

    /// Removes every element matching `selector` from the whole document
    ///
    /// Returns the number of subtrees detached.
    pub fn remove(&mut self, selector: &Selector) -> usize {
        let ids: Vec<NodeId> = self.html.select(selector).map(|el| el.id()).collect();
        self.detach_all(ids)
    }

    /// Removes elements under `scope` that match `selector`
    pub fn remove_within(&mut self, scope: NodeId, selector: &Selector) -> usize {
        let ids: Vec<NodeId> = match self.element(scope) {
            Some(el) => el.select(selector).map(|e| e.id()).collect(),
            None => return 0,
        };
        self.detach_all(ids)
    }

    /// Removes elements under `scope` for which `predicate` holds
    pub fn remove_where<F>(&mut self, scope: NodeId, predicate: F) -> usize
    where
        F: Fn(&ElementRef<'_>) -> bool,
    {
        let ids: Vec<NodeId> = match self.element(scope) {
            Some(el) => el
                .descendants()
                .skip(1)
                .filter_map(ElementRef::wrap)
                .filter(|e| predicate(e))
                .map(|e| e.id())
                .collect(),
            None => return 0,
        };
        self.detach_all(ids)
    }

    fn detach_all(&mut self, ids: Vec<NodeId>) -> usize {
        let mut removed = 0;
        for id in ids {
            if let Some(mut node) = self.html.tree.get_mut(id) {
                node.detach();
                removed += 1;
            }
        }
        removed
    }

    fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(id).and_then(ElementRef::wrap)
    }

    /// Finds the first element matching `selector`
    pub fn select_first(&self, selector: &Selector) -> Option<NodeId> {
        self.html.select(selector).next().map(|el| el.id())
    }

    /// The `<body>` element, or the document's root element without one
    pub fn body_or_root(&self) -> NodeId {
        self.select_first(&BODY_SELECTOR)
            .unwrap_or_else(|| self.html.root_element().id())
    }

    /// Enumerates outbound links as absolute, fragment-free URLs
    ///
    /// **Skipped:**
    /// - empty hrefs
    /// - `javascript:`, `mailto:`, `tel:` links
    /// - fragment-only links (same page anchors)
    /// - hrefs that cannot be resolved against `base`
    pub fn links(&self, base: &Url) -> Vec<String> {
        self.html
            .select(&ANCHOR_SELECTOR)
            .filter_map(|el| el.value().attr("href"))
            .filter_map(|href| resolve_link(href, base))
            .collect()
    }

    /// Whitespace-normalized text of the whole document
    pub fn text(&self) -> String {
        collapse_text(self.html.root_element())
    }

    /// Whitespace-normalized text under one element
    pub fn text_of(&self, id: NodeId) -> String {
        self.element(id).map(collapse_text).unwrap_or_default()
    }
}

fn collapse_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn resolve_link(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with('#')
    {
        return None;
    }

    let absolute = base.join(href).ok()?;
    Some(defragment(absolute.as_str()).to_string())
}
