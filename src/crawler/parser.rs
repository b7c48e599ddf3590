//! HTML reference extraction
//!
//! This module walks a fetched document once, in document order, and sorts
//! every URL-bearing attribute into one of two buckets:
//! - assets: resources the page loads (scripts, images, media, stylesheets)
//! - links: other pages on the crawl's domain

use crate::url::{normalize, same_domain};
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;

/// References extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedRefs {
    /// Absolute asset URLs, on any domain
    pub assets: BTreeSet<String>,

    /// Absolute page URLs on the crawl's domain
    pub links: BTreeSet<String>,
}

/// Extracts asset references and same-domain links from an HTML document
///
/// # Extraction Rules
///
/// **Assets** (no domain filter):
/// - `src` on any element (`<script>`, `<img>`, `<iframe>`, `<source>` …)
/// - `poster` on `<video>`
/// - `data` on `<object>`
/// - `href` on `<link>` (stylesheets, icons, preloads)
///
/// **Links** (kept only when on the same domain as `root`):
/// - `href` on every other element (`<a>`, `<area>` …)
///
/// Relative references resolve against `page_url`. References that do not
/// normalize (malformed, `mailto:`, `javascript:` …) are skipped. The parser
/// recovers from broken markup, so truncated documents yield whatever was
/// found before the damage.
///
/// # Example
///
/// ```
/// use sumi_atlas::crawler::extract_references;
///
/// let html = r#"<img src="/logo.png"><a href="/about">About</a><a href="https://other.org/">x</a>"#;
/// let refs = extract_references(html, "https://example.com/", "https://example.com/");
/// assert!(refs.assets.contains("https://example.com/logo.png"));
/// assert!(refs.links.contains("https://example.com/about"));
/// assert_eq!(refs.links.len(), 1);
/// ```
pub fn extract_references(html: &str, page_url: &str, root: &str) -> ExtractedRefs {
    let document = Html::parse_document(html);
    let mut refs = ExtractedRefs::default();

    let selector = match Selector::parse("[src], [href], [poster], object[data]") {
        Ok(selector) => selector,
        Err(_) => return refs,
    };

    for element in document.select(&selector) {
        collect_element(element, page_url, root, &mut refs);
    }

    refs
}

fn collect_element(element: ElementRef<'_>, page_url: &str, root: &str, refs: &mut ExtractedRefs) {
    let value = element.value();

    for attr in ["src", "poster"] {
        if let Some(href) = value.attr(attr) {
            push_asset(href, page_url, &mut refs.assets);
        }
    }

    if value.name() == "object" {
        if let Some(href) = value.attr("data") {
            push_asset(href, page_url, &mut refs.assets);
        }
    }

    if let Some(href) = value.attr("href") {
        if value.name() == "link" {
            push_asset(href, page_url, &mut refs.assets);
        } else {
            match normalize(href, page_url) {
                Some(url) if same_domain(&url, root) => {
                    refs.links.insert(url);
                }
                Some(url) => tracing::trace!("Skipping off-domain link {}", url),
                None => tracing::trace!("Skipping unusable href {:?}", href),
            }
        }
    }
}

fn push_asset(href: &str, page_url: &str, assets: &mut BTreeSet<String>) {
    match normalize(href, page_url) {
        Some(url) => {
            assets.insert(url);
        }
        None => tracing::trace!("Skipping unusable asset reference {:?}", href),
    }
}
