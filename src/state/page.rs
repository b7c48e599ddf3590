//! Page records and the sitemap they are collected into

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Everything recorded about one successfully fetched URL
///
/// A page is built once, right after its fetch, and never changes afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Absolute URLs of static assets referenced by the page (any domain)
    pub assets: BTreeSet<String>,

    /// Absolute URLs of same-domain pages this page links to
    pub links: BTreeSet<String>,

    /// URL of the page this one was discovered from; empty for the root
    pub parent: String,
}

impl Page {
    pub fn new(assets: BTreeSet<String>, links: BTreeSet<String>, parent: impl Into<String>) -> Self {
        Self {
            assets,
            links,
            parent: parent.into(),
        }
    }

    /// Returns true if this page was the crawl root
    pub fn is_root(&self) -> bool {
        self.parent.is_empty()
    }
}

/// Crawled URL → page
pub type Sitemap = BTreeMap<String, Page>;

/// Deferred URL → parent URL
pub type Deferred = BTreeMap<String, String>;
