//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a fixed politeness delay
//! - HTML parsing and reference extraction
//! - The bounded-concurrency crawl engine
//! - The deferred retry pass

mod engine;
mod fetcher;
mod parser;
mod retry;

pub use engine::{CrawlOutcome, Crawler, TraversalStats};
pub use fetcher::{build_http_client, fetch_url, FetchResult, Fetcher};
pub use parser::{extract_references, ExtractedRefs};
pub use retry::RetryStats;

use crate::config::Config;
use crate::Result;

/// Runs a complete crawl operation
///
/// This is the main entry point for a crawl. It will:
/// 1. Validate the configuration and build the HTTP client
/// 2. Crawl everything reachable from the root on the same domain
/// 3. Wait out the cooldown and retry deferred URLs once
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - The sitemap, remaining deferred URLs, the domain and a report
/// * `Err(AtlasError)` - The configuration was invalid; nothing was fetched
pub async fn crawl(config: Config) -> Result<CrawlOutcome> {
    let crawler = Crawler::new(config)?;
    Ok(crawler.run().await)
}
