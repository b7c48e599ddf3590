//! Run statistics
//!
//! A `CrawlReport` summarizes a finished run: what was indexed, what is still
//! deferred, and how the main and retry passes went.

use crate::crawler::{RetryStats, TraversalStats};
use crate::state::{Deferred, Sitemap};
use std::collections::BTreeSet;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Normalized root URL
    pub root: String,

    /// Pages in the final sitemap
    pub pages_indexed: usize,

    /// Same-domain links across all pages
    pub total_links: usize,

    /// Distinct asset URLs across all pages
    pub unique_assets: usize,

    /// URLs still deferred after the retry pass
    pub still_deferred: usize,

    pub main_pass: TraversalStats,

    pub retry: RetryStats,

    /// Wall-clock time of the whole run, cooldown included
    pub elapsed: Duration,
}

impl CrawlReport {
    pub fn new(
        root: &str,
        sitemap: &Sitemap,
        deferred: &Deferred,
        main_pass: TraversalStats,
        retry: RetryStats,
        elapsed: Duration,
    ) -> Self {
        let total_links = sitemap.values().map(|page| page.links.len()).sum();
        let unique_assets = sitemap
            .values()
            .flat_map(|page| page.assets.iter())
            .collect::<BTreeSet<_>>()
            .len();

        Self {
            root: root.to_string(),
            pages_indexed: sitemap.len(),
            total_links,
            unique_assets,
            still_deferred: deferred.len(),
            main_pass,
            retry,
            elapsed,
        }
    }

    /// Pages indexed per second of wall-clock time
    pub fn pages_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.pages_indexed as f64 / secs
        }
    }

    /// Logs the report at info level
    pub fn log(&self) {
        tracing::info!("=== Crawl Report for {} ===", self.root);
        tracing::info!(
            "Pages indexed: {} ({} links, {} unique assets)",
            self.pages_indexed,
            self.total_links,
            self.unique_assets
        );
        tracing::info!(
            "Main pass: {} indexed, {} failed, {} deferred while paused",
            self.main_pass.indexed,
            self.main_pass.failed,
            self.main_pass.skipped
        );
        if self.retry.attempted > 0 {
            tracing::info!(
                "Retry pass: {} of {} recovered, {} new pages",
                self.retry.recovered,
                self.retry.attempted,
                self.retry
                    .traversal
                    .indexed
                    .saturating_sub(self.retry.recovered)
            );
        }
        if self.still_deferred > 0 {
            tracing::warn!("{} URLs could not be crawled", self.still_deferred);
        }
        tracing::info!(
            "Finished in {:.2?} ({:.2} pages/sec)",
            self.elapsed,
            self.pages_per_second()
        );
    }
}
