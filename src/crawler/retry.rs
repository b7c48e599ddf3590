//! Deferred retry pass
//!
//! Once the main pass drains, every deferred URL gets exactly one more
//! attempt. Retries run one at a time on a single-permit pool so the pass
//! does not recreate the load that caused the failures. Each retry is a full
//! traversal: links first discovered from a recovered page are crawled too,
//! but anything that fails inside the pass stays deferred for good.

use super::engine::{Crawler, TraversalStats, Unit};
use crate::state::UrlState;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Counters for the retry pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryStats {
    /// Deferred URLs retried
    pub attempted: usize,
    /// Retried URLs that were indexed this time
    pub recovered: usize,
    /// Work done by the retry traversals, including newly found pages
    pub traversal: TraversalStats,
}

impl Crawler {
    /// Retries every URL deferred so far, one at a time
    ///
    /// The circuit breaker is re-armed before each URL, so every deferred URL
    /// is requested again even if the previous retry failed. Only the first
    /// call does any work; later calls return empty stats.
    pub async fn retry_deferred(&self) -> RetryStats {
        if !self.begin_retry() {
            tracing::warn!("Deferred URLs were already retried, skipping");
            return RetryStats::default();
        }

        let entries = self.state().deferred_entries();
        tracing::info!("Deferred urls: {}", entries.len());

        let permits = Arc::new(Semaphore::new(1));
        let mut stats = RetryStats::default();

        for (url, parent) in entries {
            // Skip anything a previous retry already indexed
            if self.state().url_state(&url) != UrlState::Deferred {
                continue;
            }

            self.state().resume();
            stats.attempted += 1;

            let unit = Unit {
                url: url.clone(),
                parent,
            };
            stats.traversal.merge(self.traverse(unit, permits.clone()).await);

            if self.state().url_state(&url) == UrlState::Indexed {
                tracing::info!("Recovered {} on retry", url);
                stats.recovered += 1;
            } else {
                tracing::warn!("Giving up on {}", url);
            }
        }

        tracing::info!(
            "Retry pass finished: {} of {} recovered",
            stats.recovered,
            stats.attempted
        );
        stats
    }
}
