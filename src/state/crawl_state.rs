//! Shared crawl state
//!
//! The sitemap, the deferred set, the in-flight set and the run flag live
//! together behind one mutex. Callers never see the raw maps while a crawl is
//! running; they go through the check-and-claim operations below, each of
//! which holds the lock for a single short critical section and never across
//! an `.await`.

use super::page::{Deferred, Page, Sitemap};
use super::url_state::UrlState;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct Inner {
    sitemap: Sitemap,
    deferred: Deferred,
    in_flight: HashSet<String>,
    running: bool,
}

impl Inner {
    fn state_of(&self, url: &str) -> UrlState {
        if self.sitemap.contains_key(url) {
            UrlState::Indexed
        } else if self.deferred.contains_key(url) {
            UrlState::Deferred
        } else if self.in_flight.contains(url) {
            UrlState::InFlight
        } else {
            UrlState::Unclaimed
        }
    }
}

/// Counts of URLs per state at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCounts {
    pub indexed: usize,
    pub deferred: usize,
    pub in_flight: usize,
}

/// Lock-guarded aggregate of everything the crawl units share
#[derive(Debug)]
pub struct CrawlState {
    inner: Mutex<Inner>,
}

impl Default for CrawlState {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlState {
    /// Creates empty state with the run flag set
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                sitemap: Sitemap::new(),
                deferred: Deferred::new(),
                in_flight: HashSet::new(),
                running: true,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicking unit must not wedge every other unit; the maps stay
        // consistent because each critical section only inserts or removes.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads the circuit breaker
    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// Re-arms the circuit breaker (retry pass only)
    pub fn resume(&self) {
        self.lock().running = true;
    }

    /// Claims `url` for a new unit of work
    ///
    /// Returns false if the URL is already indexed, deferred or in flight.
    pub fn claim(&self, url: &str) -> bool {
        let mut inner = self.lock();
        if inner.state_of(url).is_claimed() {
            return false;
        }
        inner.in_flight.insert(url.to_string())
    }

    /// Records a successful fetch and claims its unvisited links
    ///
    /// The page is stored under `url` exactly once, whether or not it yields
    /// any new links. Every link that is not yet claimed is marked in flight
    /// and returned; the caller must schedule one unit of work for each.
    pub fn record_page(&self, url: &str, page: Page) -> Vec<String> {
        let mut inner = self.lock();

        let current = inner.state_of(url);
        if !current.can_transition_to(UrlState::Indexed) {
            tracing::warn!("Refusing to index {} from state {}", url, current);
            return Vec::new();
        }

        let mut claimed = Vec::new();
        for link in &page.links {
            if link != url && !inner.state_of(link).is_claimed() {
                inner.in_flight.insert(link.clone());
                claimed.push(link.clone());
            }
        }

        inner.in_flight.remove(url);
        inner.deferred.remove(url);
        inner.sitemap.insert(url.to_string(), page);

        claimed
    }

    /// Records a failed or skipped fetch
    ///
    /// Trips the circuit breaker. The URL is added to the deferred set with
    /// its parent unless it is already indexed or already deferred, in which
    /// case the existing entry wins. Returns true if a new deferral was added.
    pub fn defer(&self, url: &str, parent: &str) -> bool {
        let mut inner = self.lock();
        inner.running = false;
        inner.in_flight.remove(url);

        match inner.state_of(url) {
            UrlState::Indexed | UrlState::Deferred => false,
            UrlState::Unclaimed | UrlState::InFlight => {
                inner.deferred.insert(url.to_string(), parent.to_string());
                true
            }
        }
    }

    /// Returns the current state of `url`
    pub fn url_state(&self, url: &str) -> UrlState {
        self.lock().state_of(url)
    }

    /// Snapshot of the deferred set, in URL order
    pub fn deferred_entries(&self) -> Vec<(String, String)> {
        self.lock()
            .deferred
            .iter()
            .map(|(url, parent)| (url.clone(), parent.clone()))
            .collect()
    }

    pub fn counts(&self) -> StateCounts {
        let inner = self.lock();
        StateCounts {
            indexed: inner.sitemap.len(),
            deferred: inner.deferred.len(),
            in_flight: inner.in_flight.len(),
        }
    }

    /// Copy of the sitemap as it stands
    pub fn sitemap(&self) -> Sitemap {
        self.lock().sitemap.clone()
    }

    /// Copy of the deferred set as it stands
    pub fn deferred(&self) -> Deferred {
        self.lock().deferred.clone()
    }
}
