//! Crawl engine - bounded-concurrency work expansion
//!
//! Every discovered URL becomes one unit of work. A unit fetches its page,
//! extracts references, records the page and claims the links nobody has
//! claimed yet; each claimed link comes back to the task group as a new unit.
//! There is no frontier queue: the crawl is over when the task group has
//! nothing left to join.
//!
//! # Unit of work
//!
//! 1. Acquire a permit from the pool (the only backpressure)
//! 2. Read the circuit breaker; if it is open, defer without fetching
//! 3. Fetch; on success extract, record and claim children, on failure defer
//!    (which opens the breaker for every unit that has not fetched yet)
//! 4. Drop the permit and hand the children back to the task group

use crate::config::Config;
use crate::crawler::fetcher::{FetchResult, Fetcher};
use crate::crawler::parser::extract_references;
use crate::crawler::retry::RetryStats;
use crate::output::CrawlReport;
use crate::state::{CrawlState, Deferred, Page, Sitemap};
use crate::url::{domain_key, parse_root};
use crate::{Result, UrlError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// A URL waiting to be crawled, with the page it was found on
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Unit {
    pub url: String,
    pub parent: String,
}

/// How a single unit of work ended
#[derive(Debug)]
enum UnitOutcome {
    /// Page recorded; these links were claimed and must be scheduled
    Indexed { children: Vec<Unit> },

    /// Fetch attempted and failed
    Failed,

    /// Circuit breaker was open; no request was made
    Skipped,
}

/// Counters for one traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Pages fetched and recorded
    pub indexed: usize,
    /// Fetches that failed
    pub failed: usize,
    /// Units deferred without a request because the breaker was open
    pub skipped: usize,
    /// Units that panicked
    pub aborted: usize,
}

impl TraversalStats {
    fn record(&mut self, outcome: &UnitOutcome) {
        match outcome {
            UnitOutcome::Indexed { .. } => self.indexed += 1,
            UnitOutcome::Failed => self.failed += 1,
            UnitOutcome::Skipped => self.skipped += 1,
        }
    }

    pub(crate) fn merge(&mut self, other: TraversalStats) {
        self.indexed += other.indexed;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.aborted += other.aborted;
    }
}

/// Everything a unit of work needs, shared by all units
#[derive(Debug)]
struct Shared {
    root: String,
    fetcher: Fetcher,
    state: CrawlState,
}

/// Final result of a full run
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Every page fetched successfully, keyed by normalized URL
    pub sitemap: Sitemap,
    /// URLs that still failed after the retry pass, with their parents
    pub deferred: Deferred,
    /// The root's domain, used to name the output file
    pub domain: String,
    pub report: CrawlReport,
}

/// Single-domain crawler
///
/// # Example
///
/// ```no_run
/// use sumi_atlas::{Config, Crawler};
///
/// # async fn example() -> Result<(), sumi_atlas::AtlasError> {
/// let crawler = Crawler::new(Config::new("https://www.example.com", 8))?;
/// let outcome = crawler.run().await;
/// println!("{} pages", outcome.sitemap.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Crawler {
    config: Arc<Config>,
    shared: Arc<Shared>,
    domain: String,
    max_concurrency: usize,
    permits: Arc<Semaphore>,
    retried: AtomicBool,
}

impl Crawler {
    /// Creates a crawler from a configuration
    ///
    /// Fails with a configuration error before any request is made if the
    /// root is missing or invalid or the concurrency limit is zero.
    pub fn new(config: Config) -> Result<Self> {
        crate::config::validate(&config)?;

        let root = config
            .crawler
            .root
            .as_deref()
            .map(parse_root)
            .transpose()?
            .ok_or(UrlError::MissingDomain)?;
        let domain = domain_key(&root).ok_or(UrlError::MissingDomain)?;
        let fetcher = Fetcher::new(&config.http)?;
        let max_concurrency = config.crawler.max_concurrency;

        Ok(Self {
            config: Arc::new(config),
            shared: Arc::new(Shared {
                root,
                fetcher,
                state: CrawlState::new(),
            }),
            domain,
            max_concurrency,
            permits: Arc::new(Semaphore::new(max_concurrency)),
            retried: AtomicBool::new(false),
        })
    }

    /// The normalized root URL
    pub fn root(&self) -> &str {
        &self.shared.root
    }

    /// The root's domain, without `www.`
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &CrawlState {
        &self.shared.state
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Permits currently free in the main pool
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Marks the retry pass as started; false if it already ran
    pub(crate) fn begin_retry(&self) -> bool {
        !self.retried.swap(true, Ordering::SeqCst)
    }

    /// Returns true once the retry pass has run
    pub fn has_retried(&self) -> bool {
        self.retried.load(Ordering::SeqCst)
    }

    /// Runs the main pass, the cooldown and the deferred retry pass
    ///
    /// Deferred URLs are retried at most once per crawler: calling `run`
    /// again returns the current sitemap without fetching anything.
    pub async fn run(&self) -> CrawlOutcome {
        let started = Instant::now();

        let main_pass = self.crawl().await;
        let counts = self.state().counts();
        if counts.in_flight > 0 {
            tracing::warn!(
                "{} URLs were claimed by units that never finished",
                counts.in_flight
            );
        }

        let retry = if counts.deferred > 0 && !self.has_retried() {
            let cooldown = self.config.crawler.retry_cooldown();
            tracing::info!(
                "{} URLs deferred, taking a {:?} break before retrying",
                counts.deferred,
                cooldown
            );
            tokio::time::sleep(cooldown).await;
            self.retry_deferred().await
        } else {
            RetryStats::default()
        };

        let sitemap = self.state().sitemap();
        let deferred = self.state().deferred();
        let report = CrawlReport::new(
            self.root(),
            &sitemap,
            &deferred,
            main_pass,
            retry,
            started.elapsed(),
        );

        CrawlOutcome {
            sitemap,
            deferred,
            domain: self.domain.clone(),
            report,
        }
    }

    /// Runs the main pass from the root until every unit has finished
    pub async fn crawl(&self) -> TraversalStats {
        if !self.shared.state.claim(&self.shared.root) {
            tracing::warn!("Root {} was already crawled", self.shared.root);
            return TraversalStats::default();
        }

        tracing::info!(
            "Crawling {} with up to {} concurrent requests",
            self.shared.root,
            self.max_concurrency
        );

        let seed = Unit {
            url: self.shared.root.clone(),
            parent: String::new(),
        };
        let stats = self.traverse(seed, self.permits.clone()).await;

        tracing::info!(
            "Main pass finished: {} indexed, {} failed, {} skipped",
            stats.indexed,
            stats.failed,
            stats.skipped
        );
        stats
    }

    /// Drives one traversal from an already-claimed seed until it drains
    pub(crate) async fn traverse(&self, seed: Unit, permits: Arc<Semaphore>) -> TraversalStats {
        let mut stats = TraversalStats::default();
        let mut units = JoinSet::new();
        units.spawn(run_unit(self.shared.clone(), permits.clone(), seed));

        while let Some(joined) = units.join_next().await {
            match joined {
                Ok(outcome) => {
                    stats.record(&outcome);
                    if let UnitOutcome::Indexed { children } = outcome {
                        for child in children {
                            units.spawn(run_unit(self.shared.clone(), permits.clone(), child));
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("Crawl unit aborted: {}", e);
                    stats.aborted += 1;
                }
            }
        }

        stats
    }
}

/// One fetch → extract → claim cycle
async fn run_unit(shared: Arc<Shared>, permits: Arc<Semaphore>, unit: Unit) -> UnitOutcome {
    // Held until this function returns, on every path
    let _permit = match permits.acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => {
            tracing::error!("Permit pool closed, deferring {}", unit.url);
            shared.state.defer(&unit.url, &unit.parent);
            return UnitOutcome::Skipped;
        }
    };

    if !shared.state.is_running() {
        if shared.state.defer(&unit.url, &unit.parent) {
            tracing::info!("Crawl paused, deferring {}", unit.url);
        }
        return UnitOutcome::Skipped;
    }

    tracing::debug!("Fetching {}", unit.url);

    match shared.fetcher.fetch(&unit.url).await {
        FetchResult::Success {
            final_url, body, ..
        } => {
            let refs = extract_references(&body, &final_url, &shared.root);
            let page = Page::new(refs.assets, refs.links, unit.parent);
            let claimed = shared.state.record_page(&unit.url, page);

            for link in &claimed {
                tracing::debug!("Visiting {}", link);
            }
            tracing::info!("Indexed {} ({} new links)", unit.url, claimed.len());

            let children = claimed
                .into_iter()
                .map(|url| Unit {
                    url,
                    parent: unit.url.clone(),
                })
                .collect();
            UnitOutcome::Indexed { children }
        }
        failure => {
            tracing::warn!("Request failed for {}: {:?}", unit.url, failure);
            if shared.state.defer(&unit.url, &unit.parent) {
                tracing::info!("Deferring crawl of {}", unit.url);
            }
            UnitOutcome::Failed
        }
    }
}
