//! State module for tracking crawl progress
//!
//! This module provides the data recorded per page and the shared state every
//! concurrent unit of work reads and updates.
//!
//! # Components
//!
//! - `Page`: The assets, links and parent recorded for one fetched URL
//! - `UrlState`: Where a single URL is in the crawl (unclaimed, in flight, indexed, deferred)
//! - `CrawlState`: The lock-guarded sitemap, deferred set and circuit breaker

mod crawl_state;
mod page;
mod url_state;

// Re-export main types
pub use crawl_state::{CrawlState, StateCounts};
pub use page::{Deferred, Page, Sitemap};
pub use url_state::UrlState;
