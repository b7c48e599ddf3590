//! Output module for emitting crawl results
//!
//! This module handles:
//! - Serializing the finished sitemap to `<domain>.json` or stdout
//! - Summarizing a run in a `CrawlReport`

mod json;
pub mod stats;

pub use json::{emit_sitemap, sitemap_file_name, write_sitemap, EmitTarget};
pub use stats::CrawlReport;
