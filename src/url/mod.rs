//! URL handling module for Sumi-Atlas
//!
//! This module resolves references found in markup into absolute, normalized
//! URLs and decides whether a URL belongs to the crawl's domain.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{domain_key, same_domain};
pub use normalize::{normalize, parse_root};
