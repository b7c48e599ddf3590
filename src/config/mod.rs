//! Configuration module for Sumi-Atlas
//!
//! This module handles loading, parsing, and validating configuration. Every
//! tunable has a default, so a TOML file is optional; the command line
//! supplies the root URL and concurrency limit on top of it.
//!
//! # Example
//!
//! ```no_run
//! use sumi_atlas::config::{load_config, validate};
//! use std::path::Path;
//!
//! let mut config = load_config(Path::new("atlas.toml")).unwrap();
//! config.crawler.max_concurrency = 8;
//! validate(&config).unwrap();
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, HttpConfig, OutputConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
