//! Sumi-Atlas main entry point
//!
//! This is the command-line interface for the Sumi-Atlas site mapper.

use clap::Parser;
use std::path::PathBuf;
use sumi_atlas::config::{load_config, validate, Config};
use sumi_atlas::crawler::crawl;
use sumi_atlas::output::emit_sitemap;
use tracing_subscriber::EnvFilter;

/// Sumi-Atlas: a single-domain site mapper
///
/// Sumi-Atlas crawls every page reachable from ROOT on the same domain and
/// prints a JSON map of each page's links and static assets, or writes it to
/// OUTPUT_DIR/<domain>.json.
#[derive(Parser, Debug)]
#[command(name = "sumi-atlas")]
#[command(version)]
#[command(about = "A single-domain site mapper", long_about = None)]
struct Cli {
    /// Absolute URL to start crawling from
    #[arg(value_name = "ROOT")]
    root: String,

    /// Maximum number of concurrent requests
    #[arg(value_name = "MAX_CONCURRENCY")]
    max_concurrency: usize,

    /// Directory to write <domain>.json into (stdout when omitted)
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Optional TOML file with transport and retry settings
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return Err(e);
        }
    };

    let output_dir = config.output.directory.clone();
    let outcome = crawl(config).await?;
    outcome.report.log();

    emit_sitemap(&outcome.sitemap, &outcome.domain, output_dir.as_deref())?;

    Ok(())
}

/// Merges the optional config file with command-line arguments
fn build_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        None => Config::default(),
    };

    config.crawler.root = Some(cli.root.clone());
    config.crawler.max_concurrency = cli.max_concurrency;
    if let Some(dir) = &cli.output_dir {
        config.output.directory = Some(dir.clone());
    }

    validate(&config)?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so the sitemap can be piped from stdout.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_atlas=info,warn"),
            1 => EnvFilter::new("sumi_atlas=debug,info"),
            2 => EnvFilter::new("sumi_atlas=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
