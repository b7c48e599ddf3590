use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Sumi-Atlas
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Creates a configuration for `root` with default tunables
    pub fn new(root: impl Into<String>, max_concurrency: usize) -> Self {
        Self {
            crawler: CrawlerConfig {
                root: Some(root.into()),
                max_concurrency,
                ..CrawlerConfig::default()
            },
            ..Self::default()
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Absolute URL the crawl starts from
    #[serde(default)]
    pub root: Option<String>,

    /// Maximum number of concurrently active fetch cycles
    #[serde(rename = "max-concurrency", default)]
    pub max_concurrency: usize,

    /// Pause between the main pass and the deferred retry pass (seconds)
    #[serde(rename = "retry-cooldown-secs", default = "default_retry_cooldown_secs")]
    pub retry_cooldown_secs: u64,
}

impl CrawlerConfig {
    pub fn retry_cooldown(&self) -> Duration {
        Duration::from_secs(self.retry_cooldown_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            root: None,
            max_concurrency: 0,
            retry_cooldown_secs: default_retry_cooldown_secs(),
        }
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Fixed delay applied before every request (milliseconds)
    #[serde(rename = "request-delay-ms", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Value of the User-Agent header
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl HttpConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: default_request_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving `<domain>.json`; stdout when unset
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

fn default_retry_cooldown_secs() -> u64 {
    5
}

fn default_request_delay_ms() -> u64 {
    300
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("sumi-atlas/{}", env!("CARGO_PKG_VERSION"))
}
