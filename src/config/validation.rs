use crate::config::types::{Config, CrawlerConfig, HttpConfig};
use crate::url::parse_root;
use crate::{ConfigError, ConfigResult};

/// Upper bound on the permit pool
const MAX_CONCURRENCY_LIMIT: usize = 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    let root = match config.root.as_deref().map(str::trim) {
        Some(root) if !root.is_empty() => root,
        _ => {
            return Err(ConfigError::Validation(
                "root URL must be set".to_string(),
            ))
        }
    };

    parse_root(root).map_err(|e| ConfigError::InvalidUrl(format!("Invalid root URL: {}", e)))?;

    if config.max_concurrency < 1 || config.max_concurrency > MAX_CONCURRENCY_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY_LIMIT, config.max_concurrency
        )));
    }

    Ok(())
}

/// Validates HTTP configuration
fn validate_http_config(config: &HttpConfig) -> ConfigResult<()> {
    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}
