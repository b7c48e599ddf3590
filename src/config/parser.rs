use crate::config::types::Config;
use crate::ConfigResult;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// The result is not validated yet: command-line arguments may still fill in
/// the root and concurrency. Call [`validate`](crate::config::validate) once
/// every source has been merged.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded configuration
/// * `Err(ConfigError)` - Failed to read or parse the file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sumi_atlas::config::load_config;
///
/// let config = load_config(Path::new("atlas.toml")).unwrap();
/// println!("Delay: {}ms", config.http.request_delay_ms);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    Ok(toml::from_str(content)?)
}
