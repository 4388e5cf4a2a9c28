//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};

use super::{AppConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH, MAX_RETRIES_LIMIT};

/// Resolve the config path from `STOCK_PRICES_CONFIG`, falling back
/// to `config.toml` in the working directory.
pub fn config_path() -> String {
  std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content).context("Failed to parse config.toml")?;
  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Non-empty listener addresses
/// - A parseable http(s) upstream URL
/// - Positive timeout and concurrency limits
/// - A bounded retry count
fn validate_config(config: &AppConfig) -> Result<()> {
  // Server validation
  anyhow::ensure!(
    !config.server.bind_address.is_empty(),
    "server.bind_address must not be empty"
  );

  // Upstream validation
  let url = reqwest::Url::parse(&config.quotes.base_url)
    .with_context(|| format!("quotes.base_url is not a valid URL: {}", config.quotes.base_url))?;
  anyhow::ensure!(
    matches!(url.scheme(), "http" | "https"),
    "quotes.base_url must be http or https, got {}",
    url.scheme()
  );
  anyhow::ensure!(
    !url.cannot_be_a_base(),
    "quotes.base_url cannot be used as a base URL: {}",
    config.quotes.base_url
  );
  anyhow::ensure!(
    config.quotes.timeout_seconds > 0,
    "quotes.timeout_seconds must be positive"
  );
  anyhow::ensure!(
    config.quotes.max_concurrent > 0,
    "quotes.max_concurrent must be positive"
  );
  anyhow::ensure!(
    config.quotes.max_retries <= MAX_RETRIES_LIMIT,
    "quotes.max_retries must be at most {MAX_RETRIES_LIMIT}, got {}",
    config.quotes.max_retries
  );

  // Metrics validation
  if config.metrics.enabled {
    anyhow::ensure!(
      !config.metrics.bind_address.is_empty(),
      "metrics.bind_address must not be empty when metrics are enabled"
    );
  }

  Ok(())
}
