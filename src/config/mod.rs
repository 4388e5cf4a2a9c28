//! Configuration Module - TOML-based Service Configuration
//!
//! Loads and validates configuration from `config.toml`. The path can
//! be overridden with the `STOCK_PRICES_CONFIG` environment variable.
//! Upstream endpoints and listener addresses are externalized here -
//! nothing is hardcoded in the usecases layer.

pub mod loader;

use std::time::Duration;

use serde::Deserialize;

/// Environment variable overriding the config file path.
pub const CONFIG_PATH_ENV: &str = "STOCK_PRICES_CONFIG";

/// Config file used when `STOCK_PRICES_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Upper bound accepted for `quotes.max_retries`.
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Top-level service configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before any listener is bound.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// API server settings.
  pub server: ServerConfig,
  /// Upstream quote proxy settings.
  pub quotes: QuoteSourceConfig,
  /// Metrics and health probes.
  #[serde(default)]
  pub metrics: MetricsConfig,
}

/// API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  /// Human-readable service name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Listen address for the public API.
  #[serde(default = "default_bind_address")]
  pub bind_address: String,
  /// Take the client address from `X-Forwarded-For` when present.
  ///
  /// Only enable behind a reverse proxy that overwrites the header,
  /// otherwise clients can pick their own liker identity.
  #[serde(default)]
  pub trust_forwarded_for: bool,
}

/// Upstream quote proxy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteSourceConfig {
  /// Base URL; quotes are fetched from `{base_url}/{SYMBOL}/quote`.
  pub base_url: String,
  /// Per-request timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
  /// Maximum in-flight upstream requests.
  #[serde(default = "default_max_concurrent")]
  pub max_concurrent: usize,
  /// Maximum retries on transport errors and 5xx responses
  /// (at most `MAX_RETRIES_LIMIT`).
  #[serde(default = "default_max_retries")]
  pub max_retries: u32,
  /// Base delay between retries (exponential backoff), milliseconds.
  #[serde(default = "default_retry_delay")]
  pub retry_base_delay_ms: u64,
}

impl QuoteSourceConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_seconds)
  }

  pub fn retry_base_delay(&self) -> Duration {
    Duration::from_millis(self.retry_base_delay_ms)
  }
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Enable Prometheus metrics export.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Metrics server bind address.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
  /// Health check endpoint port.
  #[serde(default = "default_health_port")]
  pub health_port: u16,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: default_true(),
      bind_address: default_metrics_addr(),
      health_port: default_health_port(),
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_bind_address() -> String {
  "0.0.0.0:3000".to_string()
}

fn default_true() -> bool {
  true
}

fn default_timeout() -> u64 {
  10
}

fn default_max_concurrent() -> usize {
  10
}

fn default_max_retries() -> u32 {
  2
}

fn default_retry_delay() -> u64 {
  200
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}

fn default_health_port() -> u16 {
  8080
}
