//! Quote Proxy HTTP Client - Concurrency-limited REST Client
//!
//! Wraps reqwest with a concurrency limit, a per-request timeout and
//! exponential-backoff retries for transport errors and 5xx answers.
//! Retries live here, in the transport; the stock prices use case
//! never retries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

use super::types::parse_quote_body;
use crate::config::QuoteSourceConfig;
use crate::domain::symbol::{Quote, Symbol};
use crate::ports::QuoteSource;

/// Configuration for the quote proxy client.
#[derive(Debug, Clone)]
pub struct QuoteProxyConfig {
  /// Base URL; quotes live at `{base_url}/{SYMBOL}/quote`.
  pub base_url: String,
  /// Request timeout.
  pub timeout: Duration,
  /// Maximum concurrent requests.
  pub max_concurrent: usize,
  /// Maximum retries on transient errors.
  pub max_retries: u32,
  /// Base delay between retries (exponential backoff).
  pub retry_base_delay: Duration,
}

impl Default for QuoteProxyConfig {
  fn default() -> Self {
    Self {
      base_url: "https://stock-price-checker-proxy.freecodecamp.rocks/v1/stock".to_string(),
      timeout: Duration::from_secs(10),
      max_concurrent: 10,
      max_retries: 2,
      retry_base_delay: Duration::from_millis(200),
    }
  }
}

impl From<&QuoteSourceConfig> for QuoteProxyConfig {
  fn from(config: &QuoteSourceConfig) -> Self {
    Self {
      base_url: config.base_url.clone(),
      timeout: config.timeout(),
      max_concurrent: config.max_concurrent,
      max_retries: config.max_retries,
      retry_base_delay: config.retry_base_delay(),
    }
  }
}

/// HTTP client for the stock quote proxy.
pub struct QuoteProxyClient {
  /// Underlying HTTP client.
  http: Client,
  /// Parsed base URL.
  base_url: Url,
  /// Client configuration.
  config: QuoteProxyConfig,
  /// Concurrency limiter.
  semaphore: Arc<Semaphore>,
  /// Outcome of the most recent fetch (drives readiness).
  last_fetch_ok: AtomicBool,
}

impl QuoteProxyClient {
  /// Create a new quote proxy client.
  pub fn new(config: QuoteProxyConfig) -> Result<Self> {
    let base_url = Url::parse(&config.base_url)
      .with_context(|| format!("Invalid quote proxy URL: {}", config.base_url))?;
    anyhow::ensure!(
      !base_url.cannot_be_a_base(),
      "Quote proxy URL cannot be a base: {}",
      config.base_url
    );

    let http = Client::builder()
      .timeout(config.timeout)
      .pool_max_idle_per_host(5)
      .build()
      .context("Failed to build HTTP client")?;

    let semaphore = Arc::new(Semaphore::new(config.max_concurrent));

    Ok(Self {
      http,
      base_url,
      config,
      semaphore,
      last_fetch_ok: AtomicBool::new(true),
    })
  }

  /// URL of the quote resource for `symbol`, with the symbol
  /// percent-encoded as a single path segment.
  pub fn quote_url(&self, symbol: &Symbol) -> Url {
    let mut url = self.base_url.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
      segments.pop_if_empty().push(symbol.as_str()).push("quote");
    }
    url
  }

  /// GET the quote body, retrying transport errors and 5xx responses.
  async fn get_with_retry(&self, url: &Url) -> Result<String> {
    let _permit = self
      .semaphore
      .acquire()
      .await
      .context("Semaphore closed")?;

    let mut last_error = None;

    for attempt in 0..=self.config.max_retries {
      if attempt > 0 {
        let delay = backoff_delay(self.config.retry_base_delay, attempt);
        debug!(attempt, delay_ms = delay.as_millis(), "Retrying quote request");
        sleep(delay).await;
      }

      match self.http.get(url.clone()).send().await {
        Ok(response) => match response.status() {
          StatusCode::OK => {
            return response.text().await.context("Failed to read quote body");
          }
          StatusCode::TOO_MANY_REQUESTS => {
            warn!("Rate limited by quote proxy, backing off");
            last_error = Some(anyhow::anyhow!("Rate limited"));
          }
          status if status.is_server_error() => {
            warn!(status = %status, "Quote proxy server error, retrying");
            last_error = Some(anyhow::anyhow!("Server error: {status}"));
          }
          status => {
            return Err(anyhow::anyhow!("Quote proxy error {status}"));
          }
        },
        Err(e) => {
          warn!(error = %e, attempt, "Quote request failed");
          last_error = Some(e.into());
        }
      }
    }

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Max retries exceeded")))
  }
}

#[async_trait]
impl QuoteSource for QuoteProxyClient {
  #[instrument(skip(self), fields(symbol = %symbol))]
  async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote> {
    let url = self.quote_url(symbol);
    let result = match self.get_with_retry(&url).await {
      Ok(body) => parse_quote_body(symbol, &body),
      Err(e) => Err(e),
    };

    self.last_fetch_ok.store(result.is_ok(), Ordering::Relaxed);

    let quote = result.with_context(|| format!("Failed to fetch quote for {symbol}"))?;
    debug!(reported = %quote.symbol, price = quote.price, "Quote fetched");
    Ok(quote)
  }

  async fn is_healthy(&self) -> bool {
    self.last_fetch_ok.load(Ordering::Relaxed)
  }
}

/// Delay before retry `attempt` (1-based): `base * 2^(attempt - 1)`,
/// saturating instead of overflowing.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
  let factor = 2u32.checked_pow(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
  base.saturating_mul(factor)
}
