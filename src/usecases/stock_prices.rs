//! Stock Prices - Quote Lookup with Anonymized Likes
//!
//! Handles one `GET /api/stock-prices` request end to end:
//! - Validates and normalizes the 1-2 requested symbols
//! - Fetches all quotes concurrently, failing fast on the first error
//! - Registers (or just reads) likes in the shared ledger
//! - Shapes the answer as absolute likes (one symbol) or relative
//!   likes (two symbols)

use std::sync::Arc;
use std::time::Instant;

use futures_util::future::try_join_all;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::domain::anonymizer::anonymize;
use crate::domain::ledger::LikeLedger;
use crate::domain::stock_data::StockData;
use crate::domain::symbol::{Quote, Symbol};
use crate::ports::{QuoteSource, RequestMetrics};

/// Maximum number of symbols accepted per request.
pub const MAX_SYMBOLS: usize = 2;

/// Reasons a stock prices request fails. Display strings are the
/// client-facing messages; sources are for logs only.
#[derive(Debug, Error)]
pub enum StockPriceError {
  /// No usable `stock` value was supplied.
  #[error("Stock symbol is required")]
  MissingSymbol,

  /// More than `MAX_SYMBOLS` values were supplied.
  #[error("Maximum of two stocks allowed")]
  TooManySymbols { requested: usize },

  /// Some quote could not be fetched or parsed.
  #[error("Failed to fetch stock data")]
  UpstreamFetchFailure(#[source] anyhow::Error),
}

impl StockPriceError {
  /// Stable label for metrics and logs.
  pub const fn kind(&self) -> &'static str {
    match self {
      Self::MissingSymbol => "missing_symbol",
      Self::TooManySymbols { .. } => "too_many_symbols",
      Self::UpstreamFetchFailure(_) => "upstream_failure",
    }
  }
}

/// Stock prices use case, shared across request handlers.
pub struct StockPriceService<Q: QuoteSource> {
  /// Quote source port.
  quotes: Arc<Q>,
  /// Process-wide like ledger.
  ledger: Arc<LikeLedger>,
  /// Metrics sink port.
  metrics: Arc<dyn RequestMetrics>,
}

impl<Q: QuoteSource> StockPriceService<Q> {
  /// Create a new service over an injected quote source, ledger and
  /// metrics sink.
  pub fn new(quotes: Arc<Q>, ledger: Arc<LikeLedger>, metrics: Arc<dyn RequestMetrics>) -> Self {
    Self {
      quotes,
      ledger,
      metrics,
    }
  }

  /// Answer one request.
  ///
  /// `raw_symbols` are the `stock` query values in request order;
  /// `client_address` is the raw client address, anonymized here only
  /// when `should_like` is set.
  #[instrument(skip_all, fields(symbols = ?raw_symbols, like = should_like))]
  pub async fn handle_request(
    &self,
    raw_symbols: &[String],
    should_like: bool,
    client_address: &str,
  ) -> Result<StockData, StockPriceError> {
    let result = self.resolve(raw_symbols, should_like, client_address).await;

    match &result {
      Ok(_) => self.metrics.record_request("ok"),
      Err(e) => self.metrics.record_request(e.kind()),
    }
    result
  }

  async fn resolve(
    &self,
    raw_symbols: &[String],
    should_like: bool,
    client_address: &str,
  ) -> Result<StockData, StockPriceError> {
    let symbols = parse_symbols(raw_symbols)?;

    let quotes = try_join_all(symbols.iter().map(|s| self.timed_fetch(s)))
      .await
      .map_err(|e| {
        let detail = format!("{e:#}");
        warn!(error = %detail, "Quote fetch failed, discarding request");
        StockPriceError::UpstreamFetchFailure(e)
      })?;

    let likes = if should_like {
      let liker = anonymize(client_address);
      let counts = self.ledger.register_likes(&symbols, &liker);
      self
        .metrics
        .set_ledger_size(self.ledger.total_likes(), self.ledger.liker_count());
      info!(liker = %liker, likes = ?counts, "Likes registered");
      counts
    } else {
      self.ledger.peek_many(&symbols)
    };

    shape(quotes, &likes)
  }

  async fn timed_fetch(&self, symbol: &Symbol) -> anyhow::Result<Quote> {
    let started = Instant::now();
    let result = self.quotes.fetch_quote(symbol).await;
    self.metrics.record_fetch(started.elapsed(), result.is_ok());
    result
  }
}

/// Normalize the raw `stock` values. Blank values are ignored.
pub fn parse_symbols(raw_symbols: &[String]) -> Result<Vec<Symbol>, StockPriceError> {
  let symbols: Vec<Symbol> = raw_symbols.iter().filter_map(|s| Symbol::parse(s)).collect();

  match symbols.len() {
    0 => Err(StockPriceError::MissingSymbol),
    n if n > MAX_SYMBOLS => Err(StockPriceError::TooManySymbols { requested: n }),
    _ => {
      debug!(symbols = ?symbols, "Symbols normalized");
      Ok(symbols)
    }
  }
}

fn shape(quotes: Vec<Quote>, likes: &[u64]) -> Result<StockData, StockPriceError> {
  let mut entries = quotes.into_iter().zip(likes.iter().copied());
  match (entries.next(), entries.next()) {
    (Some(first), Some(second)) => Ok(StockData::pair(first, second)),
    (Some((quote, count)), None) => Ok(StockData::single(quote, count)),
    (None, _) => Err(StockPriceError::MissingSymbol),
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;
  use std::time::Duration;

  use async_trait::async_trait;

  use super::*;

  fn raw(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
  }

  struct FixedQuotes;

  #[async_trait]
  impl QuoteSource for FixedQuotes {
    async fn fetch_quote(&self, symbol: &Symbol) -> anyhow::Result<Quote> {
      if symbol.as_str() == "FAIL" {
        anyhow::bail!("upstream down");
      }
      Ok(Quote::new(symbol.clone(), 100.0))
    }

    async fn is_healthy(&self) -> bool {
      true
    }
  }

  #[derive(Default)]
  struct RecordingMetrics {
    outcomes: Mutex<Vec<String>>,
    fetches: Mutex<Vec<bool>>,
    ledger_size: Mutex<Option<(u64, usize)>>,
  }

  impl RequestMetrics for RecordingMetrics {
    fn record_request(&self, outcome: &str) {
      self.outcomes.lock().unwrap().push(outcome.to_string());
    }

    fn record_fetch(&self, _elapsed: Duration, ok: bool) {
      self.fetches.lock().unwrap().push(ok);
    }

    fn set_ledger_size(&self, likes_total: u64, likers: usize) {
      *self.ledger_size.lock().unwrap() = Some((likes_total, likers));
    }
  }

  fn recorded_service() -> (StockPriceService<FixedQuotes>, Arc<RecordingMetrics>) {
    let metrics = Arc::new(RecordingMetrics::default());
    let sink: Arc<dyn RequestMetrics> = metrics.clone();
    let svc = StockPriceService::new(Arc::new(FixedQuotes), Arc::new(LikeLedger::new()), sink);
    (svc, metrics)
  }

  #[tokio::test]
  async fn test_outcomes_reported_through_metrics_port() {
    let (svc, metrics) = recorded_service();

    svc.handle_request(&raw(&["aapl", "msft"]), true, "203.0.113.7").await.unwrap();
    let _ = svc.handle_request(&raw(&["aapl", "fail"]), false, "203.0.113.7").await;
    let _ = svc.handle_request(&[], false, "203.0.113.7").await;

    assert_eq!(
      *metrics.outcomes.lock().unwrap(),
      vec!["ok", "upstream_failure", "missing_symbol"]
    );
    assert!(metrics.fetches.lock().unwrap().contains(&false));
    assert_eq!(*metrics.ledger_size.lock().unwrap(), Some((2, 1)));
  }

  #[test]
  fn test_parse_symbols_normalizes() {
    let symbols = parse_symbols(&raw(&["aapl", " googl "])).unwrap();
    assert_eq!(symbols[0].as_str(), "AAPL");
    assert_eq!(symbols[1].as_str(), "GOOGL");
  }

  #[test]
  fn test_parse_symbols_empty_is_missing() {
    assert!(matches!(parse_symbols(&[]), Err(StockPriceError::MissingSymbol)));
    assert!(matches!(
      parse_symbols(&raw(&["", "  "])),
      Err(StockPriceError::MissingSymbol)
    ));
  }

  #[test]
  fn test_parse_symbols_three_is_too_many() {
    let err = parse_symbols(&raw(&["A", "B", "C"])).unwrap_err();
    assert!(matches!(err, StockPriceError::TooManySymbols { requested: 3 }));
    assert_eq!(err.to_string(), "Maximum of two stocks allowed");
  }

  #[test]
  fn test_parse_symbols_ignores_blank_entries() {
    let symbols = parse_symbols(&raw(&["", "msft"])).unwrap();
    assert_eq!(symbols.len(), 1);
  }

  #[test]
  fn test_error_messages_hide_details() {
    let err = StockPriceError::UpstreamFetchFailure(anyhow::anyhow!("connection reset by 10.0.0.5"));
    assert_eq!(err.to_string(), "Failed to fetch stock data");
    assert_eq!(err.kind(), "upstream_failure");
  }
}
