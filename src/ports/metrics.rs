//! Request Metrics Port - Observability Sink Interface
//!
//! The stock prices use case reports request outcomes, upstream fetch
//! latency and ledger size through this trait; the Prometheus adapter
//! implements it.

use std::time::Duration;

/// Sink for per-request measurements.
pub trait RequestMetrics: Send + Sync + 'static {
  /// Count one handled request, labelled by outcome.
  fn record_request(&self, outcome: &str);

  /// Observe one upstream quote fetch.
  fn record_fetch(&self, elapsed: Duration, ok: bool);

  /// Refresh the ledger size after likes were registered.
  fn set_ledger_size(&self, likes_total: u64, likers: usize);
}
