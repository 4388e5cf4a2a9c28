//! Quote Source Port - Upstream Price Lookup Interface
//!
//! Defines the trait the stock prices use case consumes to fetch the
//! latest quote for a symbol. The use case never sees transport details;
//! retries and timeouts, if any, belong to the implementor.

use async_trait::async_trait;

use crate::domain::symbol::{Quote, Symbol};

/// Trait for upstream quote providers.
///
/// Implementors return the latest quote for a normalized symbol or fail
/// with an error describing the transport or payload problem. Errors are
/// logged by the caller and never shown to API clients.
#[async_trait]
pub trait QuoteSource: Send + Sync + 'static {
  /// Fetch the latest quote for `symbol`.
  async fn fetch_quote(&self, symbol: &Symbol) -> anyhow::Result<Quote>;

  /// Whether the source is currently usable (drives readiness).
  async fn is_healthy(&self) -> bool;
}
