//! Prometheus Metrics Registry - Service Observability
//!
//! Registers and exposes Prometheus metrics for request outcomes,
//! upstream quote latency and ledger size. Each registry owns its
//! own `prometheus::Registry`, so tests can build as many as they like.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use crate::ports::RequestMetrics;

/// Centralized Prometheus metrics for the service.
///
/// All metrics follow the naming convention `stock_prices_*`.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Requests handled, labelled by outcome.
    pub requests: IntCounterVec,
    /// Upstream quote fetch latency (seconds), labelled by outcome.
    pub upstream_fetch_seconds: HistogramVec,
    /// Sum of like counts across all symbols.
    pub likes_total: IntGauge,
    /// Distinct anonymized identities that have liked something.
    pub likers: IntGauge,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new(
                "stock_prices_requests_total",
                "Stock price requests by outcome",
            ),
            &["outcome"],
        )?;

        let upstream_fetch_seconds = HistogramVec::new(
            HistogramOpts::new(
                "stock_prices_upstream_fetch_seconds",
                "Upstream quote fetch latency in seconds",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["outcome"],
        )?;

        let likes_total = IntGauge::new(
            "stock_prices_likes_total",
            "Sum of like counts across all symbols",
        )?;

        let likers = IntGauge::new(
            "stock_prices_likers",
            "Distinct anonymized identities that liked at least one symbol",
        )?;

        // Register all metrics
        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(upstream_fetch_seconds.clone()))?;
        registry.register(Box::new(likes_total.clone()))?;
        registry.register(Box::new(likers.clone()))?;

        Ok(Self {
            registry,
            requests,
            upstream_fetch_seconds,
            likes_total,
            likers,
        })
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Serve Prometheus metrics on the configured bind address.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics_self = Arc::clone(&self);

        let app = Router::new().route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&metrics_self);
                async move {
                    match metrics.render() {
                        Ok(body) => (StatusCode::OK, body),
                        Err(e) => {
                            warn!(error = %e, "Failed to encode metrics");
                            (StatusCode::INTERNAL_SERVER_ERROR, String::new())
                        }
                    }
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}

impl RequestMetrics for MetricsRegistry {
    fn record_request(&self, outcome: &str) {
        self.requests.with_label_values(&[outcome]).inc();
    }

    fn record_fetch(&self, elapsed: Duration, ok: bool) {
        let outcome = if ok { "ok" } else { "error" };
        self.upstream_fetch_seconds
            .with_label_values(&[outcome])
            .observe(elapsed.as_secs_f64());
    }

    fn set_ledger_size(&self, likes_total: u64, likers: usize) {
        self.likes_total
            .set(i64::try_from(likes_total).unwrap_or(i64::MAX));
        self.likers.set(i64::try_from(likers).unwrap_or(i64::MAX));
    }
}
