//! Health Check Server - Liveness and Readiness Probes
//!
//! Exposes /live and /ready endpoints via axum 0.7 for container
//! health checks. Readiness depends on the service still accepting
//! requests and on the quote source reporting itself healthy.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio::sync::broadcast;
use tracing::{info, instrument};

use crate::ports::QuoteSource;

/// Shared health state polled by readiness probes.
#[derive(Debug)]
pub struct HealthState {
    /// Cleared when graceful shutdown begins.
    accepting: AtomicBool,
}

impl HealthState {
    /// Create a new health state (accepting by default).
    pub fn new() -> Self {
        Self {
            accepting: AtomicBool::new(true),
        }
    }

    /// Stop reporting ready; called at the start of shutdown.
    pub fn mark_draining(&self) {
        self.accepting.store(false, Ordering::Relaxed);
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::Relaxed)
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

struct ProbeState<Q> {
    health: Arc<HealthState>,
    quotes: Arc<Q>,
}

// Manual impl: `Q` itself need not be `Clone`.
impl<Q> Clone for ProbeState<Q> {
    fn clone(&self) -> Self {
        Self {
            health: Arc::clone(&self.health),
            quotes: Arc::clone(&self.quotes),
        }
    }
}

/// Axum-based health check HTTP server.
pub struct HealthServer<Q: QuoteSource> {
    health: Arc<HealthState>,
    quotes: Arc<Q>,
    /// Bind port (default 8080 from config).
    port: u16,
}

impl<Q: QuoteSource> HealthServer<Q> {
    /// Create a new health server.
    pub fn new(health: Arc<HealthState>, quotes: Arc<Q>, port: u16) -> Self {
        Self {
            health,
            quotes,
            port,
        }
    }

    /// Build the probe router (also used directly in tests).
    pub fn router(&self) -> Router {
        Router::new()
            .route("/live", get(liveness))
            .route("/ready", get(readiness::<Q>))
            .with_state(ProbeState {
                health: Arc::clone(&self.health),
                quotes: Arc::clone(&self.quotes),
            })
    }

    /// Start the health check server.
    #[instrument(skip(self, shutdown_rx), fields(port = self.port))]
    pub async fn run(
        self,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let app = self.router();

        let addr = format!("0.0.0.0:{}", self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!(address = %addr, "Health server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness probe: 200 only while accepting and upstream is healthy.
async fn readiness<Q: QuoteSource>(State(state): State<ProbeState<Q>>) -> impl IntoResponse {
    if state.health.is_accepting() && state.quotes.is_healthy().await {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}
