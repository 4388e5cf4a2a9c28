//! Stock Price Checker - Entry Point
//!
//! Initializes configuration, logging, the quote proxy client and the
//! like ledger, then serves the API until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config.toml (or $STOCK_PRICES_CONFIG) + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Create QuoteProxyClient (HTTP + timeout + retry)
//! 4. Create the empty LikeLedger and the StockPriceService
//! 5. Spawn health server (/live + /ready) and metrics server
//! 6. Serve the API on server.bind_address
//! 7. Wait for SIGINT → readiness 503 → drain → exit

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};

use stock_price_checker::adapters::http::{router, ApiServer, ApiState};
use stock_price_checker::adapters::metrics::{HealthServer, HealthState, MetricsRegistry};
use stock_price_checker::adapters::quotes::{QuoteProxyClient, QuoteProxyConfig};
use stock_price_checker::config::loader::{config_path, load_config};
use stock_price_checker::domain::LikeLedger;
use stock_price_checker::usecases::StockPriceService;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let path = config_path();
    let config = load_config(&path)
        .with_context(|| format!("Failed to load configuration from {path}"))?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(&config.server.log_level)
                }),
        )
        .json()
        .init();

    info!(
        name = %config.server.name,
        version = env!("CARGO_PKG_VERSION"),
        bind = %config.server.bind_address,
        trust_forwarded_for = config.server.trust_forwarded_for,
        "Starting stock price checker"
    );
    info!(
        path = %path,
        upstream = %config.quotes.base_url,
        max_retries = config.quotes.max_retries,
        metrics_enabled = config.metrics.enabled,
        "Configuration loaded successfully"
    );

    // ── 3. Shutdown signal channel ──────────────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);

    // ── 4. Quote proxy client (QuoteSource port) ────────────
    let quotes = Arc::new(
        QuoteProxyClient::new(QuoteProxyConfig::from(&config.quotes))
            .context("Failed to create quote proxy client")?,
    );

    // ── 5. Ledger, metrics and the use case ─────────────────
    let ledger = Arc::new(LikeLedger::new());
    let metrics = Arc::new(MetricsRegistry::new().context("Failed to register metrics")?);
    let service = Arc::new(StockPriceService::new(
        Arc::clone(&quotes),
        Arc::clone(&ledger),
        metrics.clone(),
    ));

    // ── 6. Health and metrics servers ───────────────────────
    let health = Arc::new(HealthState::new());
    let health_server = HealthServer::new(
        Arc::clone(&health),
        Arc::clone(&quotes),
        config.metrics.health_port,
    );
    let health_shutdown = shutdown_tx.subscribe();
    let health_handle = tokio::spawn(async move {
        if let Err(e) = health_server.run(health_shutdown).await {
            error!(error = %e, "Health server failed");
        }
    });

    let metrics_handle = if config.metrics.enabled {
        let metrics_shutdown = shutdown_tx.subscribe();
        let bind = config.metrics.bind_address.clone();
        let registry = Arc::clone(&metrics);
        Some(tokio::spawn(async move {
            if let Err(e) = registry.serve(bind, metrics_shutdown).await {
                error!(error = %e, "Metrics server failed");
            }
        }))
    } else {
        None
    };

    // ── 7. Public API ───────────────────────────────────────
    let app = router(ApiState::new(service, config.server.trust_forwarded_for));
    let api = ApiServer::bind(&config.server.bind_address, app).await?;
    let api_shutdown = shutdown_tx.subscribe();
    let mut api_handle = tokio::spawn(api.run(api_shutdown));

    info!("All tasks spawned - service is running");

    // ── 8. Wait for SIGINT (or an API server failure) ───────
    let api_finished = tokio::select! {
        _ = signal::ctrl_c() => {
            info!("SIGINT received, initiating graceful shutdown");
            false
        }
        result = &mut api_handle => {
            match result {
                Ok(Ok(())) => info!("API server exited"),
                Ok(Err(e)) => error!(error = %e, "API server failed"),
                Err(e) => error!(error = %e, "API server task panicked"),
            }
            true
        }
    };

    // ── Graceful shutdown ───────────────────────────────────

    // 1. Mark health as unhealthy (readiness probe → 503)
    health.mark_draining();

    // 2. Signal all tasks to stop
    let _ = shutdown_tx.send(());
    info!("Shutdown signal broadcast to all tasks");

    // 3. Drain in-flight API requests (up to 10s)
    if !api_finished {
        let _ = tokio::time::timeout(Duration::from_secs(10), api_handle).await;
    }

    // 4. Stop the ops servers
    let _ = tokio::time::timeout(Duration::from_secs(2), health_handle).await;
    if let Some(handle) = metrics_handle {
        let _ = tokio::time::timeout(Duration::from_secs(2), handle).await;
    }

    info!(
        likes = ledger.total_likes(),
        likers = ledger.liker_count(),
        "Shutdown complete (likes are not persisted)"
    );
    Ok(())
}
