//! API Server - axum Listener for the Public Endpoint
//!
//! Binds the API router with connect-info enabled (the handler needs
//! the peer address) and serves it until the shutdown broadcast fires.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{info, instrument};

/// Bound, not yet running, API server.
pub struct ApiServer {
    listener: TcpListener,
    router: Router,
}

impl ApiServer {
    /// Bind `bind_address`. Port 0 picks an ephemeral port.
    pub async fn bind(bind_address: &str, router: Router) -> Result<Self> {
        let listener = TcpListener::bind(bind_address)
            .await
            .with_context(|| format!("Failed to bind API listener on {bind_address}"))?;
        Ok(Self { listener, router })
    }

    /// Address actually bound.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read API listener address")
    }

    /// Serve until a shutdown signal, then drain in-flight requests.
    #[instrument(skip_all)]
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let addr = self.local_addr()?;
        info!(address = %addr, "API server started");

        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await
        .context("API server failed")?;

        info!("API server stopped");
        Ok(())
    }
}
