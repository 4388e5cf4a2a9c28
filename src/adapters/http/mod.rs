//! HTTP API Adapter
//!
//! Serves `GET /api/stock-prices` via axum 0.7.
//!
//! Sub-modules:
//! - `routes`: router, query parsing, client address, error mapping
//! - `server`: listener binding and graceful shutdown

pub mod routes;
pub mod server;

pub use routes::{router, ApiState, STOCK_PRICES_PATH};
pub use server::ApiServer;
