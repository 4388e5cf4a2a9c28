//! Stock Prices Route - `GET /api/stock-prices`
//!
//! Extracts the query (`stock` may repeat), resolves the client
//! address and delegates to `StockPriceService`. Errors become
//! `{ "error": "<message>" }` bodies:
//! - 400 for missing or too many symbols
//! - 502 when the upstream quote source fails

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::domain::stock_data::StockPriceResponse;
use crate::ports::QuoteSource;
use crate::usecases::{StockPriceError, StockPriceService};

/// Path of the stock prices endpoint.
pub const STOCK_PRICES_PATH: &str = "/api/stock-prices";

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Router state shared by all requests.
pub struct ApiState<Q: QuoteSource> {
    service: Arc<StockPriceService<Q>>,
    trust_forwarded_for: bool,
}

impl<Q: QuoteSource> ApiState<Q> {
    pub fn new(service: Arc<StockPriceService<Q>>, trust_forwarded_for: bool) -> Self {
        Self {
            service,
            trust_forwarded_for,
        }
    }
}

// Manual impl: `Q` itself need not be `Clone`.
impl<Q: QuoteSource> Clone for ApiState<Q> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            trust_forwarded_for: self.trust_forwarded_for,
        }
    }
}

/// Build the public API router.
pub fn router<Q: QuoteSource>(state: ApiState<Q>) -> Router {
    Router::new()
        .route(STOCK_PRICES_PATH, get(stock_prices::<Q>))
        .with_state(state)
}

/// Parsed query of a stock prices request.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct StockQuery {
    /// `stock` values in request order.
    pub stocks: Vec<String>,
    /// True only when the last `like` value is exactly `"true"`.
    pub like: bool,
}

impl StockQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "stock" => query.stocks.push(value),
                "like" => query.like = value == "true",
                _ => {}
            }
        }
        query
    }
}

/// Resolve the raw client address for like deduplication.
///
/// With `trust_forwarded_for`, the first `X-Forwarded-For` entry wins
/// over the TCP peer. Entries in `ip:port` or `[ipv6]:port` form are
/// reduced to the bare IP.
pub fn client_address(headers: &HeaderMap, peer: SocketAddr, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = headers
            .get(FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(addr) = forwarded {
            return match addr.parse::<SocketAddr>() {
                Ok(socket) => socket.ip().to_string(),
                Err(_) => addr.to_string(),
            };
        }
    }
    peer.ip().to_string()
}

async fn stock_prices<Q: QuoteSource>(
    State(state): State<ApiState<Q>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let query = StockQuery::from_pairs(pairs);
    let address = client_address(&headers, peer, state.trust_forwarded_for);
    let span = info_span!("stock_prices", request_id = %Uuid::new_v4());

    let result = state
        .service
        .handle_request(&query.stocks, query.like, &address)
        .instrument(span)
        .await;

    match result {
        Ok(stock_data) => Json(StockPriceResponse { stock_data }).into_response(),
        Err(e) => e.into_response(),
    }
}

impl StockPriceError {
    /// HTTP status for each error kind.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingSymbol | Self::TooManySymbols { .. } => StatusCode::BAD_REQUEST,
            Self::UpstreamFetchFailure(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for StockPriceError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
