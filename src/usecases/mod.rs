//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces.
//!
//! Use cases:
//! - `StockPriceService`: quote lookup with anonymized like tracking

pub mod stock_prices;

pub use stock_prices::{StockPriceError, StockPriceService, MAX_SYMBOLS};
