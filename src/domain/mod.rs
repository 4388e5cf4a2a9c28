//! Domain layer - Core business logic and models.
//!
//! Pure logic for the stock price checker: symbol normalization, client
//! address anonymization, the like ledger and the response shapes.
//! No I/O here (hexagonal architecture inner ring).

pub mod anonymizer;
pub mod ledger;
pub mod stock_data;
pub mod symbol;

// Re-export core types for convenience
pub use anonymizer::{anonymize, AnonymizedIp};
pub use ledger::LikeLedger;
pub use stock_data::{RelativeStockLikes, StockData, StockLikes, StockPriceResponse};
pub use symbol::{Quote, Symbol};
