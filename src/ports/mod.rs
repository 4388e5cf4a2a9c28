//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `QuoteSource`: Latest price lookup for a ticker symbol
//! - `RequestMetrics`: Request outcome and latency reporting

pub mod metrics;
pub mod quote_source;

pub use metrics::RequestMetrics;
pub use quote_source::QuoteSource;
