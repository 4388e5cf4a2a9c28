//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies and exposes the service over HTTP.
//!
//! Adapter categories:
//! - `http`: public stock prices API
//! - `metrics`: Prometheus metrics export and health checks
//! - `quotes`: stock quote proxy client

pub mod http;
pub mod metrics;
pub mod quotes;
