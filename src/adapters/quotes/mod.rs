//! Stock Quote Proxy Adapter
//!
//! Implements the `QuoteSource` port against the stock quote proxy
//! (`{base_url}/{SYMBOL}/quote`).
//!
//! Sub-modules:
//! - `client`: HTTP client with concurrency limit, timeout and retries
//! - `types`: proxy response types and conversion into `Quote`

pub mod client;
pub mod types;

pub use client::{QuoteProxyClient, QuoteProxyConfig};
