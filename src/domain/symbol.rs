//! Ticker symbol and quote types.
//!
//! A `Symbol` is the case-insensitive identity of a stock: every
//! constructor normalizes to uppercase, so `aapl`, `Aapl` and `AAPL`
//! compare, hash and serialize identically.

use serde::Serialize;

/// Normalized (trimmed, uppercase) ticker symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Normalize a raw ticker. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A single price quote as returned by a quote source.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// Symbol reported by the source (normalized).
    pub symbol: Symbol,
    /// Latest price. Zero when the source omitted it.
    pub price: f64,
}

impl Quote {
    pub fn new(symbol: Symbol, price: f64) -> Self {
        Self { symbol, price }
    }
}
