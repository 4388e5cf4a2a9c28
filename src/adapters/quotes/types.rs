//! Quote Proxy Response Types
//!
//! Deserialization types for the stock quote proxy and the conversion
//! into the domain `Quote`. The proxy answers either a quote object or,
//! for symbols it does not know, a bare JSON string such as
//! `"Unknown symbol"`.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::symbol::{Quote, Symbol};

/// Quote object returned by `GET {base}/{SYMBOL}/quote`.
///
/// Only the fields the service uses are modelled.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyQuote {
  /// Symbol as reported by the proxy.
  pub symbol: Option<String>,
  /// Latest traded price.
  pub latest_price: Option<f64>,
}

/// Convert a raw proxy body into a `Quote` for `requested`.
///
/// - missing `symbol` falls back to the requested symbol
/// - missing or null `latestPrice` falls back to 0
/// - a non-object JSON body (unknown symbol) yields the requested symbol at 0
/// - invalid JSON or a negative / non-finite price is an error
pub fn parse_quote_body(requested: &Symbol, body: &str) -> Result<Quote> {
  let value: serde_json::Value =
    serde_json::from_str(body).context("Quote payload is not valid JSON")?;

  if !value.is_object() {
    return Ok(Quote::new(requested.clone(), 0.0));
  }

  let proxy: ProxyQuote =
    serde_json::from_value(value).context("Quote payload has unexpected field types")?;

  let symbol = proxy
    .symbol
    .as_deref()
    .and_then(Symbol::parse)
    .unwrap_or_else(|| requested.clone());

  let price = proxy.latest_price.unwrap_or(0.0);
  anyhow::ensure!(
    price.is_finite() && price >= 0.0,
    "Quote payload has invalid price {price} for {requested}"
  );

  Ok(Quote::new(symbol, price))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn aapl() -> Symbol {
    Symbol::parse("AAPL").unwrap()
  }

  #[test]
  fn test_full_payload() {
    let body = r#"{"symbol":"AAPL","latestPrice":189.84,"companyName":"Apple Inc."}"#;
    let quote = parse_quote_body(&aapl(), body).unwrap();
    assert_eq!(quote.symbol.as_str(), "AAPL");
    assert!((quote.price - 189.84).abs() < f64::EPSILON);
  }

  #[test]
  fn test_missing_price_defaults_to_zero() {
    let quote = parse_quote_body(&aapl(), r#"{"symbol":"AAPL"}"#).unwrap();
    assert_eq!(quote.price, 0.0);
  }

  #[test]
  fn test_null_price_defaults_to_zero() {
    let quote = parse_quote_body(&aapl(), r#"{"symbol":"AAPL","latestPrice":null}"#).unwrap();
    assert_eq!(quote.price, 0.0);
  }

  #[test]
  fn test_missing_symbol_uses_requested() {
    let quote = parse_quote_body(&aapl(), r#"{"latestPrice":1.5}"#).unwrap();
    assert_eq!(quote.symbol, aapl());
  }

  #[test]
  fn test_reported_symbol_is_normalized() {
    let quote = parse_quote_body(&aapl(), r#"{"symbol":"aapl","latestPrice":1.5}"#).unwrap();
    assert_eq!(quote.symbol.as_str(), "AAPL");
  }

  #[test]
  fn test_unknown_symbol_string_yields_zero_price() {
    let quote = parse_quote_body(&aapl(), r#""Unknown symbol""#).unwrap();
    assert_eq!(quote.symbol, aapl());
    assert_eq!(quote.price, 0.0);
  }

  #[test]
  fn test_invalid_json_is_error() {
    assert!(parse_quote_body(&aapl(), "<html>bad gateway</html>").is_err());
  }

  #[test]
  fn test_negative_price_is_error() {
    assert!(parse_quote_body(&aapl(), r#"{"symbol":"AAPL","latestPrice":-1}"#).is_err());
  }

  #[test]
  fn test_string_price_is_error() {
    assert!(parse_quote_body(&aapl(), r#"{"symbol":"AAPL","latestPrice":"12"}"#).is_err());
  }
}
