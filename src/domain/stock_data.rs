//! Response shapes for the stock prices endpoint.
//!
//! One requested symbol yields an object with the absolute like count;
//! two yield an ordered pair where each entry carries its like count
//! relative to the other.

use serde::Serialize;

use super::symbol::{Quote, Symbol};

/// Quote with its absolute like count (single-symbol mode).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockLikes {
    pub stock: Symbol,
    pub price: f64,
    pub likes: u64,
}

/// Quote with its like count relative to the paired quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelativeStockLikes {
    pub stock: Symbol,
    pub price: f64,
    pub rel_likes: i64,
}

/// Body of a successful response, under the `stockData` key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StockData {
    Single(StockLikes),
    Pair([RelativeStockLikes; 2]),
}

impl StockData {
    pub fn single(quote: Quote, likes: u64) -> Self {
        Self::Single(StockLikes {
            stock: quote.symbol,
            price: quote.price,
            likes,
        })
    }

    /// Build the pair shape; `rel_likes` of each side is its count minus
    /// the other's, so the two always sum to zero.
    pub fn pair(first: (Quote, u64), second: (Quote, u64)) -> Self {
        let (q0, l0) = first;
        let (q1, l1) = second;
        let diff = signed_diff(l0, l1);

        Self::Pair([
            RelativeStockLikes {
                stock: q0.symbol,
                price: q0.price,
                rel_likes: diff,
            },
            RelativeStockLikes {
                stock: q1.symbol,
                price: q1.price,
                rel_likes: -diff,
            },
        ])
    }
}

/// Wire envelope: `{ "stockData": ... }`.
#[derive(Debug, Clone, Serialize)]
pub struct StockPriceResponse {
    #[serde(rename = "stockData")]
    pub stock_data: StockData,
}

fn signed_diff(a: u64, b: u64) -> i64 {
    // Counts are bounded by distinct identities, far below i64::MAX.
    let a = i64::try_from(a).unwrap_or(i64::MAX);
    let b = i64::try_from(b).unwrap_or(i64::MAX);
    a - b
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn quote(s: &str, price: f64) -> Quote {
        Quote::new(Symbol::parse(s).unwrap(), price)
    }

    #[test]
    fn test_single_shape() {
        let body = StockPriceResponse {
            stock_data: StockData::single(quote("AAPL", 123.45), 3),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "stockData": { "stock": "AAPL", "price": 123.45, "likes": 3 } })
        );
    }

    #[test]
    fn test_pair_shape_and_symmetry() {
        let body = StockPriceResponse {
            stock_data: StockData::pair((quote("AAPL", 123.45), 1), (quote("GOOGL", 2500.0), 2)),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "stockData": [
                { "stock": "AAPL", "price": 123.45, "rel_likes": -1 },
                { "stock": "GOOGL", "price": 2500.0, "rel_likes": 1 }
            ] })
        );
    }

    #[test]
    fn test_pair_tie_is_zero() {
        let StockData::Pair([a, b]) = StockData::pair((quote("A", 1.0), 4), (quote("B", 2.0), 4)) else {
            panic!("expected pair");
        };
        assert_eq!(a.rel_likes, 0);
        assert_eq!(b.rel_likes, 0);
    }
}
