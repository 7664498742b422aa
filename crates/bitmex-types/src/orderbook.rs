//! Snapshot orderbook (`orderBook10`) with best-effort row decoding
//!
//! Rows arrive as raw `[price, size]` arrays. A row with the wrong arity or a
//! non-numeric element is skipped on its own; the rest of the book still
//! decodes.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// A single `[price, size]` row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Book {
    /// Price of this level
    pub price: f64,
    /// Size at this level
    pub size: f64,
}

impl Book {
    /// Create a new row
    pub fn new(price: f64, size: f64) -> Self {
        Self { price, size }
    }

    /// Decode one raw row, `None` if it is not a two-element numeric array
    pub fn from_row(row: &Value) -> Option<Self> {
        match row.as_array()?.as_slice() {
            [price, size] => Some(Self::new(price.as_f64()?, size.as_f64()?)),
            _ => None,
        }
    }

    /// Decode a list of raw rows, dropping malformed ones
    pub fn from_rows(rows: &[Value]) -> Vec<Self> {
        rows.iter().filter_map(Self::from_row).collect()
    }
}

/// Orderbook snapshot for one symbol
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawOrderBook")]
pub struct OrderBook {
    /// Instrument symbol, empty when the row carried none
    pub symbol: String,
    /// Snapshot time, `None` when absent or unparseable
    pub timestamp: Option<DateTime<Utc>>,
    /// Bid rows, best first as sent by the server
    pub bids: Vec<Book>,
    /// Ask rows, best first as sent by the server
    pub asks: Vec<Book>,
}

/// Wire form; `bids` and `asks` must be arrays, everything else is lenient
#[derive(Deserialize)]
struct RawOrderBook {
    #[serde(default)]
    symbol: Option<Value>,
    #[serde(default)]
    timestamp: Option<Value>,
    bids: Vec<Value>,
    asks: Vec<Value>,
}

impl From<RawOrderBook> for OrderBook {
    fn from(raw: RawOrderBook) -> Self {
        let symbol = match raw.symbol {
            Some(Value::String(symbol)) => symbol,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let timestamp = raw
            .timestamp
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc));

        Self {
            symbol,
            timestamp,
            bids: Book::from_rows(&raw.bids),
            asks: Book::from_rows(&raw.asks),
        }
    }
}

impl OrderBook {
    /// Best (first) bid
    pub fn best_bid(&self) -> Option<&Book> {
        self.bids.first()
    }

    /// Best (first) ask
    pub fn best_ask(&self) -> Option<&Book> {
        self.asks.first()
    }

    /// Spread between best ask and best bid
    pub fn spread(&self) -> Option<f64> {
        Some(self.best_ask()?.price - self.best_bid()?.price)
    }

    /// Mid price
    pub fn mid_price(&self) -> Option<f64> {
        Some((self.best_ask()?.price + self.best_bid()?.price) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_decode() {
        let rows = json!([[7024.5, 200430], [7024.5, 200430]]);
        let books = Book::from_rows(rows.as_array().unwrap());

        assert_eq!(books.len(), 2);
        for book in books {
            assert_eq!(book, Book::new(7024.5, 200430.0));
        }
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let rows = json!([
            [7024.5, 200430],
            [7024.5, 200430, 1],
            ["7024.5", 100],
            [7025.0],
            "not a row",
            [7026.0, 50]
        ]);
        let books = Book::from_rows(rows.as_array().unwrap());

        assert_eq!(books, vec![Book::new(7024.5, 200430.0), Book::new(7026.0, 50.0)]);
    }

    #[test]
    fn test_snapshot_decode() {
        let json = r#"{
            "symbol": "XBTUSD",
            "timestamp": "2019-03-01T12:00:00.123Z",
            "bids": [[3830, 100], [3829.5, 250]],
            "asks": [[3830.5, 300], [3831, 400, 9]]
        }"#;
        let book: OrderBook = serde_json::from_str(json).unwrap();

        assert_eq!(book.symbol, "XBTUSD");
        assert!(book.timestamp.is_some());
        assert_eq!(book.bids.len(), 2);
        assert_eq!(book.asks, vec![Book::new(3830.5, 300.0)]);
        assert_eq!(book.spread(), Some(0.5));
        assert_eq!(book.mid_price(), Some(3830.25));
    }

    #[test]
    fn test_bad_timestamp_falls_back() {
        let json = r#"{"symbol":"ETHUSD","timestamp":"yesterday","bids":[],"asks":[[1,2]]}"#;
        let book: OrderBook = serde_json::from_str(json).unwrap();

        assert!(book.timestamp.is_none());
        assert_eq!(book.best_ask(), Some(&Book::new(1.0, 2.0)));
        assert!(book.best_bid().is_none());
    }

    #[test]
    fn test_missing_side_fails() {
        let json = r#"{"symbol":"XBTUSD","bids":[[1,2]]}"#;
        assert!(serde_json::from_str::<OrderBook>(json).is_err());
    }
}
