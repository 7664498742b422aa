//! Frame classification and decoding
//!
//! A frame is a data frame when it is a JSON object with a string `table`
//! and a non-null `data`. Anything else (welcome banner, subscribe acks,
//! error replies, `pong`) is a control frame: it is logged and dropped.
//!
//! The topic in `table` is classified by the longest registered prefix, so
//! `orderBookL2_25` is an [`EventKind::OrderBookL2`] and never an
//! [`EventKind::OrderBook`] or [`EventKind::Order`].

use crate::error::DecodeError;
use crate::events::{Event, Payload};
use bitmex_types::{Action, EventKind};
use serde_json::Value;
use tracing::{debug, trace, warn};

/// Symbol assigned when the topic names none
pub const UNDEFINED_SYMBOL: &str = "undefined";

/// Symbols recognised as a bare topic suffix
pub const KNOWN_SYMBOLS: [&str; 3] = ["XBTUSD", "ETHUSD", "XRPUSD"];

/// Classifies and decodes inbound frames
///
/// Built once per session; the prefix table is sorted longest first so the
/// first match wins.
#[derive(Debug, Clone)]
pub struct Decoder {
    prefixes: Vec<(&'static str, EventKind)>,
    known_symbols: Vec<String>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Create a decoder for every registered kind
    pub fn new() -> Self {
        let mut prefixes: Vec<_> = EventKind::REGISTERED
            .iter()
            .filter_map(|kind| kind.topic_prefix().map(|prefix| (prefix, *kind)))
            .collect();
        prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self {
            prefixes,
            known_symbols: KNOWN_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the symbols recognised as a bare topic suffix
    pub fn with_known_symbols(mut self, symbols: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.known_symbols = symbols.into_iter().map(Into::into).collect();
        self
    }

    /// Classify a topic by its longest registered prefix
    pub fn classify(&self, topic: &str) -> EventKind {
        self.prefixes
            .iter()
            .find(|(prefix, _)| topic.starts_with(prefix))
            .map(|(_, kind)| *kind)
            .unwrap_or(EventKind::Undefined)
    }

    /// Derive the symbol a topic refers to
    ///
    /// `channel:SYMBOL` yields everything after the first `:`. Otherwise a
    /// known symbol at the end of the topic is used, and failing that
    /// [`UNDEFINED_SYMBOL`].
    pub fn symbol_for(&self, topic: &str) -> String {
        if let Some((_, symbol)) = topic.split_once(':') {
            return symbol.to_string();
        }
        self.known_symbols
            .iter()
            .find(|symbol| topic.ends_with(symbol.as_str()))
            .cloned()
            .unwrap_or_else(|| UNDEFINED_SYMBOL.to_string())
    }

    /// Decode one text frame
    ///
    /// Returns `Ok(None)` for control frames and frames without data, and an
    /// error when a recognised topic carries rows of the wrong shape.
    pub fn decode(&self, frame: &str) -> Result<Option<Event>, DecodeError> {
        let Ok(mut value) = serde_json::from_str::<Value>(frame) else {
            trace!(frame, "Ignoring non-JSON frame");
            return Ok(None);
        };

        let Some(table) = value.get("table").and_then(Value::as_str).map(str::to_owned) else {
            log_control(&value);
            return Ok(None);
        };

        let data = match value.get_mut("data").map(Value::take) {
            Some(Value::Null) | None => {
                debug!(table = %table, "Dropping table frame without data");
                return Ok(None);
            }
            Some(data) => data,
        };

        let action = Action::from_wire(value.get("action").and_then(Value::as_str));
        let kind = self.classify(&table);
        let payload = Payload::decode(kind, data, frame)?;

        trace!(table = %table, %kind, action = action.as_str(), rows = payload.len(), "Decoded frame");
        Ok(Some(Event {
            symbol: self.symbol_for(&table),
            action,
            payload,
        }))
    }
}

fn log_control(value: &Value) {
    let text = |key: &str| value.get(key).and_then(|v| v.as_str());

    if let Some(error) = value.get("error") {
        let status = value.get("status").and_then(|v| v.as_i64());
        warn!(
            error = %error,
            status = ?status,
            request = ?value.get("request"),
            "Server reported an error"
        );
    } else if let Some(success) = value.get("success") {
        let subscribe = text("subscribe");
        let unsubscribe = text("unsubscribe");
        debug!(
            success = %success,
            subscribe = ?subscribe,
            unsubscribe = ?unsubscribe,
            "Request acknowledged"
        );
    } else if let Some(info) = text("info") {
        debug!(info, "Server info");
    } else {
        trace!(frame = %value, "Ignoring control frame");
    }
}
