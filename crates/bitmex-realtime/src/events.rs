//! Typed events delivered to the caller
//!
//! Every data frame becomes one [`Event`]: the symbol derived from its
//! topic, the table action, and the rows decoded into the shape registered
//! for the topic's [`EventKind`].

use crate::error::DecodeError;
use bitmex_types::{
    Action, Affiliate, Announcement, Chat, ConnectedUsers, EventKind, Execution, Funding,
    Instrument, Insurance, Liquidation, Margin, Notification, Order, OrderBook, OrderBookL2,
    Position, Quote, Settlement, Trade, TradeBin, Transaction, Wallet,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A classified data frame
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Symbol derived from the topic, `"undefined"` if none could be found
    pub symbol: String,
    /// Table action
    pub action: Action,
    /// Decoded rows
    pub payload: Payload,
}

impl Event {
    /// Kind of this event
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// Returns true if the topic was not recognised
    pub fn is_undefined(&self) -> bool {
        self.kind() == EventKind::Undefined
    }
}

/// Rows of a data frame, one variant per [`EventKind`]
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Announcement(Vec<Announcement>),
    Chat(Vec<Chat>),
    Connected(Vec<ConnectedUsers>),
    Funding(Vec<Funding>),
    Instrument(Vec<Instrument>),
    Insurance(Vec<Insurance>),
    Liquidation(Vec<Liquidation>),
    OrderBook(Vec<OrderBook>),
    OrderBookL2(Vec<OrderBookL2>),
    PublicNotifications(Vec<Notification>),
    Quote(Vec<Quote>),
    Settlement(Vec<Settlement>),
    Trade(Vec<Trade>),
    TradeBin(Vec<TradeBin>),
    Affiliate(Vec<Affiliate>),
    Execution(Vec<Execution>),
    Order(Vec<Order>),
    Margin(Vec<Margin>),
    Position(Vec<Position>),
    PrivateNotifications(Vec<Notification>),
    Transact(Vec<Transaction>),
    Wallet(Vec<Wallet>),
    /// Unrecognised topic; the whole frame is kept verbatim
    Undefined { raw: String },
}

fn rows<T: DeserializeOwned>(kind: EventKind, data: Value) -> Result<Vec<T>, DecodeError> {
    serde_json::from_value(data).map_err(|source| DecodeError { kind, source })
}

impl Payload {
    /// Decode `data` into the row shape registered for `kind`
    ///
    /// `raw` is the full frame text and is only kept for
    /// [`EventKind::Undefined`].
    pub fn decode(kind: EventKind, data: Value, raw: &str) -> Result<Self, DecodeError> {
        let payload = match kind {
            EventKind::Announcement => Self::Announcement(rows(kind, data)?),
            EventKind::Chat => Self::Chat(rows(kind, data)?),
            EventKind::Connected => Self::Connected(rows(kind, data)?),
            EventKind::Funding => Self::Funding(rows(kind, data)?),
            EventKind::Instrument => Self::Instrument(rows(kind, data)?),
            EventKind::Insurance => Self::Insurance(rows(kind, data)?),
            EventKind::Liquidation => Self::Liquidation(rows(kind, data)?),
            EventKind::OrderBook => Self::OrderBook(rows(kind, data)?),
            EventKind::OrderBookL2 => Self::OrderBookL2(rows(kind, data)?),
            EventKind::PublicNotifications => Self::PublicNotifications(rows(kind, data)?),
            EventKind::Quote => Self::Quote(rows(kind, data)?),
            EventKind::Settlement => Self::Settlement(rows(kind, data)?),
            EventKind::Trade => Self::Trade(rows(kind, data)?),
            EventKind::TradeBin => Self::TradeBin(rows(kind, data)?),
            EventKind::Affiliate => Self::Affiliate(rows(kind, data)?),
            EventKind::Execution => Self::Execution(rows(kind, data)?),
            EventKind::Order => Self::Order(rows(kind, data)?),
            EventKind::Margin => Self::Margin(rows(kind, data)?),
            EventKind::Position => Self::Position(rows(kind, data)?),
            EventKind::PrivateNotifications => Self::PrivateNotifications(rows(kind, data)?),
            EventKind::Transact => Self::Transact(rows(kind, data)?),
            EventKind::Wallet => Self::Wallet(rows(kind, data)?),
            EventKind::Undefined => Self::Undefined {
                raw: raw.to_string(),
            },
        };
        Ok(payload)
    }

    /// Kind of these rows
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Announcement(_) => EventKind::Announcement,
            Self::Chat(_) => EventKind::Chat,
            Self::Connected(_) => EventKind::Connected,
            Self::Funding(_) => EventKind::Funding,
            Self::Instrument(_) => EventKind::Instrument,
            Self::Insurance(_) => EventKind::Insurance,
            Self::Liquidation(_) => EventKind::Liquidation,
            Self::OrderBook(_) => EventKind::OrderBook,
            Self::OrderBookL2(_) => EventKind::OrderBookL2,
            Self::PublicNotifications(_) => EventKind::PublicNotifications,
            Self::Quote(_) => EventKind::Quote,
            Self::Settlement(_) => EventKind::Settlement,
            Self::Trade(_) => EventKind::Trade,
            Self::TradeBin(_) => EventKind::TradeBin,
            Self::Affiliate(_) => EventKind::Affiliate,
            Self::Execution(_) => EventKind::Execution,
            Self::Order(_) => EventKind::Order,
            Self::Margin(_) => EventKind::Margin,
            Self::Position(_) => EventKind::Position,
            Self::PrivateNotifications(_) => EventKind::PrivateNotifications,
            Self::Transact(_) => EventKind::Transact,
            Self::Wallet(_) => EventKind::Wallet,
            Self::Undefined { .. } => EventKind::Undefined,
        }
    }

    /// Number of decoded rows, zero for undefined payloads
    pub fn len(&self) -> usize {
        match self {
            Self::Announcement(r) => r.len(),
            Self::Chat(r) => r.len(),
            Self::Connected(r) => r.len(),
            Self::Funding(r) => r.len(),
            Self::Instrument(r) => r.len(),
            Self::Insurance(r) => r.len(),
            Self::Liquidation(r) => r.len(),
            Self::OrderBook(r) => r.len(),
            Self::OrderBookL2(r) => r.len(),
            Self::PublicNotifications(r) | Self::PrivateNotifications(r) => r.len(),
            Self::Quote(r) => r.len(),
            Self::Settlement(r) => r.len(),
            Self::Trade(r) => r.len(),
            Self::TradeBin(r) => r.len(),
            Self::Affiliate(r) => r.len(),
            Self::Execution(r) => r.len(),
            Self::Order(r) => r.len(),
            Self::Margin(r) => r.len(),
            Self::Position(r) => r.len(),
            Self::Transact(r) => r.len(),
            Self::Wallet(r) => r.len(),
            Self::Undefined { .. } => 0,
        }
    }

    /// Returns true if there are no decoded rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
