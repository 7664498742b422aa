//! EventKind, Action and Side enums

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a classified inbound event
///
/// Each kind except [`EventKind::Undefined`] is registered against the topic
/// prefix returned by [`EventKind::topic_prefix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Site announcements
    Announcement,
    /// Trollbox chat
    Chat,
    /// Connected users / bots statistics
    Connected,
    /// Funding rate updates
    Funding,
    /// Instrument reference data and ticker
    Instrument,
    /// Insurance fund balance
    Insurance,
    /// Liquidation orders as they are entered into the book
    Liquidation,
    /// Top-of-book snapshots (`orderBook10`)
    OrderBook,
    /// Full level 2 orderbook rows (`orderBookL2`, `orderBookL2_25`)
    OrderBookL2,
    /// System-wide notifications
    PublicNotifications,
    /// Top level of the book
    Quote,
    /// Settlements
    Settlement,
    /// Live trades
    Trade,
    /// Trade bins (`tradeBin1m`, `tradeBin5m`, ...)
    TradeBin,

    // Private
    /// Affiliate status
    Affiliate,
    /// Individual executions
    Execution,
    /// Live orders
    Order,
    /// Account balance and margin
    Margin,
    /// Positions
    Position,
    /// Individual notifications
    PrivateNotifications,
    /// Deposit / withdrawal history
    Transact,
    /// Bitcoin address balance data
    Wallet,

    /// Topic not recognised by the classifier
    Undefined,
}

impl EventKind {
    /// Every kind that has a registered topic prefix
    pub const REGISTERED: [EventKind; 22] = [
        Self::Announcement,
        Self::Chat,
        Self::Connected,
        Self::Funding,
        Self::Instrument,
        Self::Insurance,
        Self::Liquidation,
        Self::OrderBook,
        Self::OrderBookL2,
        Self::PublicNotifications,
        Self::Quote,
        Self::Settlement,
        Self::Trade,
        Self::TradeBin,
        Self::Affiliate,
        Self::Execution,
        Self::Order,
        Self::Margin,
        Self::Position,
        Self::PrivateNotifications,
        Self::Transact,
        Self::Wallet,
    ];

    /// Topic prefix this kind is classified by
    ///
    /// Several prefixes overlap (`order` / `orderBook` / `orderBookL`,
    /// `trade` / `tradeBin`); callers must prefer the longest match.
    pub fn topic_prefix(&self) -> Option<&'static str> {
        let prefix = match self {
            Self::Announcement => "announcement",
            Self::Chat => "chat",
            Self::Connected => "connected",
            Self::Funding => "funding",
            Self::Instrument => "instrument",
            Self::Insurance => "insurance",
            Self::Liquidation => "liquidation",
            Self::OrderBook => "orderBook",
            Self::OrderBookL2 => "orderBookL",
            Self::PublicNotifications => "publicNotifications",
            Self::Quote => "quote",
            Self::Settlement => "settlement",
            Self::Trade => "trade",
            Self::TradeBin => "tradeBin",
            Self::Affiliate => "affiliate",
            Self::Execution => "execution",
            Self::Order => "order",
            Self::Margin => "margin",
            Self::Position => "position",
            Self::PrivateNotifications => "privateNotifications",
            Self::Transact => "transact",
            Self::Wallet => "wallet",
            Self::Undefined => return None,
        };
        Some(prefix)
    }

    /// Returns the kind name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderBookL2 => "orderBookL2",
            Self::Undefined => "undefined",
            other => other.topic_prefix().unwrap_or("undefined"),
        }
    }

    /// Returns true if this kind is only streamed on authenticated sessions
    pub fn is_private(&self) -> bool {
        matches!(
            self,
            Self::Affiliate
                | Self::Execution
                | Self::Order
                | Self::Margin
                | Self::Position
                | Self::PrivateNotifications
                | Self::Transact
                | Self::Wallet
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Table action tag attached to every data frame
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Action {
    /// Full image of the table; replaces local state
    Partial,
    /// New rows
    Insert,
    /// Changed fields of existing rows
    Update,
    /// Rows to remove
    Delete,
    /// Frame carried no action field
    #[default]
    Unspecified,
    /// Action not known to this client
    Other(String),
}

impl Action {
    /// Parse the wire `action` field
    pub fn from_wire(action: Option<&str>) -> Self {
        match action {
            Some("partial") => Self::Partial,
            Some("insert") => Self::Insert,
            Some("update") => Self::Update,
            Some("delete") => Self::Delete,
            Some("") | None => Self::Unspecified,
            Some(other) => Self::Other(other.to_string()),
        }
    }

    /// Returns the wire representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Partial => "partial",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Unspecified => "",
            Self::Other(other) => other,
        }
    }
}

/// Order / trade side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Buy
    Buy,
    /// Sell
    Sell,
}

impl Side {
    /// Returns the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}
