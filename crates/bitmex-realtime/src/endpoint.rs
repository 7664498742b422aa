//! WebSocket endpoint definitions

use std::fmt;

/// BitMEX realtime endpoints
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Endpoint {
    /// Production (default)
    #[default]
    Production,
    /// Testnet
    Testnet,
    /// Any other URL, e.g. a local relay
    Custom(String),
}

impl Endpoint {
    /// Get the WebSocket URL for this endpoint
    pub fn url(&self) -> &str {
        match self {
            Self::Production => "wss://www.bitmex.com/realtime",
            Self::Testnet => "wss://testnet.bitmex.com/realtime",
            Self::Custom(url) => url,
        }
    }

    /// Check if this endpoint trades real funds
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url())
    }
}
