//! Error types for realtime sessions

use crate::transport::TransportError;
use bitmex_types::EventKind;
use std::time::Duration;

/// Reasons a realtime session ends
#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    /// Opening the WebSocket failed
    #[error("Failed to connect to {url}: {source}")]
    Connect {
        /// Endpoint that was dialled
        url: String,
        /// Underlying transport failure
        #[source]
        source: TransportError,
    },

    /// Writing the authentication request failed
    #[error("Authentication write failed: {0}")]
    Authenticate(#[source] TransportError),

    /// Writing a subscribe request failed
    #[error("Subscribe write failed: {0}")]
    Subscribe(#[source] TransportError),

    /// Reading from the connection failed
    #[error("Read failed: {0}")]
    Read(#[source] TransportError),

    /// No frame arrived within the read deadline
    #[error("No frame received within {0:?}")]
    ReadTimeout(Duration),

    /// Peer closed the connection
    #[error("Connection closed by server")]
    ConnectionClosed,

    /// Caller cancelled the session
    #[error("Session cancelled")]
    Cancelled,

    /// The event receiver was dropped
    #[error("Event receiver closed")]
    OutputClosed,
}

impl RealtimeError {
    /// Check if this error is the caller's own cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if opening a fresh session is likely to succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. }
                | Self::Authenticate(_)
                | Self::Subscribe(_)
                | Self::Read(_)
                | Self::ReadTimeout(_)
                | Self::ConnectionClosed
        )
    }
}

/// Result type for realtime operations
pub type RealtimeResult<T> = Result<T, RealtimeError>;

/// A table frame whose rows did not match the shape of its kind
#[derive(Debug, thiserror::Error)]
#[error("Failed to decode {kind} rows: {source}")]
pub struct DecodeError {
    /// Kind the topic classified as
    pub kind: EventKind,
    /// Underlying JSON error
    #[source]
    pub source: serde_json::Error,
}
