//! Async client for the BitMEX realtime WebSocket API
//!
//! A session connects, optionally authenticates, subscribes to a set of
//! topics and then streams every table frame it receives as a typed
//! [`Event`] over a tokio channel. Keep-alive pings run alongside the read
//! loop. When the session ends, whether cancelled, timed out or dropped by
//! the server, it unsubscribes and closes the connection before returning.
//!
//! There is no automatic reconnection; call [`connect`] again.
//!
//! # Example
//!
//! ```no_run
//! use bitmex_realtime::{RealtimeSession, SessionConfig, SessionContext, Endpoint};
//! use tokio::sync::mpsc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let ctx = SessionContext::new(CancellationToken::new());
//!     let (tx, mut rx) = mpsc::channel(1024);
//!
//!     let session = RealtimeSession::new(
//!         SessionConfig::new().with_endpoint(Endpoint::Testnet),
//!     );
//!
//!     let runner = ctx.clone();
//!     tokio::spawn(async move {
//!         session.run(&runner, &tx, &["trade", "quote"], &["XBTUSD"]).await
//!     });
//!
//!     while let Some(event) = rx.recv().await {
//!         println!("{} {} {:?}", event.kind(), event.symbol, event.action);
//!     }
//! }
//! ```

pub mod context;
pub mod decoder;
pub mod endpoint;
pub mod error;
pub mod events;
pub mod heartbeat;
pub mod session;
pub mod subscription;
pub mod transport;

// Re-export main types
pub use context::SessionContext;
pub use decoder::{Decoder, KNOWN_SYMBOLS, UNDEFINED_SYMBOL};
pub use endpoint::Endpoint;
pub use error::{DecodeError, RealtimeError, RealtimeResult};
pub use events::{Event, Payload};
pub use heartbeat::{Heartbeat, HeartbeatConfig, PING_FRAME};
pub use session::{connect, RealtimeSession, SessionConfig, SessionState};
pub use subscription::{build_subscribe, build_unsubscribe, SubscriptionManager};
pub use transport::{Connector, FrameSink, FrameSource, SharedWriter, TransportError, WsConnector};

#[cfg(any(test, feature = "test-utils"))]
pub use transport::MockConnector;

// Re-export crates users need to build a session
pub use bitmex_auth::Credentials;
pub use bitmex_types::{self, Action, EventKind};
