//! WebSocket transport abstraction
//!
//! A connection is split into a write half ([`FrameSink`]) and a read half
//! ([`FrameSource`]) so the read loop and the heartbeat keeper can run
//! concurrently. The write half is shared through [`SharedWriter`], which
//! serialises every write behind one async mutex.
//!
//! # Example
//!
//! ```no_run
//! use bitmex_realtime::transport::{Connector, TransportError, WsConnector};
//!
//! async fn example() -> Result<(), TransportError> {
//!     let (mut sink, mut source) = WsConnector::new()
//!         .connect("wss://www.bitmex.com/realtime")
//!         .await?;
//!     sink.send("ping").await?;
//!     if let Some(frame) = source.recv().await? {
//!         println!("Received: {}", frame);
//!     }
//!     sink.close().await
//! }
//! ```

use async_trait::async_trait;
use bitmex_types::Request;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, instrument, trace};

/// Transport layer errors
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection closed
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// Operation timed out
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// Protocol error
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Write half of a connection
#[async_trait]
pub trait FrameSink: Send {
    /// Send a text frame
    async fn send(&mut self, text: &str) -> Result<(), TransportError>;

    /// Close the connection gracefully
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Read half of a connection
#[async_trait]
pub trait FrameSource: Send {
    /// Receive the next text frame
    ///
    /// Returns `None` if the peer closed the connection.
    async fn recv(&mut self) -> Result<Option<String>, TransportError>;
}

/// Opens connections
///
/// This trait enables unit testing of the session loop by allowing mock
/// implementations to be injected instead of real WebSocket connections.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect to `url` and return the two halves of the connection
    async fn connect(
        &self,
        url: &str,
    ) -> Result<(Box<dyn FrameSink>, Box<dyn FrameSource>), TransportError>;
}

/// Write half shared between the session loop and the heartbeat keeper
#[derive(Clone)]
pub struct SharedWriter {
    inner: Arc<Mutex<Box<dyn FrameSink>>>,
}

impl SharedWriter {
    /// Wrap a write half
    pub fn new(sink: Box<dyn FrameSink>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sink)),
        }
    }

    /// Send a raw text frame
    pub async fn send_text(&self, text: &str) -> Result<(), TransportError> {
        self.inner.lock().await.send(text).await
    }

    /// Serialize and send a control request
    pub async fn send_request(&self, request: &Request) -> Result<(), TransportError> {
        let json = request
            .to_json()
            .map_err(|e| TransportError::Protocol(e.to_string()))?;
        trace!(%json, "Sending request");
        self.send_text(&json).await
    }

    /// Close the connection
    pub async fn close(&self) -> Result<(), TransportError> {
        self.inner.lock().await.close().await
    }
}

impl std::fmt::Debug for SharedWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedWriter").finish_non_exhaustive()
    }
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Real WebSocket connector using tokio-tungstenite
#[derive(Debug, Clone)]
pub struct WsConnector {
    connect_timeout: Duration,
}

impl Default for WsConnector {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl WsConnector {
    /// Create a connector with the default 10s connect timeout
    pub fn new() -> Self {
        Self::default()
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

#[async_trait]
impl Connector for WsConnector {
    #[instrument(skip(self))]
    async fn connect(
        &self,
        url: &str,
    ) -> Result<(Box<dyn FrameSink>, Box<dyn FrameSource>), TransportError> {
        debug!("Connecting to WebSocket");

        let (ws_stream, _response) = timeout(self.connect_timeout, connect_async(url))
            .await
            .map_err(|_| TransportError::Timeout(self.connect_timeout))?
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        debug!("WebSocket connected");
        let (write, read) = ws_stream.split();
        Ok((Box::new(WsSink { inner: write }), Box::new(WsSource { inner: read })))
    }
}

struct WsSink {
    inner: SplitSink<WsStream, Message>,
}

#[async_trait]
impl FrameSink for WsSink {
    async fn send(&mut self, text: &str) -> Result<(), TransportError> {
        self.inner
            .send(Message::Text(text.to_string()))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.inner
            .close()
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }
}

struct WsSource {
    inner: SplitStream<WsStream>,
}

#[async_trait]
impl FrameSource for WsSource {
    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            match self.inner.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Binary(data))) => {
                    return String::from_utf8(data)
                        .map(Some)
                        .map_err(|e| TransportError::Protocol(e.to_string()));
                }
                Some(Ok(Message::Close(_))) => return Ok(None),
                // Control and raw frames never carry table data
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => continue,
                Some(Err(e)) => return Err(TransportError::ReceiveFailed(e.to_string())),
                None => return Err(TransportError::ConnectionClosed),
            }
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockConnector;

#[cfg(any(test, feature = "test-utils"))]
mod mock {
    //! Scripted connector for tests
    //!
    //! Inbound frames are fed through an unbounded channel owned by the
    //! connector, so a source with nothing queued stays pending instead of
    //! failing. That lets tests exercise the read deadline.

    use super::*;
    use parking_lot::Mutex as SyncMutex;
    use tokio::sync::mpsc;

    enum Inbound {
        Frame(String),
        Close,
        Error(TransportError),
    }

    struct MockState {
        inbound_tx: mpsc::UnboundedSender<Inbound>,
        inbound_rx: Option<mpsc::UnboundedReceiver<Inbound>>,
        sent: Vec<String>,
        fail_connect: bool,
        fail_send_containing: Option<String>,
        stall_send_containing: Option<String>,
        stall_close: bool,
        stalled: usize,
        connects: usize,
        closes: usize,
    }

    /// Mock connector that captures outbound frames and replays scripted inbound ones
    #[derive(Clone)]
    pub struct MockConnector {
        state: Arc<SyncMutex<MockState>>,
    }

    impl Default for MockConnector {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockConnector {
        /// Create a new mock connector
        pub fn new() -> Self {
            let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
            Self {
                state: Arc::new(SyncMutex::new(MockState {
                    inbound_tx,
                    inbound_rx: Some(inbound_rx),
                    sent: Vec::new(),
                    fail_connect: false,
                    fail_send_containing: None,
                    stall_send_containing: None,
                    stall_close: false,
                    stalled: 0,
                    connects: 0,
                    closes: 0,
                })),
            }
        }

        /// Queue an inbound text frame
        pub fn push_frame(&self, frame: impl Into<String>) {
            let _ = self.state.lock().inbound_tx.send(Inbound::Frame(frame.into()));
        }

        /// Queue several inbound text frames
        pub fn push_frames(&self, frames: impl IntoIterator<Item = impl Into<String>>) {
            for frame in frames {
                self.push_frame(frame);
            }
        }

        /// Simulate the peer closing the connection
        pub fn push_close(&self) {
            let _ = self.state.lock().inbound_tx.send(Inbound::Close);
        }

        /// Simulate a receive error
        pub fn push_error(&self, error: TransportError) {
            let _ = self.state.lock().inbound_tx.send(Inbound::Error(error));
        }

        /// Make the next connect attempt fail
        pub fn fail_connect(&self) {
            self.state.lock().fail_connect = true;
        }

        /// Fail every send whose text contains `pattern`
        pub fn fail_send_containing(&self, pattern: impl Into<String>) {
            self.state.lock().fail_send_containing = Some(pattern.into());
        }

        /// Leave every send whose text contains `pattern` pending forever
        pub fn stall_send_containing(&self, pattern: impl Into<String>) {
            self.state.lock().stall_send_containing = Some(pattern.into());
        }

        /// Leave close calls pending forever
        pub fn stall_close(&self) {
            self.state.lock().stall_close = true;
        }

        /// Number of sends and closes left pending so far
        pub fn stalled_count(&self) -> usize {
            self.state.lock().stalled
        }

        /// Frames successfully sent so far
        pub fn sent(&self) -> Vec<String> {
            self.state.lock().sent.clone()
        }

        /// Number of successful connects
        pub fn connect_count(&self) -> usize {
            self.state.lock().connects
        }

        /// Number of close calls on the write half
        pub fn close_count(&self) -> usize {
            self.state.lock().closes
        }
    }

    #[async_trait]
    impl Connector for MockConnector {
        async fn connect(
            &self,
            _url: &str,
        ) -> Result<(Box<dyn FrameSink>, Box<dyn FrameSource>), TransportError> {
            let mut state = self.state.lock();
            if state.fail_connect {
                return Err(TransportError::ConnectionFailed("mock connection failure".into()));
            }
            let inbound = state
                .inbound_rx
                .take()
                .ok_or_else(|| TransportError::ConnectionFailed("mock already connected".into()))?;
            state.connects += 1;

            Ok((
                Box::new(MockSink {
                    state: Arc::clone(&self.state),
                }),
                Box::new(MockSource { inbound }),
            ))
        }
    }

    struct MockSink {
        state: Arc<SyncMutex<MockState>>,
    }

    #[async_trait]
    impl FrameSink for MockSink {
        async fn send(&mut self, text: &str) -> Result<(), TransportError> {
            let stall = {
                let mut state = self.state.lock();
                let matches = |pattern: &Option<String>| {
                    pattern.as_deref().is_some_and(|p| text.contains(p))
                };
                if matches(&state.fail_send_containing) {
                    return Err(TransportError::SendFailed("mock send failure".into()));
                }
                if matches(&state.stall_send_containing) {
                    state.stalled += 1;
                    true
                } else {
                    state.sent.push(text.to_string());
                    false
                }
            };
            if stall {
                std::future::pending::<()>().await;
            }
            Ok(())
        }

        async fn close(&mut self) -> Result<(), TransportError> {
            let stall = {
                let mut state = self.state.lock();
                state.closes += 1;
                if state.stall_close {
                    state.stalled += 1;
                }
                state.stall_close
            };
            if stall {
                std::future::pending::<()>().await;
            }
            Ok(())
        }
    }

    struct MockSource {
        inbound: mpsc::UnboundedReceiver<Inbound>,
    }

    #[async_trait]
    impl FrameSource for MockSource {
        async fn recv(&mut self) -> Result<Option<String>, TransportError> {
            match self.inbound.recv().await {
                Some(Inbound::Frame(frame)) => Ok(Some(frame)),
                Some(Inbound::Close) => Ok(None),
                Some(Inbound::Error(error)) => Err(error),
                None => Err(TransportError::ConnectionClosed),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_send_recv() {
        let mock = MockConnector::new();
        mock.push_frame(r#"{"info":"Welcome"}"#);

        let (mut sink, mut source) = mock.connect("wss://mock.test").await.unwrap();
        assert_eq!(mock.connect_count(), 1);

        sink.send("ping").await.unwrap();
        assert_eq!(mock.sent(), vec!["ping".to_string()]);

        let frame = source.recv().await.unwrap();
        assert!(frame.unwrap().contains("Welcome"));
    }

    #[tokio::test]
    async fn test_mock_connection_failure() {
        let mock = MockConnector::new();
        mock.fail_connect();

        let result = mock.connect("wss://mock.test").await;
        assert!(matches!(result, Err(TransportError::ConnectionFailed(_))));
        assert_eq!(mock.connect_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_close_and_error() {
        let mock = MockConnector::new();
        mock.push_close();
        mock.push_error(TransportError::ReceiveFailed("reset".into()));

        let (_sink, mut source) = mock.connect("wss://mock.test").await.unwrap();
        assert!(source.recv().await.unwrap().is_none());
        assert!(matches!(
            source.recv().await,
            Err(TransportError::ReceiveFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_idle_source_stays_pending() {
        let mock = MockConnector::new();
        let (_sink, mut source) = mock.connect("wss://mock.test").await.unwrap();

        let result = timeout(Duration::from_millis(20), source.recv()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_shared_writer_serialises_requests() {
        let mock = MockConnector::new();
        mock.fail_send_containing("unsubscribe");
        let (sink, _source) = mock.connect("wss://mock.test").await.unwrap();
        let writer = SharedWriter::new(sink);

        let sub = Request::new(bitmex_types::Operation::Subscribe, vec!["trade".into()]);
        writer.send_request(&sub).await.unwrap();
        let unsub = sub.with_op(bitmex_types::Operation::Unsubscribe);
        assert!(writer.send_request(&unsub).await.is_err());

        writer.close().await.unwrap();
        assert_eq!(mock.sent(), vec![r#"{"op":"subscribe","args":["trade"]}"#.to_string()]);
        assert_eq!(mock.close_count(), 1);
    }
}
