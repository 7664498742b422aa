//! Session lifecycle
//!
//! One session owns one connection and walks it through
//! `Connecting -> Authenticating -> Subscribing -> Streaming -> Unsubscribing -> Closed`.
//! Every exit path after a successful connect unsubscribes what was
//! subscribed and closes the connection before returning.

use crate::context::SessionContext;
use crate::decoder::Decoder;
use crate::endpoint::Endpoint;
use crate::error::{RealtimeError, RealtimeResult};
use crate::events::Event;
use crate::heartbeat::{Heartbeat, HeartbeatConfig};
use crate::subscription::SubscriptionManager;
use crate::transport::{Connector, FrameSource, SharedWriter, WsConnector};
use bitmex_auth::AUTH_VALIDITY_SECS;
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, error, info, info_span, warn, Instrument, Span};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Not started
    #[default]
    Idle,
    /// Opening the WebSocket
    Connecting,
    /// Writing the authentication request
    Authenticating,
    /// Writing subscribe requests
    Subscribing,
    /// Reading frames
    Streaming,
    /// Tearing down subscriptions
    Unsubscribing,
    /// Connection closed
    Closed,
}

/// Configuration for a realtime session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// WebSocket endpoint
    pub endpoint: Endpoint,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Maximum silence tolerated between inbound frames
    pub read_deadline: Duration,
    /// Time between keep-alive pings
    pub heartbeat_interval: Duration,
    /// Upper bound on a single keep-alive write
    pub write_deadline: Duration,
    /// How long the authentication signature stays valid
    pub auth_validity: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::Production,
            connect_timeout: Duration::from_secs(10),
            read_deadline: Duration::from_secs(300),
            heartbeat_interval: Duration::from_secs(5),
            write_deadline: Duration::from_secs(5),
            auth_validity: Duration::from_secs(AUTH_VALIDITY_SECS as u64),
        }
    }
}

impl SessionConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the read deadline
    pub fn with_read_deadline(mut self, deadline: Duration) -> Self {
        self.read_deadline = deadline;
        self
    }

    /// Set the keep-alive interval
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Set the keep-alive write deadline
    pub fn with_write_deadline(mut self, deadline: Duration) -> Self {
        self.write_deadline = deadline;
        self
    }

    /// Set the signature validity window
    pub fn with_auth_validity(mut self, validity: Duration) -> Self {
        self.auth_validity = validity;
        self
    }

    fn heartbeat(&self) -> HeartbeatConfig {
        HeartbeatConfig {
            interval: self.heartbeat_interval,
            write_deadline: self.write_deadline,
        }
    }

    fn auth_validity(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.auth_validity)
            .unwrap_or_else(|_| chrono::Duration::seconds(AUTH_VALIDITY_SECS))
    }
}

/// A realtime session runner
///
/// The runner is reusable: each [`RealtimeSession::run`] opens a fresh
/// connection. Reconnecting after a failure is the caller's decision.
pub struct RealtimeSession<C = WsConnector> {
    config: SessionConfig,
    connector: C,
    decoder: Decoder,
    span: Option<Span>,
    state: Arc<RwLock<SessionState>>,
}

impl RealtimeSession<WsConnector> {
    /// Create a session over a real WebSocket
    pub fn new(config: SessionConfig) -> Self {
        let connector = WsConnector::new().with_timeout(config.connect_timeout);
        Self::with_connector(config, connector)
    }
}

impl<C: Connector> RealtimeSession<C> {
    /// Create a session over a custom connector
    pub fn with_connector(config: SessionConfig, connector: C) -> Self {
        Self {
            config,
            connector,
            decoder: Decoder::new(),
            span: None,
            state: Arc::new(RwLock::new(SessionState::Idle)),
        }
    }

    /// Emit all session logs inside `span`
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Replace the frame decoder
    pub fn with_decoder(mut self, decoder: Decoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Get the session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Get the current state
    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    fn set_state(&self, state: SessionState) {
        let previous = std::mem::replace(&mut *self.state.write(), state);
        debug!(from = ?previous, to = ?state, "Session state changed");
    }

    /// Run one session until it is cancelled or fails
    ///
    /// Decoded events are pushed to `events`; a full channel blocks the read
    /// loop. The session always ends with an error: [`RealtimeError::Cancelled`]
    /// when the context was cancelled, otherwise the failure that ended it.
    pub async fn run<Ch, Sy>(
        &self,
        ctx: &SessionContext,
        events: &mpsc::Sender<Event>,
        channels: &[Ch],
        symbols: &[Sy],
    ) -> RealtimeResult<()>
    where
        Ch: AsRef<str> + Sync,
        Sy: AsRef<str> + Sync,
    {
        let span = self.span.clone().unwrap_or_else(|| {
            let channels: Vec<&str> = channels.iter().map(|c| c.as_ref()).collect();
            info_span!("realtime", endpoint = %self.config.endpoint, channels = ?channels)
        });

        let reason = self
            .run_session(ctx, events, channels, symbols)
            .instrument(span)
            .await;
        Err(reason)
    }

    async fn run_session<Ch, Sy>(
        &self,
        ctx: &SessionContext,
        events: &mpsc::Sender<Event>,
        channels: &[Ch],
        symbols: &[Sy],
    ) -> RealtimeError
    where
        Ch: AsRef<str> + Sync,
        Sy: AsRef<str> + Sync,
    {
        self.set_state(SessionState::Connecting);
        let url = self.config.endpoint.url().to_string();

        let (sink, mut source) = match self.connector.connect(&url).await {
            Ok(halves) => halves,
            Err(source) => {
                self.set_state(SessionState::Closed);
                let err = RealtimeError::Connect { url, source };
                error!(error = %err, "Connection failed");
                return err;
            }
        };
        info!("Connected");

        let writer = SharedWriter::new(sink);
        let mut subscriptions = SubscriptionManager::new();

        let reason = match self
            .establish(ctx, &writer, &mut subscriptions, channels, symbols)
            .await
        {
            Err(err) => err,
            Ok(()) => {
                self.set_state(SessionState::Streaming);
                let heartbeat = Heartbeat::spawn(
                    writer.clone(),
                    self.config.heartbeat(),
                    ctx.cancellation_token().child_token(),
                );
                let reason = self.stream(ctx, source.as_mut(), events).await;
                heartbeat.stop().await;
                reason
            }
        };

        self.set_state(SessionState::Unsubscribing);
        let write_deadline = self.config.write_deadline;
        subscriptions.unsubscribe(&writer, write_deadline).await;

        match timeout(write_deadline, writer.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(error = %e, "Error closing connection"),
            Err(_) => warn!(deadline = ?write_deadline, "Close timed out"),
        }
        self.set_state(SessionState::Closed);

        if reason.is_cancelled() {
            info!("Session cancelled");
        } else {
            error!(error = %reason, "Session ended");
        }
        reason
    }

    async fn establish<Ch, Sy>(
        &self,
        ctx: &SessionContext,
        writer: &SharedWriter,
        subscriptions: &mut SubscriptionManager,
        channels: &[Ch],
        symbols: &[Sy],
    ) -> RealtimeResult<()>
    where
        Ch: AsRef<str> + Sync,
        Sy: AsRef<str> + Sync,
    {
        if let Some(credentials) = ctx.credentials() {
            self.set_state(SessionState::Authenticating);
            let request = credentials.auth_request_with_validity(Utc::now(), self.config.auth_validity());
            writer
                .send_request(&request)
                .await
                .map_err(RealtimeError::Authenticate)?;
            info!("Authentication request sent");
        }

        self.set_state(SessionState::Subscribing);
        subscriptions.subscribe(writer, channels, symbols).await
    }

    async fn stream(
        &self,
        ctx: &SessionContext,
        source: &mut dyn FrameSource,
        events: &mpsc::Sender<Event>,
    ) -> RealtimeError {
        let deadline = self.config.read_deadline;

        loop {
            if ctx.is_cancelled() {
                return RealtimeError::Cancelled;
            }

            let frame = match timeout(deadline, source.recv()).await {
                Err(_) => return RealtimeError::ReadTimeout(deadline),
                Ok(Err(e)) => return RealtimeError::Read(e),
                Ok(Ok(None)) => return RealtimeError::ConnectionClosed,
                Ok(Ok(Some(frame))) => frame,
            };

            let event = match self.decoder.decode(&frame) {
                Ok(event) => event,
                Err(e) => {
                    debug!(error = %e, "Dropping undecodable frame");
                    None
                }
            };

            if ctx.is_cancelled() {
                return RealtimeError::Cancelled;
            }

            if let Some(event) = event {
                if events.send(event).await.is_err() {
                    return RealtimeError::OutputClosed;
                }
            }
        }
    }
}

/// Run a session against the production endpoint
///
/// Subscribes to `channels` x `symbols` (bare channel names when `symbols`
/// is empty), authenticating first when `ctx` carries credentials, and
/// pushes every decoded event to `events`. Intended to be spawned:
///
/// ```no_run
/// use bitmex_realtime::{connect, SessionContext};
/// use tokio::sync::mpsc;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() {
/// let ctx = SessionContext::new(CancellationToken::new());
/// let (tx, mut rx) = mpsc::channel(1024);
///
/// let task = tokio::spawn(connect(
///     ctx.clone(),
///     tx,
///     vec!["trade".to_string()],
///     vec!["XBTUSD".to_string()],
///     None,
/// ));
///
/// while let Some(event) = rx.recv().await {
///     println!("{} {:?}", event.symbol, event.kind());
/// }
/// let _ = task.await;
/// # }
/// ```
///
/// `span`, when given, wraps every log line of the session.
pub async fn connect(
    ctx: SessionContext,
    events: mpsc::Sender<Event>,
    channels: Vec<String>,
    symbols: Vec<String>,
    span: Option<Span>,
) -> RealtimeResult<()> {
    let mut session = RealtimeSession::new(SessionConfig::default());
    if let Some(span) = span {
        session = session.with_span(span);
    }
    session
        .run(&ctx, &events, channels.as_slice(), symbols.as_slice())
        .await
}
