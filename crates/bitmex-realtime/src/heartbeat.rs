//! Keep-alive pings
//!
//! BitMEX drops connections that stay silent, so a background task writes a
//! literal `ping` text frame on a fixed interval. Write failures and
//! timeouts are logged and the loop carries on; a dead connection surfaces
//! through the read side instead.

use crate::transport::SharedWriter;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn, Instrument, Span};

/// Text frame sent as keep-alive
pub const PING_FRAME: &str = "ping";

/// Heartbeat timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatConfig {
    /// Time between pings; the first ping goes out one interval after start
    pub interval: Duration,
    /// Upper bound on a single ping write
    pub write_deadline: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            write_deadline: Duration::from_secs(5),
        }
    }
}

/// Handle to a running heartbeat task
///
/// Dropping the handle cancels the task without waiting for it.
pub struct Heartbeat {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Heartbeat {
    /// Start pinging through `writer` until `cancel` fires or [`Heartbeat::stop`] is called
    pub fn spawn(writer: SharedWriter, config: HeartbeatConfig, cancel: CancellationToken) -> Self {
        let task = run(writer, config, cancel.clone()).instrument(Span::current());
        Self {
            cancel,
            handle: Some(tokio::spawn(task)),
        }
    }

    /// Stop the task and wait until it has exited
    ///
    /// No ping is written after this returns.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Heartbeat task failed");
            }
        }
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(writer: SharedWriter, config: HeartbeatConfig, cancel: CancellationToken) {
    let mut ticker = interval_at(Instant::now() + config.interval, config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    debug!(interval = ?config.interval, "Heartbeat started");

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                match timeout(config.write_deadline, writer.send_text(PING_FRAME)).await {
                    Ok(Ok(())) => trace!("Ping sent"),
                    Ok(Err(e)) => warn!(error = %e, "Ping write failed"),
                    Err(_) => warn!(deadline = ?config.write_deadline, "Ping write timed out"),
                }
            }
        }
    }

    debug!("Heartbeat stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{Connector, MockConnector};

    async fn writer(mock: &MockConnector) -> SharedWriter {
        let (sink, _source) = mock.connect("wss://mock.test").await.unwrap();
        SharedWriter::new(sink)
    }

    fn pings(mock: &MockConnector) -> usize {
        mock.sent().iter().filter(|f| f.as_str() == PING_FRAME).count()
    }

    #[tokio::test(start_paused = true)]
    async fn test_pings_on_interval() {
        let mock = MockConnector::new();
        let heartbeat = Heartbeat::spawn(
            writer(&mock).await,
            HeartbeatConfig::default(),
            CancellationToken::new(),
        );

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(pings(&mock), 0);

        tokio::time::sleep(Duration::from_millis(5_200)).await;
        assert_eq!(pings(&mock), 2);

        heartbeat.stop().await;
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(pings(&mock), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parent_cancel_stops_pings() {
        let mock = MockConnector::new();
        let parent = CancellationToken::new();
        let heartbeat = Heartbeat::spawn(
            writer(&mock).await,
            HeartbeatConfig::default(),
            parent.child_token(),
        );

        parent.cancel();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(pings(&mock), 0);
        heartbeat.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_failures_swallowed() {
        let mock = MockConnector::new();
        mock.fail_send_containing(PING_FRAME);
        let heartbeat = Heartbeat::spawn(
            writer(&mock).await,
            HeartbeatConfig::default(),
            CancellationToken::new(),
        );

        tokio::time::sleep(Duration::from_secs(16)).await;
        assert_eq!(pings(&mock), 0);

        // Task is still alive and exits cleanly on stop
        heartbeat.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_ping_abandoned_after_deadline() {
        let mock = MockConnector::new();
        mock.stall_send_containing(PING_FRAME);
        let config = HeartbeatConfig {
            interval: Duration::from_secs(5),
            write_deadline: Duration::from_secs(2),
        };
        let heartbeat = Heartbeat::spawn(writer(&mock).await, config, CancellationToken::new());

        // Pings start at 5s, 10s and 15s; each is dropped 2s later
        tokio::time::sleep(Duration::from_secs(16)).await;
        assert_eq!(mock.stalled_count(), 3);
        assert_eq!(pings(&mock), 0);

        // The third ping is still in flight, stop waits at most its deadline
        let started = Instant::now();
        heartbeat.stop().await;
        assert!(started.elapsed() <= config.write_deadline);
    }
}
