//! Subscription management
//!
//! Topics are `channel` or `channel:SYMBOL`. A subscribe call sends one
//! request covering the whole channel x symbol cross product; the manager
//! remembers what was actually written so teardown can unsubscribe exactly
//! those topics, once.

use crate::error::{RealtimeError, RealtimeResult};
use crate::transport::SharedWriter;
use bitmex_types::{Arg, Operation, Request};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Format a topic for `channel` scoped to `symbol`
pub fn topic(channel: &str, symbol: &str) -> String {
    format!("{channel}:{symbol}")
}

/// Build the subscribe requests for `channels` x `symbols`
///
/// - both non-empty: one request, channel-major, e.g.
///   `["trade:XBTUSD", "trade:ETHUSD", "quote:XBTUSD", "quote:ETHUSD"]`
/// - no symbols: one request with the bare channel names
/// - no channels: nothing to subscribe
pub fn build_subscribe<C, S>(channels: &[C], symbols: &[S]) -> Vec<Request>
where
    C: AsRef<str>,
    S: AsRef<str>,
{
    if channels.is_empty() {
        return Vec::new();
    }

    let args: Vec<Arg> = if symbols.is_empty() {
        channels.iter().map(|c| Arg::from(c.as_ref())).collect()
    } else {
        channels
            .iter()
            .flat_map(|c| symbols.iter().map(move |s| Arg::Text(topic(c.as_ref(), s.as_ref()))))
            .collect()
    };

    vec![Request::new(Operation::Subscribe, args)]
}

/// Mirror `requests` as unsubscribe requests with identical arguments
pub fn build_unsubscribe(requests: &[Request]) -> Vec<Request> {
    requests
        .iter()
        .map(|request| request.with_op(Operation::Unsubscribe))
        .collect()
}

/// Tracks the subscribe requests written on one connection
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    sent: Vec<Request>,
}

impl SubscriptionManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests written so far and not yet unsubscribed
    pub fn active(&self) -> &[Request] {
        &self.sent
    }

    /// Write subscribe requests for `channels` x `symbols`
    ///
    /// Stops at the first failed write; requests written before it stay
    /// tracked so they are still unsubscribed on teardown.
    pub async fn subscribe<C, S>(
        &mut self,
        writer: &SharedWriter,
        channels: &[C],
        symbols: &[S],
    ) -> RealtimeResult<()>
    where
        C: AsRef<str>,
        S: AsRef<str>,
    {
        let requests = build_subscribe(channels, symbols);
        if requests.is_empty() {
            warn!("No channels requested, nothing to subscribe");
        }

        for request in requests {
            writer
                .send_request(&request)
                .await
                .map_err(RealtimeError::Subscribe)?;
            info!(topics = request.args.len(), "Subscribe request sent");
            self.sent.push(request);
        }
        Ok(())
    }

    /// Unsubscribe everything tracked, draining the list
    ///
    /// Each write is abandoned after `write_deadline`. Failures are logged
    /// and otherwise ignored; a second call is a no-op.
    pub async fn unsubscribe(&mut self, writer: &SharedWriter, write_deadline: Duration) {
        let sent = std::mem::take(&mut self.sent);
        for request in build_unsubscribe(&sent) {
            match timeout(write_deadline, writer.send_request(&request)).await {
                Ok(Ok(())) => debug!(topics = request.args.len(), "Unsubscribe request sent"),
                Ok(Err(e)) => warn!(error = %e, "Failed to unsubscribe"),
                Err(_) => warn!(deadline = ?write_deadline, "Unsubscribe write timed out"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{Connector, MockConnector};

    const DEADLINE: Duration = Duration::from_secs(1);

    fn texts(request: &Request) -> Vec<String> {
        request.args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_cross_product_channel_major() {
        let requests = build_subscribe(&["trade", "quote"], &["XBTUSD", "ETHUSD"]);

        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].op, Operation::Subscribe);
        assert_eq!(
            texts(&requests[0]),
            vec!["trade:XBTUSD", "trade:ETHUSD", "quote:XBTUSD", "quote:ETHUSD"]
        );
    }

    #[test]
    fn test_channels_without_symbols() {
        let no_symbols: [&str; 0] = [];
        let requests = build_subscribe(&["order"], &no_symbols);

        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].to_json().unwrap(),
            r#"{"op":"subscribe","args":["order"]}"#
        );
    }

    #[test]
    fn test_no_channels_no_requests() {
        let no_channels: [&str; 0] = [];
        assert!(build_subscribe(&no_channels, &["XBTUSD"]).is_empty());
    }

    #[test]
    fn test_unsubscribe_mirrors_args() {
        let subs = build_subscribe(&["trade".to_string()], &["XBTUSD".to_string()]);
        let unsubs = build_unsubscribe(&subs);

        assert_eq!(unsubs.len(), 1);
        assert_eq!(unsubs[0].op, Operation::Unsubscribe);
        assert_eq!(unsubs[0].args, subs[0].args);
    }

    #[tokio::test]
    async fn test_manager_unsubscribes_once() {
        let mock = MockConnector::new();
        let (sink, _source) = mock.connect("wss://mock.test").await.unwrap();
        let writer = SharedWriter::new(sink);

        let mut manager = SubscriptionManager::new();
        manager.subscribe(&writer, &["trade"], &["XBTUSD"]).await.unwrap();
        assert_eq!(manager.active().len(), 1);

        manager.unsubscribe(&writer, DEADLINE).await;
        manager.unsubscribe(&writer, DEADLINE).await;
        assert!(manager.active().is_empty());

        assert_eq!(
            mock.sent(),
            vec![
                r#"{"op":"subscribe","args":["trade:XBTUSD"]}"#.to_string(),
                r#"{"op":"unsubscribe","args":["trade:XBTUSD"]}"#.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_subscribe_not_tracked() {
        let mock = MockConnector::new();
        mock.fail_send_containing("subscribe");
        let (sink, _source) = mock.connect("wss://mock.test").await.unwrap();
        let writer = SharedWriter::new(sink);

        let mut manager = SubscriptionManager::new();
        let result = manager.subscribe(&writer, &["trade"], &["XBTUSD"]).await;

        assert!(matches!(result, Err(RealtimeError::Subscribe(_))));
        assert!(manager.active().is_empty());
        assert!(mock.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_unsubscribe_abandoned_after_deadline() {
        let mock = MockConnector::new();
        mock.stall_send_containing("unsubscribe");
        let (sink, _source) = mock.connect("wss://mock.test").await.unwrap();
        let writer = SharedWriter::new(sink);

        let mut manager = SubscriptionManager::new();
        manager.subscribe(&writer, &["trade"], &["XBTUSD"]).await.unwrap();
        manager.subscribe(&writer, &["quote"], &["XBTUSD"]).await.unwrap();

        let started = tokio::time::Instant::now();
        manager.unsubscribe(&writer, DEADLINE).await;

        assert!(started.elapsed() >= DEADLINE * 2);
        assert!(started.elapsed() < DEADLINE * 3);
        assert_eq!(mock.stalled_count(), 2);
        assert!(manager.active().is_empty());
        assert_eq!(mock.sent().len(), 2);
    }
}
