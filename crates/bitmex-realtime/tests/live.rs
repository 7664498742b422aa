//! Live tests against the BitMEX realtime API
//!
//! These tests make real WebSocket connections.
//! Run with: cargo test -p bitmex-realtime --test live -- --ignored
//!
//! The authenticated test additionally needs `BITMEX_API_KEY` and
//! `BITMEX_API_SECRET` for a testnet account.

use bitmex_realtime::{
    connect, Action, Endpoint, EventKind, RealtimeError, RealtimeSession, SessionConfig,
    SessionContext,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

/// Public trade stream yields a partial snapshot, then cancels cleanly
#[tokio::test]
#[ignore = "Makes real WebSocket connection"]
async fn test_public_trade_stream() {
    let ctx = SessionContext::new(CancellationToken::new());
    let (tx, mut rx) = mpsc::channel(256);

    let handle = tokio::spawn(connect(
        ctx.clone(),
        tx,
        vec!["trade".to_string()],
        vec!["XBTUSD".to_string()],
        None,
    ));

    let event = timeout(Duration::from_secs(15), rx.recv())
        .await
        .expect("No event within 15s")
        .expect("Channel closed");

    assert_eq!(event.kind(), EventKind::Trade);
    assert_eq!(event.symbol, "XBTUSD");
    assert_eq!(event.action, Action::Partial);

    ctx.cancel();
    // Cancellation is observed on the next frame; XBTUSD trades are frequent
    drop(rx);
    let result = timeout(Duration::from_secs(60), handle)
        .await
        .expect("Session did not stop")
        .expect("Session task panicked");

    assert!(matches!(
        result,
        Err(RealtimeError::Cancelled) | Err(RealtimeError::OutputClosed)
    ));
}

/// Bare channel names subscribe across all symbols
#[tokio::test]
#[ignore = "Makes real WebSocket connection"]
async fn test_testnet_instrument_stream() {
    let ctx = SessionContext::new(CancellationToken::new());
    let (tx, mut rx) = mpsc::channel(256);

    let session = RealtimeSession::new(SessionConfig::new().with_endpoint(Endpoint::Testnet));
    let runner = ctx.clone();
    let handle = tokio::spawn(async move {
        session
            .run(&runner, &tx, &["instrument"], &[] as &[&str])
            .await
    });

    let event = timeout(Duration::from_secs(15), rx.recv())
        .await
        .expect("No event within 15s")
        .expect("Channel closed");
    assert_eq!(event.kind(), EventKind::Instrument);
    assert!(!event.payload.is_empty());

    ctx.cancel();
    drop(rx);
    let _ = timeout(Duration::from_secs(60), handle).await;
}

/// Authenticated session receives the private position partial
#[tokio::test]
#[ignore = "Requires BITMEX_API_KEY and BITMEX_API_SECRET"]
async fn test_authenticated_position_stream() {
    let ctx = SessionContext::from_env(CancellationToken::new())
        .expect("BITMEX_API_KEY / BITMEX_API_SECRET not set");
    let (tx, mut rx) = mpsc::channel(256);

    let session = RealtimeSession::new(SessionConfig::new().with_endpoint(Endpoint::Testnet));
    let runner = ctx.clone();
    let handle = tokio::spawn(async move {
        session
            .run(&runner, &tx, &["position"], &[] as &[&str])
            .await
    });

    let event = timeout(Duration::from_secs(15), rx.recv())
        .await
        .expect("No event within 15s")
        .expect("Channel closed");
    assert_eq!(event.kind(), EventKind::Position);
    assert_eq!(event.action, Action::Partial);

    ctx.cancel();
    drop(rx);
    let _ = timeout(Duration::from_secs(60), handle).await;
}
