//! Demo 2: Caller-Driven Reconnect
//!
//! Showcases: sessions never reconnect on their own; the caller decides
//! with `RealtimeError::is_retryable` and its own backoff
//!
//! Run: cargo run --bin reconnect_loop

use bitmex_realtime::{Endpoint, Event, RealtimeSession, SessionConfig, SessionContext};
use colored::*;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn};
use tracing_subscriber::EnvFilter;

const INITIAL_DELAY: Duration = Duration::from_millis(500);
const MAX_DELAY: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("{}", "═".repeat(65).cyan());
    println!("{}", "  CALLER-DRIVEN RECONNECT".cyan().bold());
    println!("{}", "═".repeat(65).cyan());

    let ctx = SessionContext::new(CancellationToken::new());
    let (tx, mut rx) = mpsc::channel::<Event>(1024);

    let stopper = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stopper.cancel();
        }
    });

    tokio::spawn(async move {
        let mut count = 0u64;
        while let Some(event) = rx.recv().await {
            count += 1;
            if count % 100 == 0 {
                println!("  {} events, last: {} {}", count.to_string().cyan(), event.kind(), event.symbol);
            }
        }
    });

    let config = SessionConfig::new()
        .with_endpoint(Endpoint::Production)
        .with_read_deadline(Duration::from_secs(30));

    let mut delay = INITIAL_DELAY;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let span = info_span!("session", attempt);
        let session = RealtimeSession::new(config.clone()).with_span(span);

        let started = tokio::time::Instant::now();
        let result = session.run(&ctx, &tx, &["trade", "instrument"], &["XBTUSD"]).await;

        let err = match result {
            Err(e) => e,
            Ok(()) => break,
        };

        if err.is_cancelled() {
            info!("Cancelled, not reconnecting");
            break;
        }
        if !err.is_retryable() {
            warn!(error = %err, "Fatal error, giving up");
            break;
        }

        // A session that streamed for a while resets the backoff
        if started.elapsed() > MAX_DELAY {
            delay = INITIAL_DELAY;
        }

        warn!(error = %err, ?delay, "Session ended, reconnecting");
        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            () = ctx.cancellation_token().cancelled() => break,
        }
        delay = (delay * 2).min(MAX_DELAY);
    }

    println!("{}", "Stopped.".dimmed());
}
