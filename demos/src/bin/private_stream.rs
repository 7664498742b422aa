//! Demo 3: Private Account Stream
//!
//! Showcases: credential injection from the environment, authenticated
//! channels (orders, positions, wallet)
//!
//! Run: BITMEX_API_KEY=... BITMEX_API_SECRET=... cargo run --bin private_stream

use bitmex_realtime::{
    Endpoint, Payload, RealtimeSession, SessionConfig, SessionContext,
};
use colored::*;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let ctx = SessionContext::from_env(CancellationToken::new())?;
    let (tx, mut rx) = mpsc::channel(256);

    println!("{}", "═".repeat(65).cyan());
    println!("{}", "  PRIVATE STREAM (testnet)".cyan().bold());
    println!("{}", "═".repeat(65).cyan());

    let session = RealtimeSession::new(SessionConfig::new().with_endpoint(Endpoint::Testnet));
    let runner = ctx.clone();
    let handle = tokio::spawn(async move {
        session
            .run(&runner, &tx, &["order", "position", "wallet"], &[] as &[&str])
            .await
    });

    let stopper = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stopper.cancel();
        }
    });

    while let Some(event) = rx.recv().await {
        match &event.payload {
            Payload::Order(orders) => {
                for order in orders {
                    let state = if order.is_closed() { "closed".dimmed() } else { "open".green() };
                    println!(
                        "  {} {} {:?} {}",
                        "ORDER".yellow(),
                        order.order_id,
                        order.ord_status,
                        state
                    );
                }
            }
            Payload::Position(positions) => {
                for position in positions {
                    println!(
                        "  {} {} qty {:?}",
                        "POSITION".blue(),
                        position.symbol,
                        position.current_qty
                    );
                }
            }
            Payload::Wallet(wallets) => {
                for wallet in wallets {
                    println!("  {} {:?} {:?}", "WALLET".magenta(), wallet.currency, wallet.amount);
                }
            }
            _ => println!("  {} {} ({:?})", event.kind(), event.symbol, event.action),
        }
    }

    if let Err(e) = handle.await? {
        if !e.is_cancelled() {
            println!("{} {}", "Session ended:".red(), e);
        }
    }
    Ok(())
}
