//! Demo 1: Trade Tape
//!
//! Showcases: public session, trade and quote channels, typed payloads
//!
//! Run: cargo run --bin trade_tape -- XBTUSD ETHUSD

use bitmex_realtime::{connect, Payload, SessionContext};
use bitmex_types::Side;
use colored::*;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let mut symbols: Vec<String> = std::env::args().skip(1).collect();
    if symbols.is_empty() {
        symbols.push("XBTUSD".to_string());
    }

    println!("{}", "═".repeat(65).cyan());
    println!("{}", "  TRADE TAPE".cyan().bold());
    println!("  Symbols: {}", symbols.join(", ").yellow());
    println!("{}", "═".repeat(65).cyan());

    let ctx = SessionContext::new(CancellationToken::new());
    let (tx, mut rx) = mpsc::channel(1024);

    let session = tokio::spawn(connect(
        ctx.clone(),
        tx,
        vec!["trade".to_string(), "quote".to_string()],
        symbols,
        None,
    ));

    let stopper = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stopper.cancel();
        }
    });

    while let Some(event) = rx.recv().await {
        let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");

        match &event.payload {
            Payload::Trade(trades) => {
                for trade in trades {
                    let size = trade.size.unwrap_or_default().to_string();
                    let price = trade.price.map(|p| p.to_string()).unwrap_or_default();
                    let line = format!("{:<8} {:>10} @ {:<10}", trade.symbol, size, price);
                    let line = match trade.side {
                        Some(Side::Buy) => line.green(),
                        Some(Side::Sell) => line.red(),
                        None => line.normal(),
                    };
                    println!("  {} {}", format!("[{}]", timestamp).dimmed(), line);
                }
            }
            Payload::Quote(quotes) => {
                for quote in quotes {
                    if let Some(spread) = quote.spread() {
                        println!(
                            "  {} {:<8} spread {}",
                            format!("[{}]", timestamp).dimmed(),
                            quote.symbol.cyan(),
                            spread.to_string().yellow()
                        );
                    }
                }
            }
            _ => {}
        }
    }

    match session.await? {
        Err(e) if e.is_cancelled() => println!("\n{}", "Stopped.".dimmed()),
        Err(e) => println!("\n{} {}", "Session ended:".red(), e),
        Ok(()) => {}
    }
    Ok(())
}
