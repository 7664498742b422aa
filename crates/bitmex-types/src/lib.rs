//! Shared types for the BitMEX realtime API
//!
//! This crate provides the wire envelopes and payload shapes used across the
//! workspace. It has minimal dependencies and can be used independently.
//!
//! # Key Types
//!
//! - [`Request`], [`Operation`], [`Arg`] - Outbound control messages
//! - [`EventKind`], [`Action`] - Inbound event discriminant and action tag
//! - [`Trade`], [`Quote`], [`OrderBookL2`], [`Order`], ... - Table rows
//! - [`OrderBook`], [`Book`] - Snapshot orderbook with best-effort row decode
//! - [`ApiLimit`] - REST rate-limit counter fed from response headers

mod decimal;
pub mod enums;
pub mod error;
pub mod messages;
pub mod models;
pub mod orderbook;
pub mod rate_limit;

// Re-export commonly used types
pub use enums::*;
pub use error::*;
pub use messages::*;
pub use models::*;
pub use orderbook::*;
pub use rate_limit::*;

// Re-export rust_decimal for users
pub use rust_decimal::Decimal;
