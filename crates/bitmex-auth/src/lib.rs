//! API key signing for the BitMEX realtime API
//!
//! BitMEX authenticates a realtime session with a single `authKeyExpires`
//! command carrying the key id, an expiry timestamp and an HMAC-SHA256
//! signature of `"GET/realtime" + expiry`.
//!
//! # Example
//!
//! ```no_run
//! use bitmex_auth::Credentials;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load credentials from environment
//!     let creds = Credentials::from_env()?;
//!
//!     // Build the first message of an authenticated session
//!     let request = creds.auth_request(chrono::Utc::now());
//!     println!("{}", request.to_json()?);
//!
//!     Ok(())
//! }
//! ```

mod credentials;
mod error;

pub use credentials::{Credentials, AUTH_VALIDITY_SECS, REALTIME_PATH, REALTIME_VERB};
pub use error::{AuthError, AuthResult};
