//! API key credentials and realtime signature
//!
//! # Security
//!
//! The secret is stored using the `secrecy` crate which:
//! - Zeroizes memory on drop
//! - Prevents accidental logging via Debug impl
//! - Provides explicit access via `expose_secret()`

use bitmex_types::{Arg, Operation, Request};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretBox};
use sha2::Sha256;
use tracing::debug;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// HTTP verb the realtime signature is computed over
pub const REALTIME_VERB: &str = "GET";

/// Path the realtime signature is computed over
pub const REALTIME_PATH: &str = "/realtime";

/// How long a realtime signature stays valid, in seconds
pub const AUTH_VALIDITY_SECS: i64 = 24 * 60 * 60;

/// Correlation id attached to the authentication request
const AUTH_REQUEST_ID: u64 = 1;

/// API key id and secret
pub struct Credentials {
    /// Key identifier (public)
    key_id: String,
    /// Secret (zeroized on drop)
    secret: SecretBox<Vec<u8>>,
}

impl Credentials {
    /// Create credentials from a key id and its secret
    ///
    /// Both values must be non-empty.
    pub fn new(key_id: impl Into<String>, secret: impl AsRef<str>) -> AuthResult<Self> {
        let key_id = key_id.into();
        let secret = secret.as_ref();

        if key_id.is_empty() {
            return Err(AuthError::InvalidCredentials("empty API key id".to_string()));
        }
        if secret.is_empty() {
            return Err(AuthError::InvalidCredentials("empty API secret".to_string()));
        }

        Ok(Self {
            key_id,
            secret: SecretBox::new(Box::new(secret.as_bytes().to_vec())),
        })
    }

    /// Create credentials from environment variables
    ///
    /// Reads `BITMEX_API_KEY` and `BITMEX_API_SECRET` from the environment.
    pub fn from_env() -> AuthResult<Self> {
        let key_id = std::env::var("BITMEX_API_KEY")
            .map_err(|_| AuthError::EnvVarNotSet("BITMEX_API_KEY".to_string()))?;
        let secret = std::env::var("BITMEX_API_SECRET")
            .map_err(|_| AuthError::EnvVarNotSet("BITMEX_API_SECRET".to_string()))?;

        Self::new(key_id, secret)
    }

    /// Get the key id
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Sign `verb + path + expires` with the secret, hex encoded
    pub fn sign(&self, verb: &str, path: &str, expires: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret())
            .expect("HMAC can take key of any size");
        mac.update(verb.as_bytes());
        mac.update(path.as_bytes());
        mac.update(expires.to_string().as_bytes());

        hex::encode(mac.finalize().into_bytes())
    }

    /// Signature for the realtime endpoint
    pub fn realtime_signature(&self, expires: i64) -> String {
        self.sign(REALTIME_VERB, REALTIME_PATH, expires)
    }

    /// Build the `authKeyExpires` request, valid for 24 hours from `now`
    pub fn auth_request(&self, now: DateTime<Utc>) -> Request {
        self.auth_request_with_validity(now, Duration::seconds(AUTH_VALIDITY_SECS))
    }

    /// Build the `authKeyExpires` request with a custom validity window
    pub fn auth_request_with_validity(&self, now: DateTime<Utc>, validity: Duration) -> Request {
        let expires = (now + validity).timestamp();
        debug!(key_id = %self.key_id, expires, "Signing realtime auth request");

        Request::new(
            Operation::AuthKeyExpires,
            vec![
                Arg::from(self.key_id.as_str()),
                Arg::Int(expires),
                Arg::Text(self.realtime_signature(expires)),
            ],
        )
        .with_id(AUTH_REQUEST_ID)
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self {
            key_id: self.key_id.clone(),
            secret: SecretBox::new(Box::new(self.secret.expose_secret().clone())),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field(
                "key_id",
                &format!("{}...", self.key_id.chars().take(8).collect::<String>()),
            )
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const DOC_KEY: &str = "LAqUlngMIQkIUjXMUreyu3qn";
    const DOC_SECRET: &str = "chNOOS4KvNXR_Xq4k4c9qsfoKWvnDecLATCRlcBwyKDYnWgO";

    #[test]
    fn test_known_signature_vector() {
        let creds = Credentials::new(DOC_KEY, DOC_SECRET).unwrap();
        assert_eq!(
            creds.realtime_signature(1518064236),
            "6d459dc02866d35a2b965edeecc68063d488e296b77982235fc6eca24b934945"
        );
    }

    #[test]
    fn test_signature_deterministic() {
        let creds = Credentials::new("key", "test_secret").unwrap();
        let sig = creds.realtime_signature(1700000000);

        assert_eq!(sig, creds.realtime_signature(1700000000));
        assert_eq!(
            sig,
            "72f59ab183ff2d6f293401be1293d60511397598b34d58d23dac5d917614c6a7"
        );
        assert_ne!(sig, creds.realtime_signature(1700000001));
        assert_eq!(sig.len(), 64);
    }

    #[test]
    fn test_auth_request_shape() {
        let creds = Credentials::new(DOC_KEY, DOC_SECRET).unwrap();
        let now = Utc.timestamp_opt(1518064236 - 24 * 3600, 0).unwrap();
        let request = creds.auth_request(now);

        assert_eq!(request.op, Operation::AuthKeyExpires);
        assert_eq!(request.id, Some(1));
        assert_eq!(
            request.args,
            vec![
                Arg::Text(DOC_KEY.to_string()),
                Arg::Int(1518064236),
                Arg::Text(
                    "6d459dc02866d35a2b965edeecc68063d488e296b77982235fc6eca24b934945".to_string()
                ),
            ]
        );

        let json: serde_json::Value = serde_json::from_str(&request.to_json().unwrap()).unwrap();
        assert_eq!(json["op"], "authKeyExpires");
        assert_eq!(json["args"][1], 1518064236);
    }

    #[test]
    fn test_empty_credentials_rejected() {
        assert!(matches!(
            Credentials::new("", "secret"),
            Err(AuthError::InvalidCredentials(_))
        ));
        assert!(matches!(
            Credentials::new("key", ""),
            Err(AuthError::InvalidCredentials(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials::new("test_api_key", "super_secret_value").unwrap();
        let debug = format!("{:?}", creds);

        assert!(!debug.contains("super_secret_value"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("test_api"));
    }

    #[test]
    fn test_debug_truncates_on_char_boundary() {
        let creds = Credentials::new("ключ_доступа_123", "secret").unwrap();
        let debug = format!("{:?}", creds);

        assert!(debug.contains("ключ_дос..."));
        assert!(!debug.contains("доступа"));
    }

    #[test]
    fn test_clone_signs_identically() {
        let creds = Credentials::new("key", "test_secret").unwrap();
        let cloned = creds.clone();

        assert_eq!(cloned.key_id(), "key");
        assert_eq!(cloned.realtime_signature(42), creds.realtime_signature(42));
    }
}
