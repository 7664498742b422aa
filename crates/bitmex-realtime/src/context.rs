//! Per-session caller context: cancellation plus optional credentials

use bitmex_auth::{AuthResult, Credentials};
use tokio_util::sync::CancellationToken;

/// What the caller hands a session
///
/// Cancelling the token ends the session at its next checkpoint with
/// [`RealtimeError::Cancelled`](crate::RealtimeError::Cancelled). Credentials,
/// when present, are used to authenticate before subscribing.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    cancel: CancellationToken,
    credentials: Option<Credentials>,
}

impl SessionContext {
    /// Unauthenticated context
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            credentials: None,
        }
    }

    /// Authenticated context
    pub fn with_credentials(cancel: CancellationToken, credentials: Credentials) -> Self {
        Self {
            cancel,
            credentials: Some(credentials),
        }
    }

    /// Authenticated context from a raw key id and secret
    pub fn with_auth(
        cancel: CancellationToken,
        key_id: impl Into<String>,
        secret: impl AsRef<str>,
    ) -> AuthResult<Self> {
        Ok(Self::with_credentials(cancel, Credentials::new(key_id, secret)?))
    }

    /// Authenticated context from `BITMEX_API_KEY` / `BITMEX_API_SECRET`
    pub fn from_env(cancel: CancellationToken) -> AuthResult<Self> {
        Ok(Self::with_credentials(cancel, Credentials::from_env()?))
    }

    /// The cancellation token
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Credentials, if the session should authenticate
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Check if cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_shared_with_clones() {
        let ctx = SessionContext::new(CancellationToken::new());
        let clone = ctx.clone();

        assert!(!clone.is_cancelled());
        ctx.cancel();
        assert!(clone.is_cancelled());
        assert!(ctx.credentials().is_none());
    }

    #[test]
    fn test_with_auth() {
        let ctx = SessionContext::with_auth(CancellationToken::new(), "key", "secret").unwrap();
        assert_eq!(ctx.credentials().unwrap().key_id(), "key");

        assert!(SessionContext::with_auth(CancellationToken::new(), "", "secret").is_err());
    }

    #[test]
    fn test_external_token_drives_context() {
        let token = CancellationToken::new();
        let ctx = SessionContext::new(token.clone());

        token.cancel();
        assert!(ctx.is_cancelled());
        assert!(ctx.cancellation_token().is_cancelled());
    }
}
