//! Error types for shared BitMEX types

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised by the shared types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    /// REST request budget exhausted until `reset`
    #[error("API limit reached ({remaining}/{limit} remaining), resets at {reset}")]
    RateLimited {
        /// Requests allowed per window
        limit: u32,
        /// Requests left in the current window
        remaining: u32,
        /// When the window refills
        reset: DateTime<Utc>,
    },
}

impl TypesError {
    /// Suggested wait before retrying, relative to `now`
    pub fn retry_after(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        match self {
            Self::RateLimited { reset, .. } => (*reset - now).to_std().ok(),
        }
    }
}

/// Result type for shared type operations
pub type TypesResult<T> = Result<T, TypesError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_retry_after() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let err = TypesError::RateLimited {
            limit: 60,
            remaining: 0,
            reset: now + chrono::Duration::seconds(30),
        };

        assert_eq!(err.retry_after(now), Some(std::time::Duration::from_secs(30)));
        assert!(err.to_string().contains("0/60"));
    }
}
