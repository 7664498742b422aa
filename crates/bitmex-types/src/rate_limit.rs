//! REST request budget tracking
//!
//! BitMEX reports the remaining request budget on every REST response via
//! `x-ratelimit-*` headers. [`ApiLimit`] mirrors those headers so callers can
//! refuse to send before the server does.

use crate::error::{TypesError, TypesResult};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Requests allowed per minute before the first response is seen
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 60;

const HEADER_LIMIT: &str = "x-ratelimit-limit";
const HEADER_REMAINING: &str = "x-ratelimit-remaining";
const HEADER_RESET: &str = "x-ratelimit-reset";

/// Header-derived request counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiLimit {
    /// Requests allowed per window
    limit: u32,
    /// Requests left in the current window
    remaining: u32,
    /// When the window refills (whole seconds)
    reset: DateTime<Utc>,
}

impl ApiLimit {
    /// Full budget with a one minute window starting at `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            limit: DEFAULT_REQUESTS_PER_MINUTE,
            remaining: DEFAULT_REQUESTS_PER_MINUTE,
            reset: now + Duration::minutes(1),
        }
    }

    /// Requests allowed per window
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Requests left in the current window
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// When the window refills
    pub fn reset(&self) -> DateTime<Utc> {
        self.reset
    }

    /// Update from response headers
    ///
    /// Header names are matched case-insensitively; missing or unparseable
    /// values leave the previous value in place.
    pub fn update_from_headers<'a, I>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (name, value) in headers {
            let value = value.trim();
            if name.eq_ignore_ascii_case(HEADER_LIMIT) {
                if let Ok(limit) = value.parse() {
                    self.limit = limit;
                }
            } else if name.eq_ignore_ascii_case(HEADER_REMAINING) {
                if let Ok(remaining) = value.parse() {
                    self.remaining = remaining;
                }
            } else if name.eq_ignore_ascii_case(HEADER_RESET) {
                if let Some(reset) = value
                    .parse::<i64>()
                    .ok()
                    .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
                {
                    self.reset = reset;
                }
            }
        }
    }

    /// Check that a request may be sent at `now`
    ///
    /// An exhausted budget is refilled once the reset time has passed.
    pub fn check(&mut self, now: DateTime<Utc>) -> TypesResult<()> {
        if self.remaining > 0 {
            return Ok(());
        }
        if now > self.reset {
            self.remaining = self.limit;
            return Ok(());
        }
        Err(TypesError::RateLimited {
            limit: self.limit,
            remaining: self.remaining,
            reset: self.reset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_default_budget() {
        let mut limit = ApiLimit::new(at(1_700_000_000));
        assert_eq!(limit.limit(), 60);
        assert_eq!(limit.remaining(), 60);
        assert_eq!(limit.reset(), at(1_700_000_060));
        assert!(limit.check(at(1_700_000_000)).is_ok());
    }

    #[test]
    fn test_update_from_headers() {
        let mut limit = ApiLimit::new(at(0));
        limit.update_from_headers([
            ("X-RateLimit-Limit", "120"),
            ("x-ratelimit-remaining", "7"),
            ("X-Ratelimit-Reset", "1700000123"),
            ("content-type", "application/json"),
        ]);

        assert_eq!(limit.limit(), 120);
        assert_eq!(limit.remaining(), 7);
        assert_eq!(limit.reset(), at(1_700_000_123));
    }

    #[test]
    fn test_garbage_headers_ignored() {
        let mut limit = ApiLimit::new(at(0));
        limit.update_from_headers([("x-ratelimit-remaining", "lots"), ("x-ratelimit-reset", "")]);

        assert_eq!(limit.remaining(), 60);
        assert_eq!(limit.reset(), at(60));
    }

    #[test]
    fn test_exhausted_until_reset() {
        let mut limit = ApiLimit::new(at(0));
        limit.update_from_headers([("x-ratelimit-remaining", "0"), ("x-ratelimit-reset", "100")]);

        let err = limit.check(at(50)).unwrap_err();
        assert!(matches!(err, TypesError::RateLimited { remaining: 0, .. }));

        assert!(limit.check(at(101)).is_ok());
        assert_eq!(limit.remaining(), 60);
    }
}
