//! Retry policy helpers.
//!
//! Only throttling (HTTP 429) is retried. Every other failure is returned
//! to the caller after the first attempt.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::GraphqlClientError;

/// Retry decision result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after a delay.
    RetryAfter(Duration),
    /// Do not retry.
    DoNotRetry,
}

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    pub max_attempts: u32,
    /// Delay used when a 429 carries no usable `Retry-After`.
    pub default_delay: Duration,
    /// Upper bound applied to any delay, declared or default.
    pub max_delay: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            default_delay: Duration::from_secs(60),
            max_delay: None,
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    #[must_use]
    pub const fn never() -> Self {
        Self {
            max_attempts: 1,
            default_delay: Duration::ZERO,
            max_delay: None,
        }
    }

    /// Decide whether to retry after `attempt` (1-based) failed with `error`.
    #[must_use]
    pub fn decide(&self, error: &GraphqlClientError, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::DoNotRetry;
        }
        match error {
            GraphqlClientError::HttpStatus { retry_after, .. } if error.is_rate_limited() => {
                RetryDecision::RetryAfter(self.delay_for(*retry_after))
            }
            _ => RetryDecision::DoNotRetry,
        }
    }

    /// Backoff for a throttled response.
    #[must_use]
    pub fn delay_for(&self, retry_after: Option<Duration>) -> Duration {
        let delay = retry_after.unwrap_or(self.default_delay);
        self.max_delay.map_or(delay, |max| delay.min(max))
    }
}

/// Parse a `Retry-After` value: delta-seconds or an HTTP-date.
///
/// A date in the past yields a zero delay.
#[must_use]
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }
    let at = DateTime::parse_from_rfc2822(value).ok()?;
    let delta = at.with_timezone(&Utc) - now;
    Some(delta.to_std().unwrap_or(Duration::ZERO))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use reqwest::StatusCode;

    use super::*;

    fn throttled(retry_after: Option<Duration>) -> GraphqlClientError {
        GraphqlClientError::HttpStatus {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: String::new(),
            retry_after,
        }
    }

    #[test]
    fn default_policy_allows_three_attempts() {
        let policy = RetryPolicy::default();
        let err = throttled(None);
        assert_eq!(
            policy.decide(&err, 1),
            RetryDecision::RetryAfter(Duration::from_secs(60))
        );
        assert_eq!(
            policy.decide(&err, 2),
            RetryDecision::RetryAfter(Duration::from_secs(60))
        );
        assert_eq!(policy.decide(&err, 3), RetryDecision::DoNotRetry);
    }

    #[test]
    fn declared_retry_after_wins_over_default() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.decide(&throttled(Some(Duration::from_secs(5))), 1),
            RetryDecision::RetryAfter(Duration::from_secs(5))
        );
    }

    #[test]
    fn max_delay_caps_backoff() {
        let policy = RetryPolicy {
            max_delay: Some(Duration::from_secs(2)),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for(None), Duration::from_secs(2));
        assert_eq!(
            policy.delay_for(Some(Duration::from_secs(1))),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn non_throttling_errors_are_not_retried() {
        let policy = RetryPolicy::default();
        let server_error = GraphqlClientError::HttpStatus {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".into(),
            retry_after: Some(Duration::from_secs(1)),
        };
        assert_eq!(policy.decide(&server_error, 1), RetryDecision::DoNotRetry);
        assert_eq!(
            policy.decide(&GraphqlClientError::Json("eof".into()), 1),
            RetryDecision::DoNotRetry
        );
        assert_eq!(
            RetryPolicy::never().decide(&throttled(None), 1),
            RetryDecision::DoNotRetry
        );
    }

    #[test]
    fn parses_delta_seconds_and_http_dates() {
        let now = Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap();
        assert_eq!(parse_retry_after("120", now), Some(Duration::from_secs(120)));
        assert_eq!(
            parse_retry_after("Wed, 21 Oct 2015 07:28:30 GMT", now),
            Some(Duration::from_secs(30))
        );
        assert_eq!(
            parse_retry_after("Wed, 21 Oct 2015 07:00:00 GMT", now),
            Some(Duration::ZERO)
        );
        assert_eq!(parse_retry_after("soon", now), None);
    }
}
