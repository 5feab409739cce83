//! Hardcover connector configuration.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shelf_graphql::RetryPolicy;

/// Hardcover GraphQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.hardcover.app/v1/graphql";

/// Settings key carrying the API token.
pub const API_TOKEN_SETTING: &str = "api_token";

/// Configuration for the Hardcover connector.
///
/// The API token is not part of this struct; it arrives through the host's
/// settings map on `configure`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardcoverConfig {
    /// GraphQL endpoint (default: https://api.hardcover.app/v1/graphql)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout
    #[serde(default = "default_timeout", with = "duration_secs")]
    pub timeout: Duration,

    /// User-Agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Rate-limit retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.into()
}

const fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("shelf-hardcover/{}", env!("CARGO_PKG_VERSION"))
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

/// Retry configuration for throttled (HTTP 429) responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff in milliseconds when the response has no Retry-After
    #[serde(default = "default_delay_ms")]
    pub default_delay_ms: u64,

    /// Optional cap on any backoff, in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_delay_ms: Option<u64>,
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_delay_ms() -> u64 {
    60_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            default_delay_ms: default_delay_ms(),
            max_delay_ms: None,
        }
    }
}

impl RetryConfig {
    /// Build the transport retry policy.
    #[must_use]
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            default_delay: Duration::from_millis(self.default_delay_ms),
            max_delay: self.max_delay_ms.map(Duration::from_millis),
        }
    }
}

impl Default for HardcoverConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
            retry: RetryConfig::default(),
        }
    }
}

/// Extract the trimmed API token from host settings; blank counts as absent.
#[must_use]
pub fn token_from_settings(settings: &HashMap<String, String>) -> Option<String> {
    settings
        .get(API_TOKEN_SETTING)
        .map(|token| token.trim())
        .filter(|token| !token.is_empty())
        .map(ToString::to_string)
}
