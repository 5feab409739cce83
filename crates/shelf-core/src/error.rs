//! Import error taxonomy surfaced to hosts.
//!
//! Only the transport's built-in rate-limit loop retries. Every other
//! category propagates to the caller unchanged.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Import error type covering all categories a connector can surface.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category")]
pub enum ImportError {
    /// Credentials are missing or blank at call time.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The service answered with a non-2xx status other than 429.
    #[error("{service} returned HTTP {status}: {message}")]
    Transport {
        service: String,
        status: u16,
        message: String,
    },

    /// Every attempt was throttled.
    #[error("Rate limit exceeded after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    /// The service reported a query-level error in a 2xx envelope.
    #[error("{service} API error: {message}")]
    Api { service: String, message: String },

    /// The connector does not implement the requested operation.
    #[error("Unsupported operation: {message}")]
    UnsupportedOperation { message: String },

    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,

    /// The request never produced an HTTP response (connect, timeout, TLS).
    #[error("Network error talking to {service}: {message}")]
    Network { service: String, message: String },

    /// The response body could not be decoded.
    #[error("Failed to decode {service} response: {message}")]
    Decode { service: String, message: String },
}

impl ImportError {
    /// Build a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Build an unsupported-operation error.
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            message: message.into(),
        }
    }

    /// Returns `true` if this error came from caller cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;
