//! Error types for the GraphQL transport.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use shelf_core::ImportError;
use thiserror::Error;

/// HTTP error information captured from reqwest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpErrorInfo {
    /// Error message.
    pub message: String,
    /// Whether the error was a timeout.
    pub is_timeout: bool,
    /// Whether the error was a connection failure.
    pub is_connect: bool,
}

impl From<reqwest::Error> for HttpErrorInfo {
    fn from(err: reqwest::Error) -> Self {
        Self {
            message: err.to_string(),
            is_timeout: err.is_timeout(),
            is_connect: err.is_connect(),
        }
    }
}

/// GraphQL error location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphqlErrorLocation {
    pub line: u32,
    pub column: u32,
}

/// GraphQL error entry from the response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlError {
    /// Human-readable error message.
    pub message: String,
    #[serde(default, deserialize_with = "crate::operation::null_as_default")]
    pub locations: Vec<GraphqlErrorLocation>,
    /// Extensions metadata (error codes, paths).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

/// Error type for GraphQL transport operations.
#[derive(Debug, Clone, Error)]
pub enum GraphqlClientError {
    /// The request did not produce a response.
    #[error("HTTP error: {}", .0.message)]
    Http(HttpErrorInfo),

    /// Non-success HTTP status.
    #[error("HTTP status {status} with body: {body}")]
    HttpStatus {
        status: StatusCode,
        /// Response body (truncated).
        body: String,
        /// Retry-After duration when supplied.
        retry_after: Option<Duration>,
    },

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(String),

    /// The envelope carried GraphQL errors; the first message is surfaced.
    #[error("GraphQL error: {}", first_message(.errors))]
    GraphqlErrors { errors: Vec<GraphqlError> },

    /// The envelope violated the GraphQL response contract.
    #[error("GraphQL protocol error: {message}")]
    Protocol { message: String },

    /// Every attempt was answered with 429.
    #[error("Rate limited on all {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    /// The caller cancelled the request or a backoff wait.
    #[error("Request cancelled")]
    Cancelled,
}

fn first_message(errors: &[GraphqlError]) -> &str {
    errors.first().map_or("unknown GraphQL error", |err| err.message.as_str())
}

impl From<reqwest::Error> for GraphqlClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(HttpErrorInfo::from(err))
    }
}

impl From<serde_json::Error> for GraphqlClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl GraphqlClientError {
    /// Returns `true` for an HTTP 429 response.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::HttpStatus { status, .. } if *status == StatusCode::TOO_MANY_REQUESTS)
    }

    /// Message of the first GraphQL error, if this is a GraphQL error.
    #[must_use]
    pub fn graphql_message(&self) -> Option<&str> {
        match self {
            Self::GraphqlErrors { errors } => Some(first_message(errors)),
            _ => None,
        }
    }

    /// Convert to the import taxonomy for a named service.
    #[must_use]
    pub fn to_import_error(&self, service: &str) -> ImportError {
        match self {
            Self::Http(info) => ImportError::Network {
                service: service.into(),
                message: info.message.clone(),
            },
            Self::HttpStatus { status, body, .. } => ImportError::Transport {
                service: service.into(),
                status: status.as_u16(),
                message: body.clone(),
            },
            Self::Json(message) => ImportError::Decode {
                service: service.into(),
                message: message.clone(),
            },
            Self::GraphqlErrors { errors } => ImportError::Api {
                service: service.into(),
                message: first_message(errors).to_string(),
            },
            Self::Protocol { message } => ImportError::Api {
                service: service.into(),
                message: message.clone(),
            },
            Self::RateLimitExceeded { attempts } => ImportError::RateLimitExceeded {
                attempts: *attempts,
            },
            Self::Cancelled => ImportError::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(message: &str) -> GraphqlError {
        GraphqlError {
            message: message.into(),
            locations: Vec::new(),
            extensions: None,
        }
    }

    #[test]
    fn graphql_errors_surface_first_message() {
        let err = GraphqlClientError::GraphqlErrors {
            errors: vec![error("field 'user_books' not found"), error("second")],
        };
        assert_eq!(err.to_string(), "GraphQL error: field 'user_books' not found");
        assert_eq!(
            err.to_import_error("hardcover"),
            ImportError::Api {
                service: "hardcover".into(),
                message: "field 'user_books' not found".into(),
            }
        );
    }

    #[test]
    fn only_429_counts_as_rate_limited() {
        let throttled = GraphqlClientError::HttpStatus {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: String::new(),
            retry_after: None,
        };
        let unavailable = GraphqlClientError::HttpStatus {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "down".into(),
            retry_after: None,
        };
        assert!(throttled.is_rate_limited());
        assert!(!unavailable.is_rate_limited());
        assert!(matches!(
            unavailable.to_import_error("hardcover"),
            ImportError::Transport { status: 503, .. }
        ));
    }

    #[test]
    fn cancellation_and_exhaustion_map_directly() {
        assert_eq!(
            GraphqlClientError::Cancelled.to_import_error("hardcover"),
            ImportError::Cancelled
        );
        assert_eq!(
            GraphqlClientError::RateLimitExceeded { attempts: 3 }.to_import_error("hardcover"),
            ImportError::RateLimitExceeded { attempts: 3 }
        );
    }
}
