//! Shelf GraphQL - GraphQL transport for import connectors.
//!
//! This crate provides:
//! - Typed GraphQL operations over a single POST endpoint.
//! - Bearer-token authentication with a fixed User-Agent.
//! - Rate-limit backoff honoring `Retry-After`, bounded by a retry policy.
//! - Cooperative cancellation of requests and backoff sleeps.
//! - Error mapping to the shelf import taxonomy.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

mod client;
mod error;
mod operation;
mod retry;

pub use client::{
    GraphqlClient, GraphqlClientBuilder, GraphqlClientConfig, GraphqlClientMetrics,
    GraphqlClientMetricsSnapshot,
};
pub use error::{GraphqlClientError, GraphqlError, GraphqlErrorLocation, HttpErrorInfo};
pub use operation::{GraphqlOperation, GraphqlRequest, GraphqlResponse, null_as_default};
pub use retry::{RetryDecision, RetryPolicy, parse_retry_after};
