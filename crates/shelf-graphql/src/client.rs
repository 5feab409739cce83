//! GraphQL HTTP client implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shelf_core::CancelSignal;
use tracing::{debug, instrument, warn};

use crate::error::GraphqlClientError;
use crate::operation::{GraphqlOperation, GraphqlRequest, GraphqlResponse};
use crate::retry::{RetryDecision, RetryPolicy, parse_retry_after};

/// GraphQL client metrics.
#[derive(Debug, Default)]
#[allow(clippy::struct_field_names)]
pub struct GraphqlClientMetrics {
    requests_total: AtomicU64,
    requests_success: AtomicU64,
    requests_error: AtomicU64,
    requests_throttled: AtomicU64,
}

impl GraphqlClientMetrics {
    /// Snapshot current metrics.
    #[must_use]
    pub fn snapshot(&self) -> GraphqlClientMetricsSnapshot {
        GraphqlClientMetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_success: self.requests_success.load(Ordering::Relaxed),
            requests_error: self.requests_error.load(Ordering::Relaxed),
            requests_throttled: self.requests_throttled.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_field_names)]
pub struct GraphqlClientMetricsSnapshot {
    /// Operations executed.
    pub requests_total: u64,
    /// Operations that returned data.
    pub requests_success: u64,
    /// Operations that failed for any reason.
    pub requests_error: u64,
    /// HTTP 429 responses received (one operation may see several).
    pub requests_throttled: u64,
}

/// GraphQL client configuration.
#[derive(Debug, Clone)]
pub struct GraphqlClientConfig {
    /// Service name for logging and error mapping.
    pub service_name: String,
    /// Default headers applied to every request.
    pub headers: HeaderMap,
    /// User-Agent sent with every request.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retry policy for throttled requests.
    pub retry: RetryPolicy,
}

impl Default for GraphqlClientConfig {
    fn default() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            service_name: "graphql".to_string(),
            headers,
            user_agent: format!("shelf-graphql/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

/// GraphQL client builder.
#[derive(Debug, Clone)]
pub struct GraphqlClientBuilder {
    endpoint: String,
    config: GraphqlClientConfig,
    invalid_header: Option<String>,
}

impl GraphqlClientBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            config: GraphqlClientConfig::default(),
            invalid_header: None,
        }
    }

    /// Set the service name for logging and error mapping.
    #[must_use]
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.config.service_name = service_name.into();
        self
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.config.headers.insert(name, value);
        self
    }

    /// Add a bearer token header. The value is marked sensitive.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl AsRef<str>) -> Self {
        let value = format!("Bearer {}", token.as_ref());
        match HeaderValue::from_str(&value) {
            Ok(mut header) => {
                header.set_sensitive(true);
                self.config.headers.insert(AUTHORIZATION, header);
            }
            Err(_) => self.invalid_header = Some(AUTHORIZATION.to_string()),
        }
        self
    }

    /// Set the User-Agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<GraphqlClient, GraphqlClientError> {
        if let Some(name) = self.invalid_header {
            return Err(GraphqlClientError::Protocol {
                message: format!("invalid value for header {name}"),
            });
        }
        GraphqlClient::with_config(self.endpoint, self.config)
    }
}

/// GraphQL client.
///
/// Clones share one connection pool and one metrics set.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    endpoint: String,
    http: reqwest::Client,
    config: GraphqlClientConfig,
    metrics: Arc<GraphqlClientMetrics>,
}

impl GraphqlClient {
    /// Create a client with custom configuration.
    pub fn with_config(
        endpoint: impl Into<String>,
        config: GraphqlClientConfig,
    ) -> Result<Self, GraphqlClientError> {
        let http = reqwest::Client::builder()
            .default_headers(config.headers.clone())
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            http,
            config,
            metrics: Arc::new(GraphqlClientMetrics::default()),
        })
    }

    /// Endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Return client metrics snapshot.
    #[must_use]
    pub fn metrics(&self) -> GraphqlClientMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Execute a typed operation and return its data.
    #[instrument(
        skip(self, variables, cancel),
        fields(service = %self.config.service_name, operation = O::OPERATION_NAME)
    )]
    pub async fn execute<O: GraphqlOperation>(
        &self,
        variables: Option<O::Variables>,
        cancel: &CancelSignal,
    ) -> Result<O::ResponseData, GraphqlClientError> {
        self.execute_request(GraphqlRequest::new(O::QUERY, variables), cancel)
            .await
    }

    /// Execute an arbitrary request and return its data.
    ///
    /// Fails on non-2xx status, on any entry in `errors`, and on missing
    /// `data`. Throttled attempts are retried per the retry policy.
    pub async fn execute_request<V, R>(
        &self,
        request: GraphqlRequest<'_, V>,
        cancel: &CancelSignal,
    ) -> Result<R, GraphqlClientError>
    where
        V: Serialize,
        R: DeserializeOwned,
    {
        self.metrics.requests_total.fetch_add(1, Ordering::Relaxed);
        let result = self.execute_inner(&request, cancel).await;
        let counter = if result.is_ok() {
            &self.metrics.requests_success
        } else {
            &self.metrics.requests_error
        };
        counter.fetch_add(1, Ordering::Relaxed);
        result
    }

    async fn execute_inner<V, R>(
        &self,
        request: &GraphqlRequest<'_, V>,
        cancel: &CancelSignal,
    ) -> Result<R, GraphqlClientError>
    where
        V: Serialize,
        R: DeserializeOwned,
    {
        let body = serde_json::to_vec(request)?;
        let bytes = self.send_with_retry(body, cancel).await?;
        let response: GraphqlResponse<R> = serde_json::from_slice(&bytes)?;
        response.into_data()
    }

    async fn send_with_retry(
        &self,
        body: Vec<u8>,
        cancel: &CancelSignal,
    ) -> Result<Vec<u8>, GraphqlClientError> {
        let mut attempt = 1;
        loop {
            if cancel.is_cancelled() {
                return Err(GraphqlClientError::Cancelled);
            }
            debug!(attempt, "sending GraphQL request");

            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(GraphqlClientError::Cancelled),
                result = self.send_once(&body) => result,
            };

            let err = match result {
                Ok(bytes) => return Ok(bytes),
                Err(err) => err,
            };
            if err.is_rate_limited() {
                self.metrics
                    .requests_throttled
                    .fetch_add(1, Ordering::Relaxed);
            }

            match self.config.retry.decide(&err, attempt) {
                RetryDecision::RetryAfter(delay) => {
                    warn!(
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "rate limited, backing off before retry"
                    );
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Err(GraphqlClientError::Cancelled),
                        () = tokio::time::sleep(delay) => {}
                    }
                    attempt += 1;
                }
                RetryDecision::DoNotRetry if err.is_rate_limited() => {
                    warn!(attempts = attempt, "rate limit persisted on every attempt");
                    return Err(GraphqlClientError::RateLimitExceeded { attempts: attempt });
                }
                RetryDecision::DoNotRetry => return Err(err),
            }
        }
    }

    async fn send_once(&self, body: &[u8]) -> Result<Vec<u8>, GraphqlClientError> {
        let response = self
            .http
            .post(&self.endpoint)
            .body(body.to_vec())
            .send()
            .await?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| parse_retry_after(value, Utc::now()));
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(GraphqlClientError::HttpStatus {
                status,
                body: truncate_body(&bytes),
                retry_after,
            });
        }

        Ok(bytes.to_vec())
    }
}

fn truncate_body(bytes: &[u8]) -> String {
    const MAX_LEN: usize = 4096;
    let mut body = String::from_utf8_lossy(bytes).to_string();
    if body.len() > MAX_LEN {
        let mut end = MAX_LEN;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
        body.push('…');
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(3000);
        let body = truncate_body(long.as_bytes());
        assert!(body.ends_with('…'));
        assert!(body.len() <= 4096 + '…'.len_utf8());

        assert_eq!(truncate_body(b"short"), "short");
    }

    #[test]
    fn invalid_bearer_token_fails_build() {
        let err = GraphqlClientBuilder::new("http://localhost")
            .with_bearer_token("bad\ntoken")
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphqlClientError::Protocol { .. }));
    }

    #[test]
    fn default_config_matches_transport_contract() {
        let config = GraphqlClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(
            config.headers.get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
