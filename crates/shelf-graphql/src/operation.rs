//! Operation types and typed GraphQL traits.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{GraphqlClientError, GraphqlError};

/// Typed GraphQL operation definition.
///
/// Implement this trait for each fixed query. The query text is a static
/// string; callers never interpolate into it.
pub trait GraphqlOperation {
    /// Variables type (`()` for parameterless operations).
    type Variables: Serialize + Send + Sync;
    /// Response data type.
    type ResponseData: DeserializeOwned + Send;

    /// GraphQL query text.
    const QUERY: &'static str;
    /// Operation name (used for tracing).
    const OPERATION_NAME: &'static str;
}

/// GraphQL request payload: `{"query": ..., "variables": ...}`.
#[derive(Debug, Clone, Serialize)]
pub struct GraphqlRequest<'a, V> {
    pub query: &'a str,
    /// Serialized as `null` when absent.
    pub variables: Option<V>,
}

impl<'a, V> GraphqlRequest<'a, V> {
    /// Create a new request.
    #[must_use]
    pub const fn new(query: &'a str, variables: Option<V>) -> Self {
        Self { query, variables }
    }
}

/// GraphQL response envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct GraphqlResponse<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<GraphqlError>,
}

impl<T> GraphqlResponse<T> {
    /// Returns `true` if no GraphQL errors were returned.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Extract the data, failing on any GraphQL error or missing data.
    pub fn into_data(self) -> Result<T, GraphqlClientError> {
        if !self.errors.is_empty() {
            return Err(GraphqlClientError::GraphqlErrors {
                errors: self.errors,
            });
        }
        self.data.ok_or_else(|| GraphqlClientError::Protocol {
            message: "missing GraphQL data".to_string(),
        })
    }
}

/// Deserialize `null` (or an absent field, with `#[serde(default)]`) as `T::default()`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
