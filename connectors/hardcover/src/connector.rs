//! Hardcover connector implementation.
//!
//! Implements the `ImportConnector` trait over the Hardcover GraphQL API.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shelf_core::{
    CancelSignal, Capabilities, Clock, ConnectorMetadata, DeviceAuthSession, DeviceAuthStatus,
    ImportConnector, ImportError, ImportKind, ImportRecord, ImportResult, RatingRecord,
    SettingDescriptor, SettingKind, WatchEvent, WatchlistEntry,
};
use shelf_graphql::{
    GraphqlClient, GraphqlClientBuilder, GraphqlClientMetricsSnapshot, GraphqlOperation,
};
use tracing::{debug, info, instrument, warn};

use crate::config::{API_TOKEN_SETTING, HardcoverConfig, token_from_settings};
use crate::normalize::Normalizer;
use crate::queries::{MeQuery, RatedBooksQuery, ReadBooksQuery, WantToReadQuery};
use crate::types::{UserBookRecord, UserBooksData};

/// Service name used in logs and errors.
pub const SERVICE: &str = "hardcover";

const DEVICE_AUTH_GUIDANCE: &str = "Hardcover does not support device authorization; \
     set an API token from https://hardcover.app/account/api instead";

enum TransportState {
    Unconfigured,
    Configured {
        token: String,
        /// Built on first use. Concurrent first uses may each build one;
        /// only the first stored client is kept.
        transport: OnceLock<Arc<GraphqlClient>>,
    },
}

impl std::fmt::Debug for TransportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unconfigured => f.write_str("Unconfigured"),
            Self::Configured { transport, .. } => f
                .debug_struct("Configured")
                .field("token", &"[redacted]")
                .field("transport_built", &transport.get().is_some())
                .finish(),
        }
    }
}

/// Hardcover import connector.
#[derive(Debug)]
pub struct HardcoverConnector {
    metadata: ConnectorMetadata,
    config: HardcoverConfig,
    normalizer: Normalizer,
    state: TransportState,
}

impl Default for HardcoverConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl HardcoverConnector {
    /// Create an unconfigured connector against the public API.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HardcoverConfig::default())
    }

    /// Create an unconfigured connector with explicit configuration.
    #[must_use]
    pub fn with_config(config: HardcoverConfig) -> Self {
        Self {
            metadata: ConnectorMetadata {
                id: "hardcover".into(),
                name: "Hardcover".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                author: "Shelf".into(),
                description: "Import reading history, ratings and want-to-read shelf from Hardcover"
                    .into(),
            },
            config,
            normalizer: Normalizer::default(),
            state: TransportState::Unconfigured,
        }
    }

    /// Replace the clock used for timestamp fallbacks.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.normalizer = Normalizer::new(clock);
        self
    }

    /// Whether an API token is set.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        matches!(self.state, TransportState::Configured { .. })
    }

    #[must_use]
    pub const fn config(&self) -> &HardcoverConfig {
        &self.config
    }

    /// Metrics of the live transport, if one has been built.
    #[must_use]
    pub fn metrics(&self) -> Option<GraphqlClientMetricsSnapshot> {
        match &self.state {
            TransportState::Configured { transport, .. } => {
                transport.get().map(|client| client.metrics())
            }
            TransportState::Unconfigured => None,
        }
    }

    /// Drop the token and any live transport.
    pub fn shutdown(&mut self) {
        self.dispose_transport();
        self.state = TransportState::Unconfigured;
        info!(service = SERVICE, "connector shut down");
    }

    /// Fetch one kind of record.
    ///
    /// `since` applies to history only.
    pub async fn fetch(
        &self,
        kind: ImportKind,
        since: Option<DateTime<Utc>>,
        cancel: &CancelSignal,
    ) -> ImportResult<Vec<ImportRecord>> {
        let records = match kind {
            ImportKind::History => into_records(self.get_watch_history(since, cancel).await?),
            ImportKind::Ratings => into_records(self.get_ratings(cancel).await?),
            ImportKind::Watchlist => into_records(self.get_watchlist(cancel).await?),
        };
        Ok(records)
    }

    fn dispose_transport(&mut self) {
        if let TransportState::Configured { transport, .. } = &mut self.state {
            if let Some(client) = transport.take() {
                debug!(service = SERVICE, endpoint = client.endpoint(), "disposing transport");
            }
        }
    }

    /// The shared transport, building it on first use.
    fn transport(&self) -> ImportResult<Arc<GraphqlClient>> {
        let TransportState::Configured { token, transport } = &self.state else {
            return Err(ImportError::configuration(format!(
                "Hardcover API token is not set; configure `{API_TOKEN_SETTING}` first"
            )));
        };
        if let Some(client) = transport.get() {
            return Ok(Arc::clone(client));
        }

        let client = GraphqlClientBuilder::new(&self.config.endpoint)
            .with_service_name(SERVICE)
            .with_bearer_token(token)
            .with_user_agent(&self.config.user_agent)
            .with_timeout(self.config.timeout)
            .with_retry_policy(self.config.retry.to_policy())
            .build()
            .map_err(|err| match err.to_import_error(SERVICE) {
                ImportError::Api { message, .. } => ImportError::configuration(message),
                other => other,
            })?;
        debug!(service = SERVICE, endpoint = %self.config.endpoint, "built transport");

        Ok(Arc::clone(transport.get_or_init(|| Arc::new(client))))
    }

    async fn user_books<O>(&self, cancel: &CancelSignal) -> ImportResult<Vec<UserBookRecord>>
    where
        O: GraphqlOperation<Variables = (), ResponseData = UserBooksData>,
    {
        let client = self.transport()?;
        let data = client
            .execute::<O>(None, cancel)
            .await
            .map_err(|err| err.to_import_error(SERVICE))?;
        debug!(
            operation = O::OPERATION_NAME,
            rows = data.user_books.len(),
            "fetched user books"
        );
        Ok(data.user_books)
    }
}

fn into_records<T: Into<ImportRecord>>(items: Vec<T>) -> Vec<ImportRecord> {
    items.into_iter().map(Into::into).collect()
}

#[async_trait]
impl ImportConnector for HardcoverConnector {
    fn metadata(&self) -> &ConnectorMetadata {
        &self.metadata
    }

    fn settings_schema(&self) -> Vec<SettingDescriptor> {
        vec![SettingDescriptor {
            key: API_TOKEN_SETTING.into(),
            label: "API Token".into(),
            description: "Personal API token from https://hardcover.app/account/api".into(),
            kind: SettingKind::Password,
            required: true,
        }]
    }

    fn configure(&mut self, settings: &HashMap<String, String>) {
        self.dispose_transport();
        self.state = match token_from_settings(settings) {
            Some(token) => TransportState::Configured {
                token,
                transport: OnceLock::new(),
            },
            None => TransportState::Unconfigured,
        };
        info!(
            service = SERVICE,
            configured = self.is_configured(),
            "connector configured"
        );
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_history: true,
            supports_ratings: true,
            supports_watchlist: true,
            requires_device_auth: false,
        }
    }

    async fn start_auth(&self) -> ImportResult<DeviceAuthSession> {
        Err(ImportError::unsupported(DEVICE_AUTH_GUIDANCE))
    }

    async fn poll_auth(&self, _device_code: &str) -> ImportResult<DeviceAuthStatus> {
        Err(ImportError::unsupported(DEVICE_AUTH_GUIDANCE))
    }

    #[instrument(skip(self), fields(service = SERVICE))]
    async fn is_authenticated(&self) -> bool {
        if !self.is_configured() {
            return false;
        }
        let client = match self.transport() {
            Ok(client) => client,
            Err(err) => {
                warn!(error = %err, "cannot build transport");
                return false;
            }
        };
        match client.execute::<MeQuery>(None, &CancelSignal::never()).await {
            Ok(data) => !data.me.is_empty(),
            Err(err) => {
                warn!(error = %err, "authentication probe failed");
                false
            }
        }
    }

    #[instrument(skip(self, cancel), fields(service = SERVICE))]
    async fn get_watch_history(
        &self,
        since: Option<DateTime<Utc>>,
        cancel: &CancelSignal,
    ) -> ImportResult<Vec<WatchEvent>> {
        let rows = self.user_books::<ReadBooksQuery>(cancel).await?;
        let events = self.normalizer.watch_history(&rows, since);
        info!(count = events.len(), "fetched reading history");
        Ok(events)
    }

    #[instrument(skip(self, cancel), fields(service = SERVICE))]
    async fn get_ratings(&self, cancel: &CancelSignal) -> ImportResult<Vec<RatingRecord>> {
        let rows = self.user_books::<RatedBooksQuery>(cancel).await?;
        let ratings = self.normalizer.ratings(&rows);
        info!(count = ratings.len(), "fetched ratings");
        Ok(ratings)
    }

    #[instrument(skip(self, cancel), fields(service = SERVICE))]
    async fn get_watchlist(&self, cancel: &CancelSignal) -> ImportResult<Vec<WatchlistEntry>> {
        let rows = self.user_books::<WantToReadQuery>(cancel).await?;
        let entries = self.normalizer.watchlist(&rows);
        info!(count = entries.len(), "fetched want-to-read shelf");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(token: &str) -> HashMap<String, String> {
        HashMap::from([(API_TOKEN_SETTING.to_string(), token.to_string())])
    }

    #[test]
    fn configure_toggles_state() {
        let mut connector = HardcoverConnector::new();
        assert!(!connector.is_configured());

        connector.configure(&settings("tok"));
        assert!(connector.is_configured());

        connector.configure(&settings("  "));
        assert!(!connector.is_configured());

        connector.configure(&settings("tok"));
        connector.shutdown();
        assert!(!connector.is_configured());
    }

    #[test]
    fn transport_is_built_once_and_dropped_on_reconfigure() {
        let mut connector = HardcoverConnector::new();
        connector.configure(&settings("tok"));
        assert!(connector.metrics().is_none());

        let first = connector.transport().unwrap();
        let second = connector.transport().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(connector.metrics().is_some());

        connector.configure(&settings("other"));
        assert!(connector.metrics().is_none());
        let rebuilt = connector.transport().unwrap();
        assert!(!Arc::ptr_eq(&first, &rebuilt));
    }

    #[test]
    fn unconfigured_transport_is_a_configuration_error() {
        let connector = HardcoverConnector::new();
        let err = connector.transport().unwrap_err();
        assert!(matches!(err, ImportError::Configuration { .. }));
    }

    #[test]
    fn debug_output_redacts_token() {
        let mut connector = HardcoverConnector::new();
        connector.configure(&settings("super-secret"));
        let debug = format!("{connector:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[redacted]"));
    }

    #[test]
    fn token_with_control_characters_fails_as_configuration() {
        let mut connector = HardcoverConnector::new();
        connector.configure(&settings("bad\u{7f}token"));
        let err = connector.transport().unwrap_err();
        assert!(matches!(err, ImportError::Configuration { .. }));
    }
}
