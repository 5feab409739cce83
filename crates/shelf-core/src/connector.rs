//! Connector trait and host-facing descriptor types.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CancelSignal, ImportResult, RatingRecord, WatchEvent, WatchlistEntry};

/// Static connector identity shown by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorMetadata {
    pub id: String,
    pub name: String,
    pub version: String,
    pub author: String,
    pub description: String,
}

/// Input widget the host renders for a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKind {
    Text,
    Password,
    Url,
}

/// One entry in a connector's settings schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingDescriptor {
    /// Key used in the settings map passed to `configure`.
    pub key: String,
    pub label: String,
    pub description: String,
    pub kind: SettingKind,
    pub required: bool,
}

/// What a connector can import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    pub supports_history: bool,
    pub supports_ratings: bool,
    pub supports_watchlist: bool,
    pub requires_device_auth: bool,
}

/// Device-authorization challenge shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAuthSession {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    pub expires_in_secs: u64,
    pub interval_secs: u64,
}

/// Result of polling a device-authorization session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeviceAuthStatus {
    Pending,
    Authorized,
    Expired,
    Denied { reason: String },
}

/// Core import connector trait - every provider implements this.
#[async_trait]
pub trait ImportConnector: Send + Sync {
    /// Static identity.
    fn metadata(&self) -> &ConnectorMetadata;

    /// Settings the host must collect before `configure`.
    fn settings_schema(&self) -> Vec<SettingDescriptor>;

    /// Apply host settings. Safe to call repeatedly.
    fn configure(&mut self, settings: &HashMap<String, String>);

    /// What this connector can import.
    fn capabilities(&self) -> Capabilities;

    /// Begin a device-authorization flow.
    async fn start_auth(&self) -> ImportResult<DeviceAuthSession>;

    /// Poll a device-authorization flow.
    async fn poll_auth(&self, device_code: &str) -> ImportResult<DeviceAuthStatus>;

    /// Probe the configured credentials. Never fails.
    async fn is_authenticated(&self) -> bool;

    /// Completed items, optionally only those at or after `since`.
    async fn get_watch_history(
        &self,
        since: Option<DateTime<Utc>>,
        cancel: &CancelSignal,
    ) -> ImportResult<Vec<WatchEvent>>;

    /// Rated items.
    async fn get_ratings(&self, cancel: &CancelSignal) -> ImportResult<Vec<RatingRecord>>;

    /// Items the user intends to consume.
    async fn get_watchlist(&self, cancel: &CancelSignal) -> ImportResult<Vec<WatchlistEntry>>;

    /// Liveness probe for the host. Never fails.
    async fn health_check(&self) -> bool {
        self.is_authenticated().await
    }
}
