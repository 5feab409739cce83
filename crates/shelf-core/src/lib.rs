//! Shelf Core - Host contract for media import connectors.
//!
//! This crate provides the types a connector produces and the trait a host
//! drives it through:
//! - Canonical import records (watch events, ratings, watchlist entries).
//! - The [`ImportConnector`] trait with settings schema and capabilities.
//! - The [`ImportError`] taxonomy surfaced to hosts.
//! - An injectable [`Clock`] and a cooperative [`CancelSignal`].

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod cancel;
mod clock;
mod connector;
mod error;
mod records;

pub use cancel::{CancelHandle, CancelSignal};
pub use clock::{Clock, FixedClock, SystemClock};
pub use connector::{
    Capabilities, ConnectorMetadata, DeviceAuthSession, DeviceAuthStatus, ImportConnector,
    SettingDescriptor, SettingKind,
};
pub use error::{ImportError, ImportResult};
pub use records::{
    ImportItem, ImportKind, ImportRecord, MediaType, RatingRecord, WatchEvent, WatchlistEntry,
};

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use chrono::{DateTime, Utc};
