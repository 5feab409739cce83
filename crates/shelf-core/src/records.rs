//! Canonical import records.
//!
//! Every connector normalizes its payloads into these shapes. Records are
//! plain values: built once by the connector, owned by the caller afterwards.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Media type tag carried by every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Book,
    Movie,
    Show,
    Episode,
}

impl MediaType {
    /// Return the wire tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Movie => "movie",
            Self::Show => "show",
            Self::Episode => "episode",
        }
    }
}

/// Fields shared by every record variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportItem {
    /// Connector-namespaced id, `"<provider>:<native-id>"`.
    pub external_id: String,
    /// Identifier scheme to value (e.g. `isbn13` -> `9780441013593`).
    pub identifiers: BTreeMap<String, String>,
    pub media_type: MediaType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

/// A completed consumption of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEvent {
    #[serde(flatten)]
    pub item: ImportItem,
    pub watched_at: DateTime<Utc>,
    /// Completion percentage (0-100).
    pub progress: u8,
}

/// A user rating on the host's 1-10 scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRecord {
    #[serde(flatten)]
    pub item: ImportItem,
    /// Rating on the 1-10 scale.
    pub rating: u8,
    pub rated_at: DateTime<Utc>,
}

/// An item the user intends to consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    #[serde(flatten)]
    pub item: ImportItem,
    pub added_at: DateTime<Utc>,
}

/// Which record family a fetch produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    History,
    Ratings,
    Watchlist,
}

/// Any canonical record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImportRecord {
    WatchEvent(WatchEvent),
    Rating(RatingRecord),
    WatchlistEntry(WatchlistEntry),
}

impl ImportRecord {
    /// Borrow the shared item fields.
    #[must_use]
    pub const fn item(&self) -> &ImportItem {
        match self {
            Self::WatchEvent(event) => &event.item,
            Self::Rating(rating) => &rating.item,
            Self::WatchlistEntry(entry) => &entry.item,
        }
    }

    /// The record family of this variant.
    #[must_use]
    pub const fn kind(&self) -> ImportKind {
        match self {
            Self::WatchEvent(_) => ImportKind::History,
            Self::Rating(_) => ImportKind::Ratings,
            Self::WatchlistEntry(_) => ImportKind::Watchlist,
        }
    }

    /// The instant the record refers to (watched, rated or added).
    #[must_use]
    pub const fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::WatchEvent(event) => event.watched_at,
            Self::Rating(rating) => rating.rated_at,
            Self::WatchlistEntry(entry) => entry.added_at,
        }
    }
}

impl From<WatchEvent> for ImportRecord {
    fn from(event: WatchEvent) -> Self {
        Self::WatchEvent(event)
    }
}

impl From<RatingRecord> for ImportRecord {
    fn from(rating: RatingRecord) -> Self {
        Self::Rating(rating)
    }
}

impl From<WatchlistEntry> for ImportRecord {
    fn from(entry: WatchlistEntry) -> Self {
        Self::WatchlistEntry(entry)
    }
}
