//! Conversion of Hardcover rows into canonical import records.
//!
//! Every "now" fallback goes through the injected [`Clock`].

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use shelf_core::{
    Clock, ImportItem, MediaType, RatingRecord, SystemClock, WatchEvent, WatchlistEntry,
};

use crate::types::{Book, UserBookRecord};

/// Identifier scheme and external-id namespace for Hardcover book ids.
pub const PROVIDER_KEY: &str = "hardcover";

/// Identifier scheme for ISBN-13.
pub const ISBN13_KEY: &str = "isbn13";

/// Identifier scheme for ISBN-10.
pub const ISBN10_KEY: &str = "isbn";

/// Progress reported for every finished book.
pub const COMPLETED_PROGRESS: u8 = 100;

/// Maps Hardcover rows to canonical records.
#[derive(Debug, Clone)]
pub struct Normalizer {
    clock: Arc<dyn Clock>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl Normalizer {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// A finished read. `None` if the row has no book.
    ///
    /// Only the latest read's finish time is consulted; the shelf insertion
    /// time is not a completion time.
    #[must_use]
    pub fn to_watch_event(&self, row: &UserBookRecord) -> Option<WatchEvent> {
        let book = row.book.as_ref()?;
        let finished_at = row
            .latest_read()
            .and_then(|read| parse_timestamp(read.finished_at.as_deref()));
        Some(WatchEvent {
            item: build_item(book),
            watched_at: finished_at.unwrap_or_else(|| self.clock.now()),
            progress: COMPLETED_PROGRESS,
        })
    }

    /// A rating on the 1-10 scale. `None` if the row has no book or no rating.
    #[must_use]
    pub fn to_rating(&self, row: &UserBookRecord) -> Option<RatingRecord> {
        let book = row.book.as_ref()?;
        let rating = row.rating?;
        Some(RatingRecord {
            item: build_item(book),
            rating: rating_to_scale(rating),
            rated_at: self.inserted_at_or_now(row),
        })
    }

    /// A want-to-read entry. `None` if the row has no book.
    #[must_use]
    pub fn to_watchlist_entry(&self, row: &UserBookRecord) -> Option<WatchlistEntry> {
        let book = row.book.as_ref()?;
        Some(WatchlistEntry {
            item: build_item(book),
            added_at: self.inserted_at_or_now(row),
        })
    }

    /// Watch events in row order, keeping those at or after `since`.
    #[must_use]
    pub fn watch_history(
        &self,
        rows: &[UserBookRecord],
        since: Option<DateTime<Utc>>,
    ) -> Vec<WatchEvent> {
        rows.iter()
            .filter_map(|row| self.to_watch_event(row))
            .filter(|event| since.is_none_or(|since| event.watched_at >= since))
            .collect()
    }

    /// Ratings in row order.
    #[must_use]
    pub fn ratings(&self, rows: &[UserBookRecord]) -> Vec<RatingRecord> {
        rows.iter().filter_map(|row| self.to_rating(row)).collect()
    }

    /// Watchlist entries in row order.
    #[must_use]
    pub fn watchlist(&self, rows: &[UserBookRecord]) -> Vec<WatchlistEntry> {
        rows.iter()
            .filter_map(|row| self.to_watchlist_entry(row))
            .collect()
    }

    fn inserted_at_or_now(&self, row: &UserBookRecord) -> DateTime<Utc> {
        parse_timestamp(row.inserted_at.as_deref()).unwrap_or_else(|| self.clock.now())
    }
}

/// Rescale a 0.5-5.0 rating to 1-10.
///
/// Doubles, rounds half away from zero, then clamps.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rating_to_scale(rating: f64) -> u8 {
    // `as` saturates and maps NaN to 0, which the clamp lifts to 1.
    let doubled = (rating * 2.0).round() as i64;
    doubled.clamp(1, 10) as u8
}

/// Parse an RFC 3339 timestamp. Anything unparseable counts as absent.
#[must_use]
pub fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
}

/// Identifier map for a book.
#[must_use]
pub fn build_identifiers(book: &Book) -> BTreeMap<String, String> {
    let mut identifiers = BTreeMap::new();
    if book.id > 0 {
        identifiers.insert(PROVIDER_KEY.to_string(), book.id.to_string());
    }
    if let Some(mapping) = book.primary_mapping() {
        if let Some(isbn_13) = &mapping.isbn_13 {
            identifiers.insert(ISBN13_KEY.to_string(), isbn_13.clone());
        }
        if let Some(isbn_10) = &mapping.isbn_10 {
            identifiers.insert(ISBN10_KEY.to_string(), isbn_10.clone());
        }
    }
    identifiers
}

/// Fields shared by every record for a book.
#[must_use]
pub fn build_item(book: &Book) -> ImportItem {
    ImportItem {
        external_id: format!("{PROVIDER_KEY}:{}", book.id),
        identifiers: build_identifiers(book),
        media_type: MediaType::Book,
        title: book.title.clone(),
        year: book.release_year,
    }
}
