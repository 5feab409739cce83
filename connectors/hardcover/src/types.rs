//! Hardcover API response types.
//!
//! These mirror the selections in [`crate::queries`]. List fields tolerate
//! `null` and absence; timestamps stay as raw strings until normalization.

use serde::{Deserialize, Serialize};
use shelf_graphql::null_as_default;

/// `data` of the `me` probe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub me: Vec<HardcoverUser>,
}

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardcoverUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

/// `data` of every `user_books` query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserBooksData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_books: Vec<UserBookRecord>,
}

/// One row of a user's shelf.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserBookRecord {
    #[serde(default)]
    pub id: i64,

    /// Missing when the book was removed or is not visible to the user
    #[serde(default)]
    pub book: Option<Book>,

    /// 0.5-5.0 in half steps
    #[serde(default)]
    pub rating: Option<f64>,

    #[serde(default)]
    pub inserted_at: Option<String>,

    /// Most recently finished first
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_book_reads: Vec<ReadEvent>,
}

impl UserBookRecord {
    /// The most recent read, as ordered by the query.
    #[must_use]
    pub fn latest_read(&self) -> Option<&ReadEvent> {
        self.user_book_reads.first()
    }
}

/// A book in the Hardcover catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub book_mappings: Vec<IdentifierMapping>,
}

impl Book {
    /// The mapping identifiers are taken from. Later mappings are ignored.
    #[must_use]
    pub fn primary_mapping(&self) -> Option<&IdentifierMapping> {
        self.book_mappings.first()
    }
}

/// External identifiers attached to a book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierMapping {
    #[serde(default)]
    pub isbn_13: Option<String>,
    #[serde(default)]
    pub isbn_10: Option<String>,
}

/// One read-through of a book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadEvent {
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
}
