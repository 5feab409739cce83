//! Fixed GraphQL queries against the Hardcover API.
//!
//! All queries are parameterless static strings. None of them accept
//! variables, so no user input ever reaches the query text.

use shelf_graphql::GraphqlOperation;

use crate::types::{MeData, UserBooksData};

/// Hardcover `status_id` for books marked "Read".
pub const STATUS_READ: i32 = 3;

/// Hardcover `status_id` for books marked "Want to Read".
pub const STATUS_WANT_TO_READ: i32 = 1;

/// Row cap applied to every `user_books` query. There is no pagination.
pub const RESULT_LIMIT: usize = 1000;

/// Authenticated user probe.
pub const ME_QUERY: &str = r"query Me {
  me {
    id
    username
  }
}";

/// Books with status "Read" and their most recently finished read.
pub const READ_BOOKS_QUERY: &str = r"query ReadBooks {
  user_books(where: {status_id: {_eq: 3}}, limit: 1000) {
    id
    rating
    book {
      id
      title
      release_year
      book_mappings {
        isbn_13
        isbn_10
      }
    }
    user_book_reads(order_by: {finished_at: desc_nulls_last}, limit: 1) {
      started_at
      finished_at
    }
  }
}";

/// Books carrying a rating.
pub const RATED_BOOKS_QUERY: &str = r"query RatedBooks {
  user_books(where: {rating: {_is_null: false}}, limit: 1000) {
    id
    rating
    inserted_at
    book {
      id
      title
      release_year
      book_mappings {
        isbn_13
        isbn_10
      }
    }
  }
}";

/// Books with status "Want to Read".
pub const WANT_TO_READ_QUERY: &str = r"query WantToRead {
  user_books(where: {status_id: {_eq: 1}}, limit: 1000) {
    id
    inserted_at
    book {
      id
      title
      release_year
      book_mappings {
        isbn_13
        isbn_10
      }
    }
  }
}";

/// `me` probe operation.
pub struct MeQuery;

impl GraphqlOperation for MeQuery {
    type Variables = ();
    type ResponseData = MeData;

    const QUERY: &'static str = ME_QUERY;
    const OPERATION_NAME: &'static str = "Me";
}

/// Reading history operation.
pub struct ReadBooksQuery;

impl GraphqlOperation for ReadBooksQuery {
    type Variables = ();
    type ResponseData = UserBooksData;

    const QUERY: &'static str = READ_BOOKS_QUERY;
    const OPERATION_NAME: &'static str = "ReadBooks";
}

/// Ratings operation.
pub struct RatedBooksQuery;

impl GraphqlOperation for RatedBooksQuery {
    type Variables = ();
    type ResponseData = UserBooksData;

    const QUERY: &'static str = RATED_BOOKS_QUERY;
    const OPERATION_NAME: &'static str = "RatedBooks";
}

/// Want-to-read operation.
pub struct WantToReadQuery;

impl GraphqlOperation for WantToReadQuery {
    type Variables = ();
    type ResponseData = UserBooksData;

    const QUERY: &'static str = WANT_TO_READ_QUERY;
    const OPERATION_NAME: &'static str = "WantToRead";
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_BOOK_QUERIES: [&str; 3] = [READ_BOOKS_QUERY, RATED_BOOKS_QUERY, WANT_TO_READ_QUERY];

    #[test]
    fn queries_take_no_variables() {
        for query in USER_BOOK_QUERIES.iter().chain([&ME_QUERY]) {
            assert!(!query.contains('$'), "query declares variables: {query}");
        }
    }

    #[test]
    fn user_book_queries_share_the_row_cap() {
        let limit = format!("limit: {RESULT_LIMIT}");
        for query in USER_BOOK_QUERIES {
            assert!(query.contains(&limit), "missing row cap: {query}");
            assert!(query.contains("book_mappings"));
            assert!(query.contains("release_year"));
        }
    }

    #[test]
    fn status_filters_match_constants() {
        assert!(READ_BOOKS_QUERY.contains(&format!("status_id: {{_eq: {STATUS_READ}}}")));
        assert!(WANT_TO_READ_QUERY.contains(&format!("status_id: {{_eq: {STATUS_WANT_TO_READ}}}")));
        assert!(RATED_BOOKS_QUERY.contains("rating: {_is_null: false}"));
    }

    #[test]
    fn selections_match_normalizer_inputs() {
        assert!(READ_BOOKS_QUERY.contains("finished_at"));
        assert!(!READ_BOOKS_QUERY.contains("inserted_at"));
        assert!(RATED_BOOKS_QUERY.contains("inserted_at"));
        assert!(WANT_TO_READ_QUERY.contains("inserted_at"));
        assert!(!WANT_TO_READ_QUERY.contains("rating"));
    }
}
