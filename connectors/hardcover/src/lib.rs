//! Hardcover import connector.
//!
//! Imports a Hardcover user's finished books, ratings and want-to-read shelf
//! through the Hardcover GraphQL API, authenticated with a personal API token.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod connector;
pub mod normalize;
pub mod queries;
pub mod types;

pub use config::{API_TOKEN_SETTING, DEFAULT_ENDPOINT, HardcoverConfig, RetryConfig};
pub use connector::{HardcoverConnector, SERVICE};
