//! Reqwest-based Google Books client.

mod books_client;
mod config;

pub use books_client::BooksClient;
pub use config::{BooksConfig, DEFAULT_BOOKS_URL, DEFAULT_MAX_RESULTS, DEFAULT_TIMEOUT_SECS};
