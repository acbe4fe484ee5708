//! Book result envelope.

use schemars::JsonSchema;
use serde::Serialize;
use tabby_core::Book;

/// Books returned by every `/books` endpoint.
#[must_use]
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookResults {
    /// Human-readable summary of the result count.
    pub message: String,
    /// Matching books.
    pub results: Vec<Book>,
    /// Number of entries in `results`.
    pub results_count: usize,
}

impl BookResults {
    /// Wraps `books`, deriving the message and count.
    pub fn new(books: Vec<Book>) -> Self {
        let message = match books.len() {
            0 => "No books found.".to_owned(),
            count => format!("Found {count} books."),
        };

        Self {
            message,
            results_count: books.len(),
            results: books,
        }
    }
}

impl From<Vec<Book>> for BookResults {
    #[inline]
    fn from(books: Vec<Book>) -> Self {
        Self::new(books)
    }
}
