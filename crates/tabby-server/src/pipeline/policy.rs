//! Result filtering applied before books leave the server.

use serde::{Deserialize, Serialize};
use tabby_core::Book;

/// Drops books without an ISBN-13 when enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsbnPolicy {
    require_isbn: bool,
}

impl IsbnPolicy {
    /// Creates a policy; `require_isbn` enables filtering.
    pub const fn new(require_isbn: bool) -> Self {
        Self { require_isbn }
    }

    /// Returns true when books without an ISBN are dropped.
    pub const fn requires_isbn(&self) -> bool {
        self.require_isbn
    }

    /// Filters `books`, preserving relative order.
    pub fn apply(&self, books: Vec<Book>) -> Vec<Book> {
        if !self.require_isbn {
            return books;
        }

        books.into_iter().filter(Book::has_isbn).collect()
    }
}

impl Default for IsbnPolicy {
    fn default() -> Self {
        Self::new(true)
    }
}
