//! Resolved catalog records.

use serde::Serialize;

/// Number of summary characters kept in [`Book::excerpt`].
pub const EXCERPT_CHARS: usize = 46;

/// Raw attributes of a catalog record, before excerpt derivation.
///
/// Missing attributes default to empty strings, a rating of `-1.0` and a
/// page count of `-1`.
#[derive(Debug, Clone, PartialEq)]
pub struct BookDetails {
    /// ISBN-13 identifier, empty when the record carries none.
    pub isbn: String,
    /// Title.
    pub title: String,
    /// Comma-joined author names.
    pub authors: String,
    /// Average rating, `-1.0` when unknown.
    pub rating: f64,
    /// Full description.
    pub summary: String,
    /// Thumbnail URL.
    pub thumbnail: String,
    /// Number of pages, `-1` when unknown.
    pub page_count: i64,
    /// Comma-joined categories.
    pub genres: String,
    /// Publisher name.
    pub publisher: String,
    /// Publication date as reported by the catalog.
    pub published_date: String,
}

impl Default for BookDetails {
    fn default() -> Self {
        Self {
            isbn: String::new(),
            title: String::new(),
            authors: String::new(),
            rating: -1.0,
            summary: String::new(),
            thumbnail: String::new(),
            page_count: -1,
            genres: String::new(),
            publisher: String::new(),
            published_date: String::new(),
        }
    }
}

/// A resolved, immutable catalog record.
///
/// A book is usable downstream only when [`Book::has_isbn`] holds; that
/// policy is applied by callers, not enforced here.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Book {
    isbn: String,
    title: String,
    authors: String,
    rating: f64,
    excerpt: String,
    summary: String,
    thumbnail: String,
    page_count: i64,
    genres: String,
    publisher: String,
    published_date: String,
}

impl Book {
    /// Creates a book, deriving the excerpt from the summary.
    pub fn new(details: BookDetails) -> Self {
        let excerpt = excerpt_of(&details.summary);
        let BookDetails {
            isbn,
            title,
            authors,
            rating,
            summary,
            thumbnail,
            page_count,
            genres,
            publisher,
            published_date,
        } = details;

        Self {
            isbn,
            title,
            authors,
            rating,
            excerpt,
            summary,
            thumbnail,
            page_count,
            genres,
            publisher,
            published_date,
        }
    }

    /// ISBN-13 identifier, possibly empty.
    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    /// Returns true when the record carries an ISBN-13.
    pub fn has_isbn(&self) -> bool {
        !self.isbn.is_empty()
    }

    /// Title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Comma-joined author names.
    pub fn authors(&self) -> &str {
        &self.authors
    }

    /// Average rating, `-1.0` when unknown.
    pub fn rating(&self) -> f64 {
        self.rating
    }

    /// First characters of the summary followed by an ellipsis.
    pub fn excerpt(&self) -> &str {
        &self.excerpt
    }

    /// Full description.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Thumbnail URL.
    pub fn thumbnail(&self) -> &str {
        &self.thumbnail
    }

    /// Number of pages, `-1` when unknown.
    pub fn page_count(&self) -> i64 {
        self.page_count
    }

    /// Comma-joined categories.
    pub fn genres(&self) -> &str {
        &self.genres
    }

    /// Publisher name.
    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    /// Publication date.
    pub fn published_date(&self) -> &str {
        &self.published_date
    }
}

impl From<BookDetails> for Book {
    #[inline]
    fn from(details: BookDetails) -> Self {
        Self::new(details)
    }
}

fn excerpt_of(summary: &str) -> String {
    let mut excerpt: String = summary.chars().take(EXCERPT_CHARS).collect();
    excerpt.push_str("...");
    excerpt
}
