//! Catalog search parameters.

use serde::{Deserialize, Serialize};

/// Free-text phrase plus optional structured fields for a catalog lookup.
///
/// Empty strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct SearchQuery {
    /// Free-text phrase.
    #[serde(default)]
    pub phrase: String,
    /// Words in the title.
    #[serde(default)]
    pub title: String,
    /// Words in the author names.
    #[serde(default)]
    pub author: String,
    /// Words in the publisher name.
    #[serde(default)]
    pub publisher: String,
    /// Category or subject.
    #[serde(default)]
    pub subject: String,
    /// ISBN identifier.
    #[serde(default)]
    pub isbn: String,
}

impl SearchQuery {
    /// Creates a query with only a free-text phrase.
    pub fn from_phrase(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            ..Self::default()
        }
    }

    /// Sets the title field.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the author field.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Sets the publisher field.
    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = publisher.into();
        self
    }

    /// Sets the subject field.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the ISBN field.
    pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = isbn.into();
        self
    }

    /// Returns true when neither the phrase nor any field is set.
    pub fn is_empty(&self) -> bool {
        [
            &self.phrase,
            &self.title,
            &self.author,
            &self.publisher,
            &self.subject,
            &self.isbn,
        ]
        .iter()
        .all(|value| value.is_empty())
    }
}
