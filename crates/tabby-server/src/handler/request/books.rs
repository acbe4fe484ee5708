//! Request types for the `/books` routes.

use std::borrow::Cow;

use schemars::JsonSchema;
use serde::Deserialize;
use tabby_core::SearchQuery;
use validator::{Validate, ValidationError};

use crate::pipeline::WeightedBook;

/// Weight assumed for every book when the request carries no weights.
const DEFAULT_WEIGHT: f64 = 1.0;

/// Query parameters of `GET /books/search`.
///
/// Every parameter is optional, but at least one must be non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// Free-text phrase, like a search bar.
    pub phrase: Option<String>,
    /// Title to search for.
    pub title: Option<String>,
    /// Author to search for.
    pub author: Option<String>,
    /// Publisher to search for.
    pub publisher: Option<String>,
    /// Subject to search for.
    pub subject: Option<String>,
    /// ISBN to search for.
    pub isbn: Option<String>,
}

impl SearchParams {
    /// Builds the catalog query, or `None` when every parameter is empty.
    pub fn into_query(self) -> Option<SearchQuery> {
        let query = SearchQuery {
            phrase: self.phrase.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            publisher: self.publisher.unwrap_or_default(),
            subject: self.subject.unwrap_or_default(),
            isbn: self.isbn.unwrap_or_default(),
        };

        (!query.is_empty()).then_some(query)
    }
}

/// Body of `POST /books/recommendations`.
#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema, Validate)]
#[validate(schema(function = "validate_equal_lengths"))]
pub struct RecommendationsRequest {
    /// Title of each book.
    pub titles: Vec<String>,
    /// Author(s) of each book.
    pub authors: Vec<String>,
    /// How heavily each book counts, from 0 to 1. Defaults to 1 for every book.
    #[serde(default)]
    pub weights: Option<Vec<f64>>,
}

impl RecommendationsRequest {
    /// Pairs titles, authors and weights, clamping every weight.
    pub fn weighted_books(&self) -> Vec<WeightedBook> {
        self.titles
            .iter()
            .zip(&self.authors)
            .enumerate()
            .map(|(index, (title, author))| {
                let weight = self
                    .weights
                    .as_ref()
                    .and_then(|weights| weights.get(index).copied())
                    .unwrap_or(DEFAULT_WEIGHT);
                WeightedBook::new(title.as_str(), author.as_str(), weight)
            })
            .collect()
    }
}

fn validate_equal_lengths(request: &RecommendationsRequest) -> Result<(), ValidationError> {
    let count = request.titles.len();
    let weights_match = request
        .weights
        .as_ref()
        .is_none_or(|weights| weights.len() == count);

    if request.authors.len() == count && weights_match {
        return Ok(());
    }

    Err(ValidationError::new("equal_length")
        .with_message(Cow::Borrowed("All lists must be equal in length.")))
}
