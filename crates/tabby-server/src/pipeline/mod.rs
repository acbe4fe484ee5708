//! Book identification pipeline.
//!
//! [`BookPipeline`] orchestrates the external collaborators: text
//! recognition feeds the [`CandidateExtractor`], whose top candidate becomes
//! a catalog query. Shelf scans segment the photo first and run a cover scan
//! per region.
//!
//! Collaborator calls are bounded by a per-call timeout. Catalog failures
//! degrade to empty results; recognition and segmentation failures are
//! returned to the caller.

mod cover;
mod extraction;
mod policy;
mod shelf;
mod tags;

use std::future::Future;
use std::time::Duration;

use regex::Regex;
use tabby_core::{
    Book, BoxedCatalog, BoxedLanguageModel, BoxedSegmenter, BoxedTextRecognizer, Error, Result,
    SearchQuery,
};

pub use self::cover::{COVER_ROTATIONS, MIN_FRAGMENT_CONFIDENCE, MIN_FRAGMENT_CHARS};
pub use self::extraction::{
    ANSWER_COUNT, CandidateExtractor, MAX_ATTEMPTS, SEPARATOR, parse_candidates,
    serialize_fragments,
};
pub use self::policy::IsbnPolicy;
pub use self::shelf::{DEFAULT_SHELF_BUDGET, MAX_RESULTS_PER_REGION, SHELF_ROTATIONS, ShelfScan};
pub use self::tags::{TAG_COUNT, TagGenerator, WeightedBook, serialize_books};
use crate::utility::tracing_targets::CATALOG as TRACING_TARGET;

/// Characters removed from candidates before they are used as a query.
const PUNCTUATION_PATTERN: &str = r"[^\w\s]";

/// Shared handles to every external collaborator.
#[derive(Clone)]
pub struct Collaborators {
    /// Text recognition model.
    pub recognizer: BoxedTextRecognizer,
    /// Shelf segmentation model.
    pub segmenter: BoxedSegmenter,
    /// Language model used for extraction and tags.
    pub language_model: BoxedLanguageModel,
    /// Bibliographic catalog.
    pub catalog: BoxedCatalog,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Cover and shelf scanning over shared collaborators.
#[derive(Clone)]
pub struct BookPipeline {
    recognizer: BoxedTextRecognizer,
    segmenter: BoxedSegmenter,
    catalog: BoxedCatalog,
    extractor: CandidateExtractor,
    punctuation: Regex,
    call_timeout: Duration,
    shelf_budget: Duration,
}

impl BookPipeline {
    /// Creates a pipeline bounding every collaborator call by `call_timeout`.
    pub fn new(collaborators: &Collaborators, call_timeout: Duration) -> Result<Self> {
        let punctuation = Regex::new(PUNCTUATION_PATTERN).map_err(|err| {
            Error::configuration()
                .with_message("invalid punctuation pattern")
                .with_source(err)
        })?;

        Ok(Self {
            recognizer: collaborators.recognizer.clone(),
            segmenter: collaborators.segmenter.clone(),
            catalog: collaborators.catalog.clone(),
            extractor: CandidateExtractor::new(
                collaborators.language_model.clone(),
                call_timeout,
            ),
            punctuation,
            call_timeout,
            shelf_budget: DEFAULT_SHELF_BUDGET,
        })
    }

    /// Bounds a whole shelf scan; regions not reached in time are skipped.
    pub fn with_shelf_budget(mut self, shelf_budget: Duration) -> Self {
        self.shelf_budget = shelf_budget;
        self
    }

    /// Searches the catalog. Failures are logged and yield no books.
    pub async fn search(&self, query: &SearchQuery) -> Vec<Book> {
        match call_with_timeout(self.call_timeout, "catalog search", self.catalog.search(query))
            .await
        {
            Ok(books) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    results = books.len(),
                    "catalog search completed"
                );
                books
            }
            Err(err) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %err,
                    "catalog search failed"
                );
                Vec::new()
            }
        }
    }

    /// Removes punctuation and lowercases `text`.
    pub fn sanitize(&self, text: &str) -> String {
        self.punctuation.replace_all(text, "").to_lowercase()
    }
}

impl std::fmt::Debug for BookPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookPipeline")
            .field("extractor", &self.extractor)
            .field("call_timeout", &self.call_timeout)
            .field("shelf_budget", &self.shelf_budget)
            .finish_non_exhaustive()
    }
}

/// Awaits `call`, failing with a timeout error once `limit` elapses.
pub(crate) async fn call_with_timeout<T>(
    limit: Duration,
    operation: &'static str,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(Error::timeout().with_message(format!("{operation} timed out after {limit:?}"))),
    }
}
