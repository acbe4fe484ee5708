//! Scripted in-memory collaborators for testing.
//!
//! Every mock counts its invocations so tests can assert that a pipeline
//! stage was (or was not) reached.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! tabby-core = { version = "...", features = ["test-utils"] }
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use image::RgbImage;

use crate::provider::{Catalog, LanguageModel, ShelfSegmenter, TextRecognizer};
use crate::{
    Book, Completion, CompletionRequest, Detection, Error, Quad, RecognizedFragment, Result,
    SearchQuery, SegmenterInput,
};

#[derive(Debug, Clone)]
enum RecognizerMode {
    Fixed(Vec<RecognizedFragment>),
    Markers(String),
    Failing,
    FailingFirst(usize, Vec<RecognizedFragment>),
}

/// Text recognizer returning scripted fragments.
#[derive(Debug, Clone)]
pub struct MockRecognizer {
    mode: RecognizerMode,
    calls: Arc<AtomicUsize>,
}

impl MockRecognizer {
    /// Returns the same fragments on every call.
    pub fn new(fragments: Vec<RecognizedFragment>) -> Self {
        Self::with_mode(RecognizerMode::Fixed(fragments))
    }

    /// Reports one single-pixel fragment labelled `text` for every pure white
    /// pixel of the image it receives.
    pub fn marker_finder(text: impl Into<String>) -> Self {
        Self::with_mode(RecognizerMode::Markers(text.into()))
    }

    /// Fails every call with a network error.
    pub fn failing() -> Self {
        Self::with_mode(RecognizerMode::Failing)
    }

    /// Fails the first `failures` calls, then returns `fragments`.
    pub fn failing_first(failures: usize, fragments: Vec<RecognizedFragment>) -> Self {
        Self::with_mode(RecognizerMode::FailingFirst(failures, fragments))
    }

    fn with_mode(mode: RecognizerMode) -> Self {
        Self {
            mode,
            calls: Arc::default(),
        }
    }

    /// Number of `recognize` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TextRecognizer for MockRecognizer {
    async fn recognize(&self, image: &RgbImage) -> Result<Vec<RecognizedFragment>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.mode {
            RecognizerMode::Fixed(fragments) => Ok(fragments.clone()),
            RecognizerMode::Markers(text) => Ok(image
                .enumerate_pixels()
                .filter(|(_, _, pixel)| pixel.0 == [255, 255, 255])
                .map(|(x, y, _)| {
                    let (x, y) = (x as f32, y as f32);
                    RecognizedFragment::new(
                        text.clone(),
                        Quad::from_rect(x, y, x + 1.0, y + 1.0),
                        1.0,
                    )
                })
                .collect()),
            RecognizerMode::Failing => {
                Err(Error::network_error().with_message("mock recognizer unavailable"))
            }
            RecognizerMode::FailingFirst(failures, _) if call < *failures => {
                Err(Error::network_error().with_message("mock recognizer unavailable"))
            }
            RecognizerMode::FailingFirst(_, fragments) => Ok(fragments.clone()),
        }
    }
}

/// Shelf segmenter returning scripted detections.
#[derive(Debug, Clone, Default)]
pub struct MockSegmenter {
    detections: Vec<Detection>,
    calls: Arc<AtomicUsize>,
}

impl MockSegmenter {
    /// Returns the same detections on every call.
    pub fn new(detections: Vec<Detection>) -> Self {
        Self {
            detections,
            calls: Arc::default(),
        }
    }

    /// Number of `find_regions` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ShelfSegmenter for MockSegmenter {
    async fn find_regions(&self, _input: &SegmenterInput) -> Result<Vec<Detection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.detections.clone())
    }
}

/// Language model that replays a script of responses.
///
/// Once the script runs out, every further call returns a completion with
/// zero choices.
#[derive(Debug, Clone, Default)]
pub struct MockLanguageModel {
    script: Arc<Mutex<VecDeque<Result<Completion>>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    latency: Option<Duration>,
}

impl MockLanguageModel {
    /// Replays `responses` in order.
    pub fn new(responses: impl IntoIterator<Item = Result<Completion>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(responses.into_iter().collect())),
            requests: Arc::default(),
            latency: None,
        }
    }

    /// Delays every reply by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Replays `contents` as single-choice completions.
    pub fn replying<I, S>(contents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(contents.into_iter().map(|c| Ok(Completion::single(c))))
    }

    /// Number of `complete` calls so far.
    pub fn calls(&self) -> usize {
        self.requests().len()
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait::async_trait]
impl LanguageModel for MockLanguageModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Ok(Completion::default()))
    }
}

/// Catalog returning fixed books and recording every query.
#[derive(Debug, Clone, Default)]
pub struct MockCatalog {
    books: Vec<Book>,
    failing: bool,
    queries: Arc<Mutex<Vec<SearchQuery>>>,
}

impl MockCatalog {
    /// Returns `books` for every query.
    pub fn new(books: Vec<Book>) -> Self {
        Self {
            books,
            ..Self::default()
        }
    }

    /// Fails every query with a network error.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Number of `search` calls so far.
    pub fn calls(&self) -> usize {
        self.queries().len()
    }

    /// Every query received so far.
    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait::async_trait]
impl Catalog for MockCatalog {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Book>> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.clone());

        if self.failing {
            return Err(Error::network_error().with_message("mock catalog unavailable"));
        }
        Ok(self.books.clone())
    }
}
