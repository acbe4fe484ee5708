//! Collaborator abstractions consumed by the scanning pipeline.
//!
//! Each trait is implemented by an HTTP client crate in the workspace and by
//! the scripted mocks in [`crate::mock`]. Handles are shared as `Arc<dyn _>`
//! through the application state, so implementations must be `Send + Sync`.

use std::sync::Arc;

use image::RgbImage;

use crate::{
    Book, Completion, CompletionRequest, Detection, RecognizedFragment, Result, Rotation,
    SearchQuery, SegmenterInput, TRACING_TARGET_PROVIDER,
};

/// Shared text recognizer handle.
pub type BoxedTextRecognizer = Arc<dyn TextRecognizer>;

/// Shared shelf segmenter handle.
pub type BoxedSegmenter = Arc<dyn ShelfSegmenter>;

/// Shared language model handle.
pub type BoxedLanguageModel = Arc<dyn LanguageModel>;

/// Shared catalog handle.
pub type BoxedCatalog = Arc<dyn Catalog>;

/// Finds text spans in an image.
#[async_trait::async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Recognizes text in `image` as given, without any rotation.
    ///
    /// Returned corners are in `image`'s own pixel frame.
    async fn recognize(&self, image: &RgbImage) -> Result<Vec<RecognizedFragment>>;
}

/// Finds book-shaped regions in a shelf photo.
#[async_trait::async_trait]
pub trait ShelfSegmenter: Send + Sync {
    /// Returns detections in the input's square coordinate space.
    async fn find_regions(&self, input: &SegmenterInput) -> Result<Vec<Detection>>;
}

/// Single-turn text completion.
#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    /// Completes the request. Choices carry no schema guarantee.
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion>;
}

/// Bibliographic catalog lookup.
#[async_trait::async_trait]
pub trait Catalog: Send + Sync {
    /// Searches the catalog and returns every record it understood, in
    /// catalog order. No ISBN filtering is applied.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Book>>;
}

/// Recognizes text in `image` turned clockwise by `rotation`, with every
/// fragment mapped back into the frame of `image`.
pub async fn find_text(
    recognizer: &dyn TextRecognizer,
    image: &RgbImage,
    rotation: Rotation,
) -> Result<Vec<RecognizedFragment>> {
    let (width, height) = image.dimensions();
    let rotated = rotation.rotate_image(image);

    let mut fragments = recognizer.recognize(&rotated).await?;
    for fragment in &mut fragments {
        fragment.remap(rotation, width as f32, height as f32);
    }

    tracing::debug!(
        target: TRACING_TARGET_PROVIDER,
        rotation = rotation.degrees(),
        width,
        height,
        fragments = fragments.len(),
        "text recognized",
    );

    Ok(fragments)
}
