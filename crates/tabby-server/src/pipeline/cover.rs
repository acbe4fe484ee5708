//! Cover scanning.

use image::RgbImage;
use tabby_core::{Book, RecognizedFragment, Result, Rotation, SearchQuery, find_text};

use super::{BookPipeline, call_with_timeout};
use crate::utility::tracing_targets::COVER as TRACING_TARGET;

/// Fragments below this confidence are ignored.
pub const MIN_FRAGMENT_CONFIDENCE: f32 = 0.3;

/// Fragments with fewer characters are ignored.
pub const MIN_FRAGMENT_CHARS: usize = 2;

/// Rotations tried on an upright cover photo.
pub const COVER_ROTATIONS: [Rotation; 1] = [Rotation::Deg0];

fn is_legible(fragment: &RecognizedFragment) -> bool {
    fragment.confidence >= MIN_FRAGMENT_CONFIDENCE && fragment.text_len() >= MIN_FRAGMENT_CHARS
}

impl BookPipeline {
    /// Identifies the book on an upright cover photo.
    pub async fn scan_cover(&self, image: &RgbImage) -> Result<Vec<Book>> {
        self.scan_cover_with(image, &COVER_ROTATIONS).await
    }

    /// Identifies a cover, recognizing text at every one of `rotations`.
    ///
    /// Returns no books when no legible text was found or extraction gave
    /// up; the language model and catalog are not consulted in the first
    /// case. ISBN filtering is left to the caller.
    pub async fn scan_cover_with(
        &self,
        image: &RgbImage,
        rotations: &[Rotation],
    ) -> Result<Vec<Book>> {
        let mut fragments = Vec::new();
        let mut last_error = None;
        let mut succeeded = 0;
        for &rotation in rotations {
            let found = call_with_timeout(
                self.call_timeout,
                "text recognition",
                find_text(self.recognizer.as_ref(), image, rotation),
            )
            .await;

            match found {
                Ok(found) => {
                    succeeded += 1;
                    fragments.extend(found);
                }
                Err(err) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        rotation = ?rotation,
                        error = %err,
                        "text recognition failed, skipping rotation"
                    );
                    last_error = Some(err);
                }
            }
        }

        if succeeded == 0
            && let Some(err) = last_error
        {
            return Err(err);
        }

        let recognized = fragments.len();
        fragments.retain(is_legible);

        if fragments.is_empty() {
            tracing::info!(
                target: TRACING_TARGET,
                recognized,
                "no legible text on cover"
            );
            return Ok(Vec::new());
        }

        for fragment in &fragments {
            tracing::debug!(
                target: TRACING_TARGET,
                confidence = fragment.confidence,
                text = %fragment.text,
                "legible fragment"
            );
        }

        let Some(candidates) = self.extractor.extract(&fragments).await else {
            return Ok(Vec::new());
        };

        let top = candidates.top();
        let phrase = format!("{} {}", self.sanitize(&top.title), self.sanitize(&top.author));
        tracing::info!(target: TRACING_TARGET, phrase = %phrase, "searching for cover");

        Ok(self.search(&SearchQuery::from_phrase(phrase)).await)
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};
    use tabby_core::mock::{MockCatalog, MockLanguageModel, MockRecognizer};
    use tabby_core::{Quad, RecognizedFragment};

    use super::super::test_support::{GIVER_ANSWER, Mocks, book, fragment};
    use super::*;

    fn cover() -> RgbImage {
        RgbImage::from_pixel(30, 40, Rgb([0, 0, 0]))
    }

    #[tokio::test]
    async fn giver_cover_queries_title_and_author() {
        let mocks = Mocks {
            language_model: MockLanguageModel::replying([GIVER_ANSWER]),
            catalog: MockCatalog::new(vec![book("The Giver", "9780544336261")]),
            ..Mocks::reading(vec![fragment("THE GIVER"), fragment("LOIS LOWRY")])
        };

        let books = mocks.pipeline().scan_cover(&cover()).await.unwrap();

        assert_eq!(books.len(), 1);
        assert_eq!(mocks.catalog.queries()[0].phrase, "the giver lois lowry");
        assert!(mocks.language_model.requests()[0].user.starts_with("THE GIVER |---| "));
    }

    #[tokio::test]
    async fn illegible_text_skips_extraction_and_catalog() {
        let faint = RecognizedFragment::new("FAINT", Quad::from_rect(0.0, 0.0, 5.0, 5.0), 0.29);
        let mocks = Mocks {
            language_model: MockLanguageModel::replying([GIVER_ANSWER]),
            ..Mocks::reading(vec![faint, fragment("A")])
        };

        let books = mocks.pipeline().scan_cover(&cover()).await.unwrap();

        assert!(books.is_empty());
        assert_eq!(mocks.recognizer().calls(), 1);
        assert_eq!(mocks.language_model.calls(), 0);
        assert_eq!(mocks.catalog.calls(), 0);
    }

    #[tokio::test]
    async fn failed_extraction_skips_catalog() {
        let mocks = Mocks {
            language_model: MockLanguageModel::replying(["no", "idea", "sorry"]),
            ..Mocks::reading(vec![fragment("THE GIVER")])
        };

        let books = mocks.pipeline().scan_cover(&cover()).await.unwrap();

        assert!(books.is_empty());
        assert_eq!(mocks.language_model.calls(), 3);
        assert_eq!(mocks.catalog.calls(), 0);
    }

    #[tokio::test]
    async fn recognizes_once_per_rotation() {
        let mocks = Mocks::reading(Vec::new());
        let rotations = [Rotation::Deg0, Rotation::Deg90, Rotation::Deg270];

        mocks
            .pipeline()
            .scan_cover_with(&cover(), &rotations)
            .await
            .unwrap();

        assert_eq!(mocks.recognizer().calls(), 3);
    }

    #[tokio::test]
    async fn recognizer_failures_are_returned() {
        let mocks = Mocks {
            recognizer: Some(MockRecognizer::failing()),
            ..Mocks::default()
        };

        assert!(mocks.pipeline().scan_cover(&cover()).await.is_err());
    }

    #[tokio::test]
    async fn failed_rotation_keeps_the_others() {
        let mocks = Mocks {
            recognizer: Some(MockRecognizer::failing_first(
                1,
                vec![fragment("THE GIVER"), fragment("LOIS LOWRY")],
            )),
            language_model: MockLanguageModel::replying([GIVER_ANSWER]),
            catalog: MockCatalog::new(vec![book("The Giver", "9780544336261")]),
            ..Mocks::default()
        };
        let rotations = [Rotation::Deg0, Rotation::Deg90, Rotation::Deg270];

        let books = mocks
            .pipeline()
            .scan_cover_with(&cover(), &rotations)
            .await
            .unwrap();

        assert_eq!(books.len(), 1);
        assert_eq!(mocks.recognizer().calls(), 3);
        assert_eq!(mocks.catalog.calls(), 1);
    }

    #[tokio::test]
    async fn every_rotation_failing_is_an_error() {
        let mocks = Mocks {
            recognizer: Some(MockRecognizer::failing()),
            ..Mocks::default()
        };
        let rotations = [Rotation::Deg0, Rotation::Deg90, Rotation::Deg270];

        let result = mocks.pipeline().scan_cover_with(&cover(), &rotations).await;

        assert!(result.is_err());
        assert_eq!(mocks.recognizer().calls(), 3);
    }
}
