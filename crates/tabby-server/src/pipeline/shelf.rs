//! Shelf scanning.

use std::time::Duration;

use image::RgbImage;
use tabby_core::{Book, Result, Rotation, SegmenterInput, ShelfRegion};
use tokio::time::{Instant, timeout_at};

use super::{BookPipeline, IsbnPolicy, call_with_timeout};
use crate::utility::tracing_targets::SHELF as TRACING_TARGET;

/// Rotations tried on every shelf region; spines are often sideways.
pub const SHELF_ROTATIONS: [Rotation; 3] = [Rotation::Deg0, Rotation::Deg90, Rotation::Deg270];

/// Default time budget of a whole shelf scan.
///
/// Stays below the default request timeout so a slow shelf still answers
/// with the regions it finished.
pub const DEFAULT_SHELF_BUDGET: Duration = Duration::from_secs(90);

/// Books kept per region after filtering.
pub const MAX_RESULTS_PER_REGION: usize = 5;

/// Catalog results per shelf region, in discovery order.
///
/// Regions without any remaining book are not represented.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShelfScan {
    regions: Vec<Vec<Book>>,
}

impl ShelfScan {
    /// Books of every surviving region; never empty per region.
    pub fn regions(&self) -> &[Vec<Book>] {
        &self.regions
    }

    /// Number of surviving regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Returns true when no region survived.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// The best book of every region.
    pub fn into_first_books(self) -> Vec<Book> {
        self.regions
            .into_iter()
            .filter_map(|books| books.into_iter().next())
            .collect()
    }
}

impl BookPipeline {
    /// Identifies every book on a shelf photo.
    ///
    /// Regions are scanned one at a time. A region whose scan fails counts
    /// as empty; only a segmentation failure fails the whole shelf. Once the
    /// shelf budget is spent, the region in progress is abandoned and the
    /// regions finished so far are returned.
    pub async fn scan_shelf(&self, image: &RgbImage, policy: IsbnPolicy) -> Result<ShelfScan> {
        let deadline = Instant::now() + self.shelf_budget;
        let (width, height) = image.dimensions();
        let input = SegmenterInput::from_image(image);

        let detections = call_with_timeout(
            self.call_timeout,
            "shelf segmentation",
            self.segmenter.find_regions(&input),
        )
        .await?;

        let regions: Vec<ShelfRegion> = detections
            .iter()
            .filter_map(|detection| {
                ShelfRegion::from_detection(detection, input.size(), width, height)
            })
            .collect();

        tracing::info!(
            target: TRACING_TARGET,
            detections = detections.len(),
            regions = regions.len(),
            "shelf segmented"
        );

        let mut scanned = Vec::with_capacity(regions.len());
        for (index, region) in regions.iter().enumerate() {
            let crop = region.crop(image);
            let scan = timeout_at(deadline, self.scan_cover_with(&crop, &SHELF_ROTATIONS));
            let books = match scan.await {
                Ok(Ok(books)) => books,
                Err(_) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        region = index,
                        skipped = regions.len() - index,
                        budget_secs = self.shelf_budget.as_secs_f32(),
                        "shelf budget spent, returning partial results"
                    );
                    break;
                }
                Ok(Err(err)) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        region = index,
                        error = %err,
                        "region scan failed"
                    );
                    Vec::new()
                }
            };

            let mut books = policy.apply(books);
            books.truncate(MAX_RESULTS_PER_REGION);
            if !books.is_empty() {
                scanned.push(books);
            }
        }

        Ok(ShelfScan { regions: scanned })
    }
}

#[cfg(test)]
mod tests {
    use image::Rgb;
    use tabby_core::mock::{MockCatalog, MockLanguageModel, MockRecognizer, MockSegmenter};
    use tabby_core::{Detection, DetectionBox};

    use super::super::test_support::{GIVER_ANSWER, Mocks, book, fragment};
    use super::*;

    fn shelf() -> RgbImage {
        RgbImage::from_pixel(320, 160, Rgb([0, 0, 0]))
    }

    fn detection(x1: f32, y1: f32, x2: f32, y2: f32) -> Detection {
        Detection::new(DetectionBox::new(x1, y1, x2, y2), 0.9, 0)
    }

    fn two_spines() -> MockSegmenter {
        MockSegmenter::new(vec![
            detection(0.0, 0.0, 100.0, 640.0),
            // zero width after scaling
            detection(300.0, 0.0, 300.5, 640.0),
            detection(200.0, 0.0, 300.0, 640.0),
        ])
    }

    #[tokio::test]
    async fn scans_every_surviving_region() {
        let mocks = Mocks {
            segmenter: two_spines(),
            language_model: MockLanguageModel::replying([GIVER_ANSWER, GIVER_ANSWER]),
            catalog: MockCatalog::new(vec![
                book("The Giver", "9780544336261"),
                book("No ISBN", ""),
                book("Gathering Blue", "9780544340688"),
            ]),
            ..Mocks::reading(vec![fragment("THE GIVER")])
        };

        let scan = mocks
            .pipeline()
            .scan_shelf(&shelf(), IsbnPolicy::default())
            .await
            .unwrap();

        assert_eq!(mocks.segmenter.calls(), 1);
        assert_eq!(mocks.recognizer().calls(), 2 * SHELF_ROTATIONS.len());
        assert_eq!(mocks.catalog.calls(), 2);
        assert_eq!(scan.len(), 2);
        assert_eq!(scan.regions()[0].len(), 2);
        assert_eq!(scan.regions()[0][1].title(), "Gathering Blue");

        let firsts = scan.into_first_books();
        assert_eq!(firsts.len(), 2);
        assert!(firsts.iter().all(|b| b.title() == "The Giver"));
    }

    #[tokio::test]
    async fn truncates_each_region() {
        let books = (0..8)
            .map(|i| book(&format!("Volume {i}"), &format!("97800000000{i:02}")))
            .collect();
        let mocks = Mocks {
            segmenter: MockSegmenter::new(vec![detection(0.0, 0.0, 640.0, 640.0)]),
            language_model: MockLanguageModel::replying([GIVER_ANSWER]),
            catalog: MockCatalog::new(books),
            ..Mocks::reading(vec![fragment("THE GIVER")])
        };

        let scan = mocks
            .pipeline()
            .scan_shelf(&shelf(), IsbnPolicy::default())
            .await
            .unwrap();

        assert_eq!(scan.regions()[0].len(), MAX_RESULTS_PER_REGION);
        assert_eq!(scan.regions()[0][0].title(), "Volume 0");
    }

    #[tokio::test]
    async fn failing_regions_are_dropped() {
        let mocks = Mocks {
            recognizer: Some(MockRecognizer::failing()),
            segmenter: two_spines(),
            ..Mocks::default()
        };

        let scan = mocks
            .pipeline()
            .scan_shelf(&shelf(), IsbnPolicy::default())
            .await
            .unwrap();

        assert!(scan.is_empty());
        assert_eq!(mocks.recognizer().calls(), 2);
        assert_eq!(mocks.catalog.calls(), 0);
    }

    #[tokio::test]
    async fn regions_without_isbn_books_are_dropped() {
        let mocks = Mocks {
            segmenter: MockSegmenter::new(vec![detection(0.0, 0.0, 640.0, 640.0)]),
            language_model: MockLanguageModel::replying([GIVER_ANSWER, GIVER_ANSWER]),
            catalog: MockCatalog::new(vec![book("No ISBN", "")]),
            ..Mocks::reading(vec![fragment("THE GIVER")])
        };

        let filtered = mocks
            .pipeline()
            .scan_shelf(&shelf(), IsbnPolicy::default())
            .await
            .unwrap();
        assert!(filtered.is_empty());

        let unfiltered = mocks
            .pipeline()
            .scan_shelf(&shelf(), IsbnPolicy::new(false))
            .await
            .unwrap();
        assert_eq!(unfiltered.len(), 1);
    }

    #[tokio::test]
    async fn spent_budget_keeps_finished_regions() {
        let mocks = Mocks {
            segmenter: MockSegmenter::new(vec![
                detection(0.0, 0.0, 200.0, 640.0),
                detection(200.0, 0.0, 400.0, 640.0),
                detection(400.0, 0.0, 600.0, 640.0),
            ]),
            language_model: MockLanguageModel::replying([GIVER_ANSWER; 3])
                .with_latency(Duration::from_millis(200)),
            catalog: MockCatalog::new(vec![book("The Giver", "9780544336261")]),
            ..Mocks::reading(vec![fragment("THE GIVER")])
        };

        let started = Instant::now();
        let scan = mocks
            .pipeline()
            .with_shelf_budget(Duration::from_millis(300))
            .scan_shelf(&shelf(), IsbnPolicy::default())
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(scan.len(), 1);
        assert_eq!(scan.regions()[0][0].title(), "The Giver");
        assert_eq!(mocks.language_model.calls(), 2);
        assert_eq!(mocks.catalog.calls(), 1);
    }
}
