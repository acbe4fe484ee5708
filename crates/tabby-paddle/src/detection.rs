//! Shelf segmentation through the PaddleX object detection pipeline.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tabby_core::{Detection, DetectionBox, SegmenterInput, ShelfSegmenter};

use crate::client::encode_png;
use crate::{DETECTION_TARGET, PdClient, Result};

/// Path of the object detection pipeline.
pub const DETECTION_PATH: &str = "object-detection";

#[derive(Debug, Serialize)]
struct DetectionRequest {
    image: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectionResult {
    #[serde(default)]
    detected_objects: Vec<DetectedObject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectedObject {
    bbox: [f32; 4],
    category_id: u32,
    score: f32,
}

impl DetectionResult {
    /// Keeps book detections scoring at least `min_confidence`.
    fn into_detections(self, book_category: u32, min_confidence: f32) -> Vec<Detection> {
        self.detected_objects
            .into_iter()
            .filter(|object| object.category_id == book_category && object.score >= min_confidence)
            .map(|object| {
                let [x1, y1, x2, y2] = object.bbox;
                Detection::new(
                    DetectionBox::new(x1, y1, x2, y2),
                    object.score,
                    object.category_id,
                )
            })
            .collect()
    }
}

impl PdClient {
    /// Runs the detection pipeline on a normalized segmenter input.
    pub async fn detect_books(&self, input: &SegmenterInput) -> Result<Vec<Detection>> {
        let request = DetectionRequest {
            image: encode_png(&input.to_rgb8())?,
        };

        let result: DetectionResult = self.infer(DETECTION_PATH, &request).await?;
        let total = result.detected_objects.len();
        let detections = result.into_detections(
            self.config().book_category,
            self.config().min_detection_confidence,
        );

        tracing::debug!(
            target: DETECTION_TARGET,
            total,
            kept = detections.len(),
            "object detection completed"
        );

        Ok(detections)
    }
}

#[async_trait]
impl ShelfSegmenter for PdClient {
    async fn find_regions(&self, input: &SegmenterInput) -> tabby_core::Result<Vec<Detection>> {
        Ok(self.detect_books(input).await?)
    }
}
