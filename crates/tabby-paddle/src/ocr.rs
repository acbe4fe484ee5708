//! Text recognition through the PaddleX OCR pipeline.
//!
//! The pipeline answers with one entry per input page. Each entry carries
//! parallel arrays of texts, scores and polygons; spans whose polygon is not
//! a quadrilateral are dropped.

use async_trait::async_trait;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use tabby_core::{Point, Quad, RecognizedFragment, TextRecognizer};

use crate::client::encode_png;
use crate::{OCR_TARGET, PdClient, Result};

/// Path of the OCR pipeline.
pub const OCR_PATH: &str = "ocr";

/// `fileType` value for image inputs.
const FILE_TYPE_IMAGE: u8 = 1;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OcrRequest {
    file: String,
    file_type: u8,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OcrResult {
    #[serde(default)]
    ocr_results: Vec<OcrPage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OcrPage {
    pruned_result: PrunedResult,
}

#[derive(Debug, Default, Deserialize)]
struct PrunedResult {
    #[serde(default)]
    rec_texts: Vec<String>,
    #[serde(default)]
    rec_scores: Vec<f32>,
    #[serde(default)]
    rec_polys: Vec<Vec<[f32; 2]>>,
}

impl PrunedResult {
    fn into_fragments(self) -> impl Iterator<Item = RecognizedFragment> {
        self.rec_texts
            .into_iter()
            .zip(self.rec_scores)
            .zip(self.rec_polys)
            .filter_map(|((text, score), poly)| {
                let quad = Quad::try_from_points(poly.into_iter().map(|[x, y]| Point::new(x, y)))
                    .ok()?;
                Some(RecognizedFragment::new(text, quad, score))
            })
    }
}

impl OcrResult {
    fn into_fragments(self) -> Vec<RecognizedFragment> {
        self.ocr_results
            .into_iter()
            .flat_map(|page| page.pruned_result.into_fragments())
            .collect()
    }
}

impl PdClient {
    /// Runs the OCR pipeline on an image.
    pub async fn ocr(&self, image: &RgbImage) -> Result<Vec<RecognizedFragment>> {
        let request = OcrRequest {
            file: encode_png(image)?,
            file_type: FILE_TYPE_IMAGE,
        };

        let result: OcrResult = self.infer(OCR_PATH, &request).await?;
        let fragments = result.into_fragments();

        tracing::debug!(
            target: OCR_TARGET,
            width = image.width(),
            height = image.height(),
            fragments = fragments.len(),
            "OCR completed"
        );

        Ok(fragments)
    }
}

#[async_trait]
impl TextRecognizer for PdClient {
    async fn recognize(&self, image: &RgbImage) -> tabby_core::Result<Vec<RecognizedFragment>> {
        Ok(self.ocr(image).await?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_shape() {
        let request = OcrRequest {
            file: "abc".into(),
            file_type: FILE_TYPE_IMAGE,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"file": "abc", "fileType": 1})
        );
    }

    #[test]
    fn parses_pruned_results() {
        let result: OcrResult = serde_json::from_value(json!({
            "ocrResults": [{
                "prunedResult": {
                    "rec_texts": ["THE GIVER", "LOIS LOWRY"],
                    "rec_scores": [0.98, 0.91],
                    "rec_polys": [
                        [[10, 10], [200, 10], [200, 60], [10, 60]],
                        [[12, 80], [150, 80], [150, 110], [12, 110]]
                    ]
                },
                "inputImage": "ignored"
            }]
        }))
        .unwrap();

        let fragments = result.into_fragments();
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].text, "THE GIVER");
        assert_eq!(fragments[0].confidence, 0.98);
        assert_eq!(fragments[0].area(), 190.0 * 50.0);
        assert_eq!(fragments[1].center(), Point::new(81.0, 95.0));
    }

    #[test]
    fn skips_malformed_polygons() {
        let result: OcrResult = serde_json::from_value(json!({
            "ocrResults": [{
                "prunedResult": {
                    "rec_texts": ["ok", "broken"],
                    "rec_scores": [0.9, 0.9],
                    "rec_polys": [
                        [[0, 0], [4, 0], [4, 4], [0, 4]],
                        [[0, 0], [4, 0], [4, 4]]
                    ]
                }
            }]
        }))
        .unwrap();

        let fragments = result.into_fragments();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].text, "ok");
    }

    #[test]
    fn empty_result_has_no_fragments() {
        let result: OcrResult = serde_json::from_value(json!({})).unwrap();
        assert!(result.into_fragments().is_empty());
    }
}
