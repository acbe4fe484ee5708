//! Recognized text fragments.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Quad, Rotation};

/// One text span found by a text recognizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct RecognizedFragment {
    /// Recognized text.
    pub text: String,
    /// Bounding quadrilateral in image coordinates.
    pub quad: Quad,
    /// Recognition confidence in `[0, 1]`.
    pub confidence: f32,
}

impl RecognizedFragment {
    /// Creates a new fragment.
    pub fn new(text: impl Into<String>, quad: Quad, confidence: f32) -> Self {
        Self {
            text: text.into(),
            quad,
            confidence,
        }
    }

    /// Area of the fragment's axis-aligned envelope.
    #[inline]
    pub fn area(&self) -> f32 {
        self.quad.area()
    }

    /// Centroid of the fragment's corners.
    #[inline]
    pub fn center(&self) -> Point {
        self.quad.center()
    }

    /// Number of characters in the recognized text.
    #[inline]
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Rewrites the corners from a frame turned by `rotation` into the
    /// original frame of a `width` x `height` image.
    pub fn remap(&mut self, rotation: Rotation, width: f32, height: f32) {
        self.quad = self.quad.remap(rotation, width, height);
    }
}
