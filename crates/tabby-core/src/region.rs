//! Shelf segmentation input, detections, and validated book regions.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb32FImage, RgbImage};
use serde::{Deserialize, Serialize};

/// Side length of the square image the shelf segmenter operates on.
pub const SEGMENTER_INPUT_SIZE: u32 = 640;

/// A fixed-size, `[0, 1]`-normalized image handed to a shelf segmenter.
#[derive(Debug, Clone)]
pub struct SegmenterInput {
    pixels: Rgb32FImage,
}

impl SegmenterInput {
    /// Resizes (bilinear) and normalizes an image to the segmenter's input space.
    pub fn from_image(image: &RgbImage) -> Self {
        let resized = imageops::resize(
            image,
            SEGMENTER_INPUT_SIZE,
            SEGMENTER_INPUT_SIZE,
            FilterType::Triangle,
        );

        Self {
            pixels: DynamicImage::ImageRgb8(resized).into_rgb32f(),
        }
    }

    /// Side length of the input square.
    #[inline]
    pub const fn size(&self) -> u32 {
        SEGMENTER_INPUT_SIZE
    }

    /// Normalized pixels.
    #[inline]
    pub fn pixels(&self) -> &Rgb32FImage {
        &self.pixels
    }

    /// Converts the normalized pixels back to 8-bit RGB, for transports that
    /// only accept encoded images.
    pub fn to_rgb8(&self) -> RgbImage {
        DynamicImage::ImageRgb32F(self.pixels.clone()).into_rgb8()
    }
}

/// Axis-aligned box in the segmenter's input coordinate space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionBox {
    /// Left edge.
    pub x1: f32,
    /// Top edge.
    pub y1: f32,
    /// Right edge.
    pub x2: f32,
    /// Bottom edge.
    pub y2: f32,
}

impl DetectionBox {
    /// Creates a new box.
    #[inline]
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

/// One book-like region reported by a shelf segmenter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Box in segmenter input coordinates.
    pub bbox: DetectionBox,
    /// Detection confidence in `[0, 1]`.
    pub confidence: f32,
    /// Class index assigned by the model.
    pub class_id: u32,
}

impl Detection {
    /// Creates a new detection.
    pub const fn new(bbox: DetectionBox, confidence: f32, class_id: u32) -> Self {
        Self {
            bbox,
            confidence,
            class_id,
        }
    }
}

/// A validated book region in original image pixels.
///
/// Invariants: `x1 < x2 <= width - 1`, `y1 < y2 <= height - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShelfRegion {
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
}

impl ShelfRegion {
    /// Maps a detection from the `input_size` square back onto a
    /// `width` x `height` image.
    ///
    /// Coordinates are scaled and truncated, clamped into the image, and put
    /// in order. Returns `None` when the region has no width or no height.
    pub fn from_detection(
        detection: &Detection,
        input_size: u32,
        width: u32,
        height: u32,
    ) -> Option<Self> {
        if width == 0 || height == 0 || input_size == 0 {
            return None;
        }

        let scale = |value: f32, extent: u32| -> u32 {
            let scaled = (f64::from(value) / f64::from(input_size) * f64::from(extent)) as i64;
            scaled.clamp(0, i64::from(extent) - 1) as u32
        };

        let DetectionBox { x1, y1, x2, y2 } = detection.bbox;
        let (x1, x2) = (scale(x1, width), scale(x2, width));
        let (y1, y2) = (scale(y1, height), scale(y2, height));

        let region = Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        };

        (region.width() > 0 && region.height() > 0).then_some(region)
    }

    /// Left edge (inclusive).
    pub const fn x1(&self) -> u32 {
        self.x1
    }

    /// Top edge (inclusive).
    pub const fn y1(&self) -> u32 {
        self.y1
    }

    /// Right edge (exclusive).
    pub const fn x2(&self) -> u32 {
        self.x2
    }

    /// Bottom edge (exclusive).
    pub const fn y2(&self) -> u32 {
        self.y2
    }

    /// Region width in pixels.
    pub const fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    /// Region height in pixels.
    pub const fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    /// Copies the region out of `image`.
    pub fn crop(&self, image: &RgbImage) -> RgbImage {
        imageops::crop_imm(image, self.x1, self.y1, self.width(), self.height()).to_image()
    }
}

#[cfg(test)]
mod tests {
    use image::Rgb;

    use super::*;

    fn detection(x1: f32, y1: f32, x2: f32, y2: f32) -> Detection {
        Detection::new(DetectionBox::new(x1, y1, x2, y2), 0.9, 0)
    }

    #[test]
    fn scales_into_image_space() {
        let region =
            ShelfRegion::from_detection(&detection(64.0, 32.0, 320.0, 640.0), 640, 1280, 960)
                .unwrap();

        assert_eq!((region.x1(), region.y1()), (128, 48));
        assert_eq!((region.x2(), region.y2()), (640, 959));
    }

    #[test]
    fn clamps_boxes_straddling_the_border() {
        let region =
            ShelfRegion::from_detection(&detection(-20.0, -5.0, 700.0, 300.0), 640, 640, 480)
                .unwrap();

        assert_eq!(region.x1(), 0);
        assert_eq!(region.y1(), 0);
        assert_eq!(region.x2(), 639);
        assert_eq!(region.y2(), 225);
    }

    #[test]
    fn orders_swapped_corners() {
        let region =
            ShelfRegion::from_detection(&detection(300.0, 400.0, 100.0, 200.0), 640, 640, 640)
                .unwrap();

        assert!(region.x1() < region.x2());
        assert!(region.y1() < region.y2());
        assert_eq!((region.x1(), region.x2()), (100, 300));
    }

    #[test]
    fn drops_degenerate_regions() {
        // Entirely right of the image: both x clamp to the last column.
        assert!(
            ShelfRegion::from_detection(&detection(700.0, 10.0, 900.0, 50.0), 640, 640, 480)
                .is_none()
        );
        // Zero height after truncation.
        assert!(
            ShelfRegion::from_detection(&detection(10.0, 20.2, 50.0, 20.7), 640, 640, 640)
                .is_none()
        );
        // Empty image.
        assert!(
            ShelfRegion::from_detection(&detection(0.0, 0.0, 10.0, 10.0), 640, 0, 480).is_none()
        );
    }

    #[test]
    fn crop_matches_region() {
        let mut image = RgbImage::new(20, 10);
        image.put_pixel(5, 3, Rgb([9, 9, 9]));

        let region =
            ShelfRegion::from_detection(&detection(160.0, 192.0, 480.0, 576.0), 640, 20, 10)
                .unwrap();
        let crop = region.crop(&image);

        assert_eq!(crop.dimensions(), (region.width(), region.height()));
        assert_eq!(crop.get_pixel(0, 0).0, [9, 9, 9]);
    }

    #[test]
    fn segmenter_input_is_normalized() {
        let image = RgbImage::from_pixel(32, 16, Rgb([255, 0, 51]));
        let input = SegmenterInput::from_image(&image);

        assert_eq!(input.pixels().dimensions(), (640, 640));
        let pixel = input.pixels().get_pixel(100, 100).0;
        assert!((pixel[0] - 1.0).abs() < 1e-6);
        assert!(pixel[1].abs() < 1e-6);
        assert!((pixel[2] - 0.2).abs() < 1e-3);
    }
}
