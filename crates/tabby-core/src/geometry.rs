//! Geometric primitives for recognized text regions.
//!
//! Text recognition may run on a copy of the image turned by a right angle
//! (books often lie on their side). Corners reported in that rotated frame
//! are mapped back into the original frame with [`Rotation::remap`], one
//! corner at a time, since a turned quadrilateral's corners change order.

use std::borrow::Cow;

use image::{RgbImage, imageops};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Point {
    /// X-coordinate of the point.
    pub x: f32,
    /// Y-coordinate of the point.
    pub y: f32,
}

impl Point {
    /// Creates a new point with the given coordinates.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Point {
    #[inline]
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// Four ordered corners of a (not necessarily axis-aligned) quadrilateral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Quad {
    corners: [Point; 4],
}

impl Quad {
    /// Creates a quadrilateral from its four corners.
    #[inline]
    pub const fn new(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    /// Creates an axis-aligned quadrilateral, clockwise from the top-left corner.
    pub const fn from_rect(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::new([
            Point::new(x1, y1),
            Point::new(x2, y1),
            Point::new(x2, y2),
            Point::new(x1, y2),
        ])
    }

    /// Creates a quadrilateral from a list of points.
    ///
    /// Fails unless exactly four points are given.
    pub fn try_from_points(points: impl IntoIterator<Item = Point>) -> Result<Self> {
        let points: Vec<Point> = points.into_iter().collect();
        let corners: [Point; 4] = points.try_into().map_err(|points: Vec<Point>| {
            Error::invalid_input().with_message(format!(
                "quadrilateral requires 4 corners, got {}",
                points.len()
            ))
        })?;

        Ok(Self::new(corners))
    }

    /// Returns the corners in their stored order.
    #[inline]
    pub const fn corners(&self) -> &[Point; 4] {
        &self.corners
    }

    /// Returns the top-left and bottom-right corners of the axis-aligned envelope.
    pub fn envelope(&self) -> (Point, Point) {
        let mut min = self.corners[0];
        let mut max = self.corners[0];
        for corner in &self.corners[1..] {
            min.x = min.x.min(corner.x);
            min.y = min.y.min(corner.y);
            max.x = max.x.max(corner.x);
            max.y = max.y.max(corner.y);
        }

        (min, max)
    }

    /// Area of the axis-aligned envelope.
    pub fn area(&self) -> f32 {
        let (min, max) = self.envelope();
        (max.x - min.x) * (max.y - min.y)
    }

    /// Arithmetic mean of the four corners.
    pub fn center(&self) -> Point {
        let (sum_x, sum_y) = self
            .corners
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point::new(sum_x / 4.0, sum_y / 4.0)
    }

    /// Maps every corner from a frame turned by `rotation` back into the
    /// original frame of an image with the given dimensions.
    pub fn remap(&self, rotation: Rotation, width: f32, height: f32) -> Self {
        Self::new(self.corners.map(|p| rotation.remap(p, width, height)))
    }
}

/// A clockwise right-angle rotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum Rotation {
    /// No rotation.
    #[default]
    Deg0,
    /// A quarter turn clockwise.
    Deg90,
    /// A half turn.
    Deg180,
    /// A quarter turn counter-clockwise.
    Deg270,
}

impl Rotation {
    /// Every supported rotation, in increasing order.
    pub const ALL: [Self; 4] = [Self::Deg0, Self::Deg90, Self::Deg180, Self::Deg270];

    /// Returns the rotation in degrees.
    #[inline]
    pub const fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Maps a point from the rotated frame back into the original frame.
    ///
    /// `width` and `height` are the dimensions of the original image.
    pub fn remap(self, point: Point, width: f32, height: f32) -> Point {
        let Point { x, y } = point;
        match self {
            Self::Deg0 => Point::new(x, y),
            Self::Deg90 => Point::new(y, height - x),
            Self::Deg180 => Point::new(width - x, height - y),
            Self::Deg270 => Point::new(width - y, x),
        }
    }

    /// Maps a point from the original frame into the rotated frame.
    ///
    /// This is the inverse of [`Rotation::remap`].
    pub fn rotate_forward(self, point: Point, width: f32, height: f32) -> Point {
        let Point { x, y } = point;
        match self {
            Self::Deg0 => Point::new(x, y),
            Self::Deg90 => Point::new(height - y, x),
            Self::Deg180 => Point::new(width - x, height - y),
            Self::Deg270 => Point::new(y, width - x),
        }
    }

    /// Turns an image clockwise by this rotation.
    pub fn rotate_image(self, image: &RgbImage) -> Cow<'_, RgbImage> {
        match self {
            Self::Deg0 => Cow::Borrowed(image),
            Self::Deg90 => Cow::Owned(imageops::rotate90(image)),
            Self::Deg180 => Cow::Owned(imageops::rotate180(image)),
            Self::Deg270 => Cow::Owned(imageops::rotate270(image)),
        }
    }
}

impl TryFrom<u16> for Rotation {
    type Error = Error;

    fn try_from(degrees: u16) -> Result<Self> {
        match degrees {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            other => Err(Error::invalid_input()
                .with_message(format!("unsupported rotation of {other} degrees"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use image::Rgb;

    use super::*;

    const WIDTH: f32 = 640.0;
    const HEIGHT: f32 = 480.0;

    fn sample_points() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(WIDTH, HEIGHT),
            Point::new(12.5, 400.0),
            Point::new(633.0, 1.0),
            Point::new(320.0, 240.0),
        ]
    }

    #[test]
    fn remap_formulas() {
        let p = Point::new(10.0, 20.0);
        assert_eq!(Rotation::Deg0.remap(p, WIDTH, HEIGHT), Point::new(10.0, 20.0));
        assert_eq!(
            Rotation::Deg90.remap(p, WIDTH, HEIGHT),
            Point::new(20.0, HEIGHT - 10.0)
        );
        assert_eq!(
            Rotation::Deg180.remap(p, WIDTH, HEIGHT),
            Point::new(WIDTH - 10.0, HEIGHT - 20.0)
        );
        assert_eq!(
            Rotation::Deg270.remap(p, WIDTH, HEIGHT),
            Point::new(WIDTH - 20.0, 10.0)
        );
    }

    #[test]
    fn remap_inverts_forward_rotation() {
        for rotation in Rotation::ALL {
            for point in sample_points() {
                let rotated = rotation.rotate_forward(point, WIDTH, HEIGHT);
                let restored = rotation.remap(rotated, WIDTH, HEIGHT);
                assert_eq!(restored, point, "rotation {}", rotation.degrees());
            }
        }
    }

    #[test]
    fn forward_rotation_matches_image_rotation() {
        let (width, height) = (7u32, 4u32);
        let (px, py) = (5u32, 1u32);

        let mut image = RgbImage::new(width, height);
        image.put_pixel(px, py, Rgb([255, 0, 0]));

        for rotation in Rotation::ALL {
            let rotated = rotation.rotate_image(&image);
            let (rx, ry, _) = rotated
                .enumerate_pixels()
                .find(|(_, _, pixel)| pixel.0 == [255, 0, 0])
                .expect("marker pixel survives rotation");

            let center = Point::new(px as f32 + 0.5, py as f32 + 0.5);
            let expected = rotation.rotate_forward(center, width as f32, height as f32);
            assert_eq!(Point::new(rx as f32 + 0.5, ry as f32 + 0.5), expected);

            let restored = rotation.remap(expected, width as f32, height as f32);
            assert_eq!(restored, center);
        }
    }

    #[test]
    fn rotated_image_dimensions() {
        let image = RgbImage::new(6, 3);
        assert_eq!(Rotation::Deg0.rotate_image(&image).dimensions(), (6, 3));
        assert_eq!(Rotation::Deg90.rotate_image(&image).dimensions(), (3, 6));
        assert_eq!(Rotation::Deg180.rotate_image(&image).dimensions(), (6, 3));
        assert_eq!(Rotation::Deg270.rotate_image(&image).dimensions(), (3, 6));
    }

    #[test]
    fn area_and_center_ignore_corner_order() {
        let a = Point::new(10.0, 5.0);
        let b = Point::new(50.0, 8.0);
        let c = Point::new(48.0, 30.0);
        let d = Point::new(12.0, 26.0);

        let reference = Quad::new([a, b, c, d]);
        let orderings = [[b, c, d, a], [d, c, b, a], [c, a, d, b], [a, c, b, d]];

        for corners in orderings {
            let quad = Quad::new(corners);
            assert_eq!(quad.area(), reference.area());
            assert_eq!(quad.center(), reference.center());
        }

        assert_eq!(reference.area(), 40.0 * 25.0);
        assert_eq!(reference.center(), Point::new(30.0, 17.25));
    }

    #[test]
    fn degenerate_quad_has_zero_area() {
        let quad = Quad::from_rect(3.0, 3.0, 3.0, 9.0);
        assert_eq!(quad.area(), 0.0);
    }

    #[test]
    fn quad_remap_is_per_corner() {
        let quad = Quad::from_rect(0.0, 0.0, 100.0, 20.0);
        let remapped = quad.remap(Rotation::Deg90, WIDTH, HEIGHT);

        for (original, mapped) in quad.corners().iter().zip(remapped.corners()) {
            assert_eq!(*mapped, Rotation::Deg90.remap(*original, WIDTH, HEIGHT));
        }

        assert_eq!(remapped.area(), quad.area());
    }

    #[test]
    fn quad_requires_four_points() {
        let three = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)];
        assert!(Quad::try_from_points(three).is_err());

        let four = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        assert!(Quad::try_from_points(four).is_ok());
    }

    #[test]
    fn rotation_from_degrees() {
        assert_eq!(Rotation::try_from(90).unwrap(), Rotation::Deg90);
        assert_eq!(Rotation::try_from(270).unwrap(), Rotation::Deg270);
        assert!(Rotation::try_from(45).is_err());
    }
}
