//! Geometry primitives shared by the coordinate mapper, the crop engine and
//! the edit parameters.
//!
//! # Coordinate Spaces
//!
//! Two spaces are in play and every rectangle belongs to exactly one of them:
//!
//! - **Image space**: intrinsic pixels of the (rotated) working image.
//!   Origin is the top-left pixel corner, unscaled.
//! - **View space**: on-screen units of the display area. The image is
//!   scaled uniformly and centred (letterboxed) inside it.
//!
//! All values are `f64` and nothing is rounded to integer pixels until the
//! pipeline extracts the crop from the pixel buffer.

pub mod crop_engine;
pub mod mapper;

use serde::{Deserialize, Serialize};

pub use crop_engine::{update_crop_rect, CropConstraints, CropDragSession, CropHandle};
pub use mapper::{image_frame, image_to_view, view_to_image, ViewportTransform};

/// Tolerance used when comparing floating point geometry.
pub const GEOMETRY_EPSILON: f64 = 1e-6;

/// A 2D point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Size of an image buffer in pixels.
    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(width as f64, height as f64)
    }

    /// True when either dimension is zero, negative or not finite.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Width divided by height, or `None` for a degenerate size.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.is_degenerate() {
            None
        } else {
            Some(self.width / self.height)
        }
    }

    /// The same size with width and height exchanged.
    pub fn transposed(&self) -> Self {
        Self::new(self.height, self.width)
    }
}

/// An axis-aligned rectangle: origin is the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin covering `size`.
    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// Rectangle of `size` centred on `center`.
    pub fn centered(center: Point, size: Size) -> Self {
        Self::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    #[inline]
    pub fn min_x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn min_y(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    pub fn mid_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    #[inline]
    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.mid_x(), self.mid_y())
    }

    /// Width divided by height, or `None` when the height is not positive.
    pub fn aspect_ratio(&self) -> Option<f64> {
        self.size().aspect_ratio()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// True when `other` lies inside `self`, allowing `GEOMETRY_EPSILON` slack.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.min_x() >= self.min_x() - GEOMETRY_EPSILON
            && other.min_y() >= self.min_y() - GEOMETRY_EPSILON
            && other.max_x() <= self.max_x() + GEOMETRY_EPSILON
            && other.max_y() <= self.max_y() + GEOMETRY_EPSILON
    }

    /// Component-wise comparison within `tolerance`.
    pub fn approx_eq(&self, other: &Rect, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
    }

    /// Clamp this rectangle into `bounds` with each side at least `min_size`.
    ///
    /// The size is clamped first (never larger than `bounds`, never smaller
    /// than `min_size` unless `bounds` itself is smaller), then the origin is
    /// moved so the rectangle fits.
    pub fn clamped_into(&self, bounds: &Rect, min_size: Size) -> Rect {
        if !bounds.is_finite() || bounds.width < 0.0 || bounds.height < 0.0 {
            return Rect::ZERO;
        }

        let min_w = min_size.width.min(bounds.width).max(0.0);
        let min_h = min_size.height.min(bounds.height).max(0.0);

        let width = sanitize(self.width).clamp(min_w, bounds.width.max(min_w));
        let height = sanitize(self.height).clamp(min_h, bounds.height.max(min_h));

        let x = sanitize(self.x).clamp(bounds.min_x(), (bounds.max_x() - width).max(bounds.min_x()));
        let y = sanitize(self.y).clamp(bounds.min_y(), (bounds.max_y() - height).max(bounds.min_y()));

        Rect::new(x, y, width, height)
    }

    /// Largest rectangle with the given aspect ratio that keeps this rect's
    /// width (or height, if the width does not fit), centred on the same
    /// point and clamped to `bounds`.
    pub fn fit_to_ratio(&self, ratio: f64, bounds: &Rect) -> Rect {
        if !(ratio.is_finite() && ratio > 0.0) {
            return *self;
        }

        let mut width = self.width;
        let mut height = width / ratio;

        if height > bounds.height {
            height = bounds.height;
            width = height * ratio;
        }
        if width > bounds.width {
            width = bounds.width;
            height = width / ratio;
        }

        Rect::centered(self.center(), Size::new(width, height)).clamped_into(bounds, Size::ZERO)
    }

    /// Map this rectangle through a 90° counter-clockwise rotation of an
    /// image of `image` size. The result lives in the rotated image's space.
    pub fn rotated_ccw_in(&self, image: Size) -> Rect {
        Rect::new(self.y, image.width - self.max_x(), self.height, self.width)
    }

    /// Map this rectangle through a 90° clockwise rotation of an image of
    /// `image` size. The result lives in the rotated image's space.
    pub fn rotated_cw_in(&self, image: Size) -> Rect {
        Rect::new(image.height - self.max_y(), self.x, self.height, self.width)
    }

    /// Human-readable aspect ratio for a crop readout.
    ///
    /// Common photographic ratios are named when within 0.05, anything else
    /// is printed as `x.xx:1`.
    pub fn aspect_label(&self) -> String {
        const COMMON_RATIOS: [(f64, &str); 5] = [
            (1.0, "1:1"),
            (4.0 / 3.0, "4:3"),
            (3.0 / 2.0, "3:2"),
            (16.0 / 9.0, "16:9"),
            (2.35, "2.35:1"),
        ];

        let Some(ratio) = self.aspect_ratio() else {
            return "-".to_string();
        };

        COMMON_RATIOS
            .iter()
            .find(|(value, _)| (ratio - value).abs() < 0.05)
            .map(|(_, name)| name.to_string())
            .unwrap_or_else(|| format!("{:.2}:1", ratio))
    }
}

/// NaN becomes zero; infinities survive so `clamp` can pull them in.
#[inline]
fn sanitize(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(r.max_x(), 110.0);
        assert_eq!(r.max_y(), 70.0);
        assert_eq!(r.mid_x(), 60.0);
        assert_eq!(r.mid_y(), 45.0);
        assert_eq!(r.aspect_ratio(), Some(2.0));
    }

    #[test]
    fn test_size_degenerate() {
        assert!(Size::new(0.0, 10.0).is_degenerate());
        assert!(Size::new(10.0, -1.0).is_degenerate());
        assert!(Size::new(f64::NAN, 10.0).is_degenerate());
        assert!(!Size::new(1.0, 1.0).is_degenerate());
        assert_eq!(Size::ZERO.aspect_ratio(), None);
    }

    #[test]
    fn test_clamped_into_moves_origin() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let r = Rect::new(80.0, -10.0, 40.0, 40.0).clamped_into(&bounds, Size::ZERO);
        assert_eq!(r, Rect::new(60.0, 0.0, 40.0, 40.0));
    }

    #[test]
    fn test_clamped_into_shrinks_and_floors() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let r = Rect::new(0.0, 0.0, 500.0, 2.0).clamped_into(&bounds, Size::new(10.0, 10.0));
        assert_eq!(r.width, 100.0);
        assert_eq!(r.height, 10.0);
    }

    #[test]
    fn test_clamped_into_handles_nan() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let r = Rect::new(f64::NAN, 5.0, f64::NAN, 20.0).clamped_into(&bounds, Size::new(5.0, 5.0));
        assert!(bounds.contains_rect(&r));
        assert_eq!(r.width, 5.0);
    }

    #[test]
    fn test_fit_to_ratio_keeps_center() {
        let bounds = Rect::new(0.0, 0.0, 1000.0, 1000.0);
        let r = Rect::new(100.0, 100.0, 400.0, 400.0).fit_to_ratio(2.0, &bounds);
        assert!((r.aspect_ratio().unwrap() - 2.0).abs() < 1e-9);
        assert!((r.mid_x() - 300.0).abs() < 1e-9);
        assert!((r.mid_y() - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_to_ratio_respects_bounds() {
        let bounds = Rect::new(0.0, 0.0, 300.0, 100.0);
        let r = Rect::new(0.0, 0.0, 300.0, 100.0).fit_to_ratio(1.0, &bounds);
        assert!((r.width - 100.0).abs() < 1e-9);
        assert!((r.height - 100.0).abs() < 1e-9);
        assert!(bounds.contains_rect(&r));
    }

    #[test]
    fn test_quarter_turns_are_inverse() {
        let image = Size::new(400.0, 300.0);
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);

        let ccw = r.rotated_ccw_in(image);
        // After a quarter turn the image is 300x400.
        assert!(Rect::from_size(image.transposed()).contains_rect(&ccw));
        let back = ccw.rotated_cw_in(image.transposed());
        assert!(back.approx_eq(&r, 1e-9));
    }

    #[test]
    fn test_rotated_ccw_moves_top_left_to_bottom_left() {
        // A 10x10 rect in the top-left corner ends up bottom-left after a
        // counter-clockwise turn.
        let image = Size::new(100.0, 50.0);
        let r = Rect::new(0.0, 0.0, 10.0, 10.0).rotated_ccw_in(image);
        assert_eq!(r, Rect::new(0.0, 90.0, 10.0, 10.0));
    }

    #[test]
    fn test_aspect_label() {
        assert_eq!(Rect::new(0.0, 0.0, 160.0, 90.0).aspect_label(), "16:9");
        assert_eq!(Rect::new(0.0, 0.0, 100.0, 100.0).aspect_label(), "1:1");
        assert_eq!(Rect::new(0.0, 0.0, 300.0, 100.0).aspect_label(), "3.00:1");
        assert_eq!(Rect::new(0.0, 0.0, 10.0, 0.0).aspect_label(), "-");
    }
}
