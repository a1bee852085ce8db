//! Image cropping operations.
//!
//! Crop rectangles are kept in image-pixel space as `f64` so they survive
//! view/image mapping without drift. They are snapped to whole pixels only
//! here, at extraction time.
//!
//! # Coordinate System
//!
//! - (0, 0) = top-left pixel corner of the (rotated) image
//! - rounding: the origin and the size are rounded separately, so equal
//!   widths and heights stay equal; the result is clamped to the image

use super::TransformError;
use crate::decode::DecodedImage;
use crate::geometry::Rect;

/// Whole-pixel crop region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Round `rect` to pixel boundaries and clamp it to a `width` x `height`
    /// image. Returns `None` when nothing of the rect remains.
    pub fn from_rect(rect: &Rect, width: u32, height: u32) -> Option<Self> {
        if !rect.is_finite() {
            return None;
        }

        let (left, width) = pixel_span(rect.min_x(), rect.max_x() - rect.min_x(), width)?;
        let (top, height) = pixel_span(rect.min_y(), rect.max_y() - rect.min_y(), height)?;

        Some(Self {
            left,
            top,
            width,
            height,
        })
    }

    pub fn covers(&self, width: u32, height: u32) -> bool {
        self.left == 0 && self.top == 0 && self.width == width && self.height == height
    }
}

/// Round one axis of a rect to `(start, length)` in `0..limit`.
fn pixel_span(origin: f64, length: f64, limit: u32) -> Option<(u32, u32)> {
    let limit = limit as f64;
    let rounded = length.round();
    let mut start = origin.round();
    let mut end = start + rounded;

    // A rect inside the image can still round past its far edge.
    if end > limit && origin + length <= limit {
        start = (limit - rounded).max(0.0);
        end = limit;
    }

    let start = start.clamp(0.0, limit);
    let end = end.clamp(0.0, limit);
    if end <= start {
        return None;
    }
    Some((start as u32, (end - start) as u32))
}

/// Extract `rect` (image-pixel space) from `image`.
///
/// A rect covering the whole image yields a plain copy.
///
/// # Errors
///
/// - `TransformError::InvalidPixelData` if the buffer does not match the
///   dimensions.
/// - `TransformError::EmptyCrop` if the rect has no pixels inside the image.
pub fn crop_to_rect(image: &DecodedImage, rect: &Rect) -> Result<DecodedImage, TransformError> {
    super::check_buffer(image)?;

    let region = PixelRect::from_rect(rect, image.width, image.height)
        .ok_or(TransformError::EmptyCrop { rect: *rect })?;

    if region.covers(image.width, image.height) {
        return Ok(image.clone());
    }

    let src_stride = image.width as usize * 3;
    let row_len = region.width as usize * 3;
    let mut output = Vec::with_capacity(row_len * region.height as usize);

    // Copy pixel data row by row
    for y in region.top..region.top + region.height {
        let start = y as usize * src_stride + region.left as usize * 3;
        output.extend_from_slice(&image.pixels[start..start + row_len]);
    }

    Ok(DecodedImage {
        width: region.width,
        height: region.height,
        pixels: output,
    })
}
