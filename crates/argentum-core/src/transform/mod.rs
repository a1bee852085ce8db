//! Geometric transforms applied by the edit pipeline: rotation and cropping.
//!
//! # Transform Order
//!
//! When editing an image, transforms are applied in this order:
//! 1. Rotation (quarter turns)
//! 2. Crop, with the rect expressed in the rotated image's pixel space
//! 3. Exposure
//! 4. Color controls
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = counter-clockwise
//! - Crop coordinates are image pixels (`f64`), rounded at extraction
//! - Origin is top-left corner

mod crop;
mod rotation;

use thiserror::Error;

use crate::decode::DecodedImage;
use crate::geometry::Rect;

pub use crop::{crop_to_rect, PixelRect};
pub use rotation::rotate_quarter_turns;

/// Errors from the geometric stages. The pipeline treats any of them as
/// "skip this stage".
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    #[error("Crop rect {rect:?} does not cover any pixel of the image")]
    EmptyCrop { rect: Rect },
}

fn check_buffer(image: &DecodedImage) -> Result<(), TransformError> {
    if image.has_valid_buffer() {
        Ok(())
    } else {
        Err(TransformError::InvalidPixelData {
            expected: image.width as usize * image.height as usize * 3,
            actual: image.pixels.len(),
        })
    }
}
