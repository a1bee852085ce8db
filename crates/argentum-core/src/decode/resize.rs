//! Image resizing for preview generation.
//!
//! The pipeline always works at full resolution; previews are downscaled
//! copies of its output. Nothing here modifies its input.

use std::sync::Arc;

use super::{DecodedImage, FilterType, ResizeError};

/// Resize an image to exact dimensions.
///
/// # Arguments
///
/// * `image` - The source image to resize
/// * `width` - Target width in pixels
/// * `height` - Target height in pixels
/// * `filter` - Interpolation filter to use
///
/// # Returns
///
/// A new `DecodedImage` with the specified dimensions.
///
/// # Errors
///
/// Returns `ResizeError::InvalidTarget` for a zero target dimension and
/// `ResizeError::InvalidPixelData` for a source whose buffer does not match
/// its dimensions.
pub fn resize(
    image: &DecodedImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedImage, ResizeError> {
    if width == 0 || height == 0 {
        return Err(ResizeError::InvalidTarget { width, height });
    }

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgb_image = image.to_rgb_image().ok_or(ResizeError::InvalidPixelData {
        expected: image.width as usize * image.height as usize * 3,
        actual: image.pixels.len(),
    })?;

    let resized = image::imageops::resize(&rgb_image, width, height, filter.to_image_filter());

    Ok(DecodedImage::from_rgb_image(resized))
}

/// Resize an image to fit within a maximum edge length while preserving aspect ratio.
///
/// The image is scaled so that its longest edge equals `max_edge`, while
/// maintaining the original aspect ratio. If the image is already smaller
/// than `max_edge`, it is returned unchanged.
///
/// # Arguments
///
/// * `image` - The source image to resize
/// * `max_edge` - Maximum length of the longest edge in pixels
/// * `filter` - Interpolation filter to use
///
/// # Returns
///
/// A new `DecodedImage` that fits within the specified dimensions.
///
/// # Errors
///
/// Returns `ResizeError::InvalidTarget` if `max_edge` is zero, or
/// `ResizeError::InvalidPixelData` if the source image cannot be converted.
pub fn resize_to_fit(
    image: &DecodedImage,
    max_edge: u32,
    filter: FilterType,
) -> Result<DecodedImage, ResizeError> {
    if max_edge == 0 {
        return Err(ResizeError::InvalidTarget {
            width: max_edge,
            height: max_edge,
        });
    }

    let (src_width, src_height) = (image.width, image.height);

    // If already fits, just clone
    if src_width <= max_edge && src_height <= max_edge {
        return Ok(image.clone());
    }

    // Calculate new dimensions preserving aspect ratio
    let (new_width, new_height) = calculate_fit_dimensions(src_width, src_height, max_edge);

    resize(image, new_width, new_height, filter)
}

/// Downscale a pipeline result for on-screen display.
///
/// An image that already fits within `max_edge` is shared rather than
/// copied, so the preview of a small image is the pipeline output itself.
pub fn render_preview(
    image: &Arc<DecodedImage>,
    max_edge: u32,
    filter: FilterType,
) -> Result<Arc<DecodedImage>, ResizeError> {
    if max_edge == 0 {
        return Err(ResizeError::InvalidTarget {
            width: max_edge,
            height: max_edge,
        });
    }
    if image.width <= max_edge && image.height <= max_edge {
        return Ok(Arc::clone(image));
    }

    let preview = resize_to_fit(image, max_edge, filter)?;
    tracing::debug!(
        width = preview.width,
        height = preview.height,
        max_edge,
        "rendered preview"
    );
    Ok(Arc::new(preview))
}

/// Calculate dimensions to fit within max_edge while preserving aspect ratio.
fn calculate_fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let ratio = width as f64 / height as f64;

    if width >= height {
        // Landscape or square: constrain by width
        let new_width = max_edge;
        let new_height = (max_edge as f64 / ratio).round() as u32;
        (new_width, new_height.max(1))
    } else {
        // Portrait: constrain by height
        let new_height = max_edge;
        let new_width = (max_edge as f64 * ratio).round() as u32;
        (new_width.max(1), new_height)
    }
}
