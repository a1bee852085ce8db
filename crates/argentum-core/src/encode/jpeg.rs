//! JPEG encoding for export.
//!
//! Export quality is expressed as a fraction in `[0.5, 1.0]` at the API
//! surface and mapped onto the encoder's 1-100 scale here. JPEG carries no
//! alpha, so RGBA input is flattened by dropping the alpha channel first.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;
use thiserror::Error;

use crate::decode::DecodedImage;
use crate::params::JPEG_QUALITY_RANGE;

/// Errors that can occur during JPEG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The encoder could not produce the target format
    #[error("JPEG encoding failed: {0}")]
    EncodeFailure(String),
}

/// Encode RGB pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality (1-100, where 100 is highest quality)
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    validate(pixels.len(), width, height, 3)?;

    let quality = quality.clamp(1, 100);
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    encoder
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodeFailure(e.to_string()))?;

    Ok(buffer.into_inner())
}

/// Encode a pipeline result at an export quality in `[0.5, 1.0]`.
///
/// Out-of-range or NaN qualities are clamped (NaN uses the 0.9 default).
pub fn encode_image(image: &DecodedImage, quality: f64) -> Result<Vec<u8>, EncodeError> {
    let bytes = encode_jpeg(&image.pixels, image.width, image.height, quality_to_u8(quality))?;

    tracing::debug!(
        width = image.width,
        height = image.height,
        quality,
        bytes = bytes.len(),
        "encoded jpeg"
    );

    Ok(bytes)
}

/// Encode RGBA pixel data (e.g. canvas `ImageData`) to JPEG, dropping alpha.
pub fn encode_jpeg_rgba(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: f64,
) -> Result<Vec<u8>, EncodeError> {
    let rgb = strip_alpha(pixels, width, height)?;
    encode_jpeg(&rgb, width, height, quality_to_u8(quality))
}

/// Convert RGBA8 to RGB8 by discarding the alpha channel.
pub fn strip_alpha(rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    validate(rgba.len(), width, height, 4)?;

    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
    }
    Ok(rgb)
}

/// Map a `[0.5, 1.0]` quality fraction to the encoder's 1-100 scale.
pub fn quality_to_u8(quality: f64) -> u8 {
    let quality = if quality.is_nan() {
        crate::params::DEFAULT_JPEG_QUALITY
    } else {
        quality.clamp(*JPEG_QUALITY_RANGE.start(), *JPEG_QUALITY_RANGE.end())
    };
    (quality * 100.0).round() as u8
}

fn validate(len: usize, width: u32, height: u32, channels: usize) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = (width as usize) * (height as usize) * channels;
    if len != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_jpeg(bytes: &[u8]) {
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_jpeg_basic() {
        let pixels = vec![128u8; 100 * 100 * 3];
        let jpeg_bytes = encode_jpeg(&pixels, 100, 100, 90).unwrap();
        assert_jpeg(&jpeg_bytes);
    }

    #[test]
    fn test_encode_jpeg_quality_clamping() {
        let pixels = vec![128u8; 10 * 10 * 3];
        assert!(encode_jpeg(&pixels, 10, 10, 0).is_ok());
        assert!(encode_jpeg(&pixels, 10, 10, 255).is_ok());
    }

    #[test]
    fn test_encode_jpeg_invalid_pixel_data() {
        let short = vec![128u8; 99 * 100 * 3];
        assert!(matches!(
            encode_jpeg(&short, 100, 100, 90),
            Err(EncodeError::InvalidPixelData { .. })
        ));

        let long = vec![128u8; 101 * 100 * 3];
        assert!(matches!(
            encode_jpeg(&long, 100, 100, 90),
            Err(EncodeError::InvalidPixelData { .. })
        ));
    }

    #[test]
    fn test_encode_jpeg_zero_dimensions() {
        assert!(matches!(
            encode_jpeg(&[], 0, 100, 90),
            Err(EncodeError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            encode_jpeg(&[], 100, 0, 90),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_encode_image_round_trips_through_decoder() {
        let image = DecodedImage::new(40, 20, vec![200u8; 40 * 20 * 3]);
        let bytes = encode_image(&image, 0.9).unwrap();
        assert_jpeg(&bytes);

        let decoded = crate::decode::decode_image(&bytes).unwrap();
        assert_eq!((decoded.width, decoded.height), (40, 20));
    }

    #[test]
    fn test_encode_image_invalid_buffer() {
        let image = DecodedImage {
            width: 4,
            height: 4,
            pixels: vec![0u8; 7],
        };
        assert!(encode_image(&image, 0.9).is_err());
    }

    #[test]
    fn test_quality_mapping() {
        assert_eq!(quality_to_u8(0.9), 90);
        assert_eq!(quality_to_u8(1.0), 100);
        assert_eq!(quality_to_u8(0.5), 50);
        assert_eq!(quality_to_u8(0.1), 50);
        assert_eq!(quality_to_u8(7.0), 100);
        assert_eq!(quality_to_u8(f64::NAN), 90);
    }

    #[test]
    fn test_strip_alpha() {
        let rgba = vec![1, 2, 3, 255, 4, 5, 6, 0];
        assert_eq!(strip_alpha(&rgba, 2, 1).unwrap(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_strip_alpha_wrong_length() {
        assert!(matches!(
            strip_alpha(&[1, 2, 3], 1, 1),
            Err(EncodeError::InvalidPixelData { expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn test_encode_jpeg_rgba() {
        let rgba = vec![90u8; 8 * 8 * 4];
        let bytes = encode_jpeg_rgba(&rgba, 8, 8, 0.8).unwrap();
        assert_jpeg(&bytes);
    }

    #[test]
    fn test_encode_failure_display() {
        let err = EncodeError::EncodeFailure("boom".to_string());
        assert_eq!(err.to_string(), "JPEG encoding failed: boom");
    }
}
