//! JPEG and TIFF decoding with EXIF orientation handling.

use std::io::Cursor;
use std::path::Path;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageFormat, ImageReader};

use super::{DecodeError, DecodedImage, Orientation};

/// File extensions accepted by [`decode_file`], lowercase.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["tif", "tiff", "jpg", "jpeg"];

/// Check a file extension (without the dot, any case) against
/// [`SUPPORTED_EXTENSIONS`].
pub fn is_supported_extension(extension: &str) -> bool {
    let extension = extension.to_ascii_lowercase();
    SUPPORTED_EXTENSIONS.contains(&extension.as_str())
}

/// Decode an image file from disk.
///
/// The extension is checked before the file is read, so an unsupported file
/// fails with `DecodeError::UnsupportedFormat` without any I/O.
///
/// # Errors
///
/// - `DecodeError::UnsupportedFormat` if the extension is not tif/tiff/jpg/jpeg.
/// - `DecodeError::IoError` if the file cannot be read.
/// - `DecodeError::DecodeFailure` if the contents are not a decodable image.
pub fn decode_file(path: &Path) -> Result<DecodedImage, DecodeError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    if !is_supported_extension(extension) {
        return Err(DecodeError::UnsupportedFormat(extension.to_string()));
    }

    let bytes = std::fs::read(path)?;
    let image = decode_image(&bytes)?;

    tracing::debug!(
        path = %path.display(),
        width = image.width,
        height = image.height,
        "decoded image file"
    );

    Ok(image)
}

/// Decode JPEG or TIFF bytes, applying EXIF orientation correction.
///
/// Any alpha channel is dropped: the result is always RGB8. The returned
/// dimensions are the displayed (oriented) dimensions.
///
/// # Errors
///
/// Returns `DecodeError::UnsupportedFormat` for a recognised format other
/// than JPEG or TIFF, and `DecodeError::DecodeFailure` if the bytes are
/// unreadable.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let img = read_dynamic(bytes)?;
    let orientation = extract_orientation(bytes);
    let oriented_img = apply_orientation(img, orientation);

    Ok(DecodedImage::from_rgb_image(oriented_img.into_rgb8()))
}

fn read_dynamic(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::DecodeFailure(e.to_string()))?;

    match reader.format() {
        Some(ImageFormat::Jpeg) | Some(ImageFormat::Tiff) => {}
        Some(other) => {
            return Err(DecodeError::UnsupportedFormat(format!("{:?}", other).to_lowercase()));
        }
        None => {
            return Err(DecodeError::DecodeFailure(
                "unrecognized image data".to_string(),
            ));
        }
    }

    reader
        .decode()
        .map_err(|e| DecodeError::DecodeFailure(e.to_string()))
}

/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    // Minimal valid JPEG bytes (1x1 pixel, no EXIF)
    pub(crate) const MINIMAL_JPEG: &[u8] = &[
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x00, 0x00,
        0x01, 0x00, 0x01, 0x00, 0x00, 0xFF, 0xDB, 0x00, 0x43, 0x00, 0x08, 0x06, 0x06, 0x07, 0x06,
        0x05, 0x08, 0x07, 0x07, 0x07, 0x09, 0x09, 0x08, 0x0A, 0x0C, 0x14, 0x0D, 0x0C, 0x0B, 0x0B,
        0x0C, 0x19, 0x12, 0x13, 0x0F, 0x14, 0x1D, 0x1A, 0x1F, 0x1E, 0x1D, 0x1A, 0x1C, 0x1C, 0x20,
        0x24, 0x2E, 0x27, 0x20, 0x22, 0x2C, 0x23, 0x1C, 0x1C, 0x28, 0x37, 0x29, 0x2C, 0x30, 0x31,
        0x34, 0x34, 0x34, 0x1F, 0x27, 0x39, 0x3D, 0x38, 0x32, 0x3C, 0x2E, 0x33, 0x34, 0x32, 0xFF,
        0xC0, 0x00, 0x0B, 0x08, 0x00, 0x01, 0x00, 0x01, 0x01, 0x01, 0x11, 0x00, 0xFF, 0xC4, 0x00,
        0x1F, 0x00, 0x00, 0x01, 0x05, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B,
        0xFF, 0xC4, 0x00, 0xB5, 0x10, 0x00, 0x02, 0x01, 0x03, 0x03, 0x02, 0x04, 0x03, 0x05, 0x05,
        0x04, 0x04, 0x00, 0x00, 0x01, 0x7D, 0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12, 0x21,
        0x31, 0x41, 0x06, 0x13, 0x51, 0x61, 0x07, 0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xA1, 0x08,
        0x23, 0x42, 0xB1, 0xC1, 0x15, 0x52, 0xD1, 0xF0, 0x24, 0x33, 0x62, 0x72, 0x82, 0x09, 0x0A,
        0x16, 0x17, 0x18, 0x19, 0x1A, 0x25, 0x26, 0x27, 0x28, 0x29, 0x2A, 0x34, 0x35, 0x36, 0x37,
        0x38, 0x39, 0x3A, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49, 0x4A, 0x53, 0x54, 0x55, 0x56,
        0x57, 0x58, 0x59, 0x5A, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69, 0x6A, 0x73, 0x74, 0x75,
        0x76, 0x77, 0x78, 0x79, 0x7A, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89, 0x8A, 0x92, 0x93,
        0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9A, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7, 0xA8, 0xA9,
        0xAA, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6, 0xB7, 0xB8, 0xB9, 0xBA, 0xC2, 0xC3, 0xC4, 0xC5, 0xC6,
        0xC7, 0xC8, 0xC9, 0xCA, 0xD2, 0xD3, 0xD4, 0xD5, 0xD6, 0xD7, 0xD8, 0xD9, 0xDA, 0xE1, 0xE2,
        0xE3, 0xE4, 0xE5, 0xE6, 0xE7, 0xE8, 0xE9, 0xEA, 0xF1, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7,
        0xF8, 0xF9, 0xFA, 0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00, 0xFB, 0xD5,
        0xDB, 0x20, 0xA8, 0xF1, 0x7E, 0xFF, 0xD9,
    ];

    fn tiff_bytes(img: &image::RgbImage) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Tiff).unwrap();
        buffer.into_inner()
    }

    fn write_temp(suffix: &str, bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_decode_valid_jpeg() {
        let img = decode_image(MINIMAL_JPEG).unwrap();
        assert_eq!(img.width, 1);
        assert_eq!(img.height, 1);
        assert_eq!(img.pixels.len(), 3);
    }

    #[test]
    fn test_decode_tiff() {
        let src = image::RgbImage::from_fn(4, 2, |x, y| image::Rgb([x as u8 * 60, y as u8 * 100, 7]));
        let img = decode_image(&tiff_bytes(&src)).unwrap();
        assert_eq!((img.width, img.height), (4, 2));
        assert_eq!(img.pixels, src.into_raw());
    }

    #[test]
    fn test_decode_rgba_tiff_strips_alpha() {
        let src = image::RgbaImage::from_pixel(3, 3, image::Rgba([10, 20, 30, 128]));
        let mut buffer = Cursor::new(Vec::new());
        src.write_to(&mut buffer, ImageFormat::Tiff).unwrap();

        let img = decode_image(buffer.get_ref()).unwrap();
        assert_eq!(img.pixels.len(), 3 * 3 * 3);
        assert_eq!(&img.pixels[0..3], &[10, 20, 30]);
    }

    #[test]
    fn test_decode_invalid_bytes() {
        let result = decode_image(&[0x00, 0x01, 0x02, 0x03]);
        assert!(matches!(result, Err(DecodeError::DecodeFailure(_))));
    }

    #[test]
    fn test_decode_png_signature_is_unsupported() {
        let png_header = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        let result = decode_image(&png_header);
        assert!(matches!(result, Err(DecodeError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_decode_empty_and_truncated() {
        assert!(decode_image(&[]).is_err());
        assert!(matches!(
            decode_image(&MINIMAL_JPEG[0..20]),
            Err(DecodeError::DecodeFailure(_))
        ));
    }

    #[test]
    fn test_supported_extensions() {
        for ext in ["jpg", "JPG", "jpeg", "tif", "TIFF"] {
            assert!(is_supported_extension(ext), "{}", ext);
        }
        for ext in ["png", "heic", "", "jp"] {
            assert!(!is_supported_extension(ext), "{}", ext);
        }
    }

    #[test]
    fn test_decode_file_jpeg() {
        let file = write_temp(".jpg", MINIMAL_JPEG);
        let img = decode_file(file.path()).unwrap();
        assert_eq!((img.width, img.height), (1, 1));
    }

    #[test]
    fn test_decode_file_uppercase_tiff() {
        let src = image::RgbImage::from_pixel(5, 6, image::Rgb([1, 2, 3]));
        let file = write_temp(".TIF", &tiff_bytes(&src));
        let img = decode_file(file.path()).unwrap();
        assert_eq!((img.width, img.height), (5, 6));
    }

    #[test]
    fn test_decode_file_rejects_extension_before_reading() {
        let result = decode_file(Path::new("/definitely/not/here/photo.png"));
        match result {
            Err(DecodeError::UnsupportedFormat(ext)) => assert_eq!(ext, "png"),
            other => panic!("Expected UnsupportedFormat, got: {:?}", other),
        }
    }

    #[test]
    fn test_decode_file_missing() {
        let result = decode_file(Path::new("/definitely/not/here/photo.jpg"));
        assert!(matches!(result, Err(DecodeError::IoError(_))));
    }

    #[test]
    fn test_decode_file_garbage_contents() {
        let file = write_temp(".jpeg", b"not an image at all");
        assert!(matches!(
            decode_file(file.path()),
            Err(DecodeError::DecodeFailure(_))
        ));
    }

    #[test]
    fn test_orientation_extraction_no_exif() {
        assert_eq!(extract_orientation(MINIMAL_JPEG), Orientation::Normal);
        assert_eq!(extract_orientation(&[0x00, 0x01, 0x02]), Orientation::Normal);
    }

    #[test]
    fn test_apply_orientation_rotate90() {
        let rgb_img = image::RgbImage::from_raw(2, 1, vec![255, 0, 0, 0, 255, 0]).unwrap();
        let result = apply_orientation(DynamicImage::ImageRgb8(rgb_img), Orientation::Rotate90CW);
        assert_eq!(result.into_rgb8().dimensions(), (1, 2));
    }

    #[test]
    fn test_apply_orientation_rotate180() {
        let rgb_img = image::RgbImage::from_raw(2, 1, vec![255, 0, 0, 0, 255, 0]).unwrap();
        let result = apply_orientation(DynamicImage::ImageRgb8(rgb_img), Orientation::Rotate180);
        let rgb = result.into_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [0, 255, 0]);
        assert_eq!(rgb.get_pixel(1, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_apply_orientation_flip_horizontal() {
        let rgb_img = image::RgbImage::from_raw(2, 1, vec![255, 0, 0, 0, 255, 0]).unwrap();
        let result = apply_orientation(DynamicImage::ImageRgb8(rgb_img), Orientation::FlipHorizontal);
        let rgb = result.into_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [0, 255, 0]);
    }
}
