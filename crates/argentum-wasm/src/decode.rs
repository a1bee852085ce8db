//! Image decoding WASM bindings.
//!
//! # Functions
//!
//! - [`decode_image`] - Decode a JPEG or TIFF from bytes, EXIF orientation applied
//! - [`is_supported_extension`] - Check a file extension before reading the file
//! - [`resize_to_fit`] - Resize an image to fit within a max edge, preserving aspect ratio
//! - [`render_preview`] - Like `resize_to_fit` but shares images that already fit
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, is_supported_extension, render_preview } from '@argentum/wasm';
//!
//! if (is_supported_extension(file.name.split('.').pop())) {
//!   const image = decode_image(new Uint8Array(await file.arrayBuffer()));
//!   const preview = render_preview(image, 1024, 1);
//! }
//! ```

use argentum_core::decode;
use wasm_bindgen::prelude::*;

use crate::js_error;
use crate::types::{filter_from_u8, JsDecodedImage};

/// Decode a JPEG or TIFF image from bytes.
///
/// # Errors
///
/// Fails for any other format and for corrupt or truncated data.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsDecodedImage::from_decoded)
        .map_err(js_error)
}

/// Whether a file extension (without the dot, any case) can be opened.
#[wasm_bindgen]
pub fn is_supported_extension(extension: &str) -> bool {
    decode::is_supported_extension(extension)
}

/// Resize an image so its longest edge is `max_edge`.
///
/// `filter`: 0 = Nearest, 1 = Bilinear, 2 = Lanczos3.
#[wasm_bindgen]
pub fn resize_to_fit(image: &JsDecodedImage, max_edge: u32, filter: u8) -> Result<JsDecodedImage, JsValue> {
    decode::resize_to_fit(image.as_decoded(), max_edge, filter_from_u8(filter))
        .map(JsDecodedImage::from_decoded)
        .map_err(js_error)
}

/// Downscale for display; images that already fit are returned as-is.
#[wasm_bindgen]
pub fn render_preview(image: &JsDecodedImage, max_edge: u32, filter: u8) -> Result<JsDecodedImage, JsValue> {
    decode::render_preview(image.shared(), max_edge, filter_from_u8(filter))
        .map(JsDecodedImage::from_shared)
        .map_err(js_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use argentum_core::decode::DecodedImage;

    fn gray(width: u32, height: u32) -> JsDecodedImage {
        JsDecodedImage::from_decoded(DecodedImage::new(
            width,
            height,
            vec![128; (width * height * 3) as usize],
        ))
    }

    #[test]
    fn test_is_supported_extension() {
        assert!(is_supported_extension("JPG"));
        assert!(is_supported_extension("tif"));
        assert!(!is_supported_extension("png"));
        assert!(!is_supported_extension("arw"));
    }

    #[test]
    fn test_resize_to_fit() {
        let result = resize_to_fit(&gray(400, 200), 100, 1).ok().unwrap();
        assert_eq!((result.width(), result.height()), (100, 50));
    }

    #[test]
    fn test_render_preview_shares_small_images() {
        let image = gray(40, 20);
        let preview = render_preview(&image, 100, 0).ok().unwrap();
        assert!(std::sync::Arc::ptr_eq(preview.shared(), image.shared()));
    }
}
