//! Image encoding WASM bindings.
//!
//! Qualities are fractions in `[0.5, 1.0]`, the range of the export slider;
//! anything outside is clamped.
//!
//! # Example
//!
//! ```typescript
//! import { encode_image, encode_jpeg_rgba } from '@argentum/wasm';
//!
//! const jpegBytes = encode_image(image, 0.9);
//!
//! // Straight from a canvas
//! const data = ctx.getImageData(0, 0, w, h);
//! const fromCanvas = encode_jpeg_rgba(new Uint8Array(data.data.buffer), w, h, 0.9);
//! ```

use argentum_core::encode;
use wasm_bindgen::prelude::*;

use crate::js_error;
use crate::types::JsDecodedImage;

/// Encode RGB pixel data (3 bytes per pixel, row-major) to JPEG bytes.
///
/// # Errors
///
/// Fails if the buffer length doesn't match `width * height * 3` or a
/// dimension is zero.
#[wasm_bindgen]
pub fn encode_jpeg(pixels: &[u8], width: u32, height: u32, quality: f64) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(pixels, width, height, encode::quality_to_u8(quality)).map_err(js_error)
}

/// Encode RGBA pixel data to JPEG bytes, discarding alpha.
#[wasm_bindgen]
pub fn encode_jpeg_rgba(pixels: &[u8], width: u32, height: u32, quality: f64) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg_rgba(pixels, width, height, quality).map_err(js_error)
}

/// Encode a JsDecodedImage to JPEG bytes.
#[wasm_bindgen]
pub fn encode_image(image: &JsDecodedImage, quality: f64) -> Result<Vec<u8>, JsValue> {
    encode::encode_image(image.as_decoded(), quality).map_err(js_error)
}
