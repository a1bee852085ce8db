//! Argentum WASM - WebAssembly bindings for Argentum
//!
//! This crate exposes the argentum-core editor to JavaScript/TypeScript
//! applications.
//!
//! # Module Structure
//!
//! - `session` - The editing session: open, adjust, crop, preview, export
//! - `params` - Edit parameters as a standalone value (save/restore)
//! - `geometry` - View/image coordinate mapping and crop drags
//! - `pipeline` - One-shot pipeline runs on an image
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Image decoding bindings (JPEG, TIFF, preview downscale)
//! - `encode` - Image encoding bindings (JPEG export)
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditSession } from '@argentum/wasm';
//!
//! await init();
//!
//! const session = new JsEditSession({});
//! session.open(new Uint8Array(await file.arrayBuffer()), file.name);
//! session.set_exposure(0.3, performance.now());
//!
//! // In a requestAnimationFrame loop:
//! if (session.tick(performance.now())) {
//!   draw(session.preview());
//! }
//! ```

use std::fmt::Display;

use wasm_bindgen::prelude::*;

mod decode;
mod encode;
mod geometry;
mod params;
mod pipeline;
mod session;
mod types;

// Re-export public types
pub use decode::{decode_image, is_supported_extension, render_preview, resize_to_fit};
pub use encode::{encode_image, encode_jpeg, encode_jpeg_rgba};
pub use geometry::{image_frame, image_to_view, view_to_image, JsCropDrag};
pub use params::JsEditParameters;
pub use pipeline::apply_edits;
pub use session::JsEditSession;
pub use types::JsDecodedImage;

/// Initialize the WASM module (called automatically on load).
///
/// Installs the panic hook and routes core `tracing` events to the browser
/// console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // A second init (hot reload) finds the logger already set.
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Convert a Rust error into a JavaScript `Error`.
pub(crate) fn js_error(error: impl Display) -> JsValue {
    js_sys::Error::new(&error.to_string()).into()
}
