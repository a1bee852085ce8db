//! Image decoding for Argentum.
//!
//! This module provides functionality for:
//! - Decoding JPEG and TIFF files with EXIF orientation applied
//! - Rejecting unsupported formats by extension before any I/O
//! - Downscaling pipeline output for previews
//!
//! Every decoder produces a [`DecodedImage`] in RGB8, the buffer type the
//! edit pipeline operates on.
//!
//! # Examples
//!
//! ```ignore
//! use argentum_core::decode::decode_file;
//!
//! let image = decode_file(Path::new("photo.jpg"))?;
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod reader;
mod resize;
mod types;

pub use reader::{decode_file, decode_image, is_supported_extension, SUPPORTED_EXTENSIONS};
pub use resize::{render_preview, resize, resize_to_fit};
pub use types::{DecodeError, DecodedImage, FilterType, Orientation, ResizeError};

#[cfg(test)]
pub(crate) use reader::tests::MINIMAL_JPEG;
