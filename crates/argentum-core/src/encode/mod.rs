//! Image encoding for export.
//!
//! This module provides functionality for:
//! - Encoding pipeline output to JPEG with a quality fraction
//! - Flattening RGBA input by stripping alpha
//!
//! # Examples
//!
//! ```ignore
//! use argentum_core::encode::encode_image;
//!
//! let jpeg_bytes = encode_image(&output, params.effective_jpeg_quality())?;
//! println!("Encoded {} bytes", jpeg_bytes.len());
//! ```

mod jpeg;

pub use jpeg::{encode_image, encode_jpeg, encode_jpeg_rgba, quality_to_u8, strip_alpha, EncodeError};
