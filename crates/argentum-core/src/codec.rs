//! Decoding and encoding behind one seam.
//!
//! The session never touches the `decode`/`encode` modules directly; it goes
//! through a [`Codec`] so hosts can substitute their own image I/O (a
//! platform decoder, an in-memory fake in tests).

use std::path::Path;

use crate::decode::{self, DecodeError, DecodedImage};
use crate::encode::{self, EncodeError};

/// Image I/O used by an editing session.
pub trait Codec: Send + Sync {
    /// Decode a file from disk. Unsupported extensions fail without I/O.
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError>;

    /// Decode an in-memory JPEG or TIFF.
    fn decode_bytes(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError>;

    /// Encode to JPEG at a quality fraction in `[0.5, 1.0]`.
    fn encode(&self, image: &DecodedImage, quality: f64) -> Result<Vec<u8>, EncodeError>;
}

/// [`Codec`] backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl Codec for ImageCodec {
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError> {
        decode::decode_file(path)
    }

    fn decode_bytes(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
        decode::decode_image(bytes)
    }

    fn encode(&self, image: &DecodedImage, quality: f64) -> Result<Vec<u8>, EncodeError> {
        encode::encode_image(image, quality)
    }
}
