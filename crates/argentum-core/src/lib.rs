//! Argentum Core - non-destructive image editing library
//!
//! This crate provides the core of the Argentum editor: JPEG/TIFF decoding,
//! the edit pipeline (rotate, crop, exposure, color controls), the
//! interactive crop geometry engine and a debounced editing session.
//!
//! The source image is never modified. Every change to [`EditParameters`]
//! schedules a fresh pipeline run from the source; results are applied in
//! the order their runs were started.

pub mod adjustments;
pub mod codec;
pub mod config;
pub mod decode;
pub mod encode;
pub mod geometry;
pub mod params;
pub mod pipeline;
pub mod session;
pub mod transform;

pub use adjustments::{ColorControls, ColorFilter, FilterError, StandardColorFilter};
pub use codec::{Codec, ImageCodec};
pub use config::EditorConfig;
pub use decode::{DecodeError, DecodedImage};
pub use encode::EncodeError;
pub use geometry::{CropConstraints, CropDragSession, CropHandle, Point, Rect, Size};
pub use params::{CropAspectRatio, CropMode, EditParameters};
pub use pipeline::{CancelToken, EditPipeline};
pub use session::{EditSession, EditorError, RecomputeResult, RecomputeTicket};
