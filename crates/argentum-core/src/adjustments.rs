//! Color adjustment algorithms.
//!
//! Two operations are exposed to the pipeline through the [`ColorFilter`]
//! trait, which is the seam for swapping in another color backend:
//!
//! 1. Exposure, in stops
//! 2. Color controls: saturation, brightness and contrast as one pass
//!
//! [`StandardColorFilter`] is the built-in CPU implementation working on RGB8
//! buffers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::DecodedImage;

/// Errors a color filter can report. The pipeline treats any of them as
/// "skip this stage".
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    #[error("Color filter failed: {0}")]
    Backend(String),
}

/// Brightness, contrast and saturation applied together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorControls {
    /// Added to every channel, 0.0 is neutral.
    pub brightness: f32,
    /// Scale around mid-grey, 1.0 is neutral.
    pub contrast: f32,
    /// Scale away from luminance, 1.0 is neutral.
    pub saturation: f32,
}

impl Default for ColorControls {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 1.0,
            saturation: 1.0,
        }
    }
}

impl ColorControls {
    /// Check if all values are neutral.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Stateless color backend used by the edit pipeline.
///
/// Implementations must not modify their input. An `Err` makes the pipeline
/// keep the stage input.
pub trait ColorFilter: Send + Sync {
    fn adjust_exposure(&self, image: &DecodedImage, ev: f32) -> Result<DecodedImage, FilterError>;

    fn adjust_color_controls(
        &self,
        image: &DecodedImage,
        controls: &ColorControls,
    ) -> Result<DecodedImage, FilterError>;
}

/// CPU implementation of [`ColorFilter`] over RGB8 pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardColorFilter;

impl ColorFilter for StandardColorFilter {
    fn adjust_exposure(&self, image: &DecodedImage, ev: f32) -> Result<DecodedImage, FilterError> {
        check_buffer(image)?;
        let mut out = image.clone();
        apply_exposure(&mut out.pixels, ev);
        Ok(out)
    }

    fn adjust_color_controls(
        &self,
        image: &DecodedImage,
        controls: &ColorControls,
    ) -> Result<DecodedImage, FilterError> {
        check_buffer(image)?;
        let mut out = image.clone();
        apply_color_controls(&mut out.pixels, controls);
        Ok(out)
    }
}

fn check_buffer(image: &DecodedImage) -> Result<(), FilterError> {
    if image.has_valid_buffer() {
        Ok(())
    } else {
        Err(FilterError::InvalidPixelData {
            expected: image.width as usize * image.height as usize * 3,
            actual: image.pixels.len(),
        })
    }
}

/// Apply exposure to RGB pixel data in place.
///
/// Formula: `output = input * 2^ev`
pub fn apply_exposure(pixels: &mut [u8], ev: f32) {
    if ev == 0.0 || !ev.is_finite() {
        return;
    }
    let multiplier = 2.0_f32.powf(ev);

    for chunk in pixels.chunks_exact_mut(3) {
        for c in chunk.iter_mut() {
            *c = to_u8(*c as f32 / 255.0 * multiplier);
        }
    }
}

/// Apply saturation, then brightness, then contrast to RGB pixel data in
/// place.
pub fn apply_color_controls(pixels: &mut [u8], controls: &ColorControls) {
    if controls.is_default() {
        return;
    }

    for chunk in pixels.chunks_exact_mut(3) {
        let mut r = chunk[0] as f32 / 255.0;
        let mut g = chunk[1] as f32 / 255.0;
        let mut b = chunk[2] as f32 / 255.0;

        (r, g, b) = apply_saturation(r, g, b, controls.saturation);
        (r, g, b) = apply_brightness(r, g, b, controls.brightness);
        (r, g, b) = apply_contrast(r, g, b, controls.contrast);

        chunk[0] = to_u8(r);
        chunk[1] = to_u8(g);
        chunk[2] = to_u8(b);
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Calculate luminance using ITU-R BT.709 coefficients.
#[inline]
fn calculate_luminance(r: f32, g: f32, b: f32) -> f32 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// Formula: `output = lum + (input - lum) * saturation`
#[inline]
fn apply_saturation(r: f32, g: f32, b: f32, saturation: f32) -> (f32, f32, f32) {
    if saturation == 1.0 {
        return (r, g, b);
    }
    let lum = calculate_luminance(r, g, b);
    (
        lum + (r - lum) * saturation,
        lum + (g - lum) * saturation,
        lum + (b - lum) * saturation,
    )
}

#[inline]
fn apply_brightness(r: f32, g: f32, b: f32, brightness: f32) -> (f32, f32, f32) {
    if brightness == 0.0 {
        return (r, g, b);
    }
    (r + brightness, g + brightness, b + brightness)
}

/// Formula: `output = (input - 0.5) * contrast + 0.5`
#[inline]
fn apply_contrast(r: f32, g: f32, b: f32, contrast: f32) -> (f32, f32, f32) {
    if contrast == 1.0 {
        return (r, g, b);
    }
    let midpoint = 0.5;
    (
        (r - midpoint) * contrast + midpoint,
        (g - midpoint) * contrast + midpoint,
        (b - midpoint) * contrast + midpoint,
    )
}
