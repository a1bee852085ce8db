//! User-adjustable edit settings.
//!
//! [`EditParameters`] is a plain value: the session mutates it in response to
//! UI commands and the pipeline reads a snapshot of it on every recompute.
//! Nothing here touches pixels.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::adjustments::ColorControls;
use crate::geometry::{Rect, Size};

/// Slider range for exposure, in stops.
pub const EXPOSURE_RANGE: RangeInclusive<f64> = -1.0..=1.0;
/// Slider range for contrast, 1.0 is neutral.
pub const CONTRAST_RANGE: RangeInclusive<f64> = 0.7..=1.3;
/// Slider range for saturation, 1.0 is neutral.
pub const SATURATION_RANGE: RangeInclusive<f64> = 0.7..=1.3;
/// Slider range for brightness, 0.0 is neutral.
pub const BRIGHTNESS_RANGE: RangeInclusive<f64> = -0.3..=0.3;
/// Export quality range.
pub const JPEG_QUALITY_RANGE: RangeInclusive<f64> = 0.5..=1.0;

pub const DEFAULT_JPEG_QUALITY: f64 = 0.9;

/// Fraction of the image covered by the crop rect created on first activation.
pub const DEFAULT_INITIAL_CROP_FRACTION: f64 = 0.8;

/// Aspect ratio constraint for the crop tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CropAspectRatio {
    /// No constraint.
    #[default]
    Free,
    /// Locked to the ratio of the image being cropped.
    Original,
    /// Locked to `width / height`.
    Custom { width: f64, height: f64 },
}

impl CropAspectRatio {
    /// A custom ratio, or `None` unless both sides are positive and finite.
    pub fn custom(width: f64, height: f64) -> Option<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        (valid(width) && valid(height)).then_some(CropAspectRatio::Custom { width, height })
    }

    /// Effective `width / height` ratio, or `None` when unconstrained.
    ///
    /// `Original` resolves against `source`, the displayed (rotated) image
    /// size. An invalid custom ratio or a degenerate source size behaves like
    /// `Free`.
    pub fn resolve(&self, source: Size) -> Option<f64> {
        match *self {
            CropAspectRatio::Free => None,
            CropAspectRatio::Original => source.aspect_ratio(),
            CropAspectRatio::Custom { width, height } => Size::new(width, height).aspect_ratio(),
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, CropAspectRatio::Free)
    }
}

impl fmt::Display for CropAspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CropAspectRatio::Free => write!(f, "Free"),
            CropAspectRatio::Original => write!(f, "Original"),
            CropAspectRatio::Custom { width, height } => write!(f, "{}:{}", width, height),
        }
    }
}

/// Crop tool state.
///
/// While active, the rect that existed before activation is kept so that
/// cancelling can restore it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum CropMode {
    #[default]
    Inactive,
    Active { previous: Option<Rect> },
}

/// All user-adjustable settings of one editing session.
///
/// Color values outside their slider ranges are accepted here and clamped
/// by the `effective_*` accessors the pipeline uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditParameters {
    /// Degrees, a multiple of 90 in (-360, 360). Positive is counter-clockwise.
    pub rotation_angle: i32,
    /// Exposure in stops.
    pub exposure: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub brightness: f64,
    pub crop_mode: CropMode,
    /// Crop in image-pixel space of the rotated image. `None` until the crop
    /// tool is first used.
    pub crop_rect: Option<Rect>,
    pub crop_aspect_ratio: CropAspectRatio,
    pub jpeg_quality: f64,
}

impl Default for EditParameters {
    fn default() -> Self {
        Self {
            rotation_angle: 0,
            exposure: 0.0,
            contrast: 1.0,
            saturation: 1.0,
            brightness: 0.0,
            crop_mode: CropMode::Inactive,
            crop_rect: None,
            crop_aspect_ratio: CropAspectRatio::Free,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl EditParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if every field is at its default.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Restore every field to its default, discarding an in-progress crop.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // ===== Rotation =====

    /// Turn a quarter clockwise.
    pub fn rotate_clockwise(&mut self) {
        self.rotation_angle = wrap_rotation(self.normalized_rotation() - 90);
    }

    /// Turn a quarter counter-clockwise.
    pub fn rotate_counter_clockwise(&mut self) {
        self.rotation_angle = wrap_rotation(self.normalized_rotation() + 90);
    }

    /// The rotation snapped to a multiple of 90 inside (-360, 360).
    pub fn normalized_rotation(&self) -> i32 {
        let quarters = (self.rotation_angle as f64 / 90.0).round() as i32;
        wrap_rotation(quarters.saturating_mul(90) % 360)
    }

    /// Counter-clockwise quarter turns in `0..4`.
    pub fn quarter_turns(&self) -> u8 {
        (self.normalized_rotation() / 90).rem_euclid(4) as u8
    }

    /// Size of the source after rotation, the space `crop_rect` lives in.
    pub fn rotated_size(&self, source: Size) -> Size {
        if self.quarter_turns() % 2 == 1 {
            source.transposed()
        } else {
            source
        }
    }

    // ===== Crop =====

    pub fn is_crop_active(&self) -> bool {
        matches!(self.crop_mode, CropMode::Active { .. })
    }

    /// Enter crop mode.
    ///
    /// `image` is the rotated image size. The first activation on an image
    /// creates a centred rect covering `fraction` of each dimension, fitted to
    /// the current aspect ratio. Does nothing when already active.
    pub fn begin_crop(&mut self, image: Size, fraction: f64) {
        if self.is_crop_active() {
            return;
        }

        let previous = self.crop_rect;
        if self.crop_rect.is_none() && !image.is_degenerate() {
            self.crop_rect = Some(self.initial_crop_rect(image, fraction));
        }
        self.crop_mode = CropMode::Active { previous };
    }

    /// Leave crop mode keeping the current rect. Returns whether crop mode
    /// was active.
    pub fn apply_crop(&mut self) -> bool {
        if !self.is_crop_active() {
            return false;
        }
        self.crop_mode = CropMode::Inactive;
        true
    }

    /// Leave crop mode restoring the rect from before activation. Returns
    /// whether crop mode was active.
    pub fn cancel_crop(&mut self) -> bool {
        match self.crop_mode {
            CropMode::Active { previous } => {
                self.crop_rect = previous;
                self.crop_mode = CropMode::Inactive;
                true
            }
            CropMode::Inactive => false,
        }
    }

    /// Store a crop rect, clamped into `image` with each side at least
    /// `min_size` image pixels.
    pub fn set_crop_rect(&mut self, rect: Rect, image: Size, min_size: f64) {
        let bounds = Rect::from_size(image);
        self.crop_rect = Some(rect.clamped_into(&bounds, Size::new(min_size, min_size)));
    }

    /// Drop the crop rect entirely.
    pub fn clear_crop(&mut self) {
        self.crop_rect = None;
    }

    /// Change the aspect ratio, refitting an existing crop rect around its
    /// centre when the new ratio is constrained.
    pub fn set_crop_aspect_ratio(&mut self, ratio: CropAspectRatio, image: Size) {
        self.crop_aspect_ratio = ratio;

        if let (Some(rect), Some(r)) = (self.crop_rect, ratio.resolve(image)) {
            self.crop_rect = Some(rect.fit_to_ratio(r, &Rect::from_size(image)));
        }
    }

    fn initial_crop_rect(&self, image: Size, fraction: f64) -> Rect {
        let fraction = if fraction.is_finite() && fraction > 0.0 {
            fraction.min(1.0)
        } else {
            DEFAULT_INITIAL_CROP_FRACTION
        };
        let bounds = Rect::from_size(image);
        let rect = Rect::centered(
            bounds.center(),
            Size::new(image.width * fraction, image.height * fraction),
        );

        match self.crop_aspect_ratio.resolve(image) {
            Some(r) => rect.fit_to_ratio(r, &bounds),
            None => rect,
        }
    }

    // ===== Color =====

    pub fn effective_exposure(&self) -> f64 {
        clamp_to(self.exposure, &EXPOSURE_RANGE, 0.0)
    }

    pub fn effective_contrast(&self) -> f64 {
        clamp_to(self.contrast, &CONTRAST_RANGE, 1.0)
    }

    pub fn effective_saturation(&self) -> f64 {
        clamp_to(self.saturation, &SATURATION_RANGE, 1.0)
    }

    pub fn effective_brightness(&self) -> f64 {
        clamp_to(self.brightness, &BRIGHTNESS_RANGE, 0.0)
    }

    pub fn effective_jpeg_quality(&self) -> f64 {
        clamp_to(self.jpeg_quality, &JPEG_QUALITY_RANGE, DEFAULT_JPEG_QUALITY)
    }

    /// Brightness, contrast and saturation as one combined adjustment.
    pub fn color_controls(&self) -> ColorControls {
        ColorControls {
            brightness: self.effective_brightness() as f32,
            contrast: self.effective_contrast() as f32,
            saturation: self.effective_saturation() as f32,
        }
    }
}

/// Wrap to 0 once a full turn is reached in either direction.
fn wrap_rotation(angle: i32) -> i32 {
    if angle.abs() >= 360 {
        0
    } else {
        angle
    }
}

/// Clamp into `range`; NaN becomes `fallback`.
fn clamp_to(value: f64, range: &RangeInclusive<f64>, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(*range.start(), *range.end())
    }
}
