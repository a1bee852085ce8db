//! Editor configuration.
//!
//! All fields are optional on input (`#[serde(default)]`), so a host can pass
//! `{}` or only the values it wants to change. Nonsensical values are
//! repaired by [`EditorConfig::sanitized`] instead of being rejected.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::decode::FilterType;
use crate::geometry::crop_engine::{DEFAULT_MIN_CROP_SIZE, DEFAULT_SNAP_THRESHOLD};
use crate::params::DEFAULT_INITIAL_CROP_FRACTION;

pub const DEFAULT_DEBOUNCE_MS: u64 = 150;
pub const DEFAULT_PREVIEW_MAX_EDGE: u32 = 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// View-space minimum crop dimension.
    pub min_crop_size: f64,
    /// View-space distance at which a dragged crop edge snaps to the frame.
    pub snap_threshold: f64,
    /// Share of each image dimension covered by the first crop rect.
    pub initial_crop_fraction: f64,
    /// Quiet period after the last change before a recompute starts.
    pub debounce_ms: u64,
    /// Longest edge of preview renders, in pixels.
    pub preview_max_edge: u32,
    pub preview_filter: FilterType,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_crop_size: DEFAULT_MIN_CROP_SIZE,
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
            initial_crop_fraction: DEFAULT_INITIAL_CROP_FRACTION,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            preview_max_edge: DEFAULT_PREVIEW_MAX_EDGE,
            preview_filter: FilterType::Bilinear,
        }
    }
}

impl EditorConfig {
    /// Replace invalid values with their defaults and clamp the rest.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        self.min_crop_size = finite_or(self.min_crop_size, defaults.min_crop_size).clamp(1.0, 1000.0);
        self.snap_threshold = finite_or(self.snap_threshold, defaults.snap_threshold).clamp(0.0, 100.0);

        self.initial_crop_fraction = finite_or(self.initial_crop_fraction, defaults.initial_crop_fraction);
        if self.initial_crop_fraction <= 0.0 {
            self.initial_crop_fraction = defaults.initial_crop_fraction;
        }
        self.initial_crop_fraction = self.initial_crop_fraction.min(1.0);

        self.debounce_ms = self.debounce_ms.min(2000);
        if self.preview_max_edge == 0 {
            self.preview_max_edge = defaults.preview_max_edge;
        }
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
