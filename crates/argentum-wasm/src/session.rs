//! The editing session for browser hosts.
//!
//! JavaScript has no threads to hand tickets to, so recomputes run inline
//! from [`JsEditSession::tick`], which the host calls from its animation
//! loop with `performance.now()`. All `now_ms` arguments are that clock.

use std::path::PathBuf;
use std::time::Duration;

use argentum_core::codec::{Codec, ImageCodec};
use argentum_core::config::EditorConfig;
use argentum_core::geometry::{CropDragSession, Point, Rect, Size};
use argentum_core::session::EditSession;
use wasm_bindgen::prelude::*;

use crate::geometry::{aspect_ratio_from, handle_from_str};
use crate::js_error;
use crate::params::JsEditParameters;
use crate::types::JsDecodedImage;

/// Milliseconds from `performance.now()` to a session timestamp.
pub(crate) fn timestamp(now_ms: f64) -> Duration {
    if now_ms.is_finite() && now_ms > 0.0 {
        Duration::from_nanos((now_ms * 1e6).round() as u64)
    } else {
        Duration::ZERO
    }
}

#[wasm_bindgen]
pub struct JsEditSession {
    inner: EditSession,
    drag: Option<CropDragSession>,
}

#[wasm_bindgen]
impl JsEditSession {
    /// Create a session. `config` may be `undefined` or a partial
    /// `EditorConfig` object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsEditSession, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(js_error)?
        };
        Ok(Self::with_config(config))
    }

    /// Open a JPEG or TIFF. `name` is used for the export file name.
    pub fn open(&mut self, bytes: &[u8], name: Option<String>) -> Result<(), JsValue> {
        let image = ImageCodec.decode_bytes(bytes).map_err(js_error)?;
        self.inner.open_image(image, name.map(PathBuf::from));
        self.drag = None;
        Ok(())
    }

    pub fn close(&mut self) {
        self.inner.close();
        self.drag = None;
    }

    #[wasm_bindgen(getter)]
    pub fn has_document(&self) -> bool {
        self.inner.has_document()
    }

    pub fn params(&self) -> JsEditParameters {
        JsEditParameters::from_core(self.inner.params().clone())
    }

    /// Restore saved parameters.
    pub fn set_params(&mut self, params: &JsEditParameters, now_ms: f64) {
        self.inner
            .set_params(params.inner().clone(), timestamp(now_ms));
    }

    pub fn reset(&mut self, now_ms: f64) {
        self.inner.reset(timestamp(now_ms));
    }

    // ===== Adjustments =====

    pub fn set_exposure(&mut self, value: f64, now_ms: f64) {
        self.inner.set_exposure(value, timestamp(now_ms));
    }

    pub fn set_contrast(&mut self, value: f64, now_ms: f64) {
        self.inner.set_contrast(value, timestamp(now_ms));
    }

    pub fn set_saturation(&mut self, value: f64, now_ms: f64) {
        self.inner.set_saturation(value, timestamp(now_ms));
    }

    pub fn set_brightness(&mut self, value: f64, now_ms: f64) {
        self.inner.set_brightness(value, timestamp(now_ms));
    }

    pub fn set_jpeg_quality(&mut self, value: f64) {
        self.inner.set_jpeg_quality(value);
    }

    pub fn rotate_clockwise(&mut self, now_ms: f64) {
        self.inner.rotate_clockwise(timestamp(now_ms));
    }

    pub fn rotate_counter_clockwise(&mut self, now_ms: f64) {
        self.inner.rotate_counter_clockwise(timestamp(now_ms));
    }

    // ===== Crop =====

    #[wasm_bindgen(getter)]
    pub fn is_crop_active(&self) -> bool {
        self.inner.params().is_crop_active()
    }

    pub fn begin_crop(&mut self, now_ms: f64) {
        self.inner.begin_crop(timestamp(now_ms));
    }

    pub fn apply_crop(&mut self, now_ms: f64) -> bool {
        self.drag = None;
        self.inner.apply_crop(timestamp(now_ms))
    }

    pub fn cancel_crop(&mut self, now_ms: f64) -> bool {
        self.drag = None;
        self.inner.cancel_crop(timestamp(now_ms))
    }

    pub fn clear_crop(&mut self, now_ms: f64) {
        self.inner.clear_crop(timestamp(now_ms));
    }

    /// `kind` is `free`, `original` or `custom` (with `width:height`).
    pub fn set_crop_aspect_ratio(&mut self, kind: &str, width: f64, height: f64, now_ms: f64) {
        self.inner
            .set_crop_aspect_ratio(aspect_ratio_from(kind, width, height), timestamp(now_ms));
    }

    /// Where the image is drawn in the view; the crop overlay's container.
    pub fn crop_frame(&self, view_width: f64, view_height: f64) -> Result<JsValue, JsValue> {
        optional_rect(self.inner.crop_frame(Size::new(view_width, view_height)))
    }

    pub fn crop_rect_in_view(&self, view_width: f64, view_height: f64) -> Result<JsValue, JsValue> {
        optional_rect(
            self.inner
                .crop_rect_in_view(Size::new(view_width, view_height)),
        )
    }

    /// Start dragging a handle (`topLeft`, ..., `center`). Returns `false`
    /// when crop mode is not active or the handle name is unknown.
    pub fn begin_crop_drag(&mut self, handle: &str, view_width: f64, view_height: f64) -> bool {
        self.drag = handle_from_str(handle).and_then(|handle| {
            self.inner
                .begin_crop_drag(handle, Size::new(view_width, view_height))
        });
        self.drag.is_some()
    }

    /// Move the active drag to the cumulative translation `(dx, dy)`.
    /// Returns the new view-space rect, or `undefined` without a drag.
    pub fn update_crop_drag(
        &mut self,
        dx: f64,
        dy: f64,
        view_width: f64,
        view_height: f64,
        now_ms: f64,
    ) -> Result<JsValue, JsValue> {
        let Some(drag) = self.drag else {
            return Ok(JsValue::UNDEFINED);
        };
        optional_rect(self.inner.update_crop_drag(
            &drag,
            Point::new(dx, dy),
            Size::new(view_width, view_height),
            timestamp(now_ms),
        ))
    }

    pub fn end_crop_drag(&mut self) {
        self.drag = None;
    }

    pub fn crop_aspect_label(&self) -> Option<String> {
        self.inner.crop_aspect_label()
    }

    // ===== Recompute and output =====

    /// Run a due recompute. Returns `true` when the output changed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.inner.tick(timestamp(now_ms))
    }

    /// Milliseconds until the next recompute is due, or `undefined`.
    pub fn time_until_recompute(&self, now_ms: f64) -> Option<f64> {
        self.inner
            .time_until_recompute(timestamp(now_ms))
            .map(|d| d.as_nanos() as f64 / 1e6)
    }

    /// Recompute now, ignoring the debounce.
    pub fn recompute(&mut self) {
        self.inner.recompute();
    }

    /// The current output downscaled to the configured preview size.
    pub fn preview(&self) -> Result<JsDecodedImage, JsValue> {
        self.inner
            .preview()
            .map(JsDecodedImage::from_shared)
            .map_err(js_error)
    }

    /// Full-resolution JPEG of the committed edits.
    pub fn export(&self) -> Result<Vec<u8>, JsValue> {
        self.inner.export(&ImageCodec).map_err(js_error)
    }

    pub fn export_file_name(&self) -> Option<String> {
        self.inner.export_file_name()
    }
}

impl JsEditSession {
    pub(crate) fn with_config(config: EditorConfig) -> Self {
        Self {
            inner: EditSession::new(config),
            drag: None,
        }
    }

    pub(crate) fn session(&self) -> &EditSession {
        &self.inner
    }
}

fn optional_rect(rect: Option<Rect>) -> Result<JsValue, JsValue> {
    match rect {
        Some(rect) => serde_wasm_bindgen::to_value(&rect).map_err(js_error),
        None => Ok(JsValue::UNDEFINED),
    }
}
