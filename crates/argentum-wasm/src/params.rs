//! Edit parameters as a standalone JavaScript value.
//!
//! Used to save and restore a session's edits, or to drive
//! [`apply_edits`](crate::pipeline::apply_edits) without a session.

use argentum_core::params::EditParameters;
use wasm_bindgen::prelude::*;

use crate::js_error;

#[wasm_bindgen]
pub struct JsEditParameters {
    inner: EditParameters,
}

#[wasm_bindgen]
impl JsEditParameters {
    /// Parameters with every field at its default.
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsEditParameters {
        Self {
            inner: EditParameters::default(),
        }
    }

    /// Rotation in degrees, positive counter-clockwise.
    #[wasm_bindgen(getter)]
    pub fn rotation_angle(&self) -> i32 {
        self.inner.rotation_angle
    }

    pub fn rotate_clockwise(&mut self) {
        self.inner.rotate_clockwise();
    }

    pub fn rotate_counter_clockwise(&mut self) {
        self.inner.rotate_counter_clockwise();
    }

    #[wasm_bindgen(getter)]
    pub fn exposure(&self) -> f64 {
        self.inner.exposure
    }

    #[wasm_bindgen(setter)]
    pub fn set_exposure(&mut self, value: f64) {
        self.inner.exposure = value;
    }

    #[wasm_bindgen(getter)]
    pub fn contrast(&self) -> f64 {
        self.inner.contrast
    }

    #[wasm_bindgen(setter)]
    pub fn set_contrast(&mut self, value: f64) {
        self.inner.contrast = value;
    }

    #[wasm_bindgen(getter)]
    pub fn saturation(&self) -> f64 {
        self.inner.saturation
    }

    #[wasm_bindgen(setter)]
    pub fn set_saturation(&mut self, value: f64) {
        self.inner.saturation = value;
    }

    #[wasm_bindgen(getter)]
    pub fn brightness(&self) -> f64 {
        self.inner.brightness
    }

    #[wasm_bindgen(setter)]
    pub fn set_brightness(&mut self, value: f64) {
        self.inner.brightness = value;
    }

    #[wasm_bindgen(getter)]
    pub fn jpeg_quality(&self) -> f64 {
        self.inner.jpeg_quality
    }

    #[wasm_bindgen(setter)]
    pub fn set_jpeg_quality(&mut self, value: f64) {
        self.inner.jpeg_quality = value;
    }

    /// Check if all parameters are at default values
    pub fn is_default(&self) -> bool {
        self.inner.is_default()
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Serialize to a plain object for storage
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(js_error)
    }

    /// Deserialize from a plain object; missing fields take their defaults.
    pub fn from_json(value: JsValue) -> Result<JsEditParameters, JsValue> {
        let inner: EditParameters = serde_wasm_bindgen::from_value(value).map_err(js_error)?;
        Ok(Self { inner })
    }
}

impl Default for JsEditParameters {
    fn default() -> Self {
        Self::new()
    }
}

impl JsEditParameters {
    pub(crate) fn from_core(inner: EditParameters) -> Self {
        Self { inner }
    }

    pub(crate) fn inner(&self) -> &EditParameters {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = JsEditParameters::new();
        assert!(params.is_default());
        assert_eq!(params.jpeg_quality(), 0.9);
        assert_eq!(params.contrast(), 1.0);
    }

    #[test]
    fn test_setters_and_reset() {
        let mut params = JsEditParameters::default();
        params.set_exposure(0.4);
        params.set_saturation(1.2);
        params.rotate_clockwise();
        assert_eq!(params.rotation_angle(), -90);
        assert!(!params.is_default());

        params.reset();
        assert!(params.is_default());
    }

    #[test]
    fn test_wraps_core_parameters() {
        let mut core = EditParameters::default();
        core.brightness = 0.2;
        let params = JsEditParameters::from_core(core.clone());
        assert_eq!(params.inner(), &core);
        assert_eq!(params.brightness(), 0.2);
    }
}
