//! One-shot pipeline runs.
//!
//! ```typescript
//! const params = new JsEditParameters();
//! params.exposure = 0.5;
//! const edited = apply_edits(image, params);
//! ```

use argentum_core::pipeline::EditPipeline;
use wasm_bindgen::prelude::*;

use crate::params::JsEditParameters;
use crate::types::JsDecodedImage;

/// Run rotate, crop, exposure and color controls on `image`.
///
/// Default parameters return the same image without copying it.
#[wasm_bindgen]
pub fn apply_edits(image: &JsDecodedImage, params: &JsEditParameters) -> JsDecodedImage {
    let output = EditPipeline::new().apply(image.shared(), params.inner());
    JsDecodedImage::from_shared(output)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use argentum_core::decode::DecodedImage;
    use argentum_core::params::EditParameters;

    fn image() -> JsDecodedImage {
        JsDecodedImage::from_decoded(DecodedImage::new(6, 4, vec![100; 6 * 4 * 3]))
    }

    #[test]
    fn test_default_params_share_input() {
        let image = image();
        let output = apply_edits(&image, &JsEditParameters::new());
        assert!(Arc::ptr_eq(output.shared(), image.shared()));
    }

    #[test]
    fn test_rotation_and_exposure() {
        let mut core = EditParameters::default();
        core.rotate_clockwise();
        core.exposure = 1.0;

        let output = apply_edits(&image(), &JsEditParameters::from_core(core));
        assert_eq!((output.width(), output.height()), (4, 6));
        assert_eq!(output.pixels()[0], 200);
    }
}
