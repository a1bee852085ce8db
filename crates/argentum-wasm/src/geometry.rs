//! Coordinate mapping and crop-drag bindings.
//!
//! Rects cross the boundary as plain `{ x, y, width, height }` objects.
//!
//! # Example (TypeScript)
//!
//! ```typescript
//! const frame = image_frame(img.width, img.height, view.width, view.height);
//!
//! const drag = new JsCropDrag('bottomRight', overlayRect);
//! const next = drag.update(dx, dy, frame, 50, 10, 'free', 0, 0, img.width, img.height);
//! ```

use argentum_core::geometry::{self, CropConstraints, CropDragSession, CropHandle, Point, Rect, Size};
use argentum_core::params::CropAspectRatio;
use wasm_bindgen::prelude::*;

use crate::js_error;

/// Parse a handle name as used by the overlay: `topLeft`, `top`, ..., `center`.
pub(crate) fn handle_from_str(name: &str) -> Option<CropHandle> {
    let handle = match name {
        "topLeft" => CropHandle::TopLeft,
        "topRight" => CropHandle::TopRight,
        "bottomLeft" => CropHandle::BottomLeft,
        "bottomRight" => CropHandle::BottomRight,
        "top" => CropHandle::Top,
        "bottom" => CropHandle::Bottom,
        "left" => CropHandle::Left,
        "right" => CropHandle::Right,
        "center" => CropHandle::Center,
        _ => return None,
    };
    Some(handle)
}

/// Build an aspect ratio from `kind` (`free`, `original` or `custom`) and
/// the custom sides. An invalid custom ratio is treated as free.
pub(crate) fn aspect_ratio_from(kind: &str, width: f64, height: f64) -> CropAspectRatio {
    match kind {
        "original" => CropAspectRatio::Original,
        "custom" => CropAspectRatio::custom(width, height).unwrap_or_default(),
        _ => CropAspectRatio::Free,
    }
}

fn rect_to_js(rect: Rect) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&rect).map_err(js_error)
}

fn rect_from_js(value: JsValue) -> Result<Rect, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(js_error)
}

/// Map an image-space rect into a view of `view_width` x `view_height`.
#[wasm_bindgen]
pub fn image_to_view(
    rect: JsValue,
    image_width: f64,
    image_height: f64,
    view_width: f64,
    view_height: f64,
) -> Result<JsValue, JsValue> {
    let rect = rect_from_js(rect)?;
    rect_to_js(geometry::image_to_view(
        rect,
        Size::new(image_width, image_height),
        Size::new(view_width, view_height),
    ))
}

/// Inverse of [`image_to_view`].
#[wasm_bindgen]
pub fn view_to_image(
    rect: JsValue,
    image_width: f64,
    image_height: f64,
    view_width: f64,
    view_height: f64,
) -> Result<JsValue, JsValue> {
    let rect = rect_from_js(rect)?;
    rect_to_js(geometry::view_to_image(
        rect,
        Size::new(image_width, image_height),
        Size::new(view_width, view_height),
    ))
}

/// Where a whole image is drawn inside a view (aspect fit, centred).
#[wasm_bindgen]
pub fn image_frame(
    image_width: f64,
    image_height: f64,
    view_width: f64,
    view_height: f64,
) -> Result<JsValue, JsValue> {
    rect_to_js(geometry::image_frame(
        Size::new(image_width, image_height),
        Size::new(view_width, view_height),
    ))
}

/// A crop drag gesture, for hosts that manage the crop rect themselves.
/// `JsEditSession` has its own drag methods.
#[wasm_bindgen]
pub struct JsCropDrag {
    inner: CropDragSession,
}

#[wasm_bindgen]
impl JsCropDrag {
    #[wasm_bindgen(constructor)]
    pub fn new(handle: &str, start_rect: JsValue) -> Result<JsCropDrag, JsValue> {
        let handle = handle_from_str(handle).ok_or_else(|| js_error(format!("unknown crop handle '{handle}'")))?;
        let start = rect_from_js(start_rect)?;
        Ok(Self {
            inner: CropDragSession::begin(handle, start),
        })
    }

    /// Rect for the cumulative translation since the drag began.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &self,
        dx: f64,
        dy: f64,
        container: JsValue,
        min_size: f64,
        snap_threshold: f64,
        aspect_kind: &str,
        aspect_width: f64,
        aspect_height: f64,
        image_width: f64,
        image_height: f64,
    ) -> Result<JsValue, JsValue> {
        let container = rect_from_js(container)?;
        let constraints = CropConstraints::new(container.size())
            .with_container(container)
            .with_min_size(min_size)
            .with_snap_threshold(snap_threshold)
            .with_aspect_ratio(
                aspect_ratio_from(aspect_kind, aspect_width, aspect_height),
                Size::new(image_width, image_height),
            );
        rect_to_js(self.inner.update(Point::new(dx, dy), &constraints))
    }
}
