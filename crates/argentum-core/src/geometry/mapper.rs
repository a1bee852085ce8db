//! Conversion between image space and view space.
//!
//! The image is fitted into the view with a uniform scale and centred, so the
//! transform is fully determined by the two sizes:
//!
//! ```text
//! scale    = min(view.w / image.w, view.h / image.h)
//! offset_x = (view.w - image.w * scale) / 2
//! offset_y = (view.h - image.h * scale) / 2
//! ```
//!
//! Nothing here rounds to integers, so `view_to_image(image_to_view(r)) == r`
//! up to floating point error. A zero-sized image or view is degenerate and
//! maps every rectangle to [`Rect::ZERO`].

use super::{Point, Rect, Size};

/// Letterbox transform for one `(image, view)` size pair.
///
/// Derived on demand and never stored: recompute it whenever either size
/// changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    pub scale: f64,
    pub offset: Point,
}

impl ViewportTransform {
    /// Build the transform, or `None` when either size is degenerate.
    pub fn new(image: Size, view: Size) -> Option<Self> {
        if image.is_degenerate() || view.is_degenerate() {
            return None;
        }

        let scale = (view.width / image.width).min(view.height / image.height);
        let offset = Point::new(
            (view.width - image.width * scale) / 2.0,
            (view.height - image.height * scale) / 2.0,
        );

        Some(Self { scale, offset })
    }

    /// Image-space rectangle to view space.
    pub fn to_view(&self, rect: Rect) -> Rect {
        Rect::new(
            rect.x * self.scale + self.offset.x,
            rect.y * self.scale + self.offset.y,
            rect.width * self.scale,
            rect.height * self.scale,
        )
    }

    /// View-space rectangle to image space.
    pub fn to_image(&self, rect: Rect) -> Rect {
        Rect::new(
            (rect.x - self.offset.x) / self.scale,
            (rect.y - self.offset.y) / self.scale,
            rect.width / self.scale,
            rect.height / self.scale,
        )
    }

    /// View-space length to image space.
    ///
    /// Used to turn the crop engine's view-space minimum size into an
    /// image-pixel floor.
    pub fn length_to_image(&self, length: f64) -> f64 {
        length / self.scale
    }
}

/// Map `rect` from image space to view space.
pub fn image_to_view(rect: Rect, image: Size, view: Size) -> Rect {
    ViewportTransform::new(image, view)
        .map(|t| t.to_view(rect))
        .unwrap_or(Rect::ZERO)
}

/// Map `rect` from view space to image space. Exact inverse of [`image_to_view`].
pub fn view_to_image(rect: Rect, image: Size, view: Size) -> Rect {
    ViewportTransform::new(image, view)
        .map(|t| t.to_image(rect))
        .unwrap_or(Rect::ZERO)
}

/// The area the whole image occupies inside the view.
///
/// This is the container the crop overlay is confined to.
pub fn image_frame(image: Size, view: Size) -> Rect {
    image_to_view(Rect::from_size(image), image, view)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn size_strategy() -> impl Strategy<Value = Size> {
        (1.0f64..=8000.0, 1.0f64..=8000.0).prop_map(|(w, h)| Size::new(w, h))
    }

    fn rect_strategy() -> impl Strategy<Value = Rect> {
        (
            -1000.0f64..=5000.0,
            -1000.0f64..=5000.0,
            0.0f64..=5000.0,
            0.0f64..=5000.0,
        )
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        /// Property: view_to_image inverts image_to_view.
        #[test]
        fn prop_round_trip(
            image in size_strategy(),
            view in size_strategy(),
            rect in rect_strategy(),
        ) {
            let back = view_to_image(image_to_view(rect, image, view), image, view);
            let tolerance = 1e-6 * (1.0 + rect.x.abs().max(rect.y.abs()).max(rect.width).max(rect.height));
            prop_assert!(back.approx_eq(&rect, tolerance), "{:?} -> {:?}", rect, back);
        }

        /// Property: the full image always lands inside the view.
        #[test]
        fn prop_image_frame_inside_view(
            image in size_strategy(),
            view in size_strategy(),
        ) {
            let frame = image_frame(image, view);
            prop_assert!(Rect::from_size(view).contains_rect(&frame));
        }

        /// Property: the fit touches at least one pair of view edges.
        #[test]
        fn prop_image_frame_fills_one_axis(
            image in size_strategy(),
            view in size_strategy(),
        ) {
            let frame = image_frame(image, view);
            let fills_w = (frame.width - view.width).abs() < 1e-6 * view.width;
            let fills_h = (frame.height - view.height).abs() < 1e-6 * view.height;
            prop_assert!(fills_w || fills_h);
        }
    }
}
