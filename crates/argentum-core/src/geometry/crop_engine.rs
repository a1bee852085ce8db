//! Interactive crop rectangle solver.
//!
//! Turns a pointer drag on one of the nine crop handles into the next crop
//! rectangle in view space. Every call starts from the rectangle captured at
//! the beginning of the gesture and the *cumulative* translation since then,
//! so the result does not depend on how often move events arrive.
//!
//! # Algorithm
//!
//! 1. The handle picks an anchor on the start rectangle (the opposite corner
//!    or edge) which stays put for the whole gesture.
//! 2. The translation moves only the dragged edge(s). `Center` moves the
//!    whole rectangle.
//! 3. Neither dimension may fall below the minimum size.
//! 4. With a locked aspect ratio one dimension is recomputed from the other:
//!    height drives for `Top`/`Bottom`, width for `Left`/`Right`, and for
//!    corners whichever dimension changed more since the gesture started.
//! 5. The minimum size is re-applied, scaling both sides when a ratio is
//!    locked.
//! 6. Dragged edges close to a container edge snap onto it, then the
//!    rectangle is fitted inside the container.
//!
//! When snapping and a locked ratio disagree, the ratio wins: a snap that
//! would force the dependent side outside the container (or under the
//! minimum) is dropped and the regular fit applies instead.

use serde::{Deserialize, Serialize};

use super::{Point, Rect, Size};
use crate::params::CropAspectRatio;

/// Smallest crop dimension in view units.
pub const DEFAULT_MIN_CROP_SIZE: f64 = 50.0;

/// Distance in view units within which a dragged edge snaps to the container.
pub const DEFAULT_SNAP_THRESHOLD: f64 = 10.0;

/// The nine grab points of the crop overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CropHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
    /// Moves the whole rectangle without resizing it.
    Center,
}

/// Which edge of an axis a handle drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AxisDrag {
    /// Left or top edge moves, the far edge is the anchor.
    Min,
    /// Right or bottom edge moves, the near edge is the anchor.
    Max,
    /// Neither edge is dragged; the axis stays centred on the start rect.
    Fixed,
}

impl CropHandle {
    pub const ALL: [CropHandle; 9] = [
        CropHandle::TopLeft,
        CropHandle::TopRight,
        CropHandle::BottomLeft,
        CropHandle::BottomRight,
        CropHandle::Top,
        CropHandle::Bottom,
        CropHandle::Left,
        CropHandle::Right,
        CropHandle::Center,
    ];

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            CropHandle::TopLeft | CropHandle::TopRight | CropHandle::BottomLeft | CropHandle::BottomRight
        )
    }

    pub fn is_edge(self) -> bool {
        matches!(
            self,
            CropHandle::Top | CropHandle::Bottom | CropHandle::Left | CropHandle::Right
        )
    }

    fn horizontal(self) -> AxisDrag {
        match self {
            CropHandle::TopLeft | CropHandle::BottomLeft | CropHandle::Left => AxisDrag::Min,
            CropHandle::TopRight | CropHandle::BottomRight | CropHandle::Right => AxisDrag::Max,
            CropHandle::Top | CropHandle::Bottom | CropHandle::Center => AxisDrag::Fixed,
        }
    }

    fn vertical(self) -> AxisDrag {
        match self {
            CropHandle::TopLeft | CropHandle::TopRight | CropHandle::Top => AxisDrag::Min,
            CropHandle::BottomLeft | CropHandle::BottomRight | CropHandle::Bottom => AxisDrag::Max,
            CropHandle::Left | CropHandle::Right | CropHandle::Center => AxisDrag::Fixed,
        }
    }

    /// The point of `start` that stays fixed while this handle is dragged.
    ///
    /// Corners anchor on the opposite corner, edges on the midpoint of the
    /// opposite edge, and `Center` on the start origin.
    pub fn anchor(self, start: &Rect) -> Point {
        if self == CropHandle::Center {
            return start.origin();
        }
        let x = match self.horizontal() {
            AxisDrag::Min => start.max_x(),
            AxisDrag::Max => start.min_x(),
            AxisDrag::Fixed => start.mid_x(),
        };
        let y = match self.vertical() {
            AxisDrag::Min => start.max_y(),
            AxisDrag::Max => start.min_y(),
            AxisDrag::Fixed => start.mid_y(),
        };
        Point::new(x, y)
    }
}

/// Per-gesture state: created on the first move event, dropped on release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropDragSession {
    start_rect: Rect,
    handle: CropHandle,
}

impl CropDragSession {
    pub fn begin(handle: CropHandle, start_rect: Rect) -> Self {
        Self { start_rect, handle }
    }

    pub fn handle(&self) -> CropHandle {
        self.handle
    }

    pub fn start_rect(&self) -> Rect {
        self.start_rect
    }

    /// Next rectangle for the cumulative `translation` since the gesture began.
    pub fn update(&self, translation: Point, constraints: &CropConstraints) -> Rect {
        update_crop_rect(self, translation, constraints)
    }
}

/// Limits applied to every candidate rectangle, all in view space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropConstraints {
    /// Area the crop must stay inside, usually the on-screen image frame.
    pub container: Rect,
    pub min_size: f64,
    /// Edges strictly closer than this to a container edge snap onto it.
    pub snap_threshold: f64,
    pub aspect_ratio: CropAspectRatio,
    /// Size of the image being cropped, used to resolve
    /// [`CropAspectRatio::Original`].
    pub source_size: Size,
}

impl CropConstraints {
    /// Constraints for a container at the origin with default limits and a
    /// free aspect ratio.
    pub fn new(container: Size) -> Self {
        Self {
            container: Rect::from_size(container),
            min_size: DEFAULT_MIN_CROP_SIZE,
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
            aspect_ratio: CropAspectRatio::Free,
            source_size: container,
        }
    }

    pub fn with_container(mut self, container: Rect) -> Self {
        self.container = container;
        self
    }

    pub fn with_min_size(mut self, min_size: f64) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn with_snap_threshold(mut self, snap_threshold: f64) -> Self {
        self.snap_threshold = snap_threshold;
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: CropAspectRatio, source_size: Size) -> Self {
        self.aspect_ratio = aspect_ratio;
        self.source_size = source_size;
        self
    }

    /// Minimum width and height, never larger than the container itself.
    fn floor(&self) -> Size {
        let min = if self.min_size.is_finite() {
            self.min_size.max(0.0)
        } else {
            0.0
        };
        Size::new(min.min(self.container.width), min.min(self.container.height))
    }

    fn threshold(&self) -> f64 {
        if self.snap_threshold.is_finite() {
            self.snap_threshold.max(0.0)
        } else {
            0.0
        }
    }
}

/// Compute the constrained crop rectangle for a drag.
///
/// The result always lies inside `constraints.container` and is at least
/// `min_size` on each side (capped at the container size). A degenerate
/// container yields [`Rect::ZERO`].
pub fn update_crop_rect(
    session: &CropDragSession,
    translation: Point,
    constraints: &CropConstraints,
) -> Rect {
    let container = constraints.container;
    if !container.is_finite() || container.size().is_degenerate() {
        return Rect::ZERO;
    }

    let translation = Point::new(finite_or_zero(translation.x), finite_or_zero(translation.y));
    let ratio = constraints.aspect_ratio.resolve(constraints.source_size);
    let floor = constraints.floor();

    let candidate = match session.handle {
        CropHandle::Center => move_rect(&session.start_rect, translation, constraints),
        handle => resize_rect(&session.start_rect, handle, translation, ratio, constraints),
    };
    let result = settle(candidate, ratio, &container, floor);

    tracing::trace!(
        handle = ?session.handle,
        dx = translation.x,
        dy = translation.y,
        x = result.x,
        y = result.y,
        width = result.width,
        height = result.height,
        "crop rect updated"
    );

    result
}

/// `Center` handle: translate, snap whole-rect to nearby container edges.
fn move_rect(start: &Rect, translation: Point, constraints: &CropConstraints) -> Rect {
    let container = &constraints.container;
    let threshold = constraints.threshold();
    let mut rect = Rect::new(
        start.x + translation.x,
        start.y + translation.y,
        start.width,
        start.height,
    );

    if (rect.min_x() - container.min_x()).abs() < threshold {
        rect.x = container.min_x();
    }
    if (rect.min_y() - container.min_y()).abs() < threshold {
        rect.y = container.min_y();
    }
    if (rect.max_x() - container.max_x()).abs() < threshold {
        rect.x = container.max_x() - rect.width;
    }
    if (rect.max_y() - container.max_y()).abs() < threshold {
        rect.y = container.max_y() - rect.height;
    }

    rect
}

fn resize_rect(
    start: &Rect,
    handle: CropHandle,
    translation: Point,
    ratio: Option<f64>,
    constraints: &CropConstraints,
) -> Rect {
    let h_axis = handle.horizontal();
    let v_axis = handle.vertical();
    let floor = constraints.floor();
    let container = &constraints.container;

    // Raw resize: only the dragged edges follow the pointer.
    let mut width = match h_axis {
        AxisDrag::Min => start.width - translation.x,
        AxisDrag::Max => start.width + translation.x,
        AxisDrag::Fixed => start.width,
    };
    let mut height = match v_axis {
        AxisDrag::Min => start.height - translation.y,
        AxisDrag::Max => start.height + translation.y,
        AxisDrag::Fixed => start.height,
    };

    width = width.max(floor.width);
    height = height.max(floor.height);

    if let Some(r) = ratio {
        if handle.is_corner() {
            let width_change = (width - start.width).abs();
            let height_change = (height - start.height).abs();
            if width_change > height_change {
                height = width / r;
            } else {
                width = height * r;
            }
        } else if v_axis == AxisDrag::Fixed {
            height = width / r;
        } else {
            width = height * r;
        }
        (width, height) = grow_to_floor(width, height, floor);
    } else {
        width = width.max(floor.width);
        height = height.max(floor.height);
    }

    // Magnetic snap of the dragged edges.
    let threshold = constraints.threshold();
    let snapped_w = snap_extent(
        (start.min_x(), start.max_x()),
        width,
        h_axis,
        (container.min_x(), container.max_x()),
        threshold,
    );
    let snapped_h = snap_extent(
        (start.min_y(), start.max_y()),
        height,
        v_axis,
        (container.min_y(), container.max_y()),
        threshold,
    );

    match ratio {
        None => {
            width = snapped_w.unwrap_or(width);
            height = snapped_h.unwrap_or(height);
        }
        Some(r) => {
            let by_width = snapped_w.map(|w| (w, w / r));
            let by_height = snapped_h.map(|h| (h * r, h));
            let accepted = [by_width, by_height].into_iter().flatten().find(|&(w, h)| {
                w >= floor.width
                    && h >= floor.height
                    && fits(start, w, h, handle, container)
            });
            if let Some((w, h)) = accepted {
                width = w;
                height = h;
            }
        }
    }

    // Fit inside the container without moving the anchor.
    let avail_w = available_extent((start.min_x(), start.max_x()), h_axis, (container.min_x(), container.max_x()));
    let avail_h = available_extent((start.min_y(), start.max_y()), v_axis, (container.min_y(), container.max_y()));
    match ratio {
        None => {
            width = width.min(avail_w);
            height = height.min(avail_h);
        }
        Some(_) => {
            let scale = shrink_factor(width, height, avail_w, avail_h);
            width *= scale;
            height *= scale;
        }
    }

    place(start, width, height, handle)
}

/// Position a `width` x `height` rect so the handle's anchor stays put.
///
/// Only meaningful for resize handles; `Center` moves instead.
fn place(start: &Rect, width: f64, height: f64, handle: CropHandle) -> Rect {
    let anchor = handle.anchor(start);
    let x = match handle.horizontal() {
        AxisDrag::Min => anchor.x - width,
        AxisDrag::Max => anchor.x,
        AxisDrag::Fixed => anchor.x - width / 2.0,
    };
    let y = match handle.vertical() {
        AxisDrag::Min => anchor.y - height,
        AxisDrag::Max => anchor.y,
        AxisDrag::Fixed => anchor.y - height / 2.0,
    };
    Rect::new(x, y, width, height)
}

fn fits(start: &Rect, width: f64, height: f64, handle: CropHandle, container: &Rect) -> bool {
    container.contains_rect(&place(start, width, height, handle))
}

/// Extent that puts the dragged edge exactly on the container edge, if the
/// dragged edge is within `threshold` of it.
fn snap_extent(
    (start_min, start_max): (f64, f64),
    extent: f64,
    axis: AxisDrag,
    (container_min, container_max): (f64, f64),
    threshold: f64,
) -> Option<f64> {
    match axis {
        AxisDrag::Min => {
            let edge = start_max - extent;
            ((edge - container_min).abs() < threshold).then_some(start_max - container_min)
        }
        AxisDrag::Max => {
            let edge = start_min + extent;
            ((edge - container_max).abs() < threshold).then_some(container_max - start_min)
        }
        AxisDrag::Fixed => None,
    }
}

/// Room between the anchor and the container edge in the drag direction.
fn available_extent(
    (start_min, start_max): (f64, f64),
    axis: AxisDrag,
    (container_min, container_max): (f64, f64),
) -> f64 {
    let room = match axis {
        AxisDrag::Min => start_max - container_min,
        AxisDrag::Max => container_max - start_min,
        AxisDrag::Fixed => {
            let mid = (start_min + start_max) / 2.0;
            2.0 * (mid - container_min).min(container_max - mid)
        }
    };
    room.max(0.0)
}

/// Uniform factor (at most 1) that makes `width` x `height` fit the limits.
fn shrink_factor(width: f64, height: f64, max_w: f64, max_h: f64) -> f64 {
    let mut scale: f64 = 1.0;
    if width > max_w && width > 0.0 {
        scale = scale.min(max_w / width);
    }
    if height > max_h && height > 0.0 {
        scale = scale.min(max_h / height);
    }
    scale
}

/// Scale both sides up so neither is below the floor, keeping their ratio.
fn grow_to_floor(width: f64, height: f64, floor: Size) -> (f64, f64) {
    if width <= 0.0 || height <= 0.0 {
        return (width.max(floor.width), height.max(floor.height));
    }
    let grow = (floor.width / width).max(floor.height / height).max(1.0);
    (width * grow, height * grow)
}

/// Final pass guaranteeing the bounds and minimum-size invariants.
///
/// A no-op for any rect the handle logic already fitted. Otherwise the size
/// is brought within the container (keeping a locked ratio where the
/// container allows) and the origin is moved inside.
fn settle(rect: Rect, ratio: Option<f64>, container: &Rect, floor: Size) -> Rect {
    let (mut width, mut height) = (finite_or_zero(rect.width), finite_or_zero(rect.height));

    if ratio.is_some() {
        (width, height) = grow_to_floor(width, height, floor);
        let scale = shrink_factor(width, height, container.width, container.height);
        width *= scale;
        height *= scale;
    }

    let sized = Rect::new(finite_or_zero(rect.x), finite_or_zero(rect.y), width, height);
    sized.clamped_into(container, floor)
}

#[inline]
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const CONTAINER: Size = Size {
        width: 800.0,
        height: 600.0,
    };

    fn handle_strategy() -> impl Strategy<Value = CropHandle> {
        prop::sample::select(CropHandle::ALL.to_vec())
    }

    fn corner_strategy() -> impl Strategy<Value = CropHandle> {
        prop::sample::select(vec![
            CropHandle::TopLeft,
            CropHandle::TopRight,
            CropHandle::BottomLeft,
            CropHandle::BottomRight,
        ])
    }

    /// Start rectangles already satisfying the invariants.
    fn start_strategy() -> impl Strategy<Value = Rect> {
        (50.0f64..=800.0, 50.0f64..=600.0).prop_flat_map(|(w, h)| {
            (0.0f64..=(800.0 - w), 0.0f64..=(600.0 - h)).prop_map(move |(x, y)| Rect::new(x, y, w, h))
        })
    }

    fn translations() -> impl Strategy<Value = Vec<(f64, f64)>> {
        prop::collection::vec((-1200.0f64..=1200.0, -1200.0f64..=1200.0), 1..12)
    }

    fn aspect_strategy() -> impl Strategy<Value = CropAspectRatio> {
        prop_oneof![
            Just(CropAspectRatio::Free),
            Just(CropAspectRatio::Original),
            Just(CropAspectRatio::Custom { width: 16.0, height: 9.0 }),
            Just(CropAspectRatio::Custom { width: 1.0, height: 1.0 }),
            Just(CropAspectRatio::Custom { width: 2.0, height: 3.0 }),
        ]
    }

    proptest! {
        /// Property: no drag sequence on any handle goes under the floor.
        #[test]
        fn prop_minimum_size(
            handle in handle_strategy(),
            start in start_strategy(),
            moves in translations(),
            aspect in aspect_strategy(),
        ) {
            let c = CropConstraints::new(CONTAINER).with_aspect_ratio(aspect, Size::new(3000.0, 2000.0));
            let mut rect = start;
            for (dx, dy) in moves {
                rect = CropDragSession::begin(handle, rect).update(Point::new(dx, dy), &c);
                prop_assert!(rect.width >= DEFAULT_MIN_CROP_SIZE - 1e-9, "{:?}", rect);
                prop_assert!(rect.height >= DEFAULT_MIN_CROP_SIZE - 1e-9, "{:?}", rect);
            }
        }

        /// Property: no drag sequence on any handle leaves the container.
        #[test]
        fn prop_bounds(
            handle in handle_strategy(),
            start in start_strategy(),
            moves in translations(),
            aspect in aspect_strategy(),
        ) {
            let c = CropConstraints::new(CONTAINER).with_aspect_ratio(aspect, Size::new(3000.0, 2000.0));
            let container = Rect::from_size(CONTAINER);
            let mut rect = start;
            for (dx, dy) in moves {
                rect = CropDragSession::begin(handle, rect).update(Point::new(dx, dy), &c);
                prop_assert!(container.contains_rect(&rect), "{:?}", rect);
            }
        }

        /// Property: a 16:9 lock holds after every corner drag.
        #[test]
        fn prop_aspect_lock_on_corners(
            handle in corner_strategy(),
            start in start_strategy(),
            moves in translations(),
        ) {
            let c = CropConstraints::new(CONTAINER)
                .with_aspect_ratio(CropAspectRatio::Custom { width: 16.0, height: 9.0 }, Size::ZERO);
            let session = CropDragSession::begin(handle, start);
            for (dx, dy) in moves {
                let rect = session.update(Point::new(dx, dy), &c);
                prop_assert!((rect.width / rect.height - 16.0 / 9.0).abs() < 1e-3, "{:?}", rect);
            }
        }

        /// Property: only the cumulative translation matters, not the path.
        #[test]
        fn prop_path_independent(
            handle in handle_strategy(),
            start in start_strategy(),
            moves in translations(),
        ) {
            let c = CropConstraints::new(CONTAINER);
            let session = CropDragSession::begin(handle, start);
            let (dx, dy) = moves.iter().fold((0.0, 0.0), |(ax, ay), (x, y)| (ax + x, ay + y));
            // Intermediate updates do not influence the final one.
            for (x, y) in &moves {
                let _ = session.update(Point::new(*x, *y), &c);
            }
            let direct = CropDragSession::begin(handle, start).update(Point::new(dx, dy), &c);
            prop_assert_eq!(session.update(Point::new(dx, dy), &c), direct);
        }

        /// Property: resize handles never move their anchor when the free
        /// rect fits without snapping.
        #[test]
        fn prop_corner_anchor_fixed_free(
            start in start_strategy(),
            dx in -30.0f64..=30.0,
            dy in -30.0f64..=30.0,
        ) {
            let c = CropConstraints::new(CONTAINER).with_snap_threshold(0.0);
            let rect = CropDragSession::begin(CropHandle::BottomRight, start).update(Point::new(dx, dy), &c);
            prop_assert!((rect.x - start.x).abs() < 1e-9);
            prop_assert!((rect.y - start.y).abs() < 1e-9);
        }
    }
}
