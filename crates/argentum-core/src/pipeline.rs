//! The edit pipeline: source buffer + parameters -> output buffer.
//!
//! # Stage Order
//!
//! 1. Rotate (quarter turns)
//! 2. Crop, in the rotated image's pixel space
//! 3. Exposure
//! 4. Color controls (brightness, contrast, saturation in one pass)
//!
//! Every run starts from the untouched source. A stage whose parameters are
//! neutral is skipped entirely, so default parameters hand back the source
//! `Arc` itself without copying a byte. A stage that fails is logged and
//! replaced by its input; the remaining stages still run.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::adjustments::{ColorControls, ColorFilter, StandardColorFilter};
use crate::decode::DecodedImage;
use crate::geometry::Rect;
use crate::params::EditParameters;
use crate::transform::{crop_to_rect, rotate_quarter_turns};

/// One step of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stage {
    Rotate { quarter_turns: u8 },
    Crop { rect: Rect },
    Exposure { ev: f32 },
    ColorControls(ColorControls),
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Rotate { .. } => "rotate",
            Stage::Crop { .. } => "crop",
            Stage::Exposure { .. } => "exposure",
            Stage::ColorControls(_) => "color_controls",
        }
    }
}

/// The non-neutral stages for `params`, in execution order.
pub fn plan(params: &EditParameters) -> Vec<Stage> {
    let mut stages = Vec::with_capacity(4);

    let quarter_turns = params.quarter_turns();
    if quarter_turns != 0 {
        stages.push(Stage::Rotate { quarter_turns });
    }

    if let Some(rect) = params.crop_rect {
        stages.push(Stage::Crop { rect });
    }

    let ev = params.effective_exposure() as f32;
    if ev != 0.0 {
        stages.push(Stage::Exposure { ev });
    }

    let controls = params.color_controls();
    if !controls.is_default() {
        stages.push(Stage::ColorControls(controls));
    }

    stages
}

/// Source of [`CancelToken`]s. Issuing a new token cancels every earlier one.
#[derive(Debug, Clone, Default)]
pub struct CancelSource {
    latest: Arc<AtomicU64>,
}

impl CancelSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for `generation`, cancelling all tokens issued before it.
    pub fn issue(&self, generation: u64) -> CancelToken {
        self.latest.store(generation, Ordering::Release);
        CancelToken {
            generation,
            latest: Arc::clone(&self.latest),
        }
    }

    /// Cancel every outstanding token.
    pub fn cancel_all(&self) {
        self.latest.fetch_add(1, Ordering::AcqRel);
    }
}

/// Cooperative cancellation flag shared between the session and a worker.
#[derive(Debug, Clone)]
pub struct CancelToken {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl CancelToken {
    /// A token nothing can cancel.
    pub fn never() -> Self {
        Self {
            generation: 0,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        self.latest.load(Ordering::Acquire) != self.generation
    }
}

/// Runs [`plan`] against a source image with a [`ColorFilter`] backend.
#[derive(Debug, Clone, Default)]
pub struct EditPipeline<F = StandardColorFilter> {
    filter: F,
}

impl EditPipeline<StandardColorFilter> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: ColorFilter> EditPipeline<F> {
    pub fn with_filter(filter: F) -> Self {
        Self { filter }
    }

    /// Process `source` with `params`.
    ///
    /// Returns `source` itself (same `Arc`) when every stage is neutral.
    pub fn apply(&self, source: &Arc<DecodedImage>, params: &EditParameters) -> Arc<DecodedImage> {
        let mut current = Arc::clone(source);
        for stage in plan(params) {
            current = self.run_stage(current, &stage);
        }
        current
    }

    /// Like [`apply`](Self::apply) but checks `token` before every stage and
    /// returns `None` as soon as it is cancelled.
    pub fn apply_cancellable(
        &self,
        source: &Arc<DecodedImage>,
        params: &EditParameters,
        token: &CancelToken,
    ) -> Option<Arc<DecodedImage>> {
        let mut current = Arc::clone(source);
        for stage in plan(params) {
            if token.is_cancelled() {
                tracing::debug!(
                    generation = token.generation(),
                    stage = stage.name(),
                    "recompute cancelled"
                );
                return None;
            }
            current = self.run_stage(current, &stage);
        }

        if token.is_cancelled() {
            return None;
        }
        Some(current)
    }

    fn run_stage(&self, input: Arc<DecodedImage>, stage: &Stage) -> Arc<DecodedImage> {
        let result = match stage {
            Stage::Rotate { quarter_turns } => {
                rotate_quarter_turns(&input, *quarter_turns).map_err(|e| e.to_string())
            }
            Stage::Crop { rect } => crop_to_rect(&input, rect).map_err(|e| e.to_string()),
            Stage::Exposure { ev } => self
                .filter
                .adjust_exposure(&input, *ev)
                .map_err(|e| e.to_string()),
            Stage::ColorControls(controls) => self
                .filter
                .adjust_color_controls(&input, controls)
                .map_err(|e| e.to_string()),
        };

        match result {
            Ok(output) => {
                tracing::debug!(
                    stage = stage.name(),
                    width = output.width,
                    height = output.height,
                    "pipeline stage applied"
                );
                Arc::new(output)
            }
            Err(error) => {
                tracing::warn!(stage = stage.name(), %error, "pipeline stage failed, keeping input");
                input
            }
        }
    }
}
