//! Editing session: one open document, its parameters and the latest
//! pipeline output.
//!
//! # Recompute Flow
//!
//! Every parameter change marks the session dirty. Once the debounce period
//! has passed without further changes, [`EditSession::poll`] hands out a
//! [`RecomputeTicket`] carrying a snapshot of everything the pipeline needs.
//! The ticket can run on any thread; its [`RecomputeResult`] goes back
//! through [`EditSession::accept`], which applies it only if it belongs to
//! the most recently started recompute. Single-threaded hosts call
//! [`EditSession::tick`] instead, which does all three steps inline.
//!
//! # Crop Mode
//!
//! While the crop tool is active the preview is rendered without the crop so
//! the overlay can be dragged over the whole frame. Exports always use the
//! committed crop.

mod document;
mod scheduler;
#[cfg(not(target_arch = "wasm32"))]
mod worker;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::adjustments::{ColorFilter, StandardColorFilter};
use crate::codec::Codec;
use crate::config::EditorConfig;
use crate::decode::{render_preview, DecodeError, DecodedImage, ResizeError};
use crate::encode::EncodeError;
use crate::geometry::{
    image_frame, CropConstraints, CropDragSession, CropHandle, Point, Rect, Size, ViewportTransform,
};
use crate::params::{
    CropAspectRatio, CropMode, EditParameters, BRIGHTNESS_RANGE, CONTRAST_RANGE, EXPOSURE_RANGE,
    JPEG_QUALITY_RANGE, SATURATION_RANGE,
};
use crate::pipeline::{CancelToken, EditPipeline};

pub use document::{Document, DEFAULT_EXPORT_STEM};
pub use scheduler::RecomputeScheduler;
#[cfg(not(target_arch = "wasm32"))]
pub use worker::PreviewWorker;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("No document is open")]
    NoDocument,

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("Failed to render preview: {0}")]
    Preview(#[from] ResizeError),

    #[error("Failed to write {path}: {message}")]
    Io { path: PathBuf, message: String },
}

/// Everything one pipeline run needs, detached from the session.
#[derive(Debug, Clone)]
pub struct RecomputeTicket {
    source: Arc<DecodedImage>,
    params: EditParameters,
    token: CancelToken,
}

impl RecomputeTicket {
    pub fn generation(&self) -> u64 {
        self.token.generation()
    }

    pub fn params(&self) -> &EditParameters {
        &self.params
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Run the pipeline. Returns `None` if the ticket was superseded before
    /// it finished.
    pub fn run<F: ColorFilter>(&self, pipeline: &EditPipeline<F>) -> Option<RecomputeResult> {
        let output = pipeline.apply_cancellable(&self.source, &self.params, &self.token)?;
        Some(RecomputeResult {
            generation: self.generation(),
            output,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RecomputeResult {
    generation: u64,
    output: Arc<DecodedImage>,
}

impl RecomputeResult {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn output(&self) -> &Arc<DecodedImage> {
        &self.output
    }
}

pub struct EditSession<F = StandardColorFilter> {
    config: EditorConfig,
    params: EditParameters,
    document: Option<Document>,
    output: Option<Arc<DecodedImage>>,
    output_generation: u64,
    scheduler: RecomputeScheduler,
    pipeline: EditPipeline<F>,
}

impl EditSession<StandardColorFilter> {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_pipeline(config, EditPipeline::new())
    }
}

impl Default for EditSession<StandardColorFilter> {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl<F: ColorFilter> EditSession<F> {
    pub fn with_pipeline(config: EditorConfig, pipeline: EditPipeline<F>) -> Self {
        let config = config.sanitized();
        Self {
            scheduler: RecomputeScheduler::new(config.debounce()),
            config,
            params: EditParameters::default(),
            document: None,
            output: None,
            output_generation: 0,
            pipeline,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn params(&self) -> &EditParameters {
        &self.params
    }

    pub fn pipeline(&self) -> &EditPipeline<F> {
        &self.pipeline
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    /// Latest accepted pipeline output at full resolution.
    pub fn output(&self) -> Option<&Arc<DecodedImage>> {
        self.output.as_ref()
    }

    /// Size of the source after rotation: the space crop rects live in.
    pub fn image_size(&self) -> Option<Size> {
        self.document
            .as_ref()
            .map(|doc| self.params.rotated_size(doc.size()))
    }

    // ===== Document lifecycle =====

    /// Open an image file. On failure the session is left as it was.
    pub fn open_file(&mut self, codec: &dyn Codec, path: &Path) -> Result<(), EditorError> {
        let image = codec.decode(path)?;
        self.open_image(image, Some(path.to_path_buf()));
        Ok(())
    }

    /// Open an in-memory JPEG or TIFF. On failure the session is left as it was.
    pub fn open_bytes(&mut self, codec: &dyn Codec, bytes: &[u8]) -> Result<(), EditorError> {
        let image = codec.decode_bytes(bytes)?;
        self.open_image(image, None);
        Ok(())
    }

    /// Replace the current document with an already decoded image.
    ///
    /// Parameters are reset: rotation and crop of the previous image mean
    /// nothing for the new one.
    pub fn open_image(&mut self, image: DecodedImage, path: Option<PathBuf>) {
        tracing::info!(
            width = image.width,
            height = image.height,
            path = ?path,
            "document opened"
        );

        let document = Document::new(image, path);
        self.output = Some(Arc::clone(document.source()));
        self.document = Some(document);
        self.params.reset();
        self.scheduler.clear();
        self.output_generation = self.scheduler.latest_generation();
    }

    pub fn close(&mut self) {
        if self.document.take().is_some() {
            tracing::info!("document closed");
        }
        self.output = None;
        self.params.reset();
        self.scheduler.clear();
        self.output_generation = self.scheduler.latest_generation();
    }

    /// Restore every parameter to its default.
    pub fn reset(&mut self, now: Duration) {
        self.params.reset();
        self.mark_dirty(now);
    }

    // ===== Adjustments =====

    pub fn set_exposure(&mut self, value: f64, now: Duration) {
        self.params.exposure = value.clamp(*EXPOSURE_RANGE.start(), *EXPOSURE_RANGE.end());
        self.mark_dirty(now);
    }

    pub fn set_contrast(&mut self, value: f64, now: Duration) {
        self.params.contrast = value.clamp(*CONTRAST_RANGE.start(), *CONTRAST_RANGE.end());
        self.mark_dirty(now);
    }

    pub fn set_saturation(&mut self, value: f64, now: Duration) {
        self.params.saturation = value.clamp(*SATURATION_RANGE.start(), *SATURATION_RANGE.end());
        self.mark_dirty(now);
    }

    pub fn set_brightness(&mut self, value: f64, now: Duration) {
        self.params.brightness = value.clamp(*BRIGHTNESS_RANGE.start(), *BRIGHTNESS_RANGE.end());
        self.mark_dirty(now);
    }

    /// Export quality only; the preview does not depend on it.
    pub fn set_jpeg_quality(&mut self, value: f64) {
        self.params.jpeg_quality = value.clamp(*JPEG_QUALITY_RANGE.start(), *JPEG_QUALITY_RANGE.end());
    }

    /// Replace all parameters at once, e.g. when restoring saved edits.
    pub fn set_params(&mut self, params: EditParameters, now: Duration) {
        self.params = params;
        self.mark_dirty(now);
    }

    // ===== Rotation =====

    /// Quarter turn clockwise. An existing crop rect turns with the image.
    pub fn rotate_clockwise(&mut self, now: Duration) {
        let before = self.image_size();
        self.params.rotate_clockwise();
        if let Some(size) = before {
            self.map_crop_rects(|rect| rect.rotated_cw_in(size));
        }
        self.mark_dirty(now);
    }

    /// Quarter turn counter-clockwise. An existing crop rect turns with the
    /// image.
    pub fn rotate_counter_clockwise(&mut self, now: Duration) {
        let before = self.image_size();
        self.params.rotate_counter_clockwise();
        if let Some(size) = before {
            self.map_crop_rects(|rect| rect.rotated_ccw_in(size));
        }
        self.mark_dirty(now);
    }

    fn map_crop_rects(&mut self, map: impl Fn(Rect) -> Rect) {
        self.params.crop_rect = self.params.crop_rect.map(&map);
        if let CropMode::Active { previous } = &mut self.params.crop_mode {
            *previous = previous.map(&map);
        }
    }

    // ===== Crop =====

    /// Enter crop mode. Does nothing without a document.
    pub fn begin_crop(&mut self, now: Duration) {
        let Some(image) = self.image_size() else {
            return;
        };
        if self.params.is_crop_active() {
            return;
        }
        self.params.begin_crop(image, self.config.initial_crop_fraction);
        self.mark_dirty(now);
    }

    /// Leave crop mode keeping the edited rect.
    pub fn apply_crop(&mut self, now: Duration) -> bool {
        let applied = self.params.apply_crop();
        if applied {
            tracing::debug!(rect = ?self.params.crop_rect, "crop applied");
            self.mark_dirty(now);
        }
        applied
    }

    /// Leave crop mode restoring the rect from before it was entered.
    pub fn cancel_crop(&mut self, now: Duration) -> bool {
        let cancelled = self.params.cancel_crop();
        if cancelled {
            self.mark_dirty(now);
        }
        cancelled
    }

    /// Remove the crop entirely.
    pub fn clear_crop(&mut self, now: Duration) {
        self.params.clear_crop();
        self.crop_changed(now);
    }

    pub fn set_crop_aspect_ratio(&mut self, ratio: CropAspectRatio, now: Duration) {
        let Some(image) = self.image_size() else {
            self.params.crop_aspect_ratio = ratio;
            return;
        };
        self.params.set_crop_aspect_ratio(ratio, image);
        self.crop_changed(now);
    }

    /// Store a crop rect given in image pixels of the rotated image.
    pub fn set_crop_rect(&mut self, rect: Rect, now: Duration) {
        let Some(image) = self.image_size() else {
            return;
        };
        self.params.set_crop_rect(rect, image, 1.0);
        self.crop_changed(now);
    }

    /// Where the whole image is drawn inside a view of size `view`.
    pub fn crop_frame(&self, view: Size) -> Option<Rect> {
        let image = self.image_size()?;
        ViewportTransform::new(image, view).map(|_| image_frame(image, view))
    }

    /// The crop rect mapped into a view of size `view`.
    pub fn crop_rect_in_view(&self, view: Size) -> Option<Rect> {
        let transform = ViewportTransform::new(self.image_size()?, view)?;
        self.params.crop_rect.map(|rect| transform.to_view(rect))
    }

    /// Constraints for dragging the crop overlay in a view of size `view`.
    pub fn crop_constraints(&self, view: Size) -> Option<CropConstraints> {
        let image = self.image_size()?;
        let frame = self.crop_frame(view)?;
        Some(
            CropConstraints::new(frame.size())
                .with_container(frame)
                .with_min_size(self.config.min_crop_size)
                .with_snap_threshold(self.config.snap_threshold)
                .with_aspect_ratio(self.params.crop_aspect_ratio, image),
        )
    }

    /// Start dragging `handle`. Only possible while crop mode is active.
    pub fn begin_crop_drag(&self, handle: CropHandle, view: Size) -> Option<CropDragSession> {
        if !self.params.is_crop_active() {
            return None;
        }
        let start = self.crop_rect_in_view(view)?;
        Some(CropDragSession::begin(handle, start))
    }

    /// Apply the cumulative `translation` of a drag and store the result.
    ///
    /// Returns the new view-space rect for the overlay.
    pub fn update_crop_drag(
        &mut self,
        drag: &CropDragSession,
        translation: Point,
        view: Size,
        now: Duration,
    ) -> Option<Rect> {
        let image = self.image_size()?;
        let transform = ViewportTransform::new(image, view)?;
        let constraints = self.crop_constraints(view)?;

        let view_rect = drag.update(translation, &constraints);
        let min_size = transform.length_to_image(constraints.min_size);
        self.params
            .set_crop_rect(transform.to_image(view_rect), image, min_size);
        self.crop_changed(now);

        Some(view_rect)
    }

    /// Readout for the current crop, e.g. `"16:9"`.
    pub fn crop_aspect_label(&self) -> Option<String> {
        self.params.crop_rect.map(|rect| rect.aspect_label())
    }

    fn crop_changed(&mut self, now: Duration) {
        // The preview ignores the crop while it is being edited.
        if !self.params.is_crop_active() {
            self.mark_dirty(now);
        }
    }

    // ===== Recompute =====

    fn mark_dirty(&mut self, now: Duration) {
        if self.document.is_some() {
            self.scheduler.mark_dirty(now);
        }
    }

    pub fn is_recompute_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Time until a pending recompute becomes due.
    pub fn time_until_recompute(&self, now: Duration) -> Option<Duration> {
        self.scheduler.time_until_due(now)
    }

    /// Parameters the preview is rendered with.
    pub fn preview_params(&self) -> EditParameters {
        let mut params = self.params.clone();
        if params.is_crop_active() {
            params.crop_rect = None;
        }
        params
    }

    /// Parameters an export is rendered with: an in-progress crop edit is
    /// not part of it.
    pub fn export_params(&self) -> EditParameters {
        let mut params = self.params.clone();
        if let CropMode::Active { previous } = params.crop_mode {
            params.crop_rect = previous;
            params.crop_mode = CropMode::Inactive;
        }
        params
    }

    /// Start a recompute if one is due.
    pub fn poll(&mut self, now: Duration) -> Option<RecomputeTicket> {
        let source = Arc::clone(self.document.as_ref()?.source());
        let token = self.scheduler.poll(now)?;
        Some(self.ticket(source, token))
    }

    /// Apply a finished recompute. Returns `false` for results that were
    /// superseded by a later change or recompute.
    pub fn accept(&mut self, result: RecomputeResult) -> bool {
        if self.document.is_none() || !self.scheduler.is_current(result.generation) {
            tracing::debug!(generation = result.generation, "discarding stale recompute");
            return false;
        }
        self.output = Some(result.output);
        self.output_generation = result.generation;
        true
    }

    /// Poll and, if due, run the recompute on the calling thread. Returns
    /// whether the output changed.
    pub fn tick(&mut self, now: Duration) -> bool {
        match self.poll(now) {
            Some(ticket) => match ticket.run(&self.pipeline) {
                Some(result) => self.accept(result),
                None => false,
            },
            None => false,
        }
    }

    /// Recompute immediately, ignoring the debounce.
    pub fn recompute(&mut self) -> Option<&Arc<DecodedImage>> {
        let source = Arc::clone(self.document.as_ref()?.source());
        let token = self.scheduler.flush();
        let ticket = self.ticket(source, token);
        if let Some(result) = ticket.run(&self.pipeline) {
            self.accept(result);
        }
        self.output.as_ref()
    }

    fn ticket(&self, source: Arc<DecodedImage>, token: CancelToken) -> RecomputeTicket {
        RecomputeTicket {
            source,
            params: self.preview_params(),
            token,
        }
    }

    fn is_output_current(&self) -> bool {
        !self.scheduler.is_pending() && self.output_generation == self.scheduler.latest_generation()
    }

    // ===== Output =====

    /// The current output downscaled for display.
    pub fn preview(&self) -> Result<Arc<DecodedImage>, EditorError> {
        let output = self.output.as_ref().ok_or(EditorError::NoDocument)?;
        Ok(render_preview(
            output,
            self.config.preview_max_edge,
            self.config.preview_filter,
        )?)
    }

    /// Render the committed edits at full resolution.
    pub fn render_export(&self) -> Result<Arc<DecodedImage>, EditorError> {
        let document = self.document.as_ref().ok_or(EditorError::NoDocument)?;

        if !self.params.is_crop_active() && self.is_output_current() {
            if let Some(output) = &self.output {
                return Ok(Arc::clone(output));
            }
        }
        Ok(self.pipeline.apply(document.source(), &self.export_params()))
    }

    /// Encode the committed edits as JPEG at the session's quality.
    pub fn export(&self, codec: &dyn Codec) -> Result<Vec<u8>, EditorError> {
        let image = self.render_export()?;
        Ok(codec.encode(&image, self.params.effective_jpeg_quality())?)
    }

    /// Encode and write to `path`.
    pub fn export_to(&self, codec: &dyn Codec, path: &Path) -> Result<(), EditorError> {
        let bytes = self.export(codec)?;
        std::fs::write(path, &bytes).map_err(|e| EditorError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "exported jpeg");
        Ok(())
    }

    /// Suggested export file name, derived from the source file.
    pub fn export_file_name(&self) -> Option<String> {
        self.document.as_ref().map(Document::export_file_name)
    }
}
