//! Application state management

use crate::crop::{CanvasRect, CropOutcome, CropSession};
use crate::dimensions::{parse_dimensions, Dimensions};
use crate::edit::Edit;
use crate::image_loader;
use crate::navigation::ImageSet;
use crate::pipeline::EditPipeline;
use crate::standardize::{self, BatchSummary};
use crate::transform::{Point, Size};
use crate::viewport::{FitOutcome, PanDrag, RenderedBitmap, Viewport, ZoomDirection};
use crate::{AppConfig, AppError};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "PixelVista";

/// What a shell should offer: everything needs a displayed image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Empty,
    Browsing,
}

/// Transient pointer state, reset on navigation
#[derive(Debug, Default)]
struct Interaction {
    crop: CropSession,
    crop_armed: bool,
    pan: Option<PanDrag>,
}

/// Main application state
pub struct AppState {
    config: AppConfig,
    image_set: Option<ImageSet>,
    pipeline: EditPipeline,
    viewport: Viewport,
    canvas: Size,
    /// Canvas updates seen while waiting to fit; `None` when no fit is pending
    pending_fit: Option<u32>,
    rendered: Option<RenderedBitmap>,
    interaction: Interaction,
    quit_requested: bool,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: AppConfig) -> Self {
        let canvas = Size::new(config.general.canvas_width, config.general.canvas_height);
        let viewport = Viewport::new(config.viewer.min_canvas_extent);
        Self {
            config,
            image_set: None,
            pipeline: EditPipeline::new(),
            viewport,
            canvas,
            pending_fit: None,
            rendered: None,
            interaction: Interaction::default(),
            quit_requested: false,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn image_set(&self) -> Option<&ImageSet> {
        self.image_set.as_ref()
    }

    pub fn pipeline(&self) -> &EditPipeline {
        &self.pipeline
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn canvas_size(&self) -> Size {
        self.canvas
    }

    pub fn view_state(&self) -> ViewState {
        if self.pipeline.has_image() {
            ViewState::Browsing
        } else {
            ViewState::Empty
        }
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.image_set.as_ref().and_then(ImageSet::current_path)
    }

    // ========================================
    // Navigation
    // ========================================

    /// Open a folder, or the folder of a file with that file selected.
    ///
    /// A file that no longer exists still opens its folder, at the first image.
    pub fn open_path(&mut self, path: &Path) -> Result<(), AppError> {
        let sort_by = self.config.navigation.sort_by;
        let set = if path.is_dir() {
            ImageSet::open_folder(path, sort_by)?
        } else {
            ImageSet::open_file(path, sort_by)?
        };

        self.image_set = Some(set);
        self.load_current()
    }

    /// Advance to the next image (wrapping). Returns `false` when empty.
    pub fn next_image(&mut self) -> Result<bool, AppError> {
        let moved = self.image_set.as_mut().is_some_and(ImageSet::next);
        if moved {
            self.load_current()?;
        }
        Ok(moved)
    }

    /// Step back to the previous image (wrapping). Returns `false` when empty.
    pub fn previous_image(&mut self) -> Result<bool, AppError> {
        let moved = self.image_set.as_mut().is_some_and(ImageSet::previous);
        if moved {
            self.load_current()?;
        }
        Ok(moved)
    }

    /// Decode the selected image. Entries that fail to decode are dropped
    /// from the set and the next one is tried; an exhausted set leaves the
    /// Empty state.
    fn load_current(&mut self) -> Result<(), AppError> {
        self.interaction = Interaction::default();

        loop {
            let Some(path) = self.current_path().map(Path::to_path_buf) else {
                tracing::info!("No image to display");
                self.pipeline.clear();
                self.viewport.reset();
                self.rendered = None;
                self.pending_fit = None;
                return Ok(());
            };

            match self.pipeline.load_path(&path) {
                Ok(()) => {
                    tracing::info!("Loaded {:?}", path);
                    self.refit();
                    return Ok(());
                }
                Err(e) if e.is_recoverable() => {
                    tracing::warn!("{}; skipping", e);
                    if let Some(set) = self.image_set.as_mut() {
                        set.remove_current_and_advance();
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    // ========================================
    // Viewport
    // ========================================

    /// Fit the working image to the canvas, deferring while the canvas is
    /// too small to measure
    fn refit(&mut self) {
        self.end_crop();
        self.interaction.pan = None;
        self.rendered = None;

        let Some(image_size) = self.pipeline.working_size() else {
            return;
        };
        match self.viewport.fit_to_window(image_size, self.canvas) {
            FitOutcome::Fitted => self.pending_fit = None,
            FitOutcome::Deferred => {
                self.viewport.reset();
                self.pending_fit = Some(0);
            }
        }
    }

    /// Record a new canvas size and retry a deferred fit
    pub fn set_canvas_size(&mut self, canvas: Size) {
        self.canvas = canvas;

        let Some(attempts) = self.pending_fit else {
            return;
        };
        if attempts >= self.config.viewer.fit_retry_limit {
            tracing::warn!("Canvas never reached a usable size; giving up on fit-to-window");
            self.pending_fit = None;
            return;
        }
        let Some(image_size) = self.pipeline.working_size() else {
            self.pending_fit = None;
            return;
        };

        match self.viewport.fit_to_window(image_size, canvas) {
            FitOutcome::Fitted => {
                self.pending_fit = None;
                self.rendered = None;
            }
            FitOutcome::Deferred => self.pending_fit = Some(attempts + 1),
        }
    }

    pub fn fit_to_window(&mut self) {
        if self.pipeline.has_image() {
            self.refit();
        }
    }

    /// Show the image at 100%, centered
    pub fn original_size(&mut self) -> bool {
        self.change_view(|viewport, image_size, canvas| viewport.set_zoom(1.0, image_size, canvas))
    }

    /// Toolbar zoom: additive step, centered
    pub fn zoom_step(&mut self, direction: ZoomDirection) -> bool {
        self.change_view(|viewport, image_size, canvas| viewport.zoom_by_step(direction, image_size, canvas))
    }

    /// Mouse-wheel zoom, anchored at the cursor when one is given
    pub fn zoom_wheel(&mut self, direction: ZoomDirection, anchor: Option<Point>) -> bool {
        self.change_view(|viewport, image_size, canvas| {
            viewport.zoom_by_factor(direction, anchor, image_size, canvas)
        })
    }

    fn change_view<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut Viewport, (u32, u32), Size) -> bool,
    {
        let Some(image_size) = self.pipeline.working_size() else {
            return false;
        };
        let changed = f(&mut self.viewport, image_size, self.canvas);
        if changed {
            self.end_crop();
            self.rendered = None;
            tracing::debug!("Zoom {:.3}, offset {:?}", self.viewport.zoom(), self.viewport.offset());
        }
        changed
    }

    /// The working image as displayed, resampled on first use after a change
    pub fn rendered(&mut self) -> Option<&RenderedBitmap> {
        if self.rendered.is_none() {
            let working = self.pipeline.working()?;
            self.rendered = self.viewport.render(working);
        }
        self.rendered.as_ref()
    }

    // ========================================
    // Pointer: pan, or crop while armed
    // ========================================

    pub fn pointer_press(&mut self, cursor: Point) {
        if !self.pipeline.has_image() {
            return;
        }
        if self.interaction.crop_armed {
            self.interaction.crop.begin(cursor, true);
        } else {
            self.interaction.pan = Some(PanDrag::begin(cursor));
        }
    }

    pub fn pointer_move(&mut self, cursor: Point) {
        if self.interaction.crop.update(cursor) {
            return;
        }
        if let Some(drag) = self.interaction.pan.as_mut() {
            let delta = drag.drag_to(cursor);
            self.pan_by(delta);
        }
    }

    /// Finish a gesture. Returns the crop outcome when a crop drag ended.
    pub fn pointer_release(&mut self, cursor: Point) -> Option<CropOutcome> {
        if self.interaction.crop.is_active() {
            let outcome = self.interaction.crop.commit(cursor, &self.viewport, &mut self.pipeline);
            self.interaction.crop_armed = false;
            if let CropOutcome::Applied(crop) = outcome {
                tracing::info!("Cropped to {:?}", crop);
                self.refit();
            }
            return Some(outcome);
        }

        if let Some(mut drag) = self.interaction.pan.take() {
            let delta = drag.drag_to(cursor);
            self.pan_by(delta);
        }
        None
    }

    fn pan_by(&mut self, delta: Point) {
        if delta == Point::ZERO {
            return;
        }
        self.viewport.pan(delta);
        // Panning moves the bitmap without resampling it
        if let Some(rendered) = self.rendered.as_mut() {
            rendered.offset = self.viewport.offset();
        }
    }

    /// Enter crop mode: the next pointer drag selects a crop rectangle
    pub fn arm_crop(&mut self) -> bool {
        if !self.pipeline.has_image() {
            return false;
        }
        self.interaction.crop_armed = true;
        true
    }

    pub fn crop_armed(&self) -> bool {
        self.interaction.crop_armed
    }

    /// Selection marker to draw, in canvas space
    pub fn crop_rect(&self) -> Option<CanvasRect> {
        self.interaction.crop.rect()
    }

    fn end_crop(&mut self) {
        self.interaction.crop.cancel();
        self.interaction.crop_armed = false;
    }

    /// Escape: leave crop mode if it is on, otherwise ask to quit
    pub fn cancel(&mut self) {
        if self.interaction.crop_armed || self.interaction.crop.is_active() {
            tracing::debug!("Crop cancelled");
            self.end_crop();
        } else {
            self.request_quit();
        }
    }

    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    // ========================================
    // Edits
    // ========================================

    /// Apply an edit to the working image and re-fit on success
    pub fn apply_edit(&mut self, edit: &Edit) -> bool {
        if self.pipeline.apply(edit) {
            self.refit();
            true
        } else {
            false
        }
    }

    /// Discard all edits since the image was loaded (or last saved in place)
    pub fn revert(&mut self) -> bool {
        if self.pipeline.revert() {
            tracing::info!("Reverted to original");
            self.refit();
            true
        } else {
            false
        }
    }

    /// Stretch-resize to user-entered `WIDTHxHEIGHT`
    pub fn resize(&mut self, input: &str) -> Result<bool, AppError> {
        let dims = parse_dimensions(input)?;
        Ok(self.apply_edit(&Edit::Resize(dims)))
    }

    /// Letterbox the working image; `None` uses the configured default size
    pub fn standardize_current(&mut self, input: Option<&str>) -> Result<bool, AppError> {
        let dims = self.standardize_dimensions(input)?;
        Ok(self.apply_edit(&Edit::Standardize(dims)))
    }

    /// Letterbox every batch-eligible image of the open folder into its
    /// output subfolder. Leaves the displayed image untouched.
    pub fn standardize_folder(&mut self, input: Option<&str>) -> Result<BatchSummary, AppError> {
        let dims = self.standardize_dimensions(input)?;
        let set = self.image_set.as_ref().ok_or(AppError::NoDocument)?;
        standardize::standardize_folder(set.folder(), dims, &self.config.standardize.output_subdir)
    }

    fn standardize_dimensions(&self, input: Option<&str>) -> Result<Dimensions, AppError> {
        match input {
            Some(input) => parse_dimensions(input),
            None => self.config.standardize.default_dimensions(),
        }
    }

    // ========================================
    // Saving
    // ========================================

    /// Overwrite the current file; the saved image becomes the revert target
    pub fn save(&mut self) -> Result<PathBuf, AppError> {
        let path = self.current_path().ok_or(AppError::NoDocument)?.to_path_buf();
        let working = self.pipeline.working().ok_or(AppError::NoDocument)?;
        image_loader::save_image(working, &path)?;
        self.pipeline.commit_saved();
        Ok(path)
    }

    /// Write the working image to a new path (`.jpg` appended when the
    /// path has no extension)
    pub fn save_as(&mut self, target: &Path) -> Result<PathBuf, AppError> {
        let path = image_loader::resolve_save_as_path(target)?;
        let working = self.pipeline.working().ok_or(AppError::NoDocument)?;
        image_loader::save_image(working, &path)?;
        Ok(path)
    }

    // ========================================
    // Display text
    // ========================================

    fn current_file_name(&self) -> Option<String> {
        self.current_path()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().to_string())
    }

    /// e.g. `photo.jpg  [3 of 12]  Zoom: 1.50x (150%)`
    pub fn status_line(&self) -> String {
        let position = self.image_set.as_ref().and_then(ImageSet::position);
        match (self.view_state(), self.current_file_name(), position) {
            (ViewState::Browsing, Some(name), Some((index, total))) => {
                let zoom = self.viewport.zoom();
                format!(
                    "{}  [{} of {}]  Zoom: {:.2}x ({:.0}%)",
                    name,
                    index,
                    total,
                    zoom,
                    zoom * 100.0
                )
            }
            _ => "No image loaded.".to_string(),
        }
    }

    pub fn window_title(&self) -> String {
        match (self.view_state(), self.current_file_name()) {
            (ViewState::Browsing, Some(name)) => format!("{} - {}", name, APP_NAME),
            _ => APP_NAME.to_string(),
        }
    }
}
