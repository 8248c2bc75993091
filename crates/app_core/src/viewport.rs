//! Viewport controller: zoom level, pan offset, fit-to-window

use crate::edit::RESAMPLE_FILTER;
use crate::transform::{centered_offset, scaled_size, zoom_anchored_at, Point, Size};
use image::DynamicImage;

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

/// Mouse-wheel zoom factors
pub const WHEEL_ZOOM_IN: f64 = 1.1;
pub const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Additive zoom step for the toolbar buttons
pub const BUTTON_ZOOM_STEP: f64 = 0.1;

/// Canvas extent below which the canvas is considered not laid out yet
pub const DEFAULT_MIN_CANVAS_EXTENT: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitOutcome {
    Fitted,
    /// Canvas too small to fit against; retry once it has been laid out
    Deferred,
}

/// The working image resampled for display, with its canvas placement
#[derive(Debug, Clone)]
pub struct RenderedBitmap {
    pub image: DynamicImage,
    pub offset: Point,
}

/// Zoom and placement of the rendered bitmap on the canvas
#[derive(Debug, Clone)]
pub struct Viewport {
    zoom: f64,
    offset: Point,
    bitmap_size: Option<(u32, u32)>,
    min_canvas_extent: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CANVAS_EXTENT)
    }
}

impl Viewport {
    pub fn new(min_canvas_extent: f64) -> Self {
        Self {
            zoom: 1.0,
            offset: Point::ZERO,
            bitmap_size: None,
            min_canvas_extent,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Pixel size of the current rendered bitmap
    pub fn bitmap_size(&self) -> Option<(u32, u32)> {
        self.bitmap_size
    }

    /// `actual / displayed` width ratio for mapping canvas points into the image
    pub fn displayed_to_actual(&self, image_width: u32) -> Option<f64> {
        let (bitmap_width, _) = self.bitmap_size?;
        if bitmap_width == 0 {
            return None;
        }
        Some(image_width as f64 / bitmap_width as f64)
    }

    /// Forget the current placement (no image displayed)
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.offset = Point::ZERO;
        self.bitmap_size = None;
    }

    /// Scale the image to the largest size that fits the canvas and center it
    pub fn fit_to_window(&mut self, image_size: (u32, u32), canvas: Size) -> FitOutcome {
        if canvas.width < self.min_canvas_extent || canvas.height < self.min_canvas_extent {
            tracing::debug!("Canvas {:?} not laid out yet, deferring fit", canvas);
            return FitOutcome::Deferred;
        }

        let (iw, ih) = (image_size.0.max(1) as f64, image_size.1.max(1) as f64);
        let ratio = (canvas.width / iw).min(canvas.height / ih);
        let zoom = ratio.clamp(MIN_ZOOM, MAX_ZOOM);

        let bitmap = scaled_size(image_size, zoom).unwrap_or_else(|| {
            (
                ((iw * zoom).round() as u32).max(1),
                ((ih * zoom).round() as u32).max(1),
            )
        });

        self.zoom = zoom;
        self.bitmap_size = Some(bitmap);
        self.offset = centered_offset(canvas, Size::from_pixels(bitmap));
        FitOutcome::Fitted
    }

    /// Set an absolute zoom level (clamped) and re-center.
    ///
    /// Returns `false` when the resulting bitmap would be empty.
    pub fn set_zoom(&mut self, level: f64, image_size: (u32, u32), canvas: Size) -> bool {
        let zoom = level.clamp(MIN_ZOOM, MAX_ZOOM);
        self.apply_zoom(zoom, None, image_size, canvas)
    }

    /// Multiplicative (mouse-wheel) zoom, optionally anchored at a cursor.
    ///
    /// Returns `false` when the clamped level is unchanged.
    pub fn zoom_by_factor(
        &mut self,
        direction: ZoomDirection,
        anchor: Option<Point>,
        image_size: (u32, u32),
        canvas: Size,
    ) -> bool {
        let factor = match direction {
            ZoomDirection::In => WHEEL_ZOOM_IN,
            ZoomDirection::Out => WHEEL_ZOOM_OUT,
        };
        let zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if zoom == self.zoom {
            return false;
        }
        self.apply_zoom(zoom, anchor, image_size, canvas)
    }

    /// Additive (toolbar button) zoom, always centered.
    ///
    /// Returns `false` when the clamped level is unchanged.
    pub fn zoom_by_step(&mut self, direction: ZoomDirection, image_size: (u32, u32), canvas: Size) -> bool {
        let step = match direction {
            ZoomDirection::In => BUTTON_ZOOM_STEP,
            ZoomDirection::Out => -BUTTON_ZOOM_STEP,
        };
        let zoom = (self.zoom + step).clamp(MIN_ZOOM, MAX_ZOOM);
        if zoom == self.zoom {
            return false;
        }
        self.apply_zoom(zoom, None, image_size, canvas)
    }

    fn apply_zoom(&mut self, zoom: f64, anchor: Option<Point>, image_size: (u32, u32), canvas: Size) -> bool {
        let Some(bitmap) = scaled_size(image_size, zoom) else {
            tracing::debug!("Zoom {:.3} rejected: empty bitmap for {:?}", zoom, image_size);
            return false;
        };

        self.offset = match anchor {
            Some(cursor) if self.bitmap_size.is_some() => {
                zoom_anchored_at(cursor, self.offset, self.zoom, zoom)
            }
            _ => centered_offset(canvas, Size::from_pixels(bitmap)),
        };
        self.zoom = zoom;
        self.bitmap_size = Some(bitmap);
        true
    }

    /// Translate the bitmap by a canvas-space delta
    pub fn pan(&mut self, delta: Point) {
        self.offset += delta;
    }

    /// Resample `working` to the current bitmap size
    pub fn render(&self, working: &DynamicImage) -> Option<RenderedBitmap> {
        let (w, h) = self.bitmap_size?;
        let image = if (w, h) == (working.width(), working.height()) {
            working.clone()
        } else {
            working.resize_exact(w, h, RESAMPLE_FILTER)
        };
        Some(RenderedBitmap {
            image,
            offset: self.offset,
        })
    }
}

/// Tracks a pan drag gesture and converts pointer moves into deltas
#[derive(Debug, Clone, Copy)]
pub struct PanDrag {
    last: Point,
}

impl PanDrag {
    pub fn begin(cursor: Point) -> Self {
        Self { last: cursor }
    }

    /// Delta since the previous pointer position
    pub fn drag_to(&mut self, cursor: Point) -> Point {
        let delta = cursor - self.last;
        self.last = cursor;
        delta
    }
}
