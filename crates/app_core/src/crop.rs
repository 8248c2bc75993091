//! Crop session: drag a rectangle on the canvas, crop the working image on release

use crate::edit::{CropBox, Edit};
use crate::pipeline::EditPipeline;
use crate::transform::{to_image_space, Point};
use crate::viewport::Viewport;

/// Axis-aligned rectangle in canvas space, `min <= max` per axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub min: Point,
    pub max: Point,
}

impl CanvasRect {
    /// Bounding box of two corners in any order
    pub fn from_corners(a: Point, b: Point) -> Self {
        let (min, max) = Point::min_max(a, b);
        Self { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CropOutcome {
    /// The working image was cropped to this image-space box
    Applied(CropBox),
    /// The session ended without an edit (empty or off-image rectangle)
    Skipped,
    /// No session was active
    NotActive,
}

/// Crop interaction state machine: `Idle -> Active -> Idle`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CropSession {
    #[default]
    Idle,
    Active { anchor: Point, rect: CanvasRect },
}

impl CropSession {
    pub fn is_active(&self) -> bool {
        matches!(self, CropSession::Active { .. })
    }

    /// Rectangle to draw as the selection marker
    pub fn rect(&self) -> Option<CanvasRect> {
        match self {
            CropSession::Active { rect, .. } => Some(*rect),
            CropSession::Idle => None,
        }
    }

    /// Start a drag at `cursor`, replacing any drag in progress.
    ///
    /// Does nothing without a working image.
    pub fn begin(&mut self, cursor: Point, has_image: bool) -> bool {
        if !has_image {
            return false;
        }
        *self = CropSession::Active {
            anchor: cursor,
            rect: CanvasRect::from_corners(cursor, cursor),
        };
        true
    }

    /// Stretch the selection to `cursor`
    pub fn update(&mut self, cursor: Point) -> bool {
        match self {
            CropSession::Active { anchor, rect } => {
                *rect = CanvasRect::from_corners(*anchor, cursor);
                true
            }
            CropSession::Idle => false,
        }
    }

    /// Finish the drag at `cursor` and crop the working image.
    ///
    /// Always leaves the session idle.
    pub fn commit(&mut self, cursor: Point, viewport: &Viewport, pipeline: &mut EditPipeline) -> CropOutcome {
        let CropSession::Active { anchor, .. } = std::mem::take(self) else {
            return CropOutcome::NotActive;
        };

        let rect = CanvasRect::from_corners(anchor, cursor);
        let Some((width, height)) = pipeline.working_size() else {
            return CropOutcome::Skipped;
        };
        let Some(ratio) = viewport.displayed_to_actual(width) else {
            return CropOutcome::Skipped;
        };

        let crop = map_to_image(rect, viewport.offset(), ratio, (width, height));
        if !crop.has_area() {
            tracing::debug!("Crop selection {:?} is empty after clamping", rect);
            return CropOutcome::Skipped;
        }

        if pipeline.apply(&Edit::Crop(crop)) {
            CropOutcome::Applied(crop)
        } else {
            CropOutcome::Skipped
        }
    }

    /// Abandon the selection without editing
    pub fn cancel(&mut self) {
        *self = CropSession::Idle;
    }
}

/// Map a canvas rectangle into a clamped image-space crop box
pub fn map_to_image(rect: CanvasRect, offset: Point, displayed_to_actual: f64, image_size: (u32, u32)) -> CropBox {
    let top_left = to_image_space(rect.min, offset, displayed_to_actual);
    let bottom_right = to_image_space(rect.max, offset, displayed_to_actual);
    CropBox::new(top_left.x, top_left.y, bottom_right.x, bottom_right.y).clamped(image_size.0, image_size.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Size;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::path::Path;

    const CANVAS: Size = Size { width: 1000.0, height: 1000.0 };

    /// 100x200 image fitted into a 1000x1000 canvas: zoom 5, offset (250, 0)
    fn setup() -> (Viewport, EditPipeline) {
        let mut bytes = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(100, 200))
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        let mut pipeline = EditPipeline::new();
        pipeline.load(bytes.get_ref(), Path::new("t.png")).unwrap();

        let mut viewport = Viewport::default();
        viewport.fit_to_window((100, 200), CANVAS);
        (viewport, pipeline)
    }

    #[test]
    fn test_begin_requires_image() {
        let mut session = CropSession::default();
        assert!(!session.begin(Point::new(1.0, 1.0), false));
        assert!(!session.is_active());
    }

    #[test]
    fn test_update_normalizes_rect() {
        let mut session = CropSession::default();
        session.begin(Point::new(300.0, 300.0), true);
        session.update(Point::new(100.0, 400.0));
        let rect = session.rect().unwrap();
        assert_eq!(rect.min, Point::new(100.0, 300.0));
        assert_eq!(rect.max, Point::new(300.0, 400.0));
        assert_eq!((rect.width(), rect.height()), (200.0, 100.0));
    }

    #[test]
    fn test_update_when_idle_is_rejected() {
        let mut session = CropSession::default();
        assert!(!session.update(Point::new(5.0, 5.0)));
        assert_eq!(session, CropSession::Idle);
    }

    #[test]
    fn test_new_begin_replaces_previous_drag() {
        let mut session = CropSession::default();
        session.begin(Point::new(10.0, 10.0), true);
        session.update(Point::new(90.0, 90.0));
        session.begin(Point::new(50.0, 50.0), true);
        let rect = session.rect().unwrap();
        assert_eq!(rect.min, Point::new(50.0, 50.0));
        assert_eq!(rect.max, Point::new(50.0, 50.0));
    }

    #[test]
    fn test_commit_maps_through_zoom_and_offset() {
        let (viewport, mut pipeline) = setup();
        let mut session = CropSession::default();

        // Drag from bottom-right to top-left; canvas (300,100)-(500,600)
        session.begin(Point::new(500.0, 600.0), true);
        let outcome = session.commit(Point::new(300.0, 100.0), &viewport, &mut pipeline);

        assert_eq!(outcome, CropOutcome::Applied(CropBox::new(10.0, 20.0, 50.0, 120.0)));
        assert_eq!(pipeline.working_size(), Some((40, 100)));
        assert!(!session.is_active());
    }

    #[test]
    fn test_commit_clamps_partially_outside() {
        let (viewport, mut pipeline) = setup();
        let mut session = CropSession::default();

        session.begin(Point::new(0.0, 900.0), true);
        let outcome = session.commit(Point::new(300.0, 1200.0), &viewport, &mut pipeline);

        assert_eq!(outcome, CropOutcome::Applied(CropBox::new(0.0, 180.0, 10.0, 200.0)));
        assert_eq!(pipeline.working_size(), Some((10, 20)));
    }

    #[test]
    fn test_degenerate_commit_is_noop() {
        let (viewport, mut pipeline) = setup();
        let before = pipeline.working().unwrap().as_bytes().to_vec();
        let mut session = CropSession::default();

        session.begin(Point::new(400.0, 400.0), true);
        let outcome = session.commit(Point::new(400.0, 400.0), &viewport, &mut pipeline);

        assert_eq!(outcome, CropOutcome::Skipped);
        assert_eq!(pipeline.working().unwrap().as_bytes(), before.as_slice());
        assert!(!session.is_active());
    }

    #[test]
    fn test_commit_outside_image_is_noop() {
        let (viewport, mut pipeline) = setup();
        let mut session = CropSession::default();

        // Entirely left of the bitmap, which starts at x = 250
        session.begin(Point::new(10.0, 10.0), true);
        let outcome = session.commit(Point::new(200.0, 500.0), &viewport, &mut pipeline);

        assert_eq!(outcome, CropOutcome::Skipped);
        assert_eq!(pipeline.working_size(), Some((100, 200)));
    }

    #[test]
    fn test_commit_without_session() {
        let (viewport, mut pipeline) = setup();
        let mut session = CropSession::default();
        let outcome = session.commit(Point::new(1.0, 1.0), &viewport, &mut pipeline);
        assert_eq!(outcome, CropOutcome::NotActive);
    }

    #[test]
    fn test_cancel_discards_selection() {
        let (_, mut pipeline) = setup();
        let mut session = CropSession::default();
        session.begin(Point::new(300.0, 100.0), pipeline.has_image());
        session.update(Point::new(500.0, 600.0));
        session.cancel();
        assert_eq!(session.rect(), None);
        assert_eq!(pipeline.working_size(), Some((100, 200)));
    }
}
