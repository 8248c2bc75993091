//! Canvas <-> image coordinate transforms
//!
//! Canvas space is the pixel grid of the drawing surface; image space is the
//! pixel grid of the working image. The rendered bitmap sits on the canvas
//! with its top-left corner at `offset`.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub};

/// A point (or displacement) in canvas or image space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise min / max of two corners
    pub fn min_max(a: Point, b: Point) -> (Point, Point) {
        (
            Point::new(a.x.min(b.x), a.y.min(b.y)),
            Point::new(a.x.max(b.x), a.y.max(b.y)),
        )
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// A width/height pair
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn from_pixels((width, height): (u32, u32)) -> Self {
        Self::new(width as f64, height as f64)
    }
}

/// Map a canvas point into image space.
///
/// `displayed_to_actual` is `actual_width / displayed_width` of the rendered bitmap.
pub fn to_image_space(canvas_point: Point, offset: Point, displayed_to_actual: f64) -> Point {
    (canvas_point - offset) * displayed_to_actual
}

/// Offset that keeps the image point under `cursor` fixed across a zoom change.
///
/// `old_zoom` and `new_zoom` must be positive.
pub fn zoom_anchored_at(cursor: Point, old_offset: Point, old_zoom: f64, new_zoom: f64) -> Point {
    cursor - (cursor - old_offset) * (new_zoom / old_zoom)
}

/// Offset that centers a bitmap on the canvas
pub fn centered_offset(canvas: Size, bitmap: Size) -> Point {
    Point::new(
        (canvas.width - bitmap.width) / 2.0,
        (canvas.height - bitmap.height) / 2.0,
    )
}

/// Pixel size of an image scaled by `factor`, rounded per axis.
///
/// Returns `None` when either axis would collapse below one pixel.
pub fn scaled_size((width, height): (u32, u32), factor: f64) -> Option<(u32, u32)> {
    let w = (width as f64 * factor).round();
    let h = (height as f64 * factor).round();
    if w < 1.0 || h < 1.0 || !w.is_finite() || !h.is_finite() {
        return None;
    }
    Some((w as u32, h as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    #[test]
    fn test_to_image_space() {
        // Bitmap drawn at (100, 50), shown at half size
        let p = to_image_space(Point::new(150.0, 80.0), Point::new(100.0, 50.0), 2.0);
        assert!(close(p, Point::new(100.0, 60.0)));
    }

    #[test]
    fn test_zoom_anchor_keeps_point_fixed() {
        let cursor = Point::new(320.0, 240.0);
        let old_offset = Point::new(40.0, -15.0);
        let (old_zoom, new_zoom) = (1.5, 1.65);

        let before = to_image_space(cursor, old_offset, 1.0 / old_zoom);
        let new_offset = zoom_anchored_at(cursor, old_offset, old_zoom, new_zoom);
        let after = to_image_space(cursor, new_offset, 1.0 / new_zoom);

        assert!(close(before, after));
    }

    #[test]
    fn test_zoom_anchor_at_offset_is_identity() {
        let offset = Point::new(12.0, 34.0);
        let new_offset = zoom_anchored_at(offset, offset, 1.0, 3.0);
        assert!(close(new_offset, offset));
    }

    #[test]
    fn test_centered_offset() {
        let offset = centered_offset(Size::new(1000.0, 1000.0), Size::new(500.0, 1000.0));
        assert!(close(offset, Point::new(250.0, 0.0)));

        // Bitmaps larger than the canvas get a negative offset
        let offset = centered_offset(Size::new(100.0, 100.0), Size::new(300.0, 100.0));
        assert!(close(offset, Point::new(-100.0, 0.0)));
    }

    #[test]
    fn test_scaled_size() {
        assert_eq!(scaled_size((100, 200), 5.0), Some((500, 1000)));
        assert_eq!(scaled_size((3, 3), 0.5), Some((2, 2)));
        assert_eq!(scaled_size((10, 1), 0.1), None);
        assert_eq!(scaled_size((10, 10), 0.0), None);
    }

    #[test]
    fn test_min_max() {
        let (lo, hi) = Point::min_max(Point::new(5.0, 1.0), Point::new(2.0, 9.0));
        assert_eq!(lo, Point::new(2.0, 1.0));
        assert_eq!(hi, Point::new(5.0, 9.0));
    }
}
