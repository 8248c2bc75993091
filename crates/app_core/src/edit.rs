//! Edit operations on the working image

use crate::dimensions::Dimensions;
use crate::enhance::Enhancement;
use crate::standardize;
use image::imageops::FilterType;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Resampling filter used for every resize, render and standardization
pub const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotateDirection {
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

/// Crop rectangle in image space (fractional pixels, right/bottom exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl CropBox {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self { left, top, right, bottom }
    }

    /// Clamp into `[0, width] x [0, height]`
    pub fn clamped(&self, width: u32, height: u32) -> Self {
        let (w, h) = (width as f64, height as f64);
        Self {
            left: self.left.clamp(0.0, w),
            top: self.top.clamp(0.0, h),
            right: self.right.clamp(0.0, w),
            bottom: self.bottom.clamp(0.0, h),
        }
    }

    pub fn has_area(&self) -> bool {
        self.right > self.left && self.bottom > self.top
    }

    /// Whole-pixel region `(x, y, width, height)` after clamping and rounding.
    ///
    /// `None` when the region is empty.
    pub fn to_pixel_region(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let clamped = self.clamped(width, height);
        if !clamped.has_area() {
            return None;
        }
        let left = clamped.left.round() as u32;
        let top = clamped.top.round() as u32;
        let right = clamped.right.round() as u32;
        let bottom = clamped.bottom.round() as u32;
        if right <= left || bottom <= top {
            return None;
        }
        Some((left, top, right - left, bottom - top))
    }
}

/// A single edit applied to the working image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Edit {
    Rotate(RotateDirection),
    Flip(FlipAxis),
    Grayscale,
    Enhance(Enhancement),
    /// Stretch to exact dimensions, aspect ratio not preserved
    Resize(Dimensions),
    Crop(CropBox),
    /// Letterbox onto a white canvas of the given size
    Standardize(Dimensions),
}

impl Edit {
    /// Produce the edited image, or `None` when the edit does not apply
    /// (an empty crop region).
    pub fn apply(&self, image: &DynamicImage) -> Option<DynamicImage> {
        match self {
            Edit::Rotate(RotateDirection::Clockwise) => Some(image.rotate90()),
            Edit::Rotate(RotateDirection::CounterClockwise) => Some(image.rotate270()),
            Edit::Flip(FlipAxis::Horizontal) => Some(image.fliph()),
            Edit::Flip(FlipAxis::Vertical) => Some(image.flipv()),
            Edit::Grayscale => Some(DynamicImage::ImageLuma8(image.to_luma8())),
            Edit::Enhance(enhancement) => Some(enhancement.apply(image)),
            Edit::Resize(dims) => Some(image.resize_exact(dims.width, dims.height, RESAMPLE_FILTER)),
            Edit::Crop(crop) => {
                let (x, y, w, h) = crop.to_pixel_region(image.width(), image.height())?;
                Some(image.crop_imm(x, y, w, h))
            }
            Edit::Standardize(target) => Some(standardize::standardize_image(image, *target)),
        }
    }

    /// Short label for logs and status messages
    pub fn name(&self) -> &'static str {
        match self {
            Edit::Rotate(RotateDirection::Clockwise) => "rotate right",
            Edit::Rotate(RotateDirection::CounterClockwise) => "rotate left",
            Edit::Flip(FlipAxis::Horizontal) => "flip horizontal",
            Edit::Flip(FlipAxis::Vertical) => "flip vertical",
            Edit::Grayscale => "grayscale",
            Edit::Enhance(_) => "adjust",
            Edit::Resize(_) => "resize",
            Edit::Crop(_) => "crop",
            Edit::Standardize(_) => "standardize",
        }
    }
}
