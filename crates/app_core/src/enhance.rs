//! Brightness / contrast / sharpness enhancement
//!
//! Each enhancement blends the image with a degenerate version of itself:
//! `out = degenerate + (pixel - degenerate) * factor`. A factor of 1.0 is the
//! identity, 0.0 yields the degenerate image, values above 1.0 extrapolate.
//!
//! | enhancement | degenerate image                     |
//! |-------------|--------------------------------------|
//! | brightness  | black                                |
//! | contrast    | solid gray at the mean luminance     |
//! | sharpness   | 3x3 smoothed copy (borders untouched)|
//!
//! Alpha channels are never modified.

use image::{DynamicImage, ImageBuffer, Pixel};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const BRIGHTNESS_RANGE: RangeInclusive<f32> = 0.5..=1.5;
pub const CONTRAST_RANGE: RangeInclusive<f32> = 0.5..=1.5;
pub const SHARPNESS_RANGE: RangeInclusive<f32> = 0.0..=2.0;

/// Smoothing kernel used as the sharpness baseline (weights sum to 13)
const SMOOTH_KERNEL: [u32; 9] = [1, 1, 1, 1, 5, 1, 1, 1, 1];
const SMOOTH_WEIGHT: u32 = 13;

/// Combined enhancement, applied brightness -> contrast -> sharpness
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Enhancement {
    pub brightness: f32,
    pub contrast: f32,
    pub sharpness: f32,
}

impl Default for Enhancement {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            sharpness: 1.0,
        }
    }
}

impl Enhancement {
    /// Build an enhancement with each factor clamped to its slider range
    pub fn new(brightness: f32, contrast: f32, sharpness: f32) -> Self {
        Self {
            brightness: clamp_to(brightness, &BRIGHTNESS_RANGE),
            contrast: clamp_to(contrast, &CONTRAST_RANGE),
            sharpness: clamp_to(sharpness, &SHARPNESS_RANGE),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.brightness == 1.0 && self.contrast == 1.0 && self.sharpness == 1.0
    }

    /// Apply all three factors in order; identity factors are skipped
    pub fn apply(&self, image: &DynamicImage) -> DynamicImage {
        let mut out = image.clone();
        if self.brightness != 1.0 {
            out = brightness(&out, self.brightness);
        }
        if self.contrast != 1.0 {
            out = contrast(&out, self.contrast);
        }
        if self.sharpness != 1.0 {
            out = sharpness(&out, self.sharpness);
        }
        out
    }
}

fn clamp_to(value: f32, range: &RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        return 1.0;
    }
    value.clamp(*range.start(), *range.end())
}

/// Scale every color sample by `factor`
pub fn brightness(image: &DynamicImage, factor: f32) -> DynamicImage {
    map_samples(image, |layout, samples| {
        blend_in_place(layout, samples, factor, |_| 0);
    })
}

/// Push color samples away from (or toward) the mean luminance
pub fn contrast(image: &DynamicImage, factor: f32) -> DynamicImage {
    let mean = mean_luminance(image);
    map_samples(image, |layout, samples| {
        blend_in_place(layout, samples, factor, |_| mean);
    })
}

/// Blend against a smoothed copy; factors above 1.0 sharpen
pub fn sharpness(image: &DynamicImage, factor: f32) -> DynamicImage {
    map_samples(image, |layout, samples| {
        let smoothed = smooth(layout, samples);
        blend_in_place(layout, samples, factor, |i| smoothed[i]);
    })
}

/// Mean luminance rounded to the nearest level
fn mean_luminance(image: &DynamicImage) -> u8 {
    let luma = image.to_luma8();
    let count = luma.as_raw().len() as u64;
    if count == 0 {
        return 0;
    }
    let total: u64 = luma.as_raw().iter().map(|&v| v as u64).sum();
    ((total as f64 / count as f64) + 0.5).floor().min(255.0) as u8
}

#[derive(Debug, Clone, Copy)]
struct SampleLayout {
    width: usize,
    height: usize,
    channels: usize,
    has_alpha: bool,
}

impl SampleLayout {
    fn is_alpha(&self, index: usize) -> bool {
        self.has_alpha && index % self.channels == self.channels - 1
    }
}

/// Run an in-place sample operation on an 8-bit copy of `image`.
///
/// Higher bit depths are reduced to 8-bit RGB(A) first.
fn map_samples<F>(image: &DynamicImage, op: F) -> DynamicImage
where
    F: Fn(SampleLayout, &mut [u8]),
{
    match image {
        DynamicImage::ImageLuma8(buf) => DynamicImage::ImageLuma8(map_buffer(buf, false, op)),
        DynamicImage::ImageLumaA8(buf) => DynamicImage::ImageLumaA8(map_buffer(buf, true, op)),
        DynamicImage::ImageRgb8(buf) => DynamicImage::ImageRgb8(map_buffer(buf, false, op)),
        DynamicImage::ImageRgba8(buf) => DynamicImage::ImageRgba8(map_buffer(buf, true, op)),
        other if other.color().has_alpha() => {
            DynamicImage::ImageRgba8(map_buffer(&other.to_rgba8(), true, op))
        }
        other => DynamicImage::ImageRgb8(map_buffer(&other.to_rgb8(), false, op)),
    }
}

fn map_buffer<P, F>(buf: &ImageBuffer<P, Vec<u8>>, has_alpha: bool, op: F) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
    F: Fn(SampleLayout, &mut [u8]),
{
    let layout = SampleLayout {
        width: buf.width() as usize,
        height: buf.height() as usize,
        channels: P::CHANNEL_COUNT as usize,
        has_alpha,
    };
    let mut out = buf.clone();
    {
        let samples: &mut [u8] = &mut out;
        op(layout, samples);
    }
    out
}

fn blend_in_place<D>(layout: SampleLayout, samples: &mut [u8], factor: f32, degenerate: D)
where
    D: Fn(usize) -> u8,
{
    for (i, sample) in samples.iter_mut().enumerate() {
        if layout.is_alpha(i) {
            continue;
        }
        let base = degenerate(i) as f32;
        let value = base + (*sample as f32 - base) * factor;
        *sample = value.round().clamp(0.0, 255.0) as u8;
    }
}

/// 3x3 smoothing; the outermost rows and columns keep their original values
fn smooth(layout: SampleLayout, samples: &[u8]) -> Vec<u8> {
    let mut out = samples.to_vec();
    let SampleLayout { width, height, channels, .. } = layout;
    if width < 3 || height < 3 {
        return out;
    }

    let stride = width * channels;
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            for c in 0..channels {
                let index = y * stride + x * channels + c;
                if layout.is_alpha(index) {
                    continue;
                }
                let mut acc = 0u32;
                for (k, weight) in SMOOTH_KERNEL.iter().enumerate() {
                    let ny = y + k / 3 - 1;
                    let nx = x + k % 3 - 1;
                    acc += samples[ny * stride + nx * channels + c] as u32 * weight;
                }
                out[index] = ((acc + SMOOTH_WEIGHT / 2) / SMOOTH_WEIGHT) as u8;
            }
        }
    }
    out
}
