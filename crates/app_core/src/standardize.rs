//! Standardization: letterbox images onto a fixed-size white canvas

use crate::dimensions::Dimensions;
use crate::edit::RESAMPLE_FILTER;
use crate::image_loader;
use crate::AppError;
use app_fs::ListOptions;
use image::{imageops, DynamicImage, Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// Letterbox background
pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Default output folder, created inside the source folder
pub const DEFAULT_OUTPUT_SUBDIR: &str = "Standardized";

/// Where a resized image lands on the target canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterboxLayout {
    pub resized: (u32, u32),
    pub paste_at: (u32, u32),
}

/// Compute the aspect-preserving fit of `source` inside `target`
pub fn letterbox_layout((width, height): (u32, u32), target: Dimensions) -> LetterboxLayout {
    let (tw, th) = target.as_tuple();
    let ratio = (tw as f64 / width.max(1) as f64).min(th as f64 / height.max(1) as f64);

    let nw = ((width as f64 * ratio).round() as u32).clamp(1, tw);
    let nh = ((height as f64 * ratio).round() as u32).clamp(1, th);

    LetterboxLayout {
        resized: (nw, nh),
        paste_at: ((tw - nw) / 2, (th - nh) / 2),
    }
}

/// Resize `image` to fit inside `target` and center it on a white RGB canvas
pub fn standardize_image(image: &DynamicImage, target: Dimensions) -> DynamicImage {
    let layout = letterbox_layout((image.width(), image.height()), target);
    let rgb = image.to_rgb8();
    let resized = imageops::resize(&rgb, layout.resized.0, layout.resized.1, RESAMPLE_FILTER);

    let mut canvas = RgbImage::from_pixel(target.width, target.height, BACKGROUND);
    imageops::replace(
        &mut canvas,
        &resized,
        layout.paste_at.0 as i64,
        layout.paste_at.1 as i64,
    );
    DynamicImage::ImageRgb8(canvas)
}

/// Result of a folder standardization run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub output_dir: PathBuf,
}

/// Standardize every batch-eligible image in `source_folder`.
///
/// Outputs go to `source_folder/output_subdir/<file name>`. Files that fail
/// are logged and skipped; only the success count is reported.
pub fn standardize_folder(
    source_folder: &Path,
    target: Dimensions,
    output_subdir: &str,
) -> Result<BatchSummary, AppError> {
    if !source_folder.is_dir() {
        return Err(AppError::FolderNotFound(source_folder.to_path_buf()));
    }

    let entries = app_fs::list_directory(source_folder, &ListOptions::batch_images())?;

    let output_dir = source_folder.join(output_subdir);
    std::fs::create_dir_all(&output_dir)?;

    tracing::info!(
        "Standardizing {} files from {:?} to {} into {:?}",
        entries.len(),
        source_folder,
        target,
        output_dir
    );

    let mut processed = 0;
    for entry in &entries {
        match standardize_file(&entry.path, &output_dir.join(&entry.name), target) {
            Ok(()) => processed += 1,
            Err(e) => {
                let err = AppError::BatchItem {
                    file: entry.path.clone(),
                    message: e.to_string(),
                };
                tracing::warn!("{}", err);
            }
        }
    }

    tracing::info!("Standardized {} of {} files", processed, entries.len());
    Ok(BatchSummary { processed, output_dir })
}

fn standardize_file(source: &Path, destination: &Path, target: Dimensions) -> Result<(), AppError> {
    let image = image_loader::decode_file(source)?;
    let standardized = standardize_image(&image, target);
    image_loader::save_image(&standardized, destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};
    use tempfile::TempDir;

    fn dims(w: u32, h: u32) -> Dimensions {
        Dimensions::new(w, h).unwrap()
    }

    #[test]
    fn test_layout_wide_image() {
        let layout = letterbox_layout((400, 200), dims(900, 900));
        assert_eq!(layout.resized, (900, 450));
        assert_eq!(layout.paste_at, (0, 225));
    }

    #[test]
    fn test_layout_tall_image() {
        let layout = letterbox_layout((100, 300), dims(300, 200));
        assert_eq!(layout.resized, (67, 200));
        assert_eq!(layout.paste_at, (116, 0));
    }

    #[test]
    fn test_layout_extreme_aspect_keeps_one_pixel() {
        let layout = letterbox_layout((10_000, 1), dims(100, 100));
        assert_eq!(layout.resized, (100, 1));
        assert_eq!(layout.paste_at, (0, 49));
    }

    #[test]
    fn test_standardize_image_fills_background() {
        let src = DynamicImage::ImageRgba8(RgbaImage::from_pixel(400, 200, Rgba([10, 20, 30, 255])));
        let out = standardize_image(&src, dims(900, 900));

        assert_eq!(out.dimensions(), (900, 900));
        assert_eq!(out.color(), image::ColorType::Rgb8);
        let rgb = out.to_rgb8();
        assert_eq!(*rgb.get_pixel(450, 100), BACKGROUND);
        assert_eq!(*rgb.get_pixel(450, 800), BACKGROUND);
        assert_eq!(*rgb.get_pixel(450, 450), Rgb([10, 20, 30]));
    }

    #[test]
    fn test_standardize_folder_counts_successes() {
        let dir = TempDir::new().unwrap();
        RgbImage::from_pixel(40, 20, Rgb([200, 0, 0])).save(dir.path().join("wide.png")).unwrap();
        RgbImage::from_pixel(10, 30, Rgb([0, 200, 0])).save(dir.path().join("tall.bmp")).unwrap();
        std::fs::write(dir.path().join("broken.jpg"), b"not an image").unwrap();
        RgbImage::from_pixel(5, 5, Rgb([0, 0, 0])).save(dir.path().join("raw.ppm")).unwrap();

        let summary = standardize_folder(dir.path(), dims(50, 50), DEFAULT_OUTPUT_SUBDIR).unwrap();

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.output_dir, dir.path().join("Standardized"));
        for name in ["wide.png", "tall.bmp"] {
            let out = image::open(summary.output_dir.join(name)).unwrap();
            assert_eq!(out.dimensions(), (50, 50));
        }
        assert!(!summary.output_dir.join("broken.jpg").exists());
        assert!(!summary.output_dir.join("raw.ppm").exists());
    }

    #[test]
    fn test_standardize_missing_folder() {
        let dir = TempDir::new().unwrap();
        let result = standardize_folder(&dir.path().join("nope"), dims(10, 10), DEFAULT_OUTPUT_SUBDIR);
        assert!(matches!(result, Err(AppError::FolderNotFound(_))));
    }
}
