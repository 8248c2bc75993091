//! Image decoding and saving

use crate::AppError;
use image::{ColorType, DynamicImage, ImageError, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Extension appended by save-as when the user gives none
pub const DEFAULT_SAVE_EXTENSION: &str = "jpg";

/// Decode an in-memory image, normalizing its color type.
///
/// `origin` is only used to label errors.
pub fn decode_bytes(data: &[u8], origin: &Path) -> Result<DynamicImage, AppError> {
    let decode_error = |message: String| AppError::Decode {
        path: origin.to_path_buf(),
        message,
    };

    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| decode_error(e.to_string()))?;

    let img = reader.decode().map_err(|e| decode_error(e.to_string()))?;
    Ok(normalize_color(img))
}

/// Read and decode a file; read failures are reported as decode failures
pub fn decode_file(path: &Path) -> Result<DynamicImage, AppError> {
    tracing::debug!("Loading image: {:?}", path);

    let data = std::fs::read(path).map_err(|e| AppError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    decode_bytes(&data, path)
}

/// Keep 8-bit RGB / RGBA as-is; convert everything else to one of them
pub fn normalize_color(img: DynamicImage) -> DynamicImage {
    match img.color() {
        ColorType::Rgb8 | ColorType::Rgba8 => img,
        color if color.has_alpha() => DynamicImage::ImageRgba8(img.to_rgba8()),
        _ => DynamicImage::ImageRgb8(img.to_rgb8()),
    }
}

/// Formats that cannot store an alpha channel
fn is_opaque_format(format: ImageFormat) -> bool {
    matches!(format, ImageFormat::Jpeg | ImageFormat::Bmp)
}

/// Convert `image` into a color type the target format can hold
fn prepare_for_format(image: &DynamicImage, format: ImageFormat) -> DynamicImage {
    if is_opaque_format(format) && image.color().has_alpha() {
        DynamicImage::ImageRgb8(image.to_rgb8())
    } else {
        image.clone()
    }
}

/// Save with the format chosen by the path's extension
pub fn save_image(image: &DynamicImage, path: &Path) -> Result<(), AppError> {
    let format = ImageFormat::from_path(path).map_err(|_| {
        AppError::UnsupportedFormat(
            path.extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_default(),
        )
    })?;

    let prepared = prepare_for_format(image, format);
    prepared
        .save_with_format(path, format)
        .map_err(|e| match e {
            ImageError::IoError(_) => AppError::Save {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
            other => AppError::Encode(other.to_string()),
        })?;

    tracing::info!("Saved {:?} as {:?}", path, format);
    Ok(())
}

/// Resolve a save-as target: append `.jpg` when there is no extension and
/// restrict the format to JPEG, PNG or BMP
pub fn resolve_save_as_path(path: &Path) -> Result<PathBuf, AppError> {
    let path = match path.extension() {
        Some(_) => path.to_path_buf(),
        None => path.with_extension(DEFAULT_SAVE_EXTENSION),
    };

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" | "png" | "bmp" => Ok(path),
        _ => Err(AppError::UnsupportedFormat(ext)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};
    use tempfile::TempDir;

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_bytes(b"definitely not pixels", Path::new("x.png")).unwrap_err();
        assert!(matches!(err, AppError::Decode { ref path, .. } if path == Path::new("x.png")));
    }

    #[test]
    fn test_decode_missing_file_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let err = decode_file(&dir.path().join("gone.png")).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_normalize_gray_to_rgb() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([9])));
        assert_eq!(normalize_color(gray).color(), ColorType::Rgb8);

        let la = DynamicImage::ImageLumaA8(image::GrayAlphaImage::new(2, 2));
        assert_eq!(normalize_color(la).color(), ColorType::Rgba8);
    }

    #[test]
    fn test_save_jpeg_drops_alpha() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.jpg");
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 100])));

        save_image(&rgba, &path).unwrap();
        let reloaded = image::open(&path).unwrap();
        assert!(!reloaded.color().has_alpha());
        // The in-memory image keeps its alpha
        assert!(rgba.color().has_alpha());
    }

    #[test]
    fn test_save_png_keeps_alpha() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.png");
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 4])));

        save_image(&rgba, &path).unwrap();
        assert_eq!(image::open(&path).unwrap().color(), ColorType::Rgba8);
    }

    #[test]
    fn test_save_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let img = DynamicImage::ImageLuma8(GrayImage::new(1, 1));
        let err = save_image(&img, &dir.path().join("out.xyz")).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(ref e) if e == "xyz"));
    }

    #[test]
    fn test_save_failures_are_classified() {
        let dir = TempDir::new().unwrap();

        let deep = DynamicImage::ImageLuma16(image::ImageBuffer::from_pixel(2, 2, Luma([40_000u16])));
        let err = save_image(&deep, &dir.path().join("deep.jpg")).unwrap_err();
        assert!(matches!(err, AppError::Encode(_)));

        let img = DynamicImage::ImageLuma8(GrayImage::new(1, 1));
        let err = save_image(&img, &dir.path().join("missing").join("out.png")).unwrap_err();
        assert!(matches!(err, AppError::Save { .. }));
    }

    #[test]
    fn test_resolve_save_as_path() {
        assert_eq!(resolve_save_as_path(Path::new("/tmp/a")).unwrap(), PathBuf::from("/tmp/a.jpg"));
        assert_eq!(resolve_save_as_path(Path::new("b.PNG")).unwrap(), PathBuf::from("b.PNG"));
        assert!(matches!(
            resolve_save_as_path(Path::new("c.webp")),
            Err(AppError::UnsupportedFormat(_))
        ));
    }
}
