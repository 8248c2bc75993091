//! Edit pipeline: original image, working copy, revert

use crate::edit::Edit;
use crate::image_loader;
use crate::AppError;
use image::DynamicImage;
use std::path::Path;

/// Holds the decoded source image and the working copy edits accumulate on
#[derive(Debug, Default)]
pub struct EditPipeline {
    source: Option<DynamicImage>,
    working: Option<DynamicImage>,
}

impl EditPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `data` and make it both the source and the working image.
    ///
    /// On failure the previous images are left untouched.
    pub fn load(&mut self, data: &[u8], origin: &Path) -> Result<(), AppError> {
        let image = image_loader::decode_bytes(data, origin)?;
        self.set_source(image);
        Ok(())
    }

    /// Read and decode a file
    pub fn load_path(&mut self, path: &Path) -> Result<(), AppError> {
        let image = image_loader::decode_file(path)?;
        tracing::debug!("Decoded {:?}: {}x{} {:?}", path, image.width(), image.height(), image.color());
        self.set_source(image);
        Ok(())
    }

    fn set_source(&mut self, image: DynamicImage) {
        self.working = Some(image.clone());
        self.source = Some(image);
    }

    /// Drop both images
    pub fn clear(&mut self) {
        self.source = None;
        self.working = None;
    }

    pub fn source(&self) -> Option<&DynamicImage> {
        self.source.as_ref()
    }

    pub fn working(&self) -> Option<&DynamicImage> {
        self.working.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.working.is_some()
    }

    /// Working image dimensions
    pub fn working_size(&self) -> Option<(u32, u32)> {
        self.working.as_ref().map(|img| (img.width(), img.height()))
    }

    /// Apply an edit to the working image.
    ///
    /// Returns `false` when there is no working image or the edit does not
    /// apply (e.g. an empty crop). Callers re-fit the viewport on `true`.
    pub fn apply(&mut self, edit: &Edit) -> bool {
        let applied = self.apply_with(|img| edit.apply(img));
        if applied {
            tracing::debug!("Applied edit: {}", edit.name());
        } else {
            tracing::debug!("Skipped edit: {}", edit.name());
        }
        applied
    }

    /// Replace the working image with `f(working)`; `None` leaves it unchanged
    pub fn apply_with<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&DynamicImage) -> Option<DynamicImage>,
    {
        let Some(working) = self.working.as_ref() else {
            return false;
        };
        match f(working) {
            Some(edited) => {
                self.working = Some(edited);
                true
            }
            None => false,
        }
    }

    /// Restore the working image to the source. Returns `false` when empty.
    pub fn revert(&mut self) -> bool {
        match &self.source {
            Some(source) => {
                self.working = Some(source.clone());
                true
            }
            None => false,
        }
    }

    /// Make the working image the new revert target (after an overwrite-save)
    pub fn commit_saved(&mut self) {
        if let Some(working) = &self.working {
            self.source = Some(working.clone());
        }
    }
}
