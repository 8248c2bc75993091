//! Image set navigation: the sorted files of one folder and a cursor into them

use crate::AppError;
use app_fs::{ListOptions, SortBy};
use std::path::{Path, PathBuf};

/// Images of a single folder in display order
#[derive(Debug, Clone, Default)]
pub struct ImageSet {
    folder: PathBuf,
    files: Vec<PathBuf>,
    current: Option<usize>,
}

impl ImageSet {
    /// List the viewable images in `folder`. An empty folder is valid.
    pub fn open_folder(folder: &Path, sort_by: SortBy) -> Result<Self, AppError> {
        if !folder.is_dir() {
            return Err(AppError::FolderNotFound(folder.to_path_buf()));
        }

        let entries = app_fs::list_directory(folder, &ListOptions::viewer_images().sorted_by(sort_by))?;
        let files: Vec<PathBuf> = entries.into_iter().map(|e| e.path).collect();
        let current = if files.is_empty() { None } else { Some(0) };

        tracing::info!("Opened {:?}: {} images", folder, files.len());
        Ok(Self {
            folder: folder.to_path_buf(),
            files,
            current,
        })
    }

    /// Open the folder containing `file` and select it.
    ///
    /// Falls back to the first image when `file` is not in the listing.
    pub fn open_file(file: &Path, sort_by: SortBy) -> Result<Self, AppError> {
        let folder = match file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut set = Self::open_folder(folder, sort_by)?;
        if let Some(name) = file.file_name() {
            if let Some(index) = set.files.iter().position(|p| p.file_name() == Some(name)) {
                set.current = Some(index);
            }
        }
        Ok(set)
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current.and_then(|i| self.files.get(i)).map(PathBuf::as_path)
    }

    /// 1-based position for display, e.g. `(3, 10)`
    pub fn position(&self) -> Option<(usize, usize)> {
        self.current.map(|i| (i + 1, self.files.len()))
    }

    /// Advance with wrap-around. Returns `false` when empty.
    pub fn next(&mut self) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        self.current = Some((current + 1) % self.files.len());
        true
    }

    /// Step back with wrap-around. Returns `false` when empty.
    pub fn previous(&mut self) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        let len = self.files.len();
        self.current = Some((current + len - 1) % len);
        true
    }

    /// Drop the current entry (it failed to decode) and return the entry now
    /// under the cursor, wrapping to the start. `None` once the set is empty.
    pub fn remove_current_and_advance(&mut self) -> Option<&Path> {
        let current = self.current?;
        let removed = self.files.remove(current);
        tracing::debug!("Removed {:?} from image set", removed);

        if self.files.is_empty() {
            self.current = None;
            return None;
        }

        self.current = Some(if current >= self.files.len() { 0 } else { current });
        self.current_path()
    }
}
