//! Directory browser - listing image folders

use crate::{FsError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Extensions the viewer can navigate (lowercase)
pub const VIEWER_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "ppm", "pgm", "pbm", "pnm",
];

/// Extensions picked up by batch standardization.
///
/// Narrower than [`VIEWER_EXTENSIONS`]: the PNM family is not processed in batch.
pub const BATCH_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp",
];

/// File entry with metadata
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
    pub is_hidden: bool,
}

impl FileEntry {
    /// Create a new file entry from path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let metadata = fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let is_hidden = name.starts_with('.');

        Ok(Self {
            path: path.to_path_buf(),
            name,
            is_dir: metadata.is_dir(),
            is_hidden,
        })
    }

    /// Check if this is a file the viewer can open
    pub fn is_image(&self) -> bool {
        !self.is_dir && has_extension(&self.path, VIEWER_EXTENSIONS)
    }
}

/// Sort key for file listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortBy {
    /// Byte-wise comparison of file names ("b10.png" < "b2.png")
    #[default]
    #[serde(rename = "name")]
    Name,
    /// Digit runs compared numerically ("b2.png" < "b10.png")
    #[serde(rename = "natural")]
    Natural,
}

/// Options for listing directory contents
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub show_hidden: bool,
    pub show_directories: bool,
    pub show_files: bool,
    pub sort_by: SortBy,
    /// Lowercase allow-list, matched case-insensitively
    pub filter_extensions: Option<&'static [&'static str]>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            show_hidden: false,
            show_directories: true,
            show_files: true,
            sort_by: SortBy::Name,
            filter_extensions: None,
        }
    }
}

impl ListOptions {
    /// Files only, restricted to the given lowercase extensions
    pub fn files_with_extensions(extensions: &'static [&'static str]) -> Self {
        Self {
            show_hidden: true,
            show_directories: false,
            show_files: true,
            sort_by: SortBy::Name,
            filter_extensions: Some(extensions),
        }
    }

    /// Every image the viewer can navigate
    pub fn viewer_images() -> Self {
        Self::files_with_extensions(VIEWER_EXTENSIONS)
    }

    /// Images eligible for batch standardization
    pub fn batch_images() -> Self {
        Self::files_with_extensions(BATCH_EXTENSIONS)
    }

    pub fn sorted_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }
}

/// Case-insensitive extension check against a lowercase allow-list
pub fn has_extension<P: AsRef<Path>>(path: P, allowed: &[&str]) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| allowed.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// List directory contents (non-recursive)
pub fn list_directory<P: AsRef<Path>>(path: P, options: &ListOptions) -> Result<Vec<FileEntry>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(FsError::NotFound(path.display().to_string()));
    }

    if !path.is_dir() {
        return Err(FsError::InvalidPath(format!("Not a directory: {}", path.display())));
    }

    let read_dir = fs::read_dir(path).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => FsError::AccessDenied(path.display().to_string()),
        _ => FsError::Io(e),
    })?;

    let mut entries = Vec::new();

    for entry in read_dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry in {:?}: {}", path, e);
                continue;
            }
        };
        let file_entry = match FileEntry::from_path(entry.path()) {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry {:?}: {}", entry.path(), e);
                continue;
            }
        };

        if !options.show_hidden && file_entry.is_hidden {
            continue;
        }

        if !options.show_directories && file_entry.is_dir {
            continue;
        }

        if !options.show_files && !file_entry.is_dir {
            continue;
        }

        if let Some(exts) = options.filter_extensions {
            if !file_entry.is_dir && !has_extension(&file_entry.path, exts) {
                continue;
            }
        }

        entries.push(file_entry);
    }

    sort_entries(&mut entries, options.sort_by);

    tracing::debug!("Listed {} entries in {:?}", entries.len(), path);
    Ok(entries)
}

/// Sort file entries, directories first
fn sort_entries(entries: &mut [FileEntry], sort_by: SortBy) {
    entries.sort_by(|a, b| {
        if a.is_dir != b.is_dir {
            return if a.is_dir { Ordering::Less } else { Ordering::Greater };
        }

        match sort_by {
            SortBy::Name => a.name.cmp(&b.name),
            SortBy::Natural => natural_sort_key(&a.name).cmp(&natural_sort_key(&b.name)),
        }
    });
}

/// Generate a natural sort key (handles numbers correctly)
/// "image2.jpg" < "image10.jpg"
fn natural_sort_key(s: &str) -> Vec<NaturalSortPart> {
    let mut parts = Vec::new();
    let mut current_num = String::new();
    let mut current_str = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            if !current_str.is_empty() {
                parts.push(NaturalSortPart::Str(current_str.to_lowercase()));
                current_str.clear();
            }
            current_num.push(c);
        } else {
            if !current_num.is_empty() {
                if let Ok(n) = current_num.parse::<u64>() {
                    parts.push(NaturalSortPart::Num(n));
                }
                current_num.clear();
            }
            current_str.push(c);
        }
    }

    if !current_num.is_empty() {
        if let Ok(n) = current_num.parse::<u64>() {
            parts.push(NaturalSortPart::Num(n));
        }
    }
    if !current_str.is_empty() {
        parts.push(NaturalSortPart::Str(current_str.to_lowercase()));
    }

    parts
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum NaturalSortPart {
    Num(u64),
    Str(String),
}
