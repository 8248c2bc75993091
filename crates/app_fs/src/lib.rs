//! PixelVista File System Layer
//!
//! Provides directory browsing for the image navigator:
//! - Non-recursive directory listing with extension filters
//! - Name-based sorting (byte-wise or natural)

mod browser;

pub use browser::{
    FileEntry, ListOptions, SortBy, list_directory, has_extension,
    VIEWER_EXTENSIONS, BATCH_EXTENSIONS,
};

use thiserror::Error;

/// File system errors
#[derive(Error, Debug)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

pub type Result<T> = std::result::Result<T, FsError>;
