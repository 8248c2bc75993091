//! Application error types

use std::path::PathBuf;
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Surfaced to the user, triggering operation aborted =====
    #[error("Folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    #[error("Invalid dimensions '{0}': expected WIDTHxHEIGHT with positive integers")]
    InvalidDimensionInput(String),

    #[error("Cannot save {}: {message}", path.display())]
    Save { path: PathBuf, message: String },

    #[error("Image encode error: {0}")]
    Encode(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("No image is loaded")]
    NoDocument,

    #[error("Command {command} requires a {param} parameter")]
    MissingParameter { command: String, param: &'static str },

    // ===== Recovered locally (skip and continue) =====
    #[error("Cannot decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    #[error("Batch item {}: {message}", file.display())]
    BatchItem { file: PathBuf, message: String },

    // ===== Plumbing =====
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File system error: {0}")]
    Fs(app_fs::FsError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Errors handled by automatic recovery rather than user notification
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::Decode { .. } | AppError::BatchItem { .. })
    }

    /// Errors caused by user input that leave all state untouched
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidDimensionInput(_)
                | AppError::UnsupportedFormat(_)
                | AppError::MissingParameter { .. }
        )
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::FolderNotFound(path) => {
                format!("The folder was not found:\n{}", path.display())
            }
            AppError::InvalidDimensionInput(_) => {
                "Invalid format. Use WIDTHxHEIGHT, for example 800x600.".to_string()
            }
            AppError::Decode { path, message } => {
                format!("Could not load the image:\n{}\n\nError: {}", path.display(), message)
            }
            AppError::Save { message, .. } => format!("Could not save the file:\n{}", message),
            _ => self.to_string(),
        }
    }
}

impl From<app_fs::FsError> for AppError {
    fn from(e: app_fs::FsError) -> Self {
        match e {
            app_fs::FsError::NotFound(p) => AppError::FolderNotFound(PathBuf::from(p)),
            app_fs::FsError::Io(io) => AppError::Io(io),
            other => AppError::Fs(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_not_found_maps_to_folder_not_found() {
        let err: AppError = app_fs::FsError::NotFound("/nowhere".into()).into();
        assert!(matches!(err, AppError::FolderNotFound(ref p) if p == &PathBuf::from("/nowhere")));
    }

    #[test]
    fn test_classification() {
        let decode = AppError::Decode { path: "a.png".into(), message: "bad".into() };
        assert!(decode.is_recoverable());
        assert!(!decode.is_input_error());

        let dims = AppError::InvalidDimensionInput("abc".into());
        assert!(dims.is_input_error());
        assert!(!dims.is_recoverable());
        assert!(dims.user_message().contains("800x600"));
    }
}
