//! PixelVista Logging Module
//!
//! Provides structured logging, panic handling and crash reports.

mod panic_hook;
mod logging;

pub use panic_hook::init_panic_hook;
pub use logging::{init_logging, cleanup_old_logs, cleanup_logs_in};
pub use tracing_appender::non_blocking::WorkerGuard;

use directories::ProjectDirs;
use std::path::PathBuf;

/// Get the application log directory
pub fn log_dir() -> PathBuf {
    ProjectDirs::from("com", "PixelVista", "PixelVista")
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialize logging and the panic hook.
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// for the lifetime of the process.
pub fn init() -> anyhow::Result<WorkerGuard> {
    let guard = init_logging()?;
    init_panic_hook();
    Ok(guard)
}
