//! PixelVista - image viewer and light editor
//!
//! Usage: `pixelvista [PATH]` where PATH is an image file or a folder.

mod app;

use anyhow::Result;
use std::path::PathBuf;

fn main() -> Result<()> {
    // Initialize logging and panic hook first
    let _log_guard = app_log::init()?;

    tracing::info!("PixelVista starting...");

    // Load configuration
    let config = app_core::AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load configuration, using defaults: {}", e);
        app_core::AppConfig::default()
    });

    if let Err(e) = app_log::cleanup_old_logs(config.logging.retention_days) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    let initial_path = std::env::args_os().nth(1).map(PathBuf::from);

    app::run(config, initial_path.as_deref())
}
