//! Structured logging setup with tracing

use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "pixelvista.log";

/// Initialize the logging system
pub fn init_logging() -> anyhow::Result<WorkerGuard> {
    let log_dir = super::log_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    #[cfg(debug_assertions)]
    {
        // Development: pretty console output + file
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .with(fmt::layer().json().with_writer(non_blocking))
            .try_init()?;
    }

    #[cfg(not(debug_assertions))]
    {
        // Release: JSON file only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(non_blocking))
            .try_init()?;
    }

    tracing::info!("Logging initialized in {:?}", log_dir);
    Ok(guard)
}

/// Clean up log files older than `days` in the application log directory
pub fn cleanup_old_logs(days: u32) -> anyhow::Result<usize> {
    cleanup_logs_in(&super::log_dir(), days)
}

/// Clean up rotated log files older than `days` in `log_dir`
pub fn cleanup_logs_in(log_dir: &Path, days: u32) -> anyhow::Result<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }

    let threshold = SystemTime::now() - Duration::from_secs(days as u64 * 24 * 60 * 60);
    let mut deleted = 0;

    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();

        let is_log = path
            .file_name()
            .map(|n| n.to_string_lossy().starts_with(LOG_FILE_PREFIX))
            .unwrap_or(false);
        if !is_log {
            continue;
        }

        let modified = entry.metadata().and_then(|m| m.modified());
        if let Ok(modified) = modified {
            if modified < threshold && std::fs::remove_file(&path).is_ok() {
                deleted += 1;
                tracing::debug!("Deleted old log: {:?}", path);
            }
        }
    }

    tracing::info!("Cleaned up {} old log files", deleted);
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cleanup_keeps_recent_logs() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("pixelvista.log.2026-10-16"), b"{}").unwrap();
        std::fs::write(dir.path().join("other.txt"), b"keep").unwrap();

        let deleted = cleanup_logs_in(dir.path(), 7).unwrap();
        assert_eq!(deleted, 0);
        assert!(dir.path().join("pixelvista.log.2026-10-16").exists());
    }

    #[test]
    fn test_cleanup_zero_days_removes_only_logs() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("pixelvista.log.2026-10-16"), b"{}").unwrap();
        std::fs::write(dir.path().join("other.txt"), b"keep").unwrap();
        std::thread::sleep(Duration::from_millis(20));

        let deleted = cleanup_logs_in(dir.path(), 0).unwrap();
        assert_eq!(deleted, 1);
        assert!(dir.path().join("other.txt").exists());
    }

    #[test]
    fn test_cleanup_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(cleanup_logs_in(&dir.path().join("none"), 7).unwrap(), 0);
    }
}
