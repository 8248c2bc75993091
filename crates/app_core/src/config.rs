//! Application configuration

use crate::command::CommandId;
use crate::dimensions::{parse_dimensions, Dimensions};
use crate::standardize::DEFAULT_OUTPUT_SUBDIR;
use crate::viewport::DEFAULT_MIN_CANVAS_EXTENT;
use crate::AppError;
use app_fs::SortBy;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub viewer: ViewerConfig,
    pub navigation: NavigationConfig,
    pub standardize: StandardizeConfig,
    pub logging: LoggingConfig,
    pub keybindings: HashMap<String, Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            viewer: ViewerConfig::default(),
            navigation: NavigationConfig::default(),
            standardize: StandardizeConfig::default(),
            logging: LoggingConfig::default(),
            keybindings: default_keybindings(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Initial canvas size before the shell reports a real one
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1000.0,
            canvas_height: 750.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Canvas extent below which fit-to-window is deferred
    pub min_canvas_extent: f64,
    /// Canvas-size updates to wait for before giving up on a deferred fit
    pub fit_retry_limit: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            min_canvas_extent: DEFAULT_MIN_CANVAS_EXTENT,
            fit_retry_limit: 20,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub sort_by: SortBy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardizeConfig {
    /// Pre-filled answer for the dimension prompt
    pub default_size: String,
    /// Output folder created inside the source folder
    pub output_subdir: String,
}

impl Default for StandardizeConfig {
    fn default() -> Self {
        Self {
            default_size: "900x900".to_string(),
            output_subdir: DEFAULT_OUTPUT_SUBDIR.to_string(),
        }
    }
}

impl StandardizeConfig {
    pub fn default_dimensions(&self) -> Result<Dimensions, AppError> {
        parse_dimensions(&self.default_size)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub retention_days: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { retention_days: 7 }
    }
}

impl AppConfig {
    /// Load configuration from the platform config file, or defaults if absent
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Ok(Self::load_from(&config_path)?)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Parse a TOML config file; missing keys take their defaults
    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::info!("Configuration loaded from {:?}", path);
        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "PixelVista", "PixelVista")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }

    /// Command bound to `key`, if any
    pub fn command_for_key(&self, key: &str) -> Option<&str> {
        let mut matches: Vec<&str> = self
            .keybindings
            .iter()
            .filter(|(_, keys)| keys.iter().any(|k| k == key))
            .map(|(id, _)| id.as_str())
            .collect();
        // HashMap order is arbitrary; keep the lookup deterministic
        matches.sort_unstable();
        matches.first().copied()
    }
}

fn default_keybindings() -> HashMap<String, Vec<String>> {
    let mut kb = HashMap::new();

    // Navigation
    kb.insert(CommandId::NAV_OPEN.into(), vec!["Ctrl+o".into()]);
    kb.insert(CommandId::NAV_NEXT_ITEM.into(), vec!["Right".into()]);
    kb.insert(CommandId::NAV_PREV_ITEM.into(), vec!["Left".into()]);

    // View
    kb.insert(CommandId::VIEW_ZOOM_IN.into(), vec!["+".into(), "=".into()]);
    kb.insert(CommandId::VIEW_ZOOM_OUT.into(), vec!["-".into()]);
    kb.insert(CommandId::VIEW_FIT_TO_WINDOW.into(), vec!["f".into()]);
    kb.insert(CommandId::VIEW_ORIGINAL_SIZE.into(), vec!["r".into(), "1".into()]);

    // Edit
    kb.insert(CommandId::EDIT_REVERT.into(), vec!["Ctrl+z".into()]);
    kb.insert(CommandId::EDIT_CROP.into(), vec!["c".into()]);

    // File
    kb.insert(CommandId::FILE_SAVE.into(), vec!["Ctrl+s".into()]);
    kb.insert(CommandId::FILE_SAVE_AS.into(), vec!["Ctrl+Shift+s".into()]);

    // App
    kb.insert(CommandId::APP_CANCEL.into(), vec!["Escape".into()]);
    kb.insert(CommandId::APP_QUIT.into(), vec!["Ctrl+q".into()]);

    kb
}
