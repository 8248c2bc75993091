//! PixelVista Core Domain Logic
//!
//! This crate contains:
//! - Application state and the command system
//! - Configuration
//! - Error types
//! - Image set navigation
//! - Viewport (zoom / pan / fit) and crop interaction
//! - The edit pipeline and its operations
//! - Batch standardization

pub mod state;
pub mod config;
pub mod command;
pub mod error;
pub mod navigation;
pub mod image_loader;
pub mod transform;
pub mod viewport;
pub mod crop;
pub mod pipeline;
pub mod edit;
pub mod enhance;
pub mod dimensions;
pub mod standardize;

pub use state::{AppState, ViewState};
pub use config::{
    AppConfig, GeneralConfig, ViewerConfig, NavigationConfig, StandardizeConfig, LoggingConfig,
};
pub use command::{Command, CommandId, CommandDispatcher, CommandParams, CommandHandler, Precondition};
pub use error::AppError;
pub use navigation::ImageSet;
pub use transform::{Point, Size};
pub use viewport::{Viewport, ZoomDirection, FitOutcome, RenderedBitmap, PanDrag};
pub use crop::{CropSession, CropOutcome, CanvasRect};
pub use pipeline::EditPipeline;
pub use edit::{Edit, CropBox, FlipAxis, RotateDirection};
pub use enhance::Enhancement;
pub use dimensions::{Dimensions, parse_dimensions};
pub use standardize::{BatchSummary, standardize_folder, standardize_image};
pub use app_fs::SortBy;
