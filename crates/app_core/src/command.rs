//! Command system for user actions

use crate::edit::{Edit, FlipAxis, RotateDirection};
use crate::enhance::Enhancement;
use crate::state::{AppState, ViewState};
use crate::transform::{Point, Size};
use crate::viewport::ZoomDirection;
use crate::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Command identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandId(pub String);

impl CommandId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Navigation commands
    pub const NAV_OPEN: &'static str = "nav.open";
    pub const NAV_NEXT_ITEM: &'static str = "nav.next_item";
    pub const NAV_PREV_ITEM: &'static str = "nav.prev_item";

    // View commands
    pub const VIEW_ZOOM_IN: &'static str = "view.zoom_in";
    pub const VIEW_ZOOM_OUT: &'static str = "view.zoom_out";
    pub const VIEW_WHEEL_ZOOM_IN: &'static str = "view.wheel_zoom_in";
    pub const VIEW_WHEEL_ZOOM_OUT: &'static str = "view.wheel_zoom_out";
    pub const VIEW_FIT_TO_WINDOW: &'static str = "view.fit_to_window";
    pub const VIEW_ORIGINAL_SIZE: &'static str = "view.original_size";
    pub const VIEW_RESIZE_CANVAS: &'static str = "view.resize_canvas";

    // Pointer gestures on the canvas (pan, or crop while crop mode is armed)
    pub const POINTER_PRESS: &'static str = "pointer.press";
    pub const POINTER_MOVE: &'static str = "pointer.move";
    pub const POINTER_RELEASE: &'static str = "pointer.release";

    // Edit commands
    pub const EDIT_ROTATE_LEFT: &'static str = "edit.rotate_left";
    pub const EDIT_ROTATE_RIGHT: &'static str = "edit.rotate_right";
    pub const EDIT_FLIP_HORIZONTAL: &'static str = "edit.flip_horizontal";
    pub const EDIT_FLIP_VERTICAL: &'static str = "edit.flip_vertical";
    pub const EDIT_GRAYSCALE: &'static str = "edit.grayscale";
    pub const EDIT_ADJUST: &'static str = "edit.adjust";
    pub const EDIT_RESIZE: &'static str = "edit.resize";
    pub const EDIT_CROP: &'static str = "edit.crop";
    pub const EDIT_REVERT: &'static str = "edit.revert";

    // File commands
    pub const FILE_SAVE: &'static str = "file.save";
    pub const FILE_SAVE_AS: &'static str = "file.save_as";

    // Tools
    pub const TOOLS_STANDARDIZE: &'static str = "tools.standardize";
    pub const TOOLS_STANDARDIZE_FOLDER: &'static str = "tools.standardize_folder";

    // App commands
    pub const APP_CANCEL: &'static str = "app.cancel";
    pub const APP_QUIT: &'static str = "app.quit";
}

/// Command with optional parameters
#[derive(Debug, Clone)]
pub struct Command {
    pub id: CommandId,
    pub params: CommandParams,
}

/// Command parameters
#[derive(Debug, Clone, Default)]
pub struct CommandParams {
    pub string_value: Option<String>,
    pub path_value: Option<PathBuf>,
    pub point_value: Option<Point>,
    pub float_values: Vec<f64>,
}

impl Command {
    pub fn new(id: &str) -> Self {
        Self {
            id: CommandId::new(id),
            params: CommandParams::default(),
        }
    }

    pub fn with_string(mut self, value: &str) -> Self {
        self.params.string_value = Some(value.to_string());
        self
    }

    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.params.path_value = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_point(mut self, x: f64, y: f64) -> Self {
        self.params.point_value = Some(Point::new(x, y));
        self
    }

    pub fn with_floats(mut self, values: &[f64]) -> Self {
        self.params.float_values = values.to_vec();
        self
    }

    fn missing(&self, param: &'static str) -> AppError {
        AppError::MissingParameter {
            command: self.id.as_str().to_string(),
            param,
        }
    }

    fn require_path(&self) -> Result<&Path, AppError> {
        self.params.path_value.as_deref().ok_or_else(|| self.missing("path"))
    }

    fn require_point(&self) -> Result<Point, AppError> {
        self.params.point_value.ok_or_else(|| self.missing("point"))
    }

    fn require_string(&self) -> Result<&str, AppError> {
        self.params.string_value.as_deref().ok_or_else(|| self.missing("string"))
    }

    /// `index`-th float, or `default` when absent
    fn float_or(&self, index: usize, default: f64) -> f64 {
        self.params.float_values.get(index).copied().unwrap_or(default)
    }
}

/// State a command needs before it can run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    None,
    /// An image folder has been opened (it may be empty)
    FolderOpen,
    /// An image is decoded and displayed
    DocumentLoaded,
}

impl Precondition {
    pub fn is_met(self, state: &AppState) -> bool {
        match self {
            Precondition::None => true,
            Precondition::FolderOpen => state.image_set().is_some(),
            Precondition::DocumentLoaded => state.view_state() == ViewState::Browsing,
        }
    }
}

/// Command handler trait
pub trait CommandHandler {
    fn execute(&self, state: &mut AppState, cmd: &Command) -> Result<(), AppError>;
}

impl<F> CommandHandler for F
where
    F: Fn(&mut AppState, &Command) -> Result<(), AppError>,
{
    fn execute(&self, state: &mut AppState, cmd: &Command) -> Result<(), AppError> {
        self(state, cmd)
    }
}

struct Registration {
    precondition: Precondition,
    handler: Box<dyn CommandHandler>,
}

/// Command dispatcher
pub struct CommandDispatcher {
    handlers: HashMap<String, Registration>,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Dispatcher with every built-in command registered
    pub fn with_defaults() -> Self {
        use Precondition::{DocumentLoaded, FolderOpen};

        let mut d = Self::new();

        d.register(CommandId::NAV_OPEN, Precondition::None, nav_open);
        d.register(CommandId::NAV_NEXT_ITEM, FolderOpen, |s: &mut AppState, _: &Command| {
            s.next_image().map(drop)
        });
        d.register(CommandId::NAV_PREV_ITEM, FolderOpen, |s: &mut AppState, _: &Command| {
            s.previous_image().map(drop)
        });

        d.register(CommandId::VIEW_ZOOM_IN, DocumentLoaded, |s: &mut AppState, _: &Command| {
            s.zoom_step(ZoomDirection::In);
            Ok(())
        });
        d.register(CommandId::VIEW_ZOOM_OUT, DocumentLoaded, |s: &mut AppState, _: &Command| {
            s.zoom_step(ZoomDirection::Out);
            Ok(())
        });
        d.register(CommandId::VIEW_WHEEL_ZOOM_IN, DocumentLoaded, |s: &mut AppState, c: &Command| {
            s.zoom_wheel(ZoomDirection::In, c.params.point_value);
            Ok(())
        });
        d.register(CommandId::VIEW_WHEEL_ZOOM_OUT, DocumentLoaded, |s: &mut AppState, c: &Command| {
            s.zoom_wheel(ZoomDirection::Out, c.params.point_value);
            Ok(())
        });
        d.register(CommandId::VIEW_FIT_TO_WINDOW, DocumentLoaded, |s: &mut AppState, _: &Command| {
            s.fit_to_window();
            Ok(())
        });
        d.register(CommandId::VIEW_ORIGINAL_SIZE, DocumentLoaded, |s: &mut AppState, _: &Command| {
            s.original_size();
            Ok(())
        });
        d.register(CommandId::VIEW_RESIZE_CANVAS, Precondition::None, view_resize_canvas);

        d.register(CommandId::POINTER_PRESS, DocumentLoaded, |s: &mut AppState, c: &Command| {
            s.pointer_press(c.require_point()?);
            Ok(())
        });
        d.register(CommandId::POINTER_MOVE, DocumentLoaded, |s: &mut AppState, c: &Command| {
            s.pointer_move(c.require_point()?);
            Ok(())
        });
        d.register(CommandId::POINTER_RELEASE, DocumentLoaded, |s: &mut AppState, c: &Command| {
            s.pointer_release(c.require_point()?);
            Ok(())
        });

        d.register(CommandId::EDIT_ROTATE_LEFT, DocumentLoaded, |s: &mut AppState, _: &Command| {
            s.apply_edit(&Edit::Rotate(RotateDirection::CounterClockwise));
            Ok(())
        });
        d.register(CommandId::EDIT_ROTATE_RIGHT, DocumentLoaded, |s: &mut AppState, _: &Command| {
            s.apply_edit(&Edit::Rotate(RotateDirection::Clockwise));
            Ok(())
        });
        d.register(CommandId::EDIT_FLIP_HORIZONTAL, DocumentLoaded, |s: &mut AppState, _: &Command| {
            s.apply_edit(&Edit::Flip(FlipAxis::Horizontal));
            Ok(())
        });
        d.register(CommandId::EDIT_FLIP_VERTICAL, DocumentLoaded, |s: &mut AppState, _: &Command| {
            s.apply_edit(&Edit::Flip(FlipAxis::Vertical));
            Ok(())
        });
        d.register(CommandId::EDIT_GRAYSCALE, DocumentLoaded, |s: &mut AppState, _: &Command| {
            s.apply_edit(&Edit::Grayscale);
            Ok(())
        });
        d.register(CommandId::EDIT_ADJUST, DocumentLoaded, edit_adjust);
        d.register(CommandId::EDIT_RESIZE, DocumentLoaded, |s: &mut AppState, c: &Command| {
            s.resize(c.require_string()?).map(drop)
        });
        d.register(CommandId::EDIT_CROP, DocumentLoaded, |s: &mut AppState, _: &Command| {
            s.arm_crop();
            Ok(())
        });
        d.register(CommandId::EDIT_REVERT, DocumentLoaded, |s: &mut AppState, _: &Command| {
            s.revert();
            Ok(())
        });

        d.register(CommandId::FILE_SAVE, DocumentLoaded, |s: &mut AppState, _: &Command| {
            s.save().map(drop)
        });
        d.register(CommandId::FILE_SAVE_AS, DocumentLoaded, |s: &mut AppState, c: &Command| {
            s.save_as(c.require_path()?).map(drop)
        });

        d.register(CommandId::TOOLS_STANDARDIZE, DocumentLoaded, |s: &mut AppState, c: &Command| {
            s.standardize_current(c.params.string_value.as_deref()).map(drop)
        });
        d.register(CommandId::TOOLS_STANDARDIZE_FOLDER, FolderOpen, |s: &mut AppState, c: &Command| {
            s.standardize_folder(c.params.string_value.as_deref()).map(drop)
        });

        d.register(CommandId::APP_CANCEL, Precondition::None, |s: &mut AppState, _: &Command| {
            s.cancel();
            Ok(())
        });
        d.register(CommandId::APP_QUIT, Precondition::None, |s: &mut AppState, _: &Command| {
            s.request_quit();
            Ok(())
        });

        d
    }

    pub fn register<H: CommandHandler + 'static>(&mut self, command_id: &str, precondition: Precondition, handler: H) {
        self.handlers.insert(
            command_id.to_string(),
            Registration {
                precondition,
                handler: Box::new(handler),
            },
        );
    }

    pub fn is_registered(&self, command_id: &str) -> bool {
        self.handlers.contains_key(command_id)
    }

    /// Run `cmd` against `state`.
    ///
    /// Unknown commands and commands whose precondition is unmet are logged
    /// and skipped; only handler failures are returned.
    pub fn dispatch(&self, state: &mut AppState, cmd: &Command) -> Result<(), AppError> {
        if let Some(registration) = self.handlers.get(cmd.id.as_str()) {
            if registration.precondition.is_met(state) {
                registration.handler.execute(state, cmd)?;
            } else {
                tracing::debug!("Command {} cannot be executed in current context", cmd.id.as_str());
            }
        } else {
            tracing::warn!("Unknown command: {}", cmd.id.as_str());
        }
        Ok(())
    }

    pub fn can_execute(&self, state: &AppState, cmd: &Command) -> bool {
        self.handlers
            .get(cmd.id.as_str())
            .map(|r| r.precondition.is_met(state))
            .unwrap_or(false)
    }
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn nav_open(state: &mut AppState, cmd: &Command) -> Result<(), AppError> {
    state.open_path(cmd.require_path()?)
}

fn view_resize_canvas(state: &mut AppState, cmd: &Command) -> Result<(), AppError> {
    match cmd.params.float_values.as_slice() {
        [width, height, ..] => {
            state.set_canvas_size(Size::new(*width, *height));
            Ok(())
        }
        _ => Err(cmd.missing("width and height")),
    }
}

/// `float_values` = `[brightness, contrast, sharpness]`, missing entries neutral
fn edit_adjust(state: &mut AppState, cmd: &Command) -> Result<(), AppError> {
    let enhancement = Enhancement::new(
        cmd.float_or(0, 1.0) as f32,
        cmd.float_or(1, 1.0) as f32,
        cmd.float_or(2, 1.0) as f32,
    );
    if !enhancement.is_identity() {
        state.apply_edit(&Edit::Enhance(enhancement));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppConfig;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn state_with_image() -> (TempDir, AppState) {
        let dir = TempDir::new().unwrap();
        RgbImage::from_pixel(100, 200, Rgb([10, 20, 30])).save(dir.path().join("a.png")).unwrap();
        let mut state = AppState::new(AppConfig::default());
        state.set_canvas_size(Size::new(1000.0, 1000.0));
        state.open_path(dir.path()).unwrap();
        (dir, state)
    }

    #[test]
    fn test_unknown_command_is_ignored() {
        let dispatcher = CommandDispatcher::with_defaults();
        let mut state = AppState::new(AppConfig::default());
        assert!(dispatcher.dispatch(&mut state, &Command::new("view.teleport")).is_ok());
    }

    #[test]
    fn test_unmet_precondition_is_noop() {
        let dispatcher = CommandDispatcher::with_defaults();
        let mut state = AppState::new(AppConfig::default());

        let cmd = Command::new(CommandId::EDIT_ROTATE_LEFT);
        assert!(!dispatcher.can_execute(&state, &cmd));
        dispatcher.dispatch(&mut state, &cmd).unwrap();
        assert_eq!(state.view_state(), ViewState::Empty);

        // Save needs a document; without one nothing is attempted
        dispatcher.dispatch(&mut state, &Command::new(CommandId::FILE_SAVE)).unwrap();
    }

    #[test]
    fn test_missing_parameter() {
        let dispatcher = CommandDispatcher::with_defaults();
        let mut state = AppState::new(AppConfig::default());
        let err = dispatcher.dispatch(&mut state, &Command::new(CommandId::NAV_OPEN)).unwrap_err();
        assert!(matches!(err, AppError::MissingParameter { param: "path", .. }));
    }

    #[test]
    fn test_edit_commands_reach_the_pipeline() {
        let (_dir, mut state) = state_with_image();
        let dispatcher = CommandDispatcher::with_defaults();

        dispatcher.dispatch(&mut state, &Command::new(CommandId::EDIT_ROTATE_RIGHT)).unwrap();
        assert_eq!(state.pipeline().working_size(), Some((200, 100)));

        dispatcher
            .dispatch(&mut state, &Command::new(CommandId::EDIT_RESIZE).with_string("50x40"))
            .unwrap();
        assert_eq!(state.pipeline().working_size(), Some((50, 40)));

        dispatcher.dispatch(&mut state, &Command::new(CommandId::EDIT_REVERT)).unwrap();
        assert_eq!(state.pipeline().working_size(), Some((100, 200)));
    }

    #[test]
    fn test_invalid_resize_input_surfaces() {
        let (_dir, mut state) = state_with_image();
        let dispatcher = CommandDispatcher::with_defaults();

        let err = dispatcher
            .dispatch(&mut state, &Command::new(CommandId::EDIT_RESIZE).with_string("wide"))
            .unwrap_err();
        assert!(err.is_input_error());
        assert_eq!(state.pipeline().working_size(), Some((100, 200)));
    }

    #[test]
    fn test_adjust_with_neutral_factors_is_skipped() {
        let (_dir, mut state) = state_with_image();
        let dispatcher = CommandDispatcher::with_defaults();
        let before = state.pipeline().working().unwrap().as_bytes().to_vec();

        dispatcher.dispatch(&mut state, &Command::new(CommandId::EDIT_ADJUST)).unwrap();
        assert_eq!(state.pipeline().working().unwrap().as_bytes(), before.as_slice());

        dispatcher
            .dispatch(&mut state, &Command::new(CommandId::EDIT_ADJUST).with_floats(&[0.5]))
            .unwrap();
        assert_ne!(state.pipeline().working().unwrap().as_bytes(), before.as_slice());
    }

    #[test]
    fn test_crop_through_pointer_commands() {
        let (_dir, mut state) = state_with_image();
        let dispatcher = CommandDispatcher::with_defaults();

        dispatcher.dispatch(&mut state, &Command::new(CommandId::EDIT_CROP)).unwrap();
        dispatcher
            .dispatch(&mut state, &Command::new(CommandId::POINTER_PRESS).with_point(300.0, 100.0))
            .unwrap();
        dispatcher
            .dispatch(&mut state, &Command::new(CommandId::POINTER_MOVE).with_point(400.0, 300.0))
            .unwrap();
        dispatcher
            .dispatch(&mut state, &Command::new(CommandId::POINTER_RELEASE).with_point(500.0, 600.0))
            .unwrap();

        assert_eq!(state.pipeline().working_size(), Some((40, 100)));
    }

    #[test]
    fn test_cancel_then_quit() {
        let (_dir, mut state) = state_with_image();
        let dispatcher = CommandDispatcher::with_defaults();

        dispatcher.dispatch(&mut state, &Command::new(CommandId::EDIT_CROP)).unwrap();
        dispatcher.dispatch(&mut state, &Command::new(CommandId::APP_CANCEL)).unwrap();
        assert!(!state.crop_armed());
        assert!(!state.quit_requested());

        dispatcher.dispatch(&mut state, &Command::new(CommandId::APP_CANCEL)).unwrap();
        assert!(state.quit_requested());
    }

    #[test]
    fn test_every_keybinding_targets_a_registered_command() {
        let dispatcher = CommandDispatcher::with_defaults();
        for id in AppConfig::default().keybindings.keys() {
            assert!(dispatcher.is_registered(id), "unregistered binding {}", id);
        }
    }
}
