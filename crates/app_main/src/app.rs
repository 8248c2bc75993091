//! Console shell: reads commands or key names from stdin and dispatches them
//!
//! Each input line is either a command id with arguments
//! (`edit.resize 800x600`, `pointer.press 120 80`) or a bound key name
//! (`Right`, `Escape`, `Ctrl+s`). After every command the status line is
//! printed.

use anyhow::Result;
use app_core::{AppConfig, AppState, Command, CommandDispatcher, CommandId, Point, ViewState};
use std::io::{self, BufRead, Write};
use std::path::Path;

/// What kind of argument a command takes from the rest of the line
enum ArgKind {
    None,
    Path { prompt: &'static str },
    Text { prompt: Option<&'static str> },
    Point { required: bool },
    Floats,
}

fn arg_kind(id: &str) -> ArgKind {
    match id {
        CommandId::NAV_OPEN => ArgKind::Path { prompt: "Open file or folder" },
        CommandId::FILE_SAVE_AS => ArgKind::Path { prompt: "Save as" },
        CommandId::EDIT_RESIZE => ArgKind::Text { prompt: Some("New size (WIDTHxHEIGHT)") },
        CommandId::TOOLS_STANDARDIZE | CommandId::TOOLS_STANDARDIZE_FOLDER => ArgKind::Text { prompt: None },
        CommandId::POINTER_PRESS | CommandId::POINTER_MOVE | CommandId::POINTER_RELEASE => {
            ArgKind::Point { required: true }
        }
        CommandId::VIEW_WHEEL_ZOOM_IN | CommandId::VIEW_WHEEL_ZOOM_OUT => ArgKind::Point { required: false },
        CommandId::EDIT_ADJUST | CommandId::VIEW_RESIZE_CANVAS => ArgKind::Floats,
        _ => ArgKind::None,
    }
}

struct Shell {
    state: AppState,
    dispatcher: CommandDispatcher,
}

impl Shell {
    fn new(config: AppConfig) -> Self {
        Self {
            state: AppState::new(config),
            dispatcher: CommandDispatcher::with_defaults(),
        }
    }

    /// Map an input token to a command id: registered ids pass through,
    /// anything else is looked up as a key binding
    fn resolve(&self, token: &str) -> Option<String> {
        if self.dispatcher.is_registered(token) {
            return Some(token.to_string());
        }
        self.state.config().command_for_key(token).map(str::to_string)
    }

    fn build_command(&self, id: &str, rest: &str, input: &mut impl BufRead) -> io::Result<Option<Command>> {
        let cmd = Command::new(id);
        let rest = rest.trim();

        let cmd = match arg_kind(id) {
            ArgKind::None => cmd,
            ArgKind::Path { prompt } => {
                let value = if rest.is_empty() { ask(prompt, input)? } else { rest.to_string() };
                if value.is_empty() {
                    return Ok(None);
                }
                cmd.with_path(Path::new(&value))
            }
            ArgKind::Text { prompt } => {
                let value = match (rest.is_empty(), prompt) {
                    (false, _) => rest.to_string(),
                    (true, Some(prompt)) => ask(prompt, input)?,
                    (true, None) => String::new(),
                };
                if value.is_empty() {
                    if prompt.is_some() {
                        return Ok(None);
                    }
                    cmd
                } else {
                    cmd.with_string(&value)
                }
            }
            ArgKind::Point { required } => match parse_floats(rest).as_slice() {
                [x, y, ..] => cmd.with_point(*x, *y),
                _ if required => {
                    eprintln!("{} needs X Y canvas coordinates", id);
                    return Ok(None);
                }
                _ => cmd,
            },
            ArgKind::Floats => cmd.with_floats(&parse_floats(rest)),
        };
        Ok(Some(cmd))
    }

    fn execute_line(&mut self, line: &str, input: &mut impl BufRead) -> io::Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        let (token, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let Some(id) = self.resolve(token) else {
            eprintln!("Unknown command or key: {}", token);
            return Ok(());
        };

        let Some(cmd) = self.build_command(&id, rest, input)? else {
            return Ok(());
        };

        if let Err(e) = self.dispatcher.dispatch(&mut self.state, &cmd) {
            tracing::error!("Command {} failed: {}", id, e);
            eprintln!("{}", e.user_message());
        }
        self.print_status();
        Ok(())
    }

    fn print_status(&mut self) {
        println!("{}", self.state.status_line());
        if let Some(rect) = self.state.crop_rect() {
            println!(
                "  crop selection ({:.0}, {:.0}) - ({:.0}, {:.0})",
                rect.min.x, rect.min.y, rect.max.x, rect.max.y
            );
        } else if self.state.crop_armed() {
            println!("  crop mode: drag with pointer.press / pointer.release, Escape cancels");
        }
        if self.state.view_state() == ViewState::Browsing {
            if let Some(bitmap) = self.state.rendered() {
                let Point { x, y } = bitmap.offset;
                tracing::debug!(
                    "Rendered {}x{} at ({:.1}, {:.1})",
                    bitmap.image.width(),
                    bitmap.image.height(),
                    x,
                    y
                );
            }
        }
    }
}

fn parse_floats(text: &str) -> Vec<f64> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect()
}

fn ask(prompt: &str, input: &mut impl BufRead) -> io::Result<String> {
    print!("{}: ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

/// Run the shell until `app.quit`, Escape outside crop mode, or end of input
pub fn run(config: AppConfig, initial_path: Option<&Path>) -> Result<()> {
    let mut shell = Shell::new(config);

    if let Some(path) = initial_path {
        if let Err(e) = shell.state.open_path(path) {
            tracing::error!("Cannot open {:?}: {}", path, e);
            eprintln!("{}", e.user_message());
        }
    }
    println!("{}", shell.state.window_title());
    shell.print_status();

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();

    while !shell.state.quit_requested() {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        shell.execute_line(&line, &mut input)?;
    }

    tracing::info!("Shell finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn shell_with_folder() -> (TempDir, Shell) {
        let dir = TempDir::new().unwrap();
        RgbImage::from_pixel(100, 200, Rgb([1, 2, 3])).save(dir.path().join("a.png")).unwrap();
        RgbImage::from_pixel(30, 10, Rgb([1, 2, 3])).save(dir.path().join("b.png")).unwrap();

        let mut shell = Shell::new(AppConfig::default());
        shell.state.set_canvas_size(app_core::Size::new(1000.0, 1000.0));
        shell.state.open_path(dir.path()).unwrap();
        (dir, shell)
    }

    #[test]
    fn test_key_names_resolve_through_bindings() {
        let (_dir, mut shell) = shell_with_folder();
        shell.execute_line("Right", &mut Cursor::new("")).unwrap();
        assert!(shell.state.status_line().starts_with("b.png  [2 of 2]"));
    }

    #[test]
    fn test_prompted_argument() {
        let (_dir, mut shell) = shell_with_folder();
        shell.execute_line("edit.resize", &mut Cursor::new("40x20\n")).unwrap();
        assert_eq!(shell.state.pipeline().working_size(), Some((40, 20)));
    }

    #[test]
    fn test_empty_prompt_answer_cancels() {
        let (_dir, mut shell) = shell_with_folder();
        shell.execute_line("Ctrl+Shift+s", &mut Cursor::new("\n")).unwrap();
        assert_eq!(shell.state.pipeline().working_size(), Some((100, 200)));
    }

    #[test]
    fn test_inline_point_arguments() {
        let (_dir, mut shell) = shell_with_folder();
        let mut input = Cursor::new("");
        shell.execute_line("c", &mut input).unwrap();
        shell.execute_line("pointer.press 300 100", &mut input).unwrap();
        shell.execute_line("pointer.release 500,600", &mut input).unwrap();
        assert_eq!(shell.state.pipeline().working_size(), Some((40, 100)));
    }

    #[test]
    fn test_escape_quits() {
        let (_dir, mut shell) = shell_with_folder();
        shell.execute_line("Escape", &mut Cursor::new("")).unwrap();
        assert!(shell.state.quit_requested());
    }

    #[test]
    fn test_parse_floats() {
        assert_eq!(parse_floats("1.5, 2  3"), vec![1.5, 2.0, 3.0]);
        assert!(parse_floats("").is_empty());
    }
}
