//! Line-oriented console host: reads commands from stdin, prints the view.

use std::io::{self, Write};
use std::path::Path;
use std::process::Command;

use viewer_core::{
    AppViewModel, DownloadView, FrameView, Msg, ThemePreference, PRESET_LINKS,
};
use viewer_engine::{BlankContextOpener, BrowsingContext, FRAME_SANDBOX};
use viewer_logging::{viewer_info, viewer_warn};

/// What the host can show and switch on behalf of the effect runner.
pub trait Surface {
    fn render(&mut self, view: &AppViewModel);
    /// Point the embedded frame at `url`.
    fn show_frame(&mut self, url: &str);
    /// Returns the fullscreen state actually reached.
    fn set_fullscreen(&mut self, on: bool) -> bool;
}

/// A parsed line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Dispatch(Msg),
    /// Simulate an OS dark-mode change.
    SystemScheme { dark: bool },
    Help,
    Quit,
}

pub const HELP: &str = "\
Type a URL to edit the input, then :go to load it.
  :go              submit the current input
  :retry           retry a failed load
  :dismiss         dismiss the load error
  :open            open the current page in a new tab
  :download        save the current page
  :clear           dismiss the download error
  :theme [light|dark|system]
  :os light|dark   simulate an OS color-scheme change
  :full            toggle fullscreen
  :preset N        load a quick link
  :quit";

/// Lines starting with `:` are commands; anything else is input text.
pub fn parse_command(line: &str) -> Option<ConsoleCommand> {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(command) = line.strip_prefix(':') else {
        return Some(ConsoleCommand::Dispatch(Msg::InputChanged(line.to_string())));
    };

    let mut words = command.split_whitespace();
    let name = words.next()?;
    let arg = words.next();
    let msg = match (name, arg) {
        ("go", None) => Msg::UrlSubmitted,
        ("retry", None) => Msg::RetryClicked,
        ("dismiss", None) => Msg::DismissErrorClicked,
        ("open", None) => Msg::OpenInNewTabClicked,
        ("download", None) => Msg::DownloadClicked,
        ("clear", None) => Msg::DismissDownloadError,
        ("full", None) => Msg::FullscreenToggled,
        ("theme", None) => Msg::ThemeToggled,
        ("theme", Some(value)) => Msg::ThemeSelected(value.parse::<ThemePreference>().ok()?),
        ("preset", Some(value)) => Msg::PresetSelected(value.parse().ok()?),
        ("os", Some("dark")) => return Some(ConsoleCommand::SystemScheme { dark: true }),
        ("os", Some("light")) => return Some(ConsoleCommand::SystemScheme { dark: false }),
        ("help", None) => return Some(ConsoleCommand::Help),
        ("quit", None) | ("q", None) => return Some(ConsoleCommand::Quit),
        _ => return None,
    };
    Some(ConsoleCommand::Dispatch(msg))
}

/// Prints a status block for every dirty view.
pub struct ConsoleSurface<W: Write> {
    out: W,
    fullscreen: bool,
}

impl ConsoleSurface<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            fullscreen: false,
        }
    }

    pub fn print_presets(&mut self) {
        for (index, preset) in PRESET_LINKS.iter().enumerate() {
            let _ = writeln!(self.out, "  [{index}] {} {}", preset.label, preset.url);
        }
    }

    pub fn print(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Surface for ConsoleSurface<W> {
    fn render(&mut self, view: &AppViewModel) {
        let lines = render_lines(view);
        for line in lines {
            let _ = writeln!(self.out, "{line}");
        }
        let _ = self.out.flush();
    }

    fn show_frame(&mut self, url: &str) {
        let _ = writeln!(self.out, "frame -> {url} [sandbox: {FRAME_SANDBOX}]");
    }

    fn set_fullscreen(&mut self, on: bool) -> bool {
        self.fullscreen = on;
        self.fullscreen
    }
}

fn render_lines(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    let marker = match (view.checking, view.input_valid) {
        (true, _) => "…",
        (false, Some(true)) => "✓",
        (false, Some(false)) => "✗",
        (false, None) => " ",
    };
    lines.push(format!("url [{marker}] {}", view.input));
    if let Some(message) = &view.validation_message {
        lines.push(format!("    {message}"));
    }

    match &view.frame {
        FrameView::Empty => lines.push("Enter a URL above to get started.".to_string()),
        FrameView::Loading => lines.push(format!(
            "loading {}",
            view.current_url.as_deref().unwrap_or_default()
        )),
        FrameView::Showing => lines.push(format!(
            "showing {}",
            view.current_url.as_deref().unwrap_or_default()
        )),
        FrameView::Error {
            message,
            can_retry,
            retries_left,
        } => {
            lines.push(format!("error: {message}"));
            if *can_retry {
                lines.push(format!("    :retry ({retries_left} left) or :dismiss"));
            } else {
                lines.push("    :dismiss".to_string());
            }
        }
    }

    match &view.download {
        DownloadView::Idle => {}
        DownloadView::InProgress { percent } => lines.push(format!("download {percent}%")),
        DownloadView::Saved { path } => lines.push(format!("saved {}", path.display())),
        DownloadView::Error { message, detail } => {
            lines.push(format!("download: {message}"));
            lines.push(format!("    ({detail})"));
        }
    }

    lines.push(format!(
        "theme {} ({:?}){}",
        view.theme_preference,
        view.resolved_theme,
        if view.fullscreen { " fullscreen" } else { "" }
    ));
    lines
}

/// Writes new-tab documents to a temp `.html` file and hands it to the
/// system browser.
pub struct SystemBrowserOpener {
    enabled: bool,
}

impl SystemBrowserOpener {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl BlankContextOpener for SystemBrowserOpener {
    fn open_blank(&self) -> Option<Box<dyn BrowsingContext>> {
        if self.enabled {
            Some(Box::new(TempDocument))
        } else {
            None
        }
    }
}

struct TempDocument;

impl BrowsingContext for TempDocument {
    fn write_document(&mut self, html: &str) -> io::Result<()> {
        let mut file = tempfile::Builder::new()
            .prefix("viewer-tab-")
            .suffix(".html")
            .tempfile()?;
        file.write_all(html.as_bytes())?;
        file.flush()?;
        let (_, path) = file.keep().map_err(|err| err.error)?;

        match launcher(&path).spawn() {
            Ok(_) => viewer_info!("Opened new tab document {:?}", path),
            Err(err) => viewer_warn!("No browser for {:?}: {}", path, err),
        }
        Ok(())
    }
}

#[cfg(target_os = "windows")]
fn launcher(path: &Path) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]).arg(path);
    command
}

#[cfg(target_os = "macos")]
fn launcher(path: &Path) -> Command {
    let mut command = Command::new("open");
    command.arg(path);
    command
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn launcher(path: &Path) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(path);
    command
}
