use std::path::PathBuf;

use crate::{ResolvedTheme, ThemePreference};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub input: String,
    /// `None` while the input is empty or still being checked.
    pub input_valid: Option<bool>,
    pub validation_message: Option<String>,
    pub checking: bool,
    pub can_submit: bool,
    pub current_url: Option<String>,
    pub frame: FrameView,
    pub can_open_in_new_tab: bool,
    pub can_download: bool,
    pub download: DownloadView,
    pub theme_preference: ThemePreference,
    pub resolved_theme: ResolvedTheme,
    pub fullscreen: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FrameView {
    /// No URL yet; show the getting-started placeholder.
    #[default]
    Empty,
    Loading,
    Showing,
    Error {
        message: String,
        can_retry: bool,
        retries_left: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DownloadView {
    #[default]
    Idle,
    InProgress { percent: u8 },
    Saved { path: PathBuf },
    /// `message` is the user hint; `detail` is what actually went wrong.
    Error { message: String, detail: String },
}
