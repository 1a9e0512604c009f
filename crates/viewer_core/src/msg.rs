use std::path::PathBuf;

use crate::{FrameFailure, Generation, NavId, ThemePreference, ValidationResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the URL input box.
    InputChanged(String),
    /// The debounce timer for an input edit fired.
    DebounceElapsed { generation: Generation },
    /// Result of the network reachability check.
    ReachabilityChecked {
        generation: Generation,
        result: ValidationResult,
    },
    /// User submitted the current input.
    UrlSubmitted,
    /// Load a URL without going through the input box (startup bootstrap).
    LoadUrl(String),
    /// User picked an entry from the quick links menu.
    PresetSelected(usize),
    FrameLoaded { nav_id: NavId },
    FrameFailed { nav_id: NavId, failure: FrameFailure },
    RetryClicked,
    DismissErrorClicked,
    OpenInNewTabClicked,
    DownloadClicked,
    DownloadProgress(u8),
    /// Saved file path, or the error detail.
    DownloadFinished(Result<PathBuf, String>),
    DismissDownloadError,
    ThemeToggled,
    ThemeSelected(ThemePreference),
    /// The OS color-scheme signal changed.
    SystemThemeChanged { dark: bool },
    FullscreenToggled,
    /// Host reports the actual fullscreen state.
    FullscreenChanged(bool),
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
