use std::path::PathBuf;
use std::time::Duration;

use crate::address::{ValidationResult, ValidationRules};
use crate::embed::EmbedState;
use crate::theme::ThemeSettings;
use crate::view_model::{AppViewModel, DownloadView, FrameView};
use crate::{LoadState, MAX_RETRIES};

/// Pause after the last keystroke before the input is validated.
pub const VALIDATION_DEBOUNCE: Duration = Duration::from_millis(500);

pub const DOWNLOAD_FAILED_HINT: &str = "Download failed. This website may block downloads due to security restrictions (CORS). Try using \"Open in New Tab\" instead.";

/// Monotonic counter identifying the latest input edit.
pub type Generation = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetLink {
    pub label: &'static str,
    pub url: &'static str,
}

pub const PRESET_LINKS: &[PresetLink] = &[PresetLink {
    label: "Games",
    url: "https://sz-games.github.io",
}];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValidationStatus {
    #[default]
    Empty,
    /// Waiting for the debounce timer.
    Pending,
    /// Waiting for the reachability check.
    Checking,
    Done(ValidationResult),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DownloadStatus {
    #[default]
    Idle,
    InProgress { percent: u8 },
    Completed { path: PathBuf },
    Failed { detail: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    input: String,
    candidate: String,
    validation: ValidationStatus,
    generation: Generation,
    rules: ValidationRules,
    debounce: Duration,
    embed: EmbedState,
    theme: ThemeSettings,
    download: DownloadStatus,
    fullscreen: bool,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            input: String::new(),
            candidate: String::new(),
            validation: ValidationStatus::Empty,
            generation: 0,
            rules: ValidationRules::default(),
            debounce: VALIDATION_DEBOUNCE,
            embed: EmbedState::default(),
            theme: ThemeSettings::default(),
            download: DownloadStatus::Idle,
            fullscreen: false,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_theme(mut self, theme: ThemeSettings) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn current_url(&self) -> Option<&str> {
        self.embed.url()
    }

    pub fn validation(&self) -> &ValidationStatus {
        &self.validation
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn embed(&self) -> &EmbedState {
        &self.embed
    }

    pub fn theme(&self) -> &ThemeSettings {
        &self.theme
    }

    pub fn download(&self) -> &DownloadStatus {
        &self.download
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn view(&self) -> AppViewModel {
        let (input_valid, validation_message) = match &self.validation {
            ValidationStatus::Done(ValidationResult::Valid) => (Some(true), None),
            ValidationStatus::Done(ValidationResult::Invalid(err)) => {
                (Some(false), Some(err.message()))
            }
            ValidationStatus::Empty | ValidationStatus::Pending | ValidationStatus::Checking => {
                (None, None)
            }
        };

        let frame = match (self.embed.url(), self.embed.load()) {
            (None, _) => FrameView::Empty,
            (Some(_), LoadState::Loading) => FrameView::Loading,
            (Some(_), LoadState::Idle | LoadState::Loaded) => FrameView::Showing,
            (Some(_), LoadState::Errored(err)) => FrameView::Error {
                message: err.kind.message().to_string(),
                can_retry: self.embed.can_retry(),
                retries_left: MAX_RETRIES.saturating_sub(self.embed.retry_count()),
            },
        };

        let download = match &self.download {
            DownloadStatus::Idle => DownloadView::Idle,
            DownloadStatus::InProgress { percent } => DownloadView::InProgress { percent: *percent },
            DownloadStatus::Completed { path } => DownloadView::Saved { path: path.clone() },
            DownloadStatus::Failed { detail } => DownloadView::Error {
                message: DOWNLOAD_FAILED_HINT.to_string(),
                detail: detail.clone(),
            },
        };

        let has_url = self.embed.url().is_some();
        let downloading = matches!(self.download, DownloadStatus::InProgress { .. });

        AppViewModel {
            input: self.input.clone(),
            input_valid,
            validation_message,
            checking: self.validation == ValidationStatus::Checking,
            can_submit: input_valid == Some(true),
            current_url: self.embed.url().map(ToOwned::to_owned),
            frame,
            can_open_in_new_tab: has_url,
            can_download: has_url && !downloading,
            download,
            theme_preference: self.theme.preference(),
            resolved_theme: self.theme.resolved(),
            fullscreen: self.fullscreen,
            dirty: self.dirty,
        }
    }

    /// Returns whether the view changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Stores new input text and returns the generation it belongs to.
    pub(crate) fn set_input(&mut self, text: String) -> Generation {
        self.candidate = crate::address::normalize_url(&text);
        self.input = text;
        self.generation += 1;
        self.validation = if self.candidate.is_empty() {
            ValidationStatus::Empty
        } else {
            ValidationStatus::Pending
        };
        self.mark_dirty();
        self.generation
    }

    pub(crate) fn candidate(&self) -> &str {
        &self.candidate
    }

    pub(crate) fn rules(&self) -> ValidationRules {
        self.rules
    }

    pub(crate) fn debounce(&self) -> Duration {
        self.debounce
    }

    pub(crate) fn set_validation(&mut self, status: ValidationStatus) {
        if self.validation != status {
            self.validation = status;
            self.mark_dirty();
        }
    }

    pub(crate) fn embed_mut(&mut self) -> &mut EmbedState {
        &mut self.embed
    }

    pub(crate) fn theme_mut(&mut self) -> &mut ThemeSettings {
        &mut self.theme
    }

    pub(crate) fn set_download(&mut self, status: DownloadStatus) {
        if self.download != status {
            self.download = status;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_fullscreen(&mut self, fullscreen: bool) {
        if self.fullscreen != fullscreen {
            self.fullscreen = fullscreen;
            self.mark_dirty();
        }
    }
}
