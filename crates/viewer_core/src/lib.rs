//! Viewer core: pure state machine, URL rules and view-model helpers.
mod address;
mod effect;
mod embed;
mod msg;
mod state;
mod theme;
mod update;
mod view_model;

pub use address::{
    is_valid_url, normalize_url, url_from_location, validate_url, ValidationError,
    ValidationResult, ValidationRules,
};
pub use effect::Effect;
pub use embed::{
    EmbedError, EmbedErrorKind, EmbedState, FrameFailure, LoadState, NavId, MAX_RETRIES,
};
pub use msg::Msg;
pub use state::{
    AppState, DownloadStatus, Generation, PresetLink, ValidationStatus, DOWNLOAD_FAILED_HINT,
    PRESET_LINKS, VALIDATION_DEBOUNCE,
};
pub use theme::{
    resolve_theme, ResolvedTheme, ThemePreference, ThemeSettings, UnknownTheme, DARK_CLASS,
    THEME_KEY,
};
pub use update::update;
pub use view_model::{AppViewModel, DownloadView, FrameView};
