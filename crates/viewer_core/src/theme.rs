use std::fmt;
use std::str::FromStr;

/// Key under which the preference is persisted.
pub const THEME_KEY: &str = "theme";

/// Class toggled on the document root when the dark theme is applied.
pub const DARK_CLASS: &str = "dark";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePreference {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
            ThemePreference::System => "system",
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTheme(pub String);

impl fmt::Display for UnknownTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown theme preference {:?}", self.0)
    }
}

impl std::error::Error for UnknownTheme {}

impl FromStr for ThemePreference {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            "system" => Ok(ThemePreference::System),
            other => Err(UnknownTheme(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolvedTheme {
    #[default]
    Light,
    Dark,
}

impl ResolvedTheme {
    pub fn is_dark(self) -> bool {
        self == ResolvedTheme::Dark
    }
}

pub fn resolve_theme(preference: ThemePreference, system_dark: bool) -> ResolvedTheme {
    match preference {
        ThemePreference::Light => ResolvedTheme::Light,
        ThemePreference::Dark => ResolvedTheme::Dark,
        ThemePreference::System if system_dark => ResolvedTheme::Dark,
        ThemePreference::System => ResolvedTheme::Light,
    }
}

/// Preference plus the last OS signal seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThemeSettings {
    preference: ThemePreference,
    system_dark: bool,
}

impl ThemeSettings {
    pub fn new(preference: ThemePreference, system_dark: bool) -> Self {
        Self {
            preference,
            system_dark,
        }
    }

    pub fn preference(&self) -> ThemePreference {
        self.preference
    }

    pub fn system_dark(&self) -> bool {
        self.system_dark
    }

    pub fn resolved(&self) -> ResolvedTheme {
        resolve_theme(self.preference, self.system_dark)
    }

    /// Flips the applied theme into an explicit preference. Never yields `System`.
    pub fn toggle(&mut self) -> ThemePreference {
        self.preference = match self.resolved() {
            ResolvedTheme::Dark => ThemePreference::Light,
            ResolvedTheme::Light => ThemePreference::Dark,
        };
        self.preference
    }

    pub fn set_preference(&mut self, preference: ThemePreference) {
        self.preference = preference;
    }

    /// Records a new OS signal. Returns the new resolved theme if it changed.
    pub fn set_system_dark(&mut self, dark: bool) -> Option<ResolvedTheme> {
        let before = self.resolved();
        self.system_dark = dark;
        let after = self.resolved();
        (before != after).then_some(after)
    }
}
