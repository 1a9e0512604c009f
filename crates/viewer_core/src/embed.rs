/// Manual retries allowed per URL.
pub const MAX_RETRIES: u32 = 3;

pub type NavId = u64;

/// What the host could observe about a failed frame load.
///
/// Cross-origin failures frequently surface with no detail at all, so hosts
/// should report `NoDetail` rather than guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFailure {
    /// Connection, DNS or TLS failure.
    Unreachable,
    /// The target refused framing (X-Frame-Options, CSP frame-ancestors, sandbox).
    Refused,
    TimedOut,
    NoDetail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedErrorKind {
    Network,
    Security,
    Timeout,
    Unknown,
}

impl EmbedErrorKind {
    pub fn classify(failure: FrameFailure) -> Self {
        match failure {
            FrameFailure::Unreachable => EmbedErrorKind::Network,
            FrameFailure::Refused => EmbedErrorKind::Security,
            FrameFailure::TimedOut => EmbedErrorKind::Timeout,
            FrameFailure::NoDetail => EmbedErrorKind::Unknown,
        }
    }

    pub fn retryable(self) -> bool {
        !matches!(self, EmbedErrorKind::Security)
    }

    pub fn message(self) -> &'static str {
        match self {
            EmbedErrorKind::Network => {
                "Network error. Please check your connection and the URL, then try again."
            }
            EmbedErrorKind::Security => {
                "This site cannot be displayed in a frame due to its security settings. Try opening it in a new tab instead."
            }
            EmbedErrorKind::Timeout => "The page took too long to load. Please try again.",
            EmbedErrorKind::Unknown => {
                "Failed to load the page. Please check the URL and try again."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedError {
    pub kind: EmbedErrorKind,
    pub retry_count: u32,
}

impl EmbedError {
    pub fn retryable(&self) -> bool {
        self.kind.retryable()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Errored(EmbedError),
}

/// Load tracking for the frame showing the current URL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmbedState {
    url: Option<String>,
    load: LoadState,
    nav_id: NavId,
    retry_count: u32,
}

impl EmbedState {
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn load(&self) -> LoadState {
        self.load
    }

    pub fn nav_id(&self) -> NavId {
        self.nav_id
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Starts a navigation to a new URL and resets the retry budget.
    pub(crate) fn navigate(&mut self, url: String) -> NavId {
        self.url = Some(url);
        self.retry_count = 0;
        self.begin_load()
    }

    fn begin_load(&mut self) -> NavId {
        self.nav_id += 1;
        self.load = LoadState::Loading;
        self.nav_id
    }

    /// Returns false when the report belongs to an older navigation.
    pub(crate) fn loaded(&mut self, nav_id: NavId) -> bool {
        if nav_id != self.nav_id || self.load != LoadState::Loading {
            return false;
        }
        self.load = LoadState::Loaded;
        true
    }

    pub(crate) fn failed(&mut self, nav_id: NavId, failure: FrameFailure) -> bool {
        if nav_id != self.nav_id || self.load != LoadState::Loading {
            return false;
        }
        self.load = LoadState::Errored(EmbedError {
            kind: EmbedErrorKind::classify(failure),
            retry_count: self.retry_count,
        });
        true
    }

    pub fn can_retry(&self) -> bool {
        match self.load {
            LoadState::Errored(err) => err.retryable() && self.retry_count < MAX_RETRIES,
            _ => false,
        }
    }

    /// Clears the error and reloads the same URL; `None` when retry is not allowed.
    pub(crate) fn retry(&mut self) -> Option<(String, NavId)> {
        if !self.can_retry() {
            return None;
        }
        let url = self.url.clone()?;
        self.retry_count += 1;
        Some((url, self.begin_load()))
    }

    pub(crate) fn dismiss(&mut self) -> bool {
        if matches!(self.load, LoadState::Errored(_)) {
            self.load = LoadState::Idle;
            true
        } else {
            false
        }
    }
}
