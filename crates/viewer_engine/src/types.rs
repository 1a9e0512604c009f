use std::fmt;
use std::path::PathBuf;

use crate::download::DownloadError;

/// Input-edit generation, mirrored from the core.
pub type Generation = u64;
/// Frame navigation id, mirrored from the core.
pub type NavId = u64;

#[derive(Debug)]
pub enum EngineEvent {
    DebounceElapsed {
        generation: Generation,
    },
    ReachabilityChecked {
        generation: Generation,
        outcome: Reachability,
    },
    FrameProbed {
        nav_id: NavId,
        outcome: FrameProbe,
    },
    DownloadProgress(u8),
    DownloadCompleted(Result<PathBuf, DownloadError>),
}

/// Outcome of the HEAD check behind optional URL validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reachability {
    /// The server answered. Any status counts; the page may still embed.
    Reachable { status: u16 },
    TimedOut,
    Unreachable { detail: String },
}

/// What a native load of the frame target revealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameProbe {
    Loaded,
    Unreachable,
    Refused { reason: String },
    TimedOut,
    /// The server answered with something other than a page, without saying why.
    NoDetail { status: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

/// Response head used to decide whether a page allows framing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseHead {
    pub status: u16,
    pub x_frame_options: Option<String>,
    pub content_security_policy: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
