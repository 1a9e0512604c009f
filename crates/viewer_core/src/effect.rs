use std::time::Duration;

use crate::{Generation, NavId, ResolvedTheme, ThemePreference};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Report `Msg::DebounceElapsed` for `generation` once `delay` has passed.
    ScheduleValidation {
        generation: Generation,
        delay: Duration,
    },
    /// Probe the URL and report `Msg::ReachabilityChecked`. Supersedes any earlier check.
    CheckReachability { generation: Generation, url: String },
    /// Point the sandboxed frame at `url`; load reports carry `nav_id`.
    NavigateFrame { nav_id: NavId, url: String },
    OpenInNewTab { url: String },
    DownloadPage { url: String },
    PersistTheme(ThemePreference),
    ApplyTheme(ResolvedTheme),
    SetFullscreen(bool),
}
