use crate::address::{normalize_url, validate_url, ValidationResult};
use crate::state::{DownloadStatus, ValidationStatus, PRESET_LINKS};
use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            let generation = state.set_input(text);
            if state.candidate().is_empty() {
                Vec::new()
            } else {
                vec![Effect::ScheduleValidation {
                    generation,
                    delay: state.debounce(),
                }]
            }
        }
        Msg::DebounceElapsed { generation } => {
            // A newer edit restarted the timer; this one is stale.
            if generation != state.generation() || *state.validation() != ValidationStatus::Pending
            {
                return (state, Vec::new());
            }
            let rules = state.rules();
            match validate_url(state.candidate(), rules) {
                None => {
                    state.set_validation(ValidationStatus::Empty);
                    Vec::new()
                }
                Some(ValidationResult::Valid) if rules.check_reachability => {
                    state.set_validation(ValidationStatus::Checking);
                    vec![Effect::CheckReachability {
                        generation,
                        url: state.candidate().to_string(),
                    }]
                }
                Some(result) => {
                    state.set_validation(ValidationStatus::Done(result));
                    Vec::new()
                }
            }
        }
        Msg::ReachabilityChecked { generation, result } => {
            if generation == state.generation()
                && *state.validation() == ValidationStatus::Checking
            {
                state.set_validation(ValidationStatus::Done(result));
            }
            Vec::new()
        }
        Msg::UrlSubmitted => {
            if *state.validation() != ValidationStatus::Done(ValidationResult::Valid) {
                return (state, Vec::new());
            }
            let url = state.candidate().to_string();
            navigate(&mut state, url)
        }
        Msg::LoadUrl(raw) => {
            let url = normalize_url(&raw);
            if url.is_empty() {
                Vec::new()
            } else {
                navigate(&mut state, url)
            }
        }
        Msg::PresetSelected(index) => match PRESET_LINKS.get(index) {
            Some(link) => navigate(&mut state, link.url.to_string()),
            None => Vec::new(),
        },
        Msg::FrameLoaded { nav_id } => {
            if state.embed_mut().loaded(nav_id) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::FrameFailed { nav_id, failure } => {
            if state.embed_mut().failed(nav_id, failure) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::RetryClicked => match state.embed_mut().retry() {
            Some((url, nav_id)) => {
                state.mark_dirty();
                vec![Effect::NavigateFrame { nav_id, url }]
            }
            None => Vec::new(),
        },
        Msg::DismissErrorClicked => {
            if state.embed_mut().dismiss() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::OpenInNewTabClicked => match state.current_url() {
            Some(url) => vec![Effect::OpenInNewTab {
                url: url.to_string(),
            }],
            None => Vec::new(),
        },
        Msg::DownloadClicked => {
            let busy = matches!(state.download(), DownloadStatus::InProgress { .. });
            match state.current_url().map(ToOwned::to_owned) {
                Some(url) if !busy => {
                    state.set_download(DownloadStatus::InProgress { percent: 0 });
                    vec![Effect::DownloadPage { url }]
                }
                _ => Vec::new(),
            }
        }
        Msg::DownloadProgress(percent) => {
            if matches!(state.download(), DownloadStatus::InProgress { .. }) {
                state.set_download(DownloadStatus::InProgress {
                    percent: percent.min(100),
                });
            }
            Vec::new()
        }
        Msg::DownloadFinished(result) => {
            state.set_download(match result {
                Ok(path) => DownloadStatus::Completed { path },
                Err(detail) => DownloadStatus::Failed { detail },
            });
            Vec::new()
        }
        Msg::DismissDownloadError => {
            if matches!(state.download(), DownloadStatus::Failed { .. }) {
                state.set_download(DownloadStatus::Idle);
            }
            Vec::new()
        }
        Msg::ThemeToggled => {
            let preference = state.theme_mut().toggle();
            state.mark_dirty();
            vec![
                Effect::PersistTheme(preference),
                Effect::ApplyTheme(state.theme().resolved()),
            ]
        }
        Msg::ThemeSelected(preference) => {
            state.theme_mut().set_preference(preference);
            state.mark_dirty();
            vec![
                Effect::PersistTheme(preference),
                Effect::ApplyTheme(state.theme().resolved()),
            ]
        }
        Msg::SystemThemeChanged { dark } => match state.theme_mut().set_system_dark(dark) {
            Some(resolved) => {
                state.mark_dirty();
                vec![Effect::ApplyTheme(resolved)]
            }
            None => Vec::new(),
        },
        Msg::FullscreenToggled => vec![Effect::SetFullscreen(!state.is_fullscreen())],
        Msg::FullscreenChanged(fullscreen) => {
            state.set_fullscreen(fullscreen);
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn navigate(state: &mut AppState, url: String) -> Vec<Effect> {
    let nav_id = state.embed_mut().navigate(url.clone());
    state.mark_dirty();
    vec![Effect::NavigateFrame { nav_id, url }]
}
