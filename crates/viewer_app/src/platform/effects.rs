use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use viewer_core::{AppViewModel, Effect, FrameFailure, Msg, ValidationError, ValidationResult};
use viewer_engine::{
    open_in_new_tab, BlankContextOpener, EngineEvent, EngineHandle, FrameProbe, Reachability,
};
use viewer_logging::{viewer_debug, viewer_info, viewer_warn};

use super::app::HostEvent;
use super::console::Surface;
use super::theme::ThemeController;

const EVENT_POLL: Duration = Duration::from_millis(20);

/// Carries out core effects against the engine and the host.
pub struct EffectRunner<S: Surface> {
    engine: EngineHandle,
    opener: Box<dyn BlankContextOpener>,
    theme: ThemeController,
    surface: S,
    events: mpsc::Sender<HostEvent>,
    stop: Arc<AtomicBool>,
    forwarder: Option<JoinHandle<()>>,
}

impl<S: Surface> EffectRunner<S> {
    pub fn new(
        engine: EngineHandle,
        opener: Box<dyn BlankContextOpener>,
        theme: ThemeController,
        surface: S,
        events: mpsc::Sender<HostEvent>,
    ) -> Self {
        let mut runner = Self {
            engine,
            opener,
            theme,
            surface,
            events,
            stop: Arc::new(AtomicBool::new(false)),
            forwarder: None,
        };
        runner.forwarder = Some(runner.spawn_event_loop());
        runner
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ScheduleValidation { generation, delay } => {
                    self.engine.schedule_validation(generation, delay);
                }
                Effect::CheckReachability { generation, url } => {
                    viewer_debug!("CheckReachability generation={} url={}", generation, url);
                    self.engine.check_reachability(generation, url);
                }
                Effect::NavigateFrame { nav_id, url } => {
                    viewer_info!("NavigateFrame nav_id={} url={}", nav_id, url);
                    self.surface.show_frame(&url);
                    self.engine.probe_frame(nav_id, url);
                }
                Effect::OpenInNewTab { url } => {
                    open_in_new_tab(self.opener.as_ref(), &url);
                }
                Effect::DownloadPage { url } => {
                    viewer_info!("DownloadPage url={}", url);
                    self.engine.download(url);
                }
                Effect::PersistTheme(preference) => self.theme.persist(preference),
                Effect::ApplyTheme(resolved) => self.theme.apply(resolved),
                Effect::SetFullscreen(on) => {
                    let actual = self.surface.set_fullscreen(on);
                    self.send(Msg::FullscreenChanged(actual));
                }
            }
        }
    }

    pub fn render(&mut self, view: &AppViewModel) {
        self.surface.render(view);
    }

    #[cfg(test)]
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[cfg(test)]
    pub fn theme(&self) -> &ThemeController {
        &self.theme
    }

    fn send(&self, msg: Msg) {
        let _ = self.events.send(HostEvent::Dispatch(msg));
    }

    /// Forwards engine events until the runner is dropped. The thread holds an
    /// engine handle, so the engine lives exactly as long as the runner.
    fn spawn_event_loop(&self) -> JoinHandle<()> {
        let engine = self.engine.clone();
        let events = self.events.clone();
        let stop = self.stop.clone();
        thread::spawn(move || loop {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            let Some(event) = engine.try_recv() else {
                thread::sleep(EVENT_POLL);
                continue;
            };
            if events.send(HostEvent::Dispatch(map_event(event))).is_err() {
                break;
            }
        })
    }
}

impl<S: Surface> Drop for EffectRunner<S> {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(forwarder) = self.forwarder.take() {
            if forwarder.join().is_err() {
                viewer_warn!("Engine event forwarder panicked");
            }
        }
    }
}

pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::DebounceElapsed { generation } => Msg::DebounceElapsed { generation },
        EngineEvent::ReachabilityChecked {
            generation,
            outcome,
        } => Msg::ReachabilityChecked {
            generation,
            result: map_reachability(outcome),
        },
        EngineEvent::FrameProbed { nav_id, outcome } => match map_probe(outcome) {
            None => Msg::FrameLoaded { nav_id },
            Some(failure) => Msg::FrameFailed { nav_id, failure },
        },
        EngineEvent::DownloadProgress(percent) => Msg::DownloadProgress(percent),
        EngineEvent::DownloadCompleted(result) => Msg::DownloadFinished(result.map_err(|err| {
            viewer_warn!("Download failed: {}", err);
            err.to_string()
        })),
    }
}

fn map_reachability(outcome: Reachability) -> ValidationResult {
    match outcome {
        Reachability::Reachable { .. } => ValidationResult::Valid,
        Reachability::TimedOut => ValidationResult::Invalid(ValidationError::Timeout),
        Reachability::Unreachable { detail } => {
            ValidationResult::Invalid(ValidationError::Unreachable(detail))
        }
    }
}

/// `None` means the frame loaded.
fn map_probe(outcome: FrameProbe) -> Option<FrameFailure> {
    match outcome {
        FrameProbe::Loaded => None,
        FrameProbe::Unreachable => Some(FrameFailure::Unreachable),
        FrameProbe::Refused { reason } => {
            viewer_info!("Frame refused: {}", reason);
            Some(FrameFailure::Refused)
        }
        FrameProbe::TimedOut => Some(FrameFailure::TimedOut),
        FrameProbe::NoDetail { .. } => Some(FrameFailure::NoDetail),
    }
}
