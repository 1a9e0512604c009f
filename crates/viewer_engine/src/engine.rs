use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use viewer_logging::{viewer_debug, viewer_error};

use crate::download::{download_page, ChannelProgressSink};
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::persist::AtomicFileWriter;
use crate::probe::{check_reachability, probe_frame};
use crate::{EngineEvent, Generation, NavId};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Clone)]
pub struct EngineConfig {
    pub fetch: FetchSettings,
    /// Where downloaded pages are written.
    pub output_dir: PathBuf,
    pub now_utc: Clock,
}

impl EngineConfig {
    pub fn default_with_output(output_dir: PathBuf) -> Self {
        Self {
            fetch: FetchSettings::default(),
            output_dir,
            now_utc: Arc::new(Utc::now),
        }
    }
}

enum EngineCommand {
    Debounce {
        generation: Generation,
        delay: Duration,
    },
    CheckReachability {
        generation: Generation,
        url: String,
    },
    ProbeFrame {
        nav_id: NavId,
        url: String,
    },
    Download {
        url: String,
    },
}

/// Runs IO on a tokio runtime owned by a background thread.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Self {
        let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(config.fetch.clone()));
        Self::with_fetcher(config, fetcher)
    }

    pub fn with_fetcher(config: EngineConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || run_engine(config, fetcher, cmd_rx, event_tx));

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    /// Restarts the debounce timer; the previous one never fires.
    pub fn schedule_validation(&self, generation: Generation, delay: Duration) {
        self.send(EngineCommand::Debounce { generation, delay });
    }

    /// Starts a reachability check, cancelling any check still in flight.
    pub fn check_reachability(&self, generation: Generation, url: impl Into<String>) {
        self.send(EngineCommand::CheckReachability {
            generation,
            url: url.into(),
        });
    }

    pub fn probe_frame(&self, nav_id: NavId, url: impl Into<String>) {
        self.send(EngineCommand::ProbeFrame {
            nav_id,
            url: url.into(),
        });
    }

    pub fn download(&self, url: impl Into<String>) {
        self.send(EngineCommand::Download { url: url.into() });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            viewer_error!("Engine thread is gone; command dropped");
        }
    }
}

fn run_engine(
    config: EngineConfig,
    fetcher: Arc<dyn Fetcher>,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            viewer_error!("Failed to start engine runtime: {}", err);
            return;
        }
    };
    let writer = AtomicFileWriter::new(config.output_dir.clone());
    let mut pending_debounce: Option<CancellationToken> = None;
    let mut pending_check: Option<CancellationToken> = None;

    while let Ok(command) = cmd_rx.recv() {
        let event_tx = event_tx.clone();
        match command {
            EngineCommand::Debounce { generation, delay } => {
                let token = supersede(&mut pending_debounce);
                runtime.spawn(async move {
                    tokio::select! {
                        _ = token.cancelled() => {}
                        _ = tokio::time::sleep(delay) => {
                            let _ = event_tx.send(EngineEvent::DebounceElapsed { generation });
                        }
                    }
                });
            }
            EngineCommand::CheckReachability { generation, url } => {
                let token = supersede(&mut pending_check);
                let fetcher = fetcher.clone();
                runtime.spawn(async move {
                    if let Some(outcome) =
                        check_reachability(fetcher.as_ref(), &url, &token).await
                    {
                        let _ = event_tx.send(EngineEvent::ReachabilityChecked {
                            generation,
                            outcome,
                        });
                    }
                });
            }
            EngineCommand::ProbeFrame { nav_id, url } => {
                let fetcher = fetcher.clone();
                runtime.spawn(async move {
                    let outcome = probe_frame(fetcher.as_ref(), &url).await;
                    viewer_debug!("Frame probe nav_id={} -> {:?}", nav_id, outcome);
                    let _ = event_tx.send(EngineEvent::FrameProbed { nav_id, outcome });
                });
            }
            EngineCommand::Download { url } => {
                let fetcher = fetcher.clone();
                let writer = writer.clone();
                let now = (config.now_utc)();
                runtime.spawn(async move {
                    let sink = ChannelProgressSink::new(event_tx.clone());
                    let result = download_page(fetcher.as_ref(), &url, &writer, now, &sink).await;
                    let _ = event_tx.send(EngineEvent::DownloadCompleted(result));
                });
            }
        }
    }
}

/// Cancels the previous token in `slot` and installs a fresh one.
fn supersede(slot: &mut Option<CancellationToken>) -> CancellationToken {
    let token = CancellationToken::new();
    if let Some(previous) = slot.replace(token.clone()) {
        previous.cancel();
    }
    token
}
