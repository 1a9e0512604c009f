use std::io::{self, BufRead};
use std::path::Path;
use std::sync::{mpsc, Arc};
use std::thread;

use anyhow::Context;
use viewer_core::{update, url_from_location, AppState, Msg};
use viewer_engine::EngineHandle;
use viewer_logging::{viewer_info, viewer_warn};

use super::config::{ViewerConfig, CONFIG_FILENAME};
use super::console::{parse_command, ConsoleCommand, ConsoleSurface, SystemBrowserOpener, HELP};
use super::effects::EffectRunner;
use super::logging;
use super::persistence::ThemeStore;
use super::theme::{ManualColorScheme, ThemeController};

/// Everything the dispatch loop reacts to.
#[derive(Debug)]
pub enum HostEvent {
    Dispatch(Msg),
    Quit,
}

/// Runs the console viewer. The first argument, if any, is treated as the
/// launch address; its `url` query parameter is loaded at startup.
pub fn run_app() -> anyhow::Result<()> {
    let (config, config_err) = match ViewerConfig::load(Path::new(CONFIG_FILENAME)) {
        Ok(config) => (config, None),
        Err(err) => (ViewerConfig::default(), Some(err)),
    };
    logging::initialize(config.log_destination);
    if let Some(err) = config_err {
        viewer_warn!("Using default configuration: {}", err);
    }

    let (events_tx, events_rx) = mpsc::channel::<HostEvent>();

    let scheme = ManualColorScheme::new(config.system_dark);
    let (theme, theme_settings) = ThemeController::init(
        ThemeStore::new(config.prefs_path.clone()),
        Arc::new(scheme.clone()),
        events_tx.clone(),
    );

    let mut state = AppState::new()
        .with_rules(config.validation_rules())
        .with_theme(theme_settings)
        .with_debounce(config.debounce());

    let mut surface = ConsoleSurface::stdout();
    surface.print(HELP);
    surface.print_presets();

    let mut runner = EffectRunner::new(
        EngineHandle::new(config.engine_config()),
        Box::new(SystemBrowserOpener::new(config.open_in_browser)),
        theme,
        surface,
        events_tx.clone(),
    );
    runner.render(&state.view());

    if let Some(url) = std::env::args().nth(1).and_then(|loc| url_from_location(&loc)) {
        viewer_info!("Bootstrapping with {}", url);
        let _ = events_tx.send(HostEvent::Dispatch(Msg::LoadUrl(url)));
    }

    spawn_input_reader(events_tx, scheme).context("failed to start console input thread")?;

    while let Ok(event) = events_rx.recv() {
        let msg = match event {
            HostEvent::Dispatch(msg) => msg,
            HostEvent::Quit => break,
        };
        let (next, effects) = update(state, msg);
        state = next;
        runner.enqueue(effects);
        if state.consume_dirty() {
            runner.render(&state.view());
        }
    }

    viewer_info!("Viewer shutting down");
    Ok(())
}

fn spawn_input_reader(
    events: mpsc::Sender<HostEvent>,
    scheme: ManualColorScheme,
) -> io::Result<()> {
    thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                let event = match parse_command(&line) {
                    Some(ConsoleCommand::Dispatch(msg)) => HostEvent::Dispatch(msg),
                    Some(ConsoleCommand::SystemScheme { dark }) => {
                        scheme.set_dark(dark);
                        continue;
                    }
                    Some(ConsoleCommand::Help) => {
                        println!("{HELP}");
                        continue;
                    }
                    Some(ConsoleCommand::Quit) => break,
                    None => {
                        println!("unknown command; :help lists them");
                        continue;
                    }
                };
                if events.send(event).is_err() {
                    return;
                }
            }
            let _ = events.send(HostEvent::Quit);
        })?;
    Ok(())
}
