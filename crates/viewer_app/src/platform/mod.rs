mod app;
mod config;
mod console;
mod effects;
mod logging;
mod persistence;
mod theme;

pub use app::run_app;
