//! PhotoSieve - keyboard-driven photo culling
//!
//! Main entry point. Usage: `photo_sieve [FOLDER]`

mod app;
mod views;

use anyhow::Result;
use std::io;
use std::path::PathBuf;

fn main() -> Result<()> {
    // Initialize logging and panic hook first
    let _log_guard = app_log::init()?;

    tracing::info!("PhotoSieve starting...");

    // Load configuration
    let config = match app_core::AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Failed to load configuration, using defaults: {}", e);
            app_core::AppConfig::default()
        }
    };

    if let Err(e) = app_log::cleanup_old_logs(config.general.log_retention_days) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    let initial_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.most_recent_folder());

    let stdin = io::stdin();
    let mut app = app::App::new(config, stdin.lock(), io::stdout());
    let exit = app.run(initial_dir)?;
    tracing::info!("Exiting: {:?}", exit);

    if let Err(e) = app.config().save() {
        tracing::warn!("Failed to save configuration: {}", e);
    }

    Ok(())
}
