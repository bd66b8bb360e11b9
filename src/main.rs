use anyhow::Result;
use screen_pets::app::{AppContext, DISPLAY_POLL_INTERVAL};
use screen_pets::logging;
use screen_pets::pets::monitor::SystemDisplays;
use screen_pets::pets::Platform;
use screen_pets::settings_store;
use std::path::PathBuf;

fn main() -> Result<()> {
    let settings_path = match std::env::args_os().nth(1) {
        Some(path) => PathBuf::from(path),
        None => settings_store::resolve_settings_path()?,
    };
    let settings = settings_store::load_or_default(&settings_path)?;
    logging::init(settings.debug_logging, settings.log_file.clone());
    tracing::info!(path = %settings_path.display(), "screen pets starting");

    let mut app = AppContext::new(settings_path, settings, Platform::system());
    app.spawn_watchers(Box::new(SystemDisplays), DISPLAY_POLL_INTERVAL)?;
    if let Err(err) = app.start_if_enabled() {
        tracing::error!(?err, "failed to start screen pet");
    }
    app.run();
    app.shutdown();
    tracing::info!("screen pets exited");
    Ok(())
}
