//! Binary entry point: read the configuration, start logging, open the
//! settings store and drive the Ratatui event loop until the user exits.
use invoice_generator::{logging, open_store, run_app, App, AppConfig, SystemClock};
use tracing::info;

/// Fatal setup problems (an unwritable data directory, a broken database
/// file) are returned to the terminal instead of panicking.
fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    logging::init(&config)?;
    info!(data_dir = %config.data_dir.display(), "starting invoice generator");

    let store = open_store(&config)?;
    let mut app = App::new(store, SystemClock, &config);
    run_app(&mut app)
}
