use anyhow::Result;
use powerpac::config::load_config;
use powerpac::logging::setup_logging;
use tracing::info;

use crate::app::App;

mod app;

fn main() -> Result<()> {
    setup_logging();

    let config = load_config()?;
    info!(
        character = config.character.as_ref(),
        seed = ?config.seed,
        "Configuration loaded"
    );

    let mut app = App::new(config)?;
    app.run()?;

    info!("Exiting");
    Ok(())
}
