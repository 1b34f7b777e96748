use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::formatter::TickFormatter;

static SUBSCRIBER_INIT: std::sync::Once = std::sync::Once::new();

/// Configure and initialize logging for the application
pub fn setup_logging() {
    SUBSCRIBER_INIT.call_once(|| {
        // Allow RUST_LOG to override levels; default to debug for our crate and warn elsewhere
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("warn,{name}=debug", name = env!("CARGO_CRATE_NAME"))));

        let result = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().event_format(TickFormatter))
            .with(ErrorLayer::default())
            .try_init();

        if let Err(e) = result {
            eprintln!("Logging was already initialized: {e}");
        }
    });
}
