//! Tracing subscriber setup

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Install the global subscriber. `RUST_LOG` takes precedence over the configured level.
/// Only the first call has an effect.
pub fn init(config: &LoggingConfig) {
    static LOGGING_SETUP: Once = Once::new();

    LOGGING_SETUP.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("ferrovias={}", config.level)));

        let registry = tracing_subscriber::registry().with(filter);
        let result = if config.format == "json" {
            registry.with(fmt::layer().json()).try_init()
        } else {
            registry.with(fmt::layer().pretty()).try_init()
        };

        if let Err(e) = result {
            eprintln!("Logging already initialized: {e}");
        }
    });
}
