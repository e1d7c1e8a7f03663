//! Logging initialization and configuration.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "shared_state_store=info";

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Try to initialize the logging system.
///
/// Uses the `RUST_LOG` environment variable for filtering. If not set,
/// defaults to `shared_state_store=info`.
///
/// Returns `Ok(())` if successful, or `Err` if logging has already been
/// initialized.
pub fn try_init() -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(default_filter())
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init()
}

/// Try to initialize logging with an explicit filter, e.g. from configuration.
///
/// A bare level such as `debug` is scoped to this crate; anything containing
/// a directive (`=` or `,`) is passed to [`EnvFilter`] unchanged.
pub fn try_init_with(level: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(filter_for(level))
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init()
}

fn filter_for(level: &str) -> EnvFilter {
    let directive = if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("shared_state_store={level}")
    };
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
