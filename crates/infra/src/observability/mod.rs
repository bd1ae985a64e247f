//! Tracing subscriber installation

use mople_domain::{LoggingConfig, MopleError, Result};
use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG` when set, otherwise from the configured directives.
///
/// # Errors
/// Returns `MopleError::Config` if the configured directives do not parse
pub fn filter_for(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter).map_err(|e| {
        MopleError::Config(format!("logging.filter '{}' is invalid: {e}", config.filter))
    })
}

/// Install the global fmt subscriber, human-readable or JSON.
///
/// Returns `false` when a global subscriber was already installed, in which
/// case nothing changes.
///
/// # Errors
/// Returns `MopleError::Config` if the filter directives do not parse
pub fn init_tracing(config: &LoggingConfig) -> Result<bool> {
    let filter = filter_for(config)?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let installed =
        if config.json { subscriber.json().try_init().is_ok() } else { subscriber.try_init().is_ok() };

    if installed {
        tracing::debug!(json = config.json, "Tracing initialized");
    }
    Ok(installed)
}
