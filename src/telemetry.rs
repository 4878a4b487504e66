//! Log subscriber initialization.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` directives take precedence; `default_level` is used when it is
/// unset. `format` is `"json"` for one JSON object per line, anything else
/// for human-readable text.
///
/// # Errors
///
/// Returns an error if `default_level` is not a valid filter directive or a
/// subscriber is already installed.
pub fn init(default_level: &str, format: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level)?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if format == "json" {
        builder
            .json()
            .with_current_span(true)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))
    } else {
        builder
            .with_target(false)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))
    }
}
