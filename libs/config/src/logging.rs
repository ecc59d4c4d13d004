//! Tracing subscriber bootstrap

use crate::settings::LoggingSettings;
use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Install a global `fmt` subscriber
///
/// `RUST_LOG` takes precedence over `settings.level`. Returns `false` when a
/// global subscriber was already installed, which makes repeated calls from
/// tests harmless.
pub fn init_logging(settings: &LoggingSettings) -> Result<bool> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level)
            .with_context(|| format!("Invalid log filter: {}", settings.level))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if settings.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };
    Ok(installed)
}
