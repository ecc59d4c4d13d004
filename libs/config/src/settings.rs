//! Settings Module
//!
//! Loads [`VesselConfig`] from a TOML file with environment-specific
//! overrides and `VESSEL__SECTION__KEY` environment variables.

use anyhow::{ensure, Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};
use vessel_types::MAX_NESTING_DEPTH;

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "VESSEL";

/// Separator between nested keys in environment variable names
pub const ENV_SEPARATOR: &str = "__";

/// Default ceiling for a single encoded message (16 MiB)
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VesselConfig {
    pub codec: CodecSettings,
    pub logging: LoggingSettings,
}

/// Limits applied by every codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecSettings {
    /// Maximum container nesting depth on encode and decode
    pub max_depth: usize,
    /// Largest accepted input and produced output, in bytes
    pub max_message_size: usize,
    /// Initial output buffer reservation
    pub reserve_hint: usize,
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self {
            max_depth: MAX_NESTING_DEPTH,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            reserve_hint: 256,
        }
    }
}

/// Logging output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `vessel_codec=debug`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl VesselConfig {
    /// Load `base_path`, then `environments/<env>.toml` next to it, then env vars
    pub fn load(base_path: &Path, environment: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder().add_source(File::from(base_path).required(true));

        if let Some(env) = environment {
            let env_file = base_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join("environments")
                .join(format!("{env}.toml"));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        let config: VesselConfig = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Parse an in-memory TOML document; missing keys take defaults
    pub fn from_toml_str(document: &str) -> Result<Self> {
        let config: VesselConfig =
            toml::from_str(document).context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render configuration")
    }

    /// Reject settings no codec can work with
    pub fn validate(&self) -> Result<()> {
        ensure!(self.codec.max_depth > 0, "codec.max_depth must be positive");
        ensure!(
            self.codec.max_message_size > 0,
            "codec.max_message_size must be positive"
        );
        Ok(())
    }
}
