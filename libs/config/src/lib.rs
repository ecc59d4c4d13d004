//! # Vessel Configuration
//!
//! Settings shared by the container and codec crates, plus the tracing
//! bootstrap.
//!
//! ## Usage
//!
//! ```rust
//! use vessel_config::VesselConfig;
//!
//! let config = VesselConfig::from_toml_str("[codec]\nmax_depth = 8\n").unwrap();
//! assert_eq!(config.codec.max_depth, 8);
//! assert_eq!(config.codec.reserve_hint, 256);
//! ```
//!
//! Files are layered by [`VesselConfig::load`]: the base TOML, then
//! `environments/<env>.toml` beside it, then variables such as
//! `VESSEL__CODEC__MAX_DEPTH=16`.

pub mod logging;
pub mod settings;

pub use logging::init_logging;
pub use settings::{
    CodecSettings, LoggingSettings, VesselConfig, DEFAULT_MAX_MESSAGE_SIZE,
};
