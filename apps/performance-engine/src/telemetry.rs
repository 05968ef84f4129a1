//! Console Logging Setup
//!
//! Installs a `tracing-subscriber` fmt subscriber configured from
//! [`LoggingConfig`].
//!
//! # Configuration
//!
//! - `RUST_LOG`: overrides `logging.level` when set
//! - `logging.format`: `compact`, `pretty` or `full`
//!
//! # Usage
//!
//! ```rust,ignore
//! use performance_engine::config::load_config;
//! use performance_engine::telemetry::init_logging;
//!
//! let config = load_config(None)?;
//! init_logging(&config.logging)?;
//! ```

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Logging initialization errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The level directive could not be parsed.
    #[error("Invalid log filter '{directive}': {message}")]
    InvalidFilter {
        /// Rejected directive.
        directive: String,
        /// Parser message.
        message: String,
    },

    /// The format name is not one of the supported formats.
    #[error("Unknown log format '{0}'")]
    UnknownFormat(String),

    /// A global subscriber is already installed.
    #[error("Failed to install subscriber: {0}")]
    InitFailed(String),
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns error if the level is not a valid filter, the format is unknown,
/// or a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let env_filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(config.include_target);

    let installed = match config.format.as_str() {
        "compact" => builder.compact().try_init(),
        "pretty" => builder.pretty().try_init(),
        "full" => builder.try_init(),
        other => return Err(TelemetryError::UnknownFormat(other.to_string())),
    };
    installed.map_err(|e| TelemetryError::InitFailed(e.to_string()))?;

    tracing::debug!(
        level = %config.level,
        format = %config.format,
        "Logging initialized"
    );
    Ok(())
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|e| TelemetryError::InvalidFilter {
        directive: config.level.clone(),
        message: e.to_string(),
    })
}
