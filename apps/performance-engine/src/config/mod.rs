//! Configuration module for the performance engine.
//!
//! Provides configuration loading, validation, and environment variable
//! interpolation. Metric evaluation never reads configuration itself: the
//! loaded [`MetricConfig`] is handed to each calculation context explicitly.
//!
//! # Usage
//!
//! ```rust,ignore
//! use performance_engine::config::load_config;
//!
//! // Load from default path (performance.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("conf/performance.yaml"))?;
//!
//! println!("MAR: {}", config.metrics.mar);
//! ```

mod batch;
mod metrics;
mod observability;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use batch::BatchConfig;
pub use metrics::{
    AppraisalMethod, DEFAULT_MAR, DEFAULT_RISK_FREE_RATE, DEFAULT_SCALE, MetricConfig,
};
pub use observability::{LOG_FORMATS, LoggingConfig};

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "performance.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Rate assumptions and metric options.
    #[serde(default)]
    pub metrics: MetricConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Batch evaluation configuration.
    #[serde(default)]
    pub batch: BatchConfig,
}

pub(crate) const fn default_true() -> bool {
    true
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "performance.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_string(),
        source,
    })?;

    load_config_from_string(&content)
}

/// Load configuration from a YAML string.
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or fails validation.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Literal pattern
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |caps: &regex::Captures<'_>| {
        let default_value = caps.get(2).map_or("", |m| m.as_str());
        match caps.get(1).map(|m| std::env::var(m.as_str())) {
            Some(Ok(v)) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let metrics = &config.metrics;

    for (name, rate) in [
        ("metrics.mar", metrics.mar),
        ("metrics.risk_free_rate", metrics.risk_free_rate),
    ] {
        if !rate.is_finite() || !(-1.0..=1.0).contains(&rate) {
            return Err(ConfigError::ValidationError(format!(
                "{name} must be between -1.0 and 1.0"
            )));
        }
    }

    if !(metrics.scale.is_finite() && metrics.scale > 0.0) {
        return Err(ConfigError::ValidationError(
            "metrics.scale must be positive".to_string(),
        ));
    }

    if !(metrics.kappa_order.is_finite() && metrics.kappa_order > 0.0) {
        return Err(ConfigError::ValidationError(
            "metrics.kappa_order must be positive".to_string(),
        ));
    }

    if !(metrics.day_boundary_hours.is_finite() && metrics.day_boundary_hours > 0.0) {
        return Err(ConfigError::ValidationError(
            "metrics.day_boundary_hours must be positive".to_string(),
        ));
    }

    if !metrics.sterling_excess.is_finite() || !metrics.prospect_loss_weight.is_finite() {
        return Err(ConfigError::ValidationError(
            "metrics.sterling_excess and metrics.prospect_loss_weight must be finite".to_string(),
        ));
    }

    if !LOG_FORMATS.contains(&config.logging.format.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "logging.format must be one of: {LOG_FORMATS:?}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!((config.metrics.mar - 0.03).abs() < f64::EPSILON);
        assert!((config.metrics.risk_free_rate - 0.03).abs() < f64::EPSILON);
        assert!((config.metrics.scale - 252.0).abs() < f64::EPSILON);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "compact");
        assert_eq!(config.batch.min_parallel_jobs, 4);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_empty_sections_use_defaults() {
        let yaml = r"
metrics:
  mar: 0.05
";

        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load partial config: {e}"),
        };
        assert!((config.metrics.mar - 0.05).abs() < f64::EPSILON);
        assert!((config.metrics.risk_free_rate - 0.03).abs() < f64::EPSILON); // Default value
        assert_eq!(config.metrics.appraisal_method, AppraisalMethod::Modified);
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r"
metrics:
  mar: 0.02
  risk_free_rate: 0.01
  scale: 12
  sterling_excess: 0.05
  kappa_order: 2.0
  prospect_loss_weight: 2.0
  burke_modified: false
  appraisal_method: APPRAISAL
  day_boundary_hours: 8
logging:
  level: debug
  format: pretty
  include_target: false
batch:
  max_threads: 2
  min_parallel_jobs: 8
  track_progress: false
";

        let config = load_config_from_string(yaml).unwrap();
        assert!((config.metrics.scale - 12.0).abs() < f64::EPSILON);
        assert!((config.metrics.kappa_order - 2.0).abs() < f64::EPSILON);
        assert!(!config.metrics.burke_modified);
        assert_eq!(config.metrics.appraisal_method, AppraisalMethod::Appraisal);
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.include_target);
        assert_eq!(config.batch.max_threads, 2);
        assert_eq!(config.batch.min_parallel_jobs, 8);
    }

    #[test]
    fn test_env_var_with_default_when_missing() {
        // Use a variable name unlikely to exist
        let input = "level: ${PERF_ENGINE_TEST_NONEXISTENT_VAR:-warn}";
        let result = interpolate_env_vars(input);

        assert_eq!(result, "level: warn");
    }

    #[test]
    #[expect(clippy::literal_string_with_formatting_args)] // ${...} is env var syntax, not format args
    fn test_env_var_with_default_uses_existing() {
        // PATH should always exist
        let input = "path: ${PATH:-default}";
        let result = interpolate_env_vars(input);

        assert_ne!(result, "path: default");
        assert!(result.starts_with("path: "));
    }

    #[test]
    fn test_env_var_without_default_becomes_empty() {
        let input = "level: ${PERF_ENGINE_TEST_UNLIKELY_TO_EXIST}";
        let result = interpolate_env_vars(input);

        assert_eq!(result, "level: ");
    }

    #[test]
    fn test_interpolated_default_reaches_config() {
        let yaml = r"
metrics:
  mar: ${PERF_ENGINE_TEST_MAR_UNSET:-0.04}
";
        let config = load_config_from_string(yaml).unwrap();
        assert!((config.metrics.mar - 0.04).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validation_negative_scale() {
        let yaml = r"
metrics:
  scale: -252
";
        let result = load_config_from_string(yaml);
        let Err(err) = result else {
            panic!("expected error for negative scale");
        };
        assert!(err.to_string().contains("metrics.scale"));
    }

    #[test]
    fn test_validation_rate_out_of_range() {
        let yaml = r"
metrics:
  risk_free_rate: 3.0
";
        let result = load_config_from_string(yaml);
        let Err(err) = result else {
            panic!("expected error for invalid risk_free_rate");
        };
        assert!(err.to_string().contains("risk_free_rate"));
    }

    #[test]
    fn test_validation_unknown_log_format() {
        let yaml = r"
logging:
  format: xml
";
        let result = load_config_from_string(yaml);
        let Err(err) = result else {
            panic!("expected error for unknown format");
        };
        assert!(err.to_string().contains("logging.format"));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "metrics:\n  scale: 4").unwrap();

        let path = file.path().to_str().unwrap();
        let config = load_config(Some(path)).unwrap();
        assert!((config.metrics.scale - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config(Some("/nonexistent/performance.yaml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }
}
