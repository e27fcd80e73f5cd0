//! # Engine Configuration
//!
//! Tuning knobs for the binding engine, settable in code or from the
//! environment.
//!
//! ## Environment Variables
//!
//! - `TOOLBIND_POOL_MAX_IDLE` - Idle argument buffers kept per tool (default: 64)
//! - `TOOLBIND_POOL_PREWARM` - Buffers allocated when a tool is built (default: 0)
//! - `TOOLBIND_CONVERSION_CACHE` - Memoize coercion feasibility (default: true)

use std::env;
use std::sync::OnceLock;
use tracing::warn;

static PROCESS_CONFIG: OnceLock<EngineConfig> = OnceLock::new();

/// Upper bound on idle buffers per tool.
pub const MAX_POOL_IDLE: usize = 65_536;

/// Error type for configuration loading
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid environment variable '{key}': {message}")]
    InvalidEnvVar { key: String, message: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Validated engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Idle argument buffers retained per tool; extras are dropped on release.
    pub pool_max_idle: usize,
    /// Buffers allocated up front when a tool is built.
    pub pool_prewarm: usize,
    /// Whether coercion feasibility is memoized.
    pub conversion_cache: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pool_max_idle: 64,
            pool_prewarm: 0,
            conversion_cache: true,
        }
    }
}

impl EngineConfig {
    /// The process configuration, read from the environment on first use.
    ///
    /// An invalid environment falls back to defaults with a warning.
    pub fn process() -> &'static EngineConfig {
        PROCESS_CONFIG.get_or_init(|| {
            EngineConfigBuilder::from_env()
                .and_then(EngineConfigBuilder::build)
                .unwrap_or_else(|error| {
                    warn!(%error, "invalid engine configuration, using defaults");
                    EngineConfig::default()
                })
        })
    }
}

/// Builder for [`EngineConfig`] with environment variable support
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Create a new builder with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is set but unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Self::default();

        if let Some(max_idle) = get_env_usize("TOOLBIND_POOL_MAX_IDLE")? {
            builder = builder.pool_max_idle(max_idle);
        }
        if let Some(prewarm) = get_env_usize("TOOLBIND_POOL_PREWARM")? {
            builder = builder.pool_prewarm(prewarm);
        }
        if let Some(enabled) = get_env_bool("TOOLBIND_CONVERSION_CACHE")? {
            builder = builder.conversion_cache(enabled);
        }

        Ok(builder)
    }

    #[must_use]
    pub fn pool_max_idle(mut self, max_idle: usize) -> Self {
        self.config.pool_max_idle = max_idle;
        self
    }

    #[must_use]
    pub fn pool_prewarm(mut self, prewarm: usize) -> Self {
        self.config.pool_prewarm = prewarm;
        self
    }

    #[must_use]
    pub fn conversion_cache(mut self, enabled: bool) -> Self {
        self.config.conversion_cache = enabled;
        self
    }

    /// Validate configuration and build [`EngineConfig`]
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if the configuration is invalid.
    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        self.validate()?;
        Ok(self.config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.config.pool_max_idle == 0 {
            return Err(ConfigError::ValidationError(
                "pool_max_idle must be greater than 0".to_string(),
            ));
        }
        if self.config.pool_max_idle > MAX_POOL_IDLE {
            return Err(ConfigError::ValidationError(format!(
                "pool_max_idle must be <= {MAX_POOL_IDLE}"
            )));
        }
        if self.config.pool_prewarm > self.config.pool_max_idle {
            return Err(ConfigError::ValidationError(
                "pool_prewarm must be <= pool_max_idle".to_string(),
            ));
        }

        Ok(())
    }
}

// Environment variable helper functions

fn get_env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match env::var(key) {
        Ok(val) => parse_bool(key, &val).map(Some),
        Err(_) => Ok(None),
    }
}

fn get_env_usize(key: &str) -> Result<Option<usize>, ConfigError> {
    match env::var(key) {
        Ok(val) => parse_usize(key, &val).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_bool(key: &str, val: &str) -> Result<bool, ConfigError> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvVar {
            key: key.to_string(),
            message: format!("invalid boolean value '{val}', expected true/false/1/0/yes/no/on/off"),
        }),
    }
}

fn parse_usize(key: &str, val: &str) -> Result<usize, ConfigError> {
    val.parse::<usize>().map_err(|e| ConfigError::InvalidEnvVar {
        key: key.to_string(),
        message: format!("invalid usize value '{val}': {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_builder() {
        let config = EngineConfigBuilder::new().build().unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.pool_max_idle, 64);
        assert_eq!(config.pool_prewarm, 0);
        assert!(config.conversion_cache);
    }

    #[test]
    fn test_process_config_is_valid() {
        let config = EngineConfig::process();
        assert!(config.pool_max_idle > 0);
        assert!(std::ptr::eq(config, EngineConfig::process()));
    }

    #[test]
    fn test_builder_validation_max_idle() {
        let result = EngineConfigBuilder::new().pool_max_idle(0).build();
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("pool_max_idle must be greater than 0")
        );

        let result = EngineConfigBuilder::new()
            .pool_max_idle(MAX_POOL_IDLE + 1)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_validation_prewarm() {
        let result = EngineConfigBuilder::new()
            .pool_max_idle(4)
            .pool_prewarm(5)
            .build();
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("pool_prewarm must be <= pool_max_idle")
        );
    }

    #[test]
    fn test_parse_bool_values() {
        for val in ["true", "TRUE", "1", "yes", "on"] {
            assert_eq!(parse_bool("K", val), Ok(true));
        }
        for val in ["false", "0", "No", "off"] {
            assert_eq!(parse_bool("K", val), Ok(false));
        }
        assert!(matches!(
            parse_bool("K", "maybe"),
            Err(ConfigError::InvalidEnvVar { .. })
        ));
    }

    #[test]
    fn test_parse_usize_rejects_garbage() {
        assert_eq!(parse_usize("K", "12"), Ok(12));
        let err = parse_usize("TOOLBIND_POOL_MAX_IDLE", "-1").unwrap_err();
        assert!(err.to_string().contains("TOOLBIND_POOL_MAX_IDLE"));
    }
}
