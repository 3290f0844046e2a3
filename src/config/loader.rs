//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `listener.port`.
pub const PORT_ENV: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid {PORT_ENV} value '{0}'")]
    Env(String),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults, then the optional TOML file, then the
/// `PORT` environment variable. The result is not yet validated so callers
/// can layer CLI overrides on top before calling [`validate_config`].
pub fn load_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => RelayConfig::default(),
    };

    apply_port_override(config, std::env::var(PORT_ENV).ok().as_deref())
}

/// Replace the listener port with `raw` when it is set and non-empty.
pub fn apply_port_override(
    mut config: RelayConfig,
    raw: Option<&str>,
) -> Result<RelayConfig, ConfigError> {
    if let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) {
        config.listener.port = raw
            .parse()
            .map_err(|_| ConfigError::Env(raw.to_string()))?;
    }
    Ok(config)
}

/// Run semantic validation, wrapping failures as a [`ConfigError`].
pub fn finalize(config: RelayConfig) -> Result<RelayConfig, ConfigError> {
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
