//! Configuration loading from disk and command-line overrides.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::LbConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

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

/// Values given on the command line; each one overrides the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Comma-separated backend URLs.
    pub backends: Option<String>,
    /// Listening port.
    pub port: Option<u16>,
}

/// Split a comma-separated backend list, dropping blank entries.
pub fn parse_backend_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Read a TOML configuration file without validating it.
pub fn read_config(path: &Path) -> Result<LbConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Build the effective configuration: defaults, then the optional file,
/// then command-line overrides. The result is validated.
pub fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<LbConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => LbConfig::default(),
    };

    if let Some(list) = &overrides.backends {
        config.backends = parse_backend_list(list);
    }
    if let Some(port) = overrides.port {
        config.listener.set_port(port);
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
