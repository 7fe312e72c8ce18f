//! Resolver configuration loading.
//!
//! A default configuration is embedded at compile time from
//! `config/default.toml`. User files use the same keys; any key they leave
//! out keeps its default.

use std::path::Path;

use geotag_resolution_models::ResolverConfig;
use thiserror::Error;

const DEFAULT_TOML: &str = include_str!("../config/default.toml");

/// Errors from reading a resolver configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file was not valid configuration TOML.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// The embedded default configuration.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (this is a compile-time guarantee
/// since the file is embedded).
#[must_use]
pub fn default_config() -> ResolverConfig {
    parse(DEFAULT_TOML).unwrap_or_else(|e| panic!("Failed to parse default resolver config: {e}"))
}

/// Parses a configuration from TOML text.
///
/// # Errors
///
/// Returns [`ConfigError::Toml`] if `text` is not valid configuration TOML.
pub fn parse(text: &str) -> Result<ResolverConfig, ConfigError> {
    Ok(toml::de::from_str(text)?)
}

/// Reads a configuration file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read, or
/// [`ConfigError::Toml`] if it is not valid configuration TOML.
pub fn load(path: &Path) -> Result<ResolverConfig, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    let config = parse(&text)?;
    log::debug!("Loaded resolver config from {}: {config:?}", path.display());
    Ok(config)
}
