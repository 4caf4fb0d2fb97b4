//! Configuration error types

use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A setting is out of range or inconsistent
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// TOML could not be parsed
    #[error("Failed to parse TOML: {0}")]
    Parse(String),

    /// Configuration could not be serialized
    #[error("Failed to serialize to TOML: {0}")]
    Serialize(String),

    /// The configuration file could not be read
    #[error("Failed to read configuration file: {0}")]
    Io(String),
}
