//! Error types for the CLI application.

use covenant_extractor::{ConfigError, ExtractionError, FailureClass, StoreError};
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid extractor settings
    #[error("Extractor configuration error: {0}")]
    ExtractorConfig(#[from] ConfigError),

    /// Extraction failed
    #[error("Extraction failed ({class}): {0}", class = .0.class())]
    Extraction(#[from] ExtractionError),

    /// Document store could not be opened
    #[error("Document store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CliError {
    /// Process exit code for this error
    ///
    /// Extraction failures map their failure class to 2, 3 or 4.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Extraction(err) => match err.class() {
                FailureClass::UserActionable => 2,
                FailureClass::SystemLevel => 3,
                FailureClass::Transient => 4,
            },
            _ => 1,
        }
    }
}
