//! Configuration for the Extractor

use covenant_resolver::{ConfigError, ResolverConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Default time budget for one extraction (seconds)
    pub timeout_seconds: u64,

    /// Default floor below which candidates are dropped
    pub min_confidence: f64,

    /// Largest accepted document (bytes)
    pub max_document_bytes: usize,

    /// Characters passed to the recognizer before recognition stops
    pub max_recognized_chars: usize,

    /// Factor applied to both dates of an inverted start/end pair
    pub inversion_penalty: f64,

    /// Field resolution tunables
    pub resolver: ResolverConfig,
}

impl ExtractorConfig {
    /// Get the default timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_seconds == 0 {
            return Err(ConfigError::Invalid("timeout_seconds must be greater than 0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::Invalid(format!(
                "min_confidence must be in [0, 1], got {}",
                self.min_confidence
            )));
        }
        if self.max_document_bytes == 0 {
            return Err(ConfigError::Invalid("max_document_bytes must be greater than 0".to_string()));
        }
        if self.max_recognized_chars == 0 {
            return Err(ConfigError::Invalid("max_recognized_chars must be greater than 0".to_string()));
        }
        if !(self.inversion_penalty > 0.0 && self.inversion_penalty <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "inversion_penalty must be in (0, 1], got {}",
                self.inversion_penalty
            )));
        }
        self.resolver.validate()
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            min_confidence: 0.0,
            max_document_bytes: 10 * 1024 * 1024,
            max_recognized_chars: 200_000,
            inversion_penalty: 0.5,
            resolver: ResolverConfig::default(),
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: short timeout, weak candidates dropped, strict resolution
    pub fn aggressive() -> Self {
        Self {
            timeout_seconds: 10,
            min_confidence: 0.5,
            max_document_bytes: 5 * 1024 * 1024,
            max_recognized_chars: 100_000,
            inversion_penalty: 0.4,
            resolver: ResolverConfig::strict(),
        }
    }

    /// Lenient preset: long timeout, every candidate kept, permissive resolution
    pub fn lenient() -> Self {
        Self {
            timeout_seconds: 120,
            min_confidence: 0.0,
            max_document_bytes: 25 * 1024 * 1024,
            max_recognized_chars: 500_000,
            inversion_penalty: 0.7,
            resolver: ResolverConfig::permissive(),
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Load and validate configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml(&contents)?;
        config.validate()?;
        Ok(config)
    }
}
