//! Per-call extraction options

use crate::config::ExtractorConfig;
use crate::error::ExtractionError;
use covenant_domain::FieldName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Options for a single extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOptions {
    /// Time budget for the whole pipeline (seconds)
    pub timeout_seconds: u64,

    /// Candidates below this confidence are dropped
    pub min_confidence: f64,

    /// Fields to resolve; every one is keyed in the result
    pub field_scope: BTreeSet<FieldName>,
}

impl ExtractionOptions {
    /// Options taking their defaults from `config`, scoped to every field
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self {
            timeout_seconds: config.timeout_seconds,
            min_confidence: config.min_confidence,
            field_scope: FieldName::ALL.into_iter().collect(),
        }
    }

    /// Restrict extraction to the given fields
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldName>) -> Self {
        self.field_scope = fields.into_iter().collect();
        self
    }

    /// Set the time budget
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Set the confidence floor
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Get the time budget as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<(), ExtractionError> {
        if self.timeout_seconds == 0 {
            return Err(ExtractionError::InvalidOptions(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ExtractionError::InvalidOptions(format!(
                "min_confidence must be in [0, 1], got {}",
                self.min_confidence
            )));
        }
        if self.field_scope.is_empty() {
            return Err(ExtractionError::InvalidOptions("field_scope cannot be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self::from_config(&ExtractorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_all_fields() {
        let options = ExtractionOptions::default();
        assert_eq!(options.field_scope.len(), FieldName::ALL.len());
        assert_eq!(options.timeout_seconds, ExtractorConfig::default().timeout_seconds);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_defaults_follow_config() {
        let options = ExtractionOptions::from_config(&ExtractorConfig::aggressive());
        assert_eq!(options.min_confidence, 0.5);
        assert_eq!(options.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_options() {
        assert!(ExtractionOptions::default().with_timeout(0).validate().is_err());
        assert!(ExtractionOptions::default().with_min_confidence(-0.1).validate().is_err());
        assert!(matches!(
            ExtractionOptions::default().with_fields([]).validate(),
            Err(ExtractionError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_with_fields() {
        let options = ExtractionOptions::default().with_fields([FieldName::Client, FieldName::Client]);
        assert_eq!(options.field_scope, BTreeSet::from([FieldName::Client]));
    }
}
