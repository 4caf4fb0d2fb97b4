//! Configuration for the Field Resolver

use crate::error::ConfigError;
use covenant_domain::confidence::is_valid_boost;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tunables for field resolution
///
/// Boost factors multiply a recognizer's base confidence and must lie in
/// `(0, 2]`; a factor below 1 is a penalty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// How far (in characters) a cue may sit from the entity it qualifies
    pub cue_window_chars: usize,

    /// Boost for an entity qualified by a matching cue
    pub cue_match_boost: f64,

    /// Factor for an entity with no cue (dates, amounts, unpaired contacts)
    pub uncued_factor: f64,

    /// Frequency boost gained per additional mention of the same value
    pub frequency_step: f64,

    /// Cap on the frequency boost
    pub max_frequency_boost: f64,

    /// Boost for a person found near an email address or phone number
    pub pairing_boost: f64,

    /// How far (in characters) a person may sit from an email or phone
    pub contact_window_chars: usize,

    /// Earliest accepted year for normalized dates
    pub min_year: i32,

    /// Latest accepted year for normalized dates
    pub max_year: i32,

    /// Cue words marking a start date (`*` suffix marks a stem)
    pub start_cues: Vec<String>,

    /// Cue words marking an end date
    pub end_cues: Vec<String>,

    /// Cue words marking a renewal date
    pub renewal_cues: Vec<String>,

    /// Cue words marking the contract value
    pub value_cues: Vec<String>,

    /// Cue words marking the client organization
    pub client_cues: Vec<String>,

    /// Organization names that are never the client (compared case-folded)
    pub org_stoplist: Vec<String>,

    /// Number of leading blocks searched for a title
    pub title_scan_blocks: usize,

    /// Confidence of a title found in body text
    pub title_confidence: f64,

    /// Confidence of a contract type supported by a single keyword
    pub type_confidence: f64,

    /// Confidence of a description following a title
    pub description_confidence: f64,

    /// Longest description kept before it is cut off with "..."
    pub description_max_chars: usize,

    /// Keywords supporting each contract type
    pub type_keywords: BTreeMap<String, Vec<String>>,
}

fn words(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn default_type_keywords() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([
        (
            "service".to_string(),
            words(&["service agreement", "services", "consulting", "professional services"]),
        ),
        (
            "purchase".to_string(),
            words(&["purchase order", "purchase agreement", "sales agreement", "buy"]),
        ),
        (
            "license".to_string(),
            words(&["license agreement", "licensing", "software license", "intellectual property"]),
        ),
        (
            "nda".to_string(),
            words(&["non-disclosure", "nda", "confidentiality agreement", "confidential"]),
        ),
    ])
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cue_window_chars: 80,
            cue_match_boost: 1.1,
            uncued_factor: 0.8,
            frequency_step: 0.15,
            max_frequency_boost: 1.6,
            pairing_boost: 1.2,
            contact_window_chars: 100,
            min_year: 2000,
            max_year: 2100,
            start_cues: words(&["effective", "commenc*", "start", "starts", "starting", "begin", "begins", "beginning"]),
            end_cues: words(&["expir*", "terminat*", "end", "ends", "ending"]),
            renewal_cues: words(&["renew*"]),
            value_cues: words(&["total", "value", "amount", "price", "fee", "fees", "sum"]),
            client_cues: words(&["client", "customer"]),
            org_stoplist: words(&["agreement", "contract", "llc", "inc", "company", "the company"]),
            title_scan_blocks: 10,
            title_confidence: 0.7,
            type_confidence: 0.5,
            description_confidence: 0.6,
            description_max_chars: 200,
            type_keywords: default_type_keywords(),
        }
    }
}

impl ResolverConfig {
    /// Strict preset: cues matter more, stray mentions count for less
    pub fn strict() -> Self {
        Self {
            cue_window_chars: 40,
            cue_match_boost: 1.15,
            uncued_factor: 0.6,
            frequency_step: 0.1,
            max_frequency_boost: 1.4,
            contact_window_chars: 60,
            ..Self::default()
        }
    }

    /// Permissive preset: wider windows, milder penalties
    pub fn permissive() -> Self {
        Self {
            cue_window_chars: 160,
            cue_match_boost: 1.05,
            uncued_factor: 0.9,
            frequency_step: 0.2,
            max_frequency_boost: 1.8,
            contact_window_chars: 200,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let boosts = [
            ("cue_match_boost", self.cue_match_boost),
            ("uncued_factor", self.uncued_factor),
            ("max_frequency_boost", self.max_frequency_boost),
            ("pairing_boost", self.pairing_boost),
        ];
        for (name, factor) in boosts {
            if !is_valid_boost(factor) {
                return Err(ConfigError::Invalid(format!("{} must be in (0, 2], got {}", name, factor)));
            }
        }
        if self.max_frequency_boost < 1.0 {
            return Err(ConfigError::Invalid("max_frequency_boost must be at least 1".to_string()));
        }
        if !self.frequency_step.is_finite() || self.frequency_step < 0.0 {
            return Err(ConfigError::Invalid("frequency_step must be non-negative".to_string()));
        }
        if self.cue_window_chars == 0 {
            return Err(ConfigError::Invalid("cue_window_chars must be greater than 0".to_string()));
        }
        if self.contact_window_chars == 0 {
            return Err(ConfigError::Invalid("contact_window_chars must be greater than 0".to_string()));
        }
        if self.min_year > self.max_year {
            return Err(ConfigError::Invalid(format!(
                "min_year ({}) cannot exceed max_year ({})",
                self.min_year, self.max_year
            )));
        }

        let cue_lists = [
            ("start_cues", &self.start_cues),
            ("end_cues", &self.end_cues),
            ("renewal_cues", &self.renewal_cues),
            ("value_cues", &self.value_cues),
            ("client_cues", &self.client_cues),
        ];
        for (name, cues) in cue_lists {
            if cues.is_empty() {
                return Err(ConfigError::Invalid(format!("{} cannot be empty", name)));
            }
            if cues.iter().any(|cue| cue.trim().trim_end_matches('*').is_empty()) {
                return Err(ConfigError::Invalid(format!("{} contains an empty cue", name)));
            }
        }

        let confidences = [
            ("title_confidence", self.title_confidence),
            ("type_confidence", self.type_confidence),
            ("description_confidence", self.description_confidence),
        ];
        for (name, value) in confidences {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::Invalid(format!("{} must be in (0, 1], got {}", name, value)));
            }
        }
        if self.description_max_chars == 0 {
            return Err(ConfigError::Invalid("description_max_chars must be greater than 0".to_string()));
        }
        if self.type_keywords.values().flatten().any(|kw| kw.trim().is_empty()) {
            return Err(ConfigError::Invalid("type_keywords contains an empty keyword".to_string()));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}
