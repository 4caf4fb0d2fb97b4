//! The outcome of one extraction

use crate::document::DocumentId;
use crate::field::{rank_candidates, FieldCandidate, FieldName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for one extraction run, based on UUIDv7
///
/// UUIDv7 keeps identifiers chronologically sortable, which lets the activity
/// history order extraction runs without a separate timestamp column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionId(uuid::Uuid);

impl ExtractionId {
    /// Generate a new UUIDv7-based identifier
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Parse an identifier from its string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid extraction id: {}", e))
    }
}

impl Default for ExtractionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExtractionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pipeline-level observations attached to a result
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum ExtractionWarning {
    /// More than one distinct organization could be the client
    MultipleClients {
        /// Number of distinct organizations
        count: usize,
    },
    /// No organization was found
    NoClient,
    /// More than one distinct amount could be the contract value
    MultipleValues {
        /// Number of distinct amounts
        count: usize,
    },
    /// No monetary amount was found
    NoContractValue,
    /// No date expression could be normalized
    NoValidDates {
        /// Number of date entities that failed to parse
        unparsed: usize,
    },
    /// An end date precedes the top start date
    InvertedDateRange,
    /// The top renewal date precedes the top start date
    RenewalBeforeStart,
    /// Only a prefix of the document was passed to recognition
    TextTruncated {
        /// Characters recognized
        recognized_chars: usize,
        /// Characters in the document
        total_chars: usize,
    },
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionWarning::MultipleClients { count } => {
                write!(f, "multiple client names found ({} candidates)", count)
            }
            ExtractionWarning::NoClient => f.write_str("no client organization detected"),
            ExtractionWarning::MultipleValues { count } => {
                write!(f, "multiple contract values found ({} candidates)", count)
            }
            ExtractionWarning::NoContractValue => f.write_str("no contract value detected"),
            ExtractionWarning::NoValidDates { unparsed } => {
                write!(f, "no valid dates detected ({} unparseable date expressions)", unparsed)
            }
            ExtractionWarning::InvertedDateRange => f.write_str("possible inverted date range"),
            ExtractionWarning::RenewalBeforeStart => f.write_str("renewal date precedes start date"),
            ExtractionWarning::TextTruncated {
                recognized_chars,
                total_chars,
            } => write!(
                f,
                "text truncated for recognition ({} of {} characters)",
                recognized_chars, total_chars
            ),
        }
    }
}

/// Metadata about an extraction run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// Identifier of this run
    pub extraction_id: ExtractionId,
    /// Document the result was extracted from
    pub document_id: DocumentId,
    /// Original file name of the document
    pub filename: String,
    /// Name of the recognition engine
    pub recognizer: String,
    /// Number of text blocks extracted
    pub block_count: usize,
    /// Number of entities recognized
    pub entity_count: usize,
    /// Unix timestamp (seconds) when the run completed
    pub timestamp: u64,
    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Ranked candidates for every requested field, plus warnings
///
/// Created once per extraction and immutable afterwards. Every requested field
/// has a key; a field with no candidates maps to an empty vector. Within a
/// field, candidates are ordered by non-increasing confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    fields: BTreeMap<FieldName, Vec<FieldCandidate>>,
    warnings: Vec<ExtractionWarning>,
    metadata: ExtractionMetadata,
}

impl ExtractionResult {
    /// Assemble a result
    ///
    /// Each field's candidates are ranked (stable, highest confidence first).
    pub fn new(
        mut fields: BTreeMap<FieldName, Vec<FieldCandidate>>,
        warnings: Vec<ExtractionWarning>,
        metadata: ExtractionMetadata,
    ) -> Self {
        for candidates in fields.values_mut() {
            rank_candidates(candidates);
        }
        Self {
            fields,
            warnings,
            metadata,
        }
    }

    /// Candidates for a field, highest confidence first
    ///
    /// Returns an empty slice for fields that were not requested.
    pub fn candidates(&self, field: FieldName) -> &[FieldCandidate] {
        self.fields.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The highest-ranked candidate for a field
    pub fn top(&self, field: FieldName) -> Option<&FieldCandidate> {
        self.candidates(field).first()
    }

    /// All keyed fields with their candidates
    pub fn fields(&self) -> &BTreeMap<FieldName, Vec<FieldCandidate>> {
        &self.fields
    }

    /// Whether the field was requested (is keyed in the result)
    pub fn contains_field(&self, field: FieldName) -> bool {
        self.fields.contains_key(&field)
    }

    /// Pipeline-level warnings
    pub fn warnings(&self) -> &[ExtractionWarning] {
        &self.warnings
    }

    /// Whether a warning was raised
    pub fn has_warning(&self, warning: &ExtractionWarning) -> bool {
        self.warnings.contains(warning)
    }

    /// Run metadata
    pub fn metadata(&self) -> &ExtractionMetadata {
        &self.metadata
    }

    /// Take the result apart
    pub fn into_parts(
        self,
    ) -> (
        BTreeMap<FieldName, Vec<FieldCandidate>>,
        Vec<ExtractionWarning>,
        ExtractionMetadata,
    ) {
        (self.fields, self.warnings, self.metadata)
    }
}
