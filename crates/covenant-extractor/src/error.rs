//! Error types for the Extractor

use covenant_domain::{DocumentFormat, DocumentId};
use covenant_ner::RecognizerError;
use covenant_text::TextError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Who can act on a failed extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// The uploader can fix it (different file, different options)
    UserActionable,

    /// An operator has to fix it (engine not loaded, storage down)
    SystemLevel,

    /// Trying again later may succeed
    Transient,
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureClass::UserActionable => "user-actionable",
            FailureClass::SystemLevel => "system-level",
            FailureClass::Transient => "transient",
        };
        f.write_str(s)
    }
}

/// Errors that can occur during extraction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// No document with this ID
    #[error("Document not found: {0}")]
    NotFound(DocumentId),

    /// The declared format is not PDF, DOC, or DOCX
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The document could not be read as its declared format
    #[error("Corrupt {format} document: {reason}")]
    CorruptDocument {
        /// Format the document was declared as
        format: DocumentFormat,
        /// What went wrong
        reason: String,
    },

    /// The document exceeds the configured size limit
    #[error("Document too large: {size} bytes (max: {max})")]
    DocumentTooLarge {
        /// Document size in bytes
        size: usize,
        /// Configured limit in bytes
        max: usize,
    },

    /// The recognition engine is not loaded or failed
    #[error("Recognition unavailable: {0}")]
    RecognitionUnavailable(String),

    /// Extraction did not finish within the time budget
    #[error("Recognition timed out after {0} seconds")]
    RecognitionTimeout(u64),

    /// Extraction options failed validation
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// The document store failed
    #[error("Store error: {0}")]
    Store(String),

    /// The pipeline worker failed (panicked, or broke the stage order)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractionError {
    /// Classify the failure for the caller
    pub fn class(&self) -> FailureClass {
        match self {
            ExtractionError::NotFound(_)
            | ExtractionError::UnsupportedFormat(_)
            | ExtractionError::CorruptDocument { .. }
            | ExtractionError::DocumentTooLarge { .. }
            | ExtractionError::InvalidOptions(_) => FailureClass::UserActionable,
            ExtractionError::RecognitionUnavailable(_) | ExtractionError::Store(_) | ExtractionError::Internal(_) => {
                FailureClass::SystemLevel
            }
            ExtractionError::RecognitionTimeout(_) => FailureClass::Transient,
        }
    }
}

impl From<TextError> for ExtractionError {
    fn from(e: TextError) -> Self {
        match e {
            TextError::UnsupportedFormat(format) => ExtractionError::UnsupportedFormat(format),
            TextError::CorruptDocument { format, reason } => ExtractionError::CorruptDocument { format, reason },
        }
    }
}

impl From<RecognizerError> for ExtractionError {
    fn from(e: RecognizerError) -> Self {
        match e {
            RecognizerError::Unavailable(reason) => ExtractionError::RecognitionUnavailable(reason),
            RecognizerError::Cancelled => ExtractionError::RecognitionUnavailable("recognition cancelled".to_string()),
        }
    }
}
