//! Error types for text extraction

use covenant_domain::DocumentFormat;
use thiserror::Error;

/// Errors that can occur while extracting text from a document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextError {
    /// The declared format is not PDF, DOC, or DOCX
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The parser could not read the content, or the content contradicts the
    /// declared format
    #[error("Corrupt {format} document: {reason}")]
    CorruptDocument {
        /// Format the document was declared as
        format: DocumentFormat,
        /// What went wrong
        reason: String,
    },
}

impl TextError {
    pub(crate) fn corrupt(format: DocumentFormat, reason: impl Into<String>) -> Self {
        TextError::CorruptDocument {
            format,
            reason: reason.into(),
        }
    }
}
