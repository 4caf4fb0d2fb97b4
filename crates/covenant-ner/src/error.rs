//! Error types for entity recognition

use thiserror::Error;

/// Errors that can occur during entity recognition
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognizerError {
    /// The recognition engine is not loaded or cannot be reached
    #[error("Recognition engine unavailable: {0}")]
    Unavailable(String),

    /// Recognition was cancelled before the document was fully processed
    #[error("Recognition cancelled")]
    Cancelled,
}
