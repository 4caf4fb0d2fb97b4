//! Format dispatch

use crate::error::TextError;
use crate::sniff::{sniff, Container};
use crate::{doc, docx, pdf};
use covenant_domain::{DocumentFormat, ExtractedText, RawDocument};

/// Extracts ordered text blocks from PDF, DOC, and DOCX documents
///
/// The extractor is stateless; it keeps no copy of the bytes it reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentTextExtractor;

impl DocumentTextExtractor {
    /// Create a new extractor
    pub fn new() -> Self {
        Self
    }

    /// Extract text from a document
    ///
    /// # Errors
    ///
    /// - [`TextError::UnsupportedFormat`] if the declared format is not PDF,
    ///   DOC, or DOCX
    /// - [`TextError::CorruptDocument`] if the parser cannot read the content
    ///   or the content contradicts the declared format
    pub fn extract(&self, document: &RawDocument) -> Result<ExtractedText, TextError> {
        let declared = document
            .format()
            .ok_or_else(|| TextError::UnsupportedFormat(document.declared_format().to_string()))?;

        if document.is_empty() {
            return Err(TextError::corrupt(declared, "document is empty"));
        }

        let container = sniff(document.bytes());
        let text = match (declared, container) {
            (DocumentFormat::Pdf, Container::Pdf) => pdf::extract(document.bytes(), declared)?,
            (DocumentFormat::Doc | DocumentFormat::Docx, Container::Zip) => {
                if declared == DocumentFormat::Doc {
                    tracing::debug!(filename = document.filename(), "DOC upload is an OOXML package");
                }
                docx::extract(document.bytes(), declared)?
            }
            (DocumentFormat::Doc | DocumentFormat::Docx, Container::Ole) => {
                if declared == DocumentFormat::Docx {
                    tracing::debug!(filename = document.filename(), "DOCX upload is a Word 97-2003 file");
                }
                doc::extract(document.bytes(), declared)?
            }
            (_, found) => {
                return Err(TextError::corrupt(
                    declared,
                    format!("content does not match the declared format (found {:?})", found),
                ));
            }
        };

        if text.is_empty() {
            tracing::warn!(
                filename = document.filename(),
                "No text could be extracted; the document may be scanned"
            );
        } else {
            tracing::debug!(
                filename = document.filename(),
                blocks = text.len(),
                chars = text.char_len(),
                "Extracted document text"
            );
        }

        Ok(text)
    }
}
