//! Uploaded contract documents

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier of an uploaded document in the document store
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Create a document identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Document formats the pipeline can read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// Portable Document Format
    Pdf,

    /// Word 97-2003 binary document
    Doc,

    /// Office Open XML word-processing document
    Docx,
}

impl DocumentFormat {
    /// Every supported format
    pub const ALL: [DocumentFormat; 3] = [DocumentFormat::Pdf, DocumentFormat::Doc, DocumentFormat::Docx];

    /// Get the format name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Doc => "doc",
            DocumentFormat::Docx => "docx",
        }
    }

    /// Parse a declared format ("pdf", ".DOCX", ...)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "doc" => Some(DocumentFormat::Doc),
            "docx" => Some(DocumentFormat::Docx),
            _ => None,
        }
    }

    /// Infer the format from a file name's extension
    pub fn from_filename(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        Self::parse(ext)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unsupported document format: {}", s))
    }
}

/// An uploaded document as fetched from the document store
///
/// The byte content is shared and immutable; cloning a `RawDocument` never
/// copies the document. The declared format is kept verbatim so that an
/// unsupported declaration can be reported as such.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    bytes: Arc<[u8]>,
    declared_format: String,
    filename: String,
}

impl RawDocument {
    /// Create a document from its bytes, declared format, and original file name
    pub fn new(
        bytes: impl Into<Arc<[u8]>>,
        declared_format: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            declared_format: declared_format.into(),
            filename: filename.into(),
        }
    }

    /// The document content
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the document in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the document has no content
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The format as declared by the uploader
    pub fn declared_format(&self) -> &str {
        &self.declared_format
    }

    /// The original file name
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The declared format, if it is one the pipeline supports
    pub fn format(&self) -> Option<DocumentFormat> {
        DocumentFormat::parse(&self.declared_format)
    }
}
