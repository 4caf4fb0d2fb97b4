//! Document stores
//!
//! [`FsDocumentStore`] reads uploads from a directory; [`InMemoryDocumentStore`]
//! holds documents in memory for tests and embedding.

use covenant_domain::traits::DocumentStore;
use covenant_domain::{DocumentFormat, DocumentId, RawDocument};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by the document stores
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store directory is missing or not a directory
    #[error("Store directory unavailable: {0}")]
    Unavailable(String),

    /// Reading a document failed
    #[error("Failed to read document {id}: {reason}")]
    Io {
        /// Document being read
        id: DocumentId,
        /// Underlying I/O error
        reason: String,
    },
}

/// Uploads stored as files in one directory
///
/// A document's ID is its file name and its declared format is the file
/// extension. IDs that name anything outside the directory are treated as
/// absent.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    /// Open a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::Unavailable(root.display().to_string()));
        }
        Ok(Self { root })
    }

    /// The store directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// IDs of the stored documents with a supported extension, sorted
    pub fn list(&self) -> Result<Vec<DocumentId>, StoreError> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let mut ids: Vec<DocumentId> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| DocumentFormat::from_filename(name).is_some())
            .map(DocumentId::from)
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn resolve(&self, id: &DocumentId) -> Option<PathBuf> {
        let name = id.as_str();
        let plain = !name.is_empty()
            && !name.starts_with('.')
            && !name.contains("..")
            && !name.chars().any(|c| matches!(c, '/' | '\\' | '\0'));
        if !plain {
            tracing::warn!(id = name, "Rejected document id outside the store");
            return None;
        }
        Some(self.root.join(name))
    }
}

impl DocumentStore for FsDocumentStore {
    type Error = StoreError;

    fn fetch(&self, id: &DocumentId) -> Result<Option<RawDocument>, Self::Error> {
        let Some(path) = self.resolve(id) else {
            return Ok(None);
        };
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Io {
                    id: id.clone(),
                    reason: e.to_string(),
                })
            }
        };
        let declared = id.as_str().rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();
        tracing::debug!(id = id.as_str(), bytes = bytes.len(), format = declared, "Fetched document");
        Ok(Some(RawDocument::new(bytes, declared, id.as_str())))
    }
}

/// Documents held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    documents: BTreeMap<DocumentId, RawDocument>,
}

impl InMemoryDocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a document
    pub fn insert(&mut self, id: impl Into<DocumentId>, document: RawDocument) {
        self.documents.insert(id.into(), document);
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    type Error = StoreError;

    fn fetch(&self, id: &DocumentId) -> Result<Option<RawDocument>, Self::Error> {
        Ok(self.documents.get(id).cloned())
    }
}
