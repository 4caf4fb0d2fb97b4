//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and the
//! collaborators it does not own. Implementations live in other crates.

use crate::{DocumentId, RawDocument, RawEntity};

/// Trait for retrieving uploaded documents
///
/// Implemented by the storage layer (covenant-extractor's `store` module)
pub trait DocumentStore {
    /// Error type for store operations
    type Error;

    /// Fetch a document by ID; `Ok(None)` when it does not exist
    fn fetch(&self, id: &DocumentId) -> Result<Option<RawDocument>, Self::Error>;
}

/// Trait for named-entity recognition engines
///
/// Implemented by covenant-ner. An engine receives one text block at a time
/// and reports entities with byte offsets relative to that block.
pub trait EntityRecognizer {
    /// Error type for recognition operations
    type Error;

    /// Engine name, recorded in extraction metadata
    fn name(&self) -> &str;

    /// Check that the engine is loaded and usable
    fn ready(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Recognize entities in one block of text
    fn recognize(&self, block: &str) -> Result<Vec<RawEntity>, Self::Error>;
}
