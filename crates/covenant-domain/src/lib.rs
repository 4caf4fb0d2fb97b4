//! Covenant Domain Layer
//!
//! This crate contains the data model of the contract extraction pipeline and
//! the trait seams through which it talks to the outside world. It holds no
//! parsing, recognition, or I/O code; those live in the crates layered above it.
//!
//! ## Key Concepts
//!
//! - **RawDocument**: immutable uploaded bytes plus their declared format
//! - **ExtractedText**: ordered text blocks tagged with a structural role
//! - **RecognizedEntity**: a typed span found by the entity recognizer
//! - **FieldCandidate**: a confidence-scored, normalized value for one contract field
//! - **ExtractionResult**: ranked candidates for every requested field, plus warnings
//!
//! ## Architecture
//!
//! ```text
//! bytes → ExtractedText → RecognizedEntity* → FieldCandidate* → ExtractionResult
//! ```
//!
//! External collaborators are reached only through [`traits::DocumentStore`]
//! and [`traits::EntityRecognizer`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod confidence;
pub mod document;
pub mod entity;
pub mod field;
pub mod provenance;
pub mod result;
pub mod text;
pub mod traits;

// Re-exports for convenience
pub use confidence::ConfidenceFactors;
pub use document::{DocumentFormat, DocumentId, RawDocument};
pub use entity::{EntityType, RawEntity, RecognizedEntity, Span};
pub use field::{FieldCandidate, FieldName, FieldValue, MonetaryAmount};
pub use provenance::{EntityRef, Provenance};
pub use result::{ExtractionId, ExtractionMetadata, ExtractionResult, ExtractionWarning};
pub use text::{BlockLocation, BlockRole, ExtractedText, ExtractedTextBuilder, TableCoordinates, TextBlock};
