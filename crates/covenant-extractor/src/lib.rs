//! Covenant Extractor
//!
//! Orchestrates the contract extraction pipeline for one uploaded document.
//!
//! # Architecture
//!
//! ```text
//! DocumentStore → TextExtractor → EntityRecognizer → FieldResolver → checks → ExtractionResult
//! ```
//!
//! # Key Features
//!
//! - **Time budget**: the CPU-bound stages run on the blocking pool under a
//!   per-call timeout; a timed-out extraction returns no partial result
//! - **Cross-field checks**: inverted start/end dates are penalized; missing
//!   or ambiguous clients and contract values are reported as warnings
//! - **Classified errors**: every [`ExtractionError`] maps to a [`FailureClass`]
//! - **Review boundary**: [`ReviewDraft`] turns a result into a
//!   [`ConfirmedContract`] with per-field provenance
//!
//! # Example Usage
//!
//! ```no_run
//! use covenant_domain::{DocumentId, FieldName};
//! use covenant_extractor::{ExtractionOptions, Extractor, ExtractorConfig, FsDocumentStore};
//! use covenant_ner::shared_recognizer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FsDocumentStore::new("/var/uploads")?;
//! let extractor = Extractor::new(store, shared_recognizer(), ExtractorConfig::default());
//!
//! let options = ExtractionOptions::default().with_min_confidence(0.3);
//! let result = extractor.extract(&DocumentId::from("msa.pdf"), &options).await?;
//!
//! if let Some(client) = result.top(FieldName::Client) {
//!     println!("Client: {} ({:.2})", client.value(), client.confidence());
//! }
//! for warning in result.warnings() {
//!     println!("Warning: {}", warning);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod checks;
mod config;
mod error;
mod extractor;
mod options;
mod review;
mod state;
mod store;


pub use config::ExtractorConfig;
pub use covenant_resolver::ConfigError;
pub use error::{ExtractionError, FailureClass};
pub use extractor::Extractor;
pub use options::ExtractionOptions;
pub use review::{CandidateProvenance, ConfirmedContract, ConfirmedField, ReviewDraft, ReviewError};
pub use state::{PipelineStage, StageTracker, TransitionError};
pub use store::{FsDocumentStore, InMemoryDocumentStore, StoreError};
