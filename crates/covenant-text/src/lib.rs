//! Covenant Document Text Extractor
//!
//! Turns uploaded contract documents (PDF, DOC, DOCX) into ordered text blocks.
//!
//! # Architecture
//!
//! ```text
//! RawDocument → sniff container → PDF | OOXML | OLE parser → ExtractedText
//! ```
//!
//! The declared format decides whether a document is accepted at all; the
//! leading bytes decide which parser reads it. A `.doc` upload that is really
//! an OOXML package is read by the DOCX parser, and the other way around.
//!
//! # Example Usage
//!
//! ```no_run
//! use covenant_domain::RawDocument;
//! use covenant_text::DocumentTextExtractor;
//!
//! # fn example(bytes: Vec<u8>) -> Result<(), covenant_text::TextError> {
//! let document = RawDocument::new(bytes, "pdf", "msa.pdf");
//! let text = DocumentTextExtractor::new().extract(&document)?;
//! for block in text.blocks() {
//!     println!("{:>10} | {}", block.role().as_str(), block.text());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod doc;
mod docx;
mod error;
mod extractor;
mod pdf;
mod sniff;

pub use error::TextError;
pub use extractor::DocumentTextExtractor;
pub use sniff::{sniff, Container};
