//! Covenant Field Resolver
//!
//! Maps recognized entities to contract fields with confidence scores.
//!
//! The resolver provides:
//! - Date normalization and start / end / renewal classification by cue words
//! - Monetary amount normalization (symbols, ISO codes, scale suffixes)
//! - Client selection by mention frequency and `Client:`-style cues
//! - Contact name pairing with nearby email addresses and phone numbers
//! - Contract title and type detection from the document text
//!
//! Every candidate's confidence is
//! `clamp(base × cue_boost × frequency_boost, 0, 1)`; see
//! [`covenant_domain::confidence`]. All tunables live in [`ResolverConfig`].
//!
//! # Examples
//!
//! ```
//! use covenant_domain::{BlockRole, EntityType, ExtractedText, FieldName, RecognizedEntity, Span};
//! use covenant_resolver::{FieldResolver, ResolverConfig};
//! use std::collections::BTreeSet;
//!
//! let text = ExtractedText::from_blocks([(BlockRole::Paragraph, "Client: Acme Corp")]);
//! let entities = vec![RecognizedEntity::new(0, EntityType::Org, "Acme Corp", Span::new(8, 17), 0, 0.75)];
//!
//! let resolver = FieldResolver::new(ResolverConfig::default());
//! let resolution = resolver.resolve(&text, &entities, &BTreeSet::from([FieldName::Client]));
//! let client = &resolution.fields[&FieldName::Client][0];
//! assert_eq!(client.value().as_text(), Some("Acme Corp"));
//! ```

#![warn(missing_docs)]

mod config;
mod cues;
mod dates;
mod document;
mod error;
mod money;
mod parties;
mod resolver;
mod tally;

pub use config::ResolverConfig;
pub use cues::{Cue, CueIndex, CueKind};
pub use dates::parse_date;
pub use error::ConfigError;
pub use money::parse_money;
pub use parties::{normalize_phone, organization_key};
pub use resolver::{FieldResolver, Resolution};
