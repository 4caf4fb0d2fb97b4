//! Provenance tracking for field candidates
//!
//! A candidate never owns the entity it was derived from; it keeps a small
//! copyable reference that is enough to locate the evidence again in the
//! extracted text and to record it in the contract's activity history.

use crate::entity::{EntityType, Span};
use serde::{Deserialize, Serialize};

/// Non-owning reference to a recognized entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// Position of the entity in its recognition sequence
    pub ordinal: usize,
    /// Entity category
    pub entity_type: EntityType,
    /// Character span in the document's full text
    pub span: Span,
}

/// Where a candidate value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Provenance {
    /// Derived from a recognized entity
    Entity(EntityRef),

    /// Derived directly from document text (titles, keyword classification)
    Text {
        /// Index of the block the evidence sits in
        block_index: usize,
        /// Character span of the evidence in the full text
        span: Span,
    },
}

impl Provenance {
    /// Character span of the evidence
    pub fn span(&self) -> Span {
        match self {
            Provenance::Entity(entity) => entity.span,
            Provenance::Text { span, .. } => *span,
        }
    }

    /// The referenced entity, if the candidate came from one
    pub fn entity(&self) -> Option<&EntityRef> {
        match self {
            Provenance::Entity(entity) => Some(entity),
            Provenance::Text { .. } => None,
        }
    }
}

impl From<EntityRef> for Provenance {
    fn from(entity: EntityRef) -> Self {
        Provenance::Entity(entity)
    }
}
