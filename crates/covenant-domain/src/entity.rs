//! Named entities produced by recognition

use crate::provenance::EntityRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity categories the pipeline consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    /// Organization (companies, agencies)
    Org,
    /// Person name
    Person,
    /// Calendar date expression
    Date,
    /// Monetary expression
    Money,
    /// Email address
    Email,
    /// Telephone number
    Phone,
}

impl EntityType {
    /// Every entity type
    pub const ALL: [EntityType; 6] = [
        EntityType::Org,
        EntityType::Person,
        EntityType::Date,
        EntityType::Money,
        EntityType::Email,
        EntityType::Phone,
    ];

    /// Get the conventional NER label
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Org => "ORG",
            EntityType::Person => "PERSON",
            EntityType::Date => "DATE",
            EntityType::Money => "MONEY",
            EntityType::Email => "EMAIL",
            EntityType::Phone => "PHONE",
        }
    }

    /// Parse an NER label
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ORG" => Some(EntityType::Org),
            "PERSON" => Some(EntityType::Person),
            "DATE" => Some(EntityType::Date),
            "MONEY" => Some(EntityType::Money),
            "EMAIL" => Some(EntityType::Email),
            "PHONE" => Some(EntityType::Phone),
            _ => None,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open character range `[start, end)` in a document's full text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    /// First character offset
    pub start: usize,
    /// One past the last character offset
    pub end: usize,
}

impl Span {
    /// Create a span
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");
        Self { start, end }
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span covers no characters
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether two spans share at least one character
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Character gap between two spans (0 when they touch or overlap)
    pub fn distance(&self, other: &Span) -> usize {
        if self.end <= other.start {
            other.start - self.end
        } else if other.end <= self.start {
            self.start - other.end
        } else {
            0
        }
    }
}

/// An entity as reported by a recognition engine for one text block
///
/// `start` and `end` are byte offsets into the block that was passed to the
/// engine. The adapter validates them and converts them to document-level
/// character spans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntity {
    /// Entity category
    pub entity_type: EntityType,
    /// Byte offset of the entity start within the block
    pub start: usize,
    /// Byte offset one past the entity end within the block
    pub end: usize,
    /// Surface text as reported by the engine
    pub text: String,
    /// Engine confidence in [0, 1]
    pub confidence: f64,
}

impl RawEntity {
    /// Create a raw entity
    pub fn new(entity_type: EntityType, start: usize, end: usize, text: impl Into<String>, confidence: f64) -> Self {
        Self {
            entity_type,
            start,
            end,
            text: text.into(),
            confidence,
        }
    }
}

/// An entity located in a document's extracted text
///
/// Recognized entities are read-only outputs of recognition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedEntity {
    ordinal: usize,
    entity_type: EntityType,
    text: String,
    span: Span,
    block_index: usize,
    base_confidence: f64,
}

impl RecognizedEntity {
    /// Create a recognized entity
    ///
    /// The base confidence is clamped to [0, 1].
    pub fn new(
        ordinal: usize,
        entity_type: EntityType,
        text: impl Into<String>,
        span: Span,
        block_index: usize,
        base_confidence: f64,
    ) -> Self {
        Self {
            ordinal,
            entity_type,
            text: text.into(),
            span,
            block_index,
            base_confidence: crate::confidence::clamp_confidence(base_confidence),
        }
    }

    /// Position of the entity in its recognition sequence
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Entity category
    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Surface text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Character span in the document's full text
    pub fn span(&self) -> Span {
        self.span
    }

    /// Index of the block the entity was found in
    pub fn block_index(&self) -> usize {
        self.block_index
    }

    /// Recognizer-provided confidence
    pub fn base_confidence(&self) -> f64 {
        self.base_confidence
    }

    /// A non-owning reference to this entity
    pub fn reference(&self) -> EntityRef {
        EntityRef {
            ordinal: self.ordinal,
            entity_type: self.entity_type,
            span: self.span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_labels() {
        for ty in EntityType::ALL {
            assert_eq!(EntityType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(EntityType::parse("gpe"), None);
    }

    #[test]
    fn test_span_distance() {
        let a = Span::new(0, 5);
        let b = Span::new(10, 12);
        assert_eq!(a.distance(&b), 5);
        assert_eq!(b.distance(&a), 5);
        assert_eq!(a.distance(&Span::new(5, 7)), 0);
        assert_eq!(a.distance(&Span::new(3, 7)), 0);
        assert!(a.overlaps(&Span::new(3, 7)));
        assert!(!a.overlaps(&Span::new(5, 7)));
    }

    #[test]
    fn test_recognized_entity_clamps_confidence() {
        let entity = RecognizedEntity::new(0, EntityType::Org, "Acme Corp", Span::new(0, 9), 0, 1.7);
        assert_eq!(entity.base_confidence(), 1.0);

        let entity = RecognizedEntity::new(1, EntityType::Org, "Acme Corp", Span::new(0, 9), 0, -0.2);
        assert_eq!(entity.base_confidence(), 0.0);
    }

    #[test]
    fn test_reference_carries_location() {
        let entity = RecognizedEntity::new(4, EntityType::Money, "$50,000", Span::new(20, 27), 2, 0.9);
        let reference = entity.reference();
        assert_eq!(reference.ordinal, 4);
        assert_eq!(reference.entity_type, EntityType::Money);
        assert_eq!(reference.span, Span::new(20, 27));
    }
}
