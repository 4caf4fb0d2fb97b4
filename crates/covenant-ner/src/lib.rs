//! Covenant Entity Recognition Layer
//!
//! Connects an entity recognition engine to extracted document text.
//!
//! # Architecture
//!
//! Engines implement the `EntityRecognizer` trait from `covenant-domain` and
//! see one text block at a time. [`EntityRecognizerAdapter`] drives an engine
//! over a whole document and yields a lazy [`EntitySequence`] of
//! document-located entities.
//!
//! # Engines
//!
//! - `StackedRecognizer`: the bundled engine, a [`PatternRecognizer`] layer
//!   followed by a [`HeuristicRecognizer`] layer
//! - `MockRecognizer`: scripted entities for testing
//!
//! The bundled engine compiles its patterns once per process; share it with
//! [`shared_recognizer`].
//!
//! # Examples
//!
//! ```
//! use covenant_domain::{BlockRole, EntityType, ExtractedText};
//! use covenant_ner::{shared_recognizer, EntityRecognizerAdapter};
//!
//! let text = ExtractedText::from_blocks([(BlockRole::Paragraph, "Client: Acme Corp")]);
//! let adapter = EntityRecognizerAdapter::new(shared_recognizer());
//! let entities: Vec<_> = adapter.recognize(&text).collect::<Result<_, _>>().unwrap();
//! assert_eq!(entities[0].entity_type(), EntityType::Org);
//! assert_eq!(entities[0].text(), "Acme Corp");
//! ```

#![warn(missing_docs)]

mod adapter;
mod error;
mod heuristic;
mod pattern;
mod stacked;

use covenant_domain::traits::EntityRecognizer;
use covenant_domain::{EntityType, RawEntity};
use serde::Serialize;
use std::sync::{Arc, LazyLock, Mutex};
use std::time::Duration;

pub use adapter::{CancellationFlag, EntityRecognizerAdapter, EntitySequence};
pub use error::RecognizerError;
pub use heuristic::HeuristicRecognizer;
pub use pattern::PatternRecognizer;
pub use stacked::{ConflictStrategy, Layer, StackedRecognizer, StackedRecognizerBuilder};

static SHARED: LazyLock<Arc<StackedRecognizer>> = LazyLock::new(|| {
    let recognizer = StackedRecognizer::default();
    tracing::info!(name = recognizer.name(), "Loaded entity recognizer");
    Arc::new(recognizer)
});

/// The process-wide default recognizer
///
/// Built on first use and shared read-only afterwards.
pub fn shared_recognizer() -> Arc<StackedRecognizer> {
    Arc::clone(&SHARED)
}

/// Description of a recognition engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognizerInfo {
    /// Engine name
    pub name: String,
    /// Engine version
    pub version: String,
    /// Layer names in priority order
    pub layers: Vec<String>,
    /// Entity types the engine can produce
    pub labels: Vec<EntityType>,
    /// How overlapping layer output is resolved
    pub strategy: ConflictStrategy,
}

#[derive(Debug, Default)]
struct MockState {
    entities: Vec<(String, EntityType, f64)>,
    failures: Vec<String>,
    unavailable: bool,
    delay: Option<Duration>,
}

/// Mock recognizer for deterministic testing
///
/// Reports every occurrence of each registered substring as an entity.
/// Clones share their script and call count.
///
/// # Examples
///
/// ```
/// use covenant_domain::traits::EntityRecognizer;
/// use covenant_domain::EntityType;
/// use covenant_ner::MockRecognizer;
///
/// let mut recognizer = MockRecognizer::new();
/// recognizer.add_entity("Acme Corp", EntityType::Org, 0.75);
///
/// let entities = recognizer.recognize("Acme Corp and Acme Corp").unwrap();
/// assert_eq!(entities.len(), 2);
/// assert_eq!(recognizer.call_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockRecognizer {
    state: Arc<Mutex<MockState>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockRecognizer {
    /// Create a mock that recognizes nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Report every occurrence of `surface` as an entity
    pub fn add_entity(&mut self, surface: impl Into<String>, entity_type: EntityType, confidence: f64) {
        self.state
            .lock()
            .unwrap()
            .entities
            .push((surface.into(), entity_type, confidence));
    }

    /// Fail any block containing `needle`
    pub fn fail_on(&mut self, needle: impl Into<String>) {
        self.state.lock().unwrap().failures.push(needle.into());
    }

    /// Make the engine report itself (un)loaded
    pub fn set_available(&mut self, available: bool) {
        self.state.lock().unwrap().unavailable = !available;
    }

    /// Sleep this long on every call
    pub fn with_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().delay = Some(delay);
        self
    }

    /// Get the number of times recognize was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap() = 0;
    }
}

impl EntityRecognizer for MockRecognizer {
    type Error = RecognizerError;

    fn name(&self) -> &str {
        "mock"
    }

    fn ready(&self) -> Result<(), Self::Error> {
        if self.state.lock().unwrap().unavailable {
            return Err(RecognizerError::Unavailable("mock engine not loaded".to_string()));
        }
        Ok(())
    }

    fn recognize(&self, block: &str) -> Result<Vec<RawEntity>, Self::Error> {
        *self.call_count.lock().unwrap() += 1;

        let (delay, unavailable) = {
            let state = self.state.lock().unwrap();
            (state.delay, state.unavailable)
        };
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        if unavailable {
            return Err(RecognizerError::Unavailable("mock engine not loaded".to_string()));
        }

        let state = self.state.lock().unwrap();
        if let Some(needle) = state.failures.iter().find(|n| block.contains(n.as_str())) {
            return Err(RecognizerError::Unavailable(format!("mock failure on '{}'", needle)));
        }

        let mut entities: Vec<RawEntity> = state
            .entities
            .iter()
            .flat_map(|(surface, entity_type, confidence)| {
                block
                    .match_indices(surface.as_str())
                    .map(move |(start, text)| RawEntity::new(*entity_type, start, start + text.len(), text, *confidence))
            })
            .collect();
        entities.sort_by_key(|e| (e.start, e.end));
        Ok(entities)
    }
}
