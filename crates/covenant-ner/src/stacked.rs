//! Layered recognition with overlap resolution
//!
//! Every layer sees the whole block. When spans from different layers
//! overlap, the [`ConflictStrategy`] decides which one survives.
//!
//! ```text
//! block ──▶ PatternRecognizer  ──┐
//!       └─▶ HeuristicRecognizer ─┴─▶ resolve overlaps ──▶ Vec<RawEntity>
//! ```

use crate::error::RecognizerError;
use crate::heuristic::HeuristicRecognizer;
use crate::pattern::PatternRecognizer;
use crate::RecognizerInfo;
use covenant_domain::traits::EntityRecognizer;
use covenant_domain::{EntityType, RawEntity};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;

/// A recognition layer
pub type Layer = Box<dyn EntityRecognizer<Error = RecognizerError> + Send + Sync>;

/// How overlapping spans from different layers are resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStrategy {
    /// Earlier layers win
    #[default]
    EarlierLayer,
    /// The longer span wins; ties go to the earlier layer
    LongestSpan,
    /// The more confident entity wins; ties go to the earlier layer
    HighestConfidence,
}

/// Recognizer composed of ordered layers
pub struct StackedRecognizer {
    layers: Vec<Layer>,
    strategy: ConflictStrategy,
    name: String,
}

impl StackedRecognizer {
    /// Start building a custom stack
    pub fn builder() -> StackedRecognizerBuilder {
        StackedRecognizerBuilder::default()
    }

    /// The conflict strategy in use
    pub fn strategy(&self) -> ConflictStrategy {
        self.strategy
    }

    /// Names of the layers, in priority order
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|layer| layer.name()).collect()
    }

    /// Describe the engine
    pub fn info(&self) -> RecognizerInfo {
        RecognizerInfo {
            name: self.name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            layers: self.layer_names().into_iter().map(str::to_string).collect(),
            labels: EntityType::ALL.to_vec(),
            strategy: self.strategy,
        }
    }

    fn resolve(&self, mut candidates: Vec<(usize, RawEntity)>) -> Vec<RawEntity> {
        match self.strategy {
            ConflictStrategy::EarlierLayer => {
                candidates.sort_by_key(|(layer, e)| (*layer, e.start));
            }
            ConflictStrategy::LongestSpan => {
                candidates.sort_by_key(|(layer, e)| (Reverse(e.end - e.start), *layer, e.start));
            }
            ConflictStrategy::HighestConfidence => {
                candidates.sort_by(|(la, a), (lb, b)| {
                    b.confidence
                        .total_cmp(&a.confidence)
                        .then(la.cmp(lb))
                        .then(a.start.cmp(&b.start))
                });
            }
        }

        let mut accepted: Vec<RawEntity> = Vec::with_capacity(candidates.len());
        for (_, entity) in candidates {
            let overlaps = accepted
                .iter()
                .any(|kept| entity.start < kept.end && kept.start < entity.end);
            if !overlaps {
                accepted.push(entity);
            }
        }
        accepted.sort_by_key(|e| (e.start, e.end));
        accepted
    }
}

impl Default for StackedRecognizer {
    /// Pattern layer first, then heuristics
    fn default() -> Self {
        Self::builder()
            .layer(PatternRecognizer::new())
            .layer(HeuristicRecognizer::new())
            .build()
    }
}

impl fmt::Debug for StackedRecognizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackedRecognizer")
            .field("layers", &self.layer_names())
            .field("strategy", &self.strategy)
            .finish()
    }
}

impl EntityRecognizer for StackedRecognizer {
    type Error = RecognizerError;

    fn name(&self) -> &str {
        &self.name
    }

    fn ready(&self) -> Result<(), Self::Error> {
        if self.layers.is_empty() {
            return Err(RecognizerError::Unavailable("recognizer has no layers".to_string()));
        }
        self.layers.iter().try_for_each(|layer| layer.ready())
    }

    fn recognize(&self, block: &str) -> Result<Vec<RawEntity>, Self::Error> {
        let mut candidates = Vec::new();
        for (index, layer) in self.layers.iter().enumerate() {
            candidates.extend(layer.recognize(block)?.into_iter().map(|e| (index, e)));
        }
        Ok(self.resolve(candidates))
    }
}

/// Builder for [`StackedRecognizer`]
#[derive(Default)]
pub struct StackedRecognizerBuilder {
    layers: Vec<Layer>,
    strategy: ConflictStrategy,
}

impl StackedRecognizerBuilder {
    /// Append a layer (lower priority than those already added)
    pub fn layer<R>(self, layer: R) -> Self
    where
        R: EntityRecognizer<Error = RecognizerError> + Send + Sync + 'static,
    {
        self.layer_boxed(Box::new(layer))
    }

    /// Append an already boxed layer
    pub fn layer_boxed(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Set the conflict strategy
    pub fn strategy(mut self, strategy: ConflictStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Finish building
    pub fn build(self) -> StackedRecognizer {
        let name = format!(
            "stacked({})",
            self.layers.iter().map(|l| l.name()).collect::<Vec<_>>().join("+")
        );
        StackedRecognizer {
            layers: self.layers,
            strategy: self.strategy,
            name,
        }
    }
}
