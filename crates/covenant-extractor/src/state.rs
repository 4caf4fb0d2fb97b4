//! Pipeline stage tracking for one extraction

use crate::error::ExtractionError;
use std::fmt;
use std::time::Instant;
use thiserror::Error;

/// Where an extraction is in the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineStage {
    /// The document has been fetched
    Started,

    /// Text has been extracted from the document
    TextExtracted,

    /// The recognizer has run over the text
    EntitiesRecognized,

    /// Entities have been resolved into field candidates
    FieldsResolved,

    /// The result has been built
    Completed,

    /// The extraction stopped with an error
    Failed(String),
}

impl PipelineStage {
    /// Stage name for logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            PipelineStage::Started => "started",
            PipelineStage::TextExtracted => "text_extracted",
            PipelineStage::EntitiesRecognized => "entities_recognized",
            PipelineStage::FieldsResolved => "fields_resolved",
            PipelineStage::Completed => "completed",
            PipelineStage::Failed(_) => "failed",
        }
    }

    /// Whether no further transition is allowed
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Completed | PipelineStage::Failed(_))
    }

    /// The stage that follows this one on success
    fn successor(&self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Started => Some(PipelineStage::TextExtracted),
            PipelineStage::TextExtracted => Some(PipelineStage::EntitiesRecognized),
            PipelineStage::EntitiesRecognized => Some(PipelineStage::FieldsResolved),
            PipelineStage::FieldsResolved => Some(PipelineStage::Completed),
            PipelineStage::Completed | PipelineStage::Failed(_) => None,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Failed(reason) => write!(f, "failed: {}", reason),
            other => f.write_str(other.name()),
        }
    }
}

/// A transition the pipeline does not allow
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid transition from {from} to {to}")]
pub struct TransitionError {
    /// The stage the pipeline was in
    pub from: &'static str,
    /// The stage that was requested
    pub to: &'static str,
}

impl From<TransitionError> for ExtractionError {
    fn from(e: TransitionError) -> Self {
        ExtractionError::Internal(e.to_string())
    }
}

/// Tracks the stage of one extraction
///
/// Stages only move forward one step at a time, or to `Failed` from any
/// non-terminal stage. Terminal stages reject every transition.
#[derive(Debug)]
pub struct StageTracker {
    stage: PipelineStage,
    started: Instant,
}

impl StageTracker {
    /// Start tracking at [`PipelineStage::Started`]
    pub fn new() -> Self {
        Self {
            stage: PipelineStage::Started,
            started: Instant::now(),
        }
    }

    /// The current stage
    pub fn stage(&self) -> &PipelineStage {
        &self.stage
    }

    /// Milliseconds since tracking started
    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Move to the next stage
    pub fn advance(&mut self, next: PipelineStage) -> Result<(), TransitionError> {
        let allowed = match &next {
            PipelineStage::Failed(_) => !self.stage.is_terminal(),
            other => self.stage.successor().as_ref() == Some(other),
        };
        if !allowed {
            return Err(TransitionError {
                from: self.stage.name(),
                to: next.name(),
            });
        }
        tracing::debug!(from = self.stage.name(), to = next.name(), elapsed_ms = self.elapsed_ms(), "Pipeline stage");
        self.stage = next;
        Ok(())
    }

    /// Record a failure and hand the error back
    ///
    /// A tracker that is already terminal keeps its stage.
    pub fn fail(&mut self, error: ExtractionError) -> ExtractionError {
        if self.advance(PipelineStage::Failed(error.to_string())).is_err() {
            tracing::debug!(stage = self.stage.name(), "Failure after terminal stage");
        }
        error
    }
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut tracker = StageTracker::new();
        for next in [
            PipelineStage::TextExtracted,
            PipelineStage::EntitiesRecognized,
            PipelineStage::FieldsResolved,
            PipelineStage::Completed,
        ] {
            tracker.advance(next).unwrap();
        }
        assert_eq!(tracker.stage(), &PipelineStage::Completed);
        assert!(tracker.stage().is_terminal());
    }

    #[test]
    fn test_skipping_a_stage_is_rejected() {
        let mut tracker = StageTracker::new();
        let err = tracker.advance(PipelineStage::FieldsResolved).unwrap_err();
        assert_eq!(err.to_string(), "invalid transition from started to fields_resolved");
        assert_eq!(tracker.stage(), &PipelineStage::Started);
    }

    #[test]
    fn test_any_stage_can_fail() {
        let mut tracker = StageTracker::new();
        tracker.advance(PipelineStage::TextExtracted).unwrap();
        let err = tracker.fail(ExtractionError::RecognitionTimeout(1));
        assert_eq!(err, ExtractionError::RecognitionTimeout(1));
        assert_eq!(tracker.stage().name(), "failed");
    }

    #[test]
    fn test_terminal_stages_reject_transitions() {
        let mut tracker = StageTracker::new();
        tracker.fail(ExtractionError::Store("disk".into()));
        assert!(tracker.advance(PipelineStage::TextExtracted).is_err());
        assert!(tracker.advance(PipelineStage::Failed("again".into())).is_err());
        assert_eq!(tracker.stage(), &PipelineStage::Failed("Store error: disk".into()));
    }

    #[test]
    fn test_transition_error_is_internal() {
        let err: ExtractionError = TransitionError {
            from: "completed",
            to: "started",
        }
        .into();
        assert!(matches!(err, ExtractionError::Internal(_)));
    }
}
