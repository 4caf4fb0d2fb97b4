//! Adapter between an entity recognition engine and extracted document text
//!
//! Engines see one block at a time and report byte offsets relative to that
//! block. The adapter turns those reports into document-level entities:
//! character spans in [`ExtractedText::full_text`], ordinals in reading order,
//! and confidences clamped to [0, 1]. Malformed reports are dropped.

use crate::error::RecognizerError;
use covenant_domain::traits::EntityRecognizer;
use covenant_domain::{ExtractedText, RawEntity, RecognizedEntity, Span, TextBlock};
use std::collections::VecDeque;
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag used to stop recognition between blocks
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Create an unset flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs an [`EntityRecognizer`] over extracted text
#[derive(Debug)]
pub struct EntityRecognizerAdapter<R> {
    recognizer: Arc<R>,
    cancellation: CancellationFlag,
    char_budget: Option<usize>,
}

impl<R> Clone for EntityRecognizerAdapter<R> {
    fn clone(&self) -> Self {
        Self {
            recognizer: Arc::clone(&self.recognizer),
            cancellation: self.cancellation.clone(),
            char_budget: self.char_budget,
        }
    }
}

impl<R> EntityRecognizerAdapter<R>
where
    R: EntityRecognizer,
    R::Error: Display,
{
    /// Create an adapter over a shared engine
    pub fn new(recognizer: Arc<R>) -> Self {
        Self {
            recognizer,
            cancellation: CancellationFlag::new(),
            char_budget: None,
        }
    }

    /// Use an externally owned cancellation flag
    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = flag;
        self
    }

    /// Stop recognizing after this many characters of text
    pub fn with_char_budget(mut self, budget: usize) -> Self {
        self.char_budget = Some(budget);
        self
    }

    /// The wrapped engine
    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// Check that the engine is loaded
    pub fn ready(&self) -> Result<(), RecognizerError> {
        self.recognizer
            .ready()
            .map_err(|e| RecognizerError::Unavailable(e.to_string()))
    }

    /// Lazily recognize entities in document order
    ///
    /// Nothing is sent to the engine until the sequence is iterated.
    pub fn recognize<'a>(&'a self, text: &'a ExtractedText) -> EntitySequence<'a, R> {
        EntitySequence {
            adapter: self,
            text,
            next_block: 0,
            pending: VecDeque::new(),
            next_ordinal: 0,
            recognized_chars: 0,
            truncated: false,
            finished: false,
        }
    }
}

/// Lazy, finite sequence of recognized entities
///
/// Entities come out ordered by position in the document. After an error the
/// sequence ends. [`EntitySequence::restart`] rewinds it to the first block.
#[derive(Debug)]
pub struct EntitySequence<'a, R> {
    adapter: &'a EntityRecognizerAdapter<R>,
    text: &'a ExtractedText,
    next_block: usize,
    pending: VecDeque<RecognizedEntity>,
    next_ordinal: usize,
    recognized_chars: usize,
    truncated: bool,
    finished: bool,
}

impl<'a, R> EntitySequence<'a, R>
where
    R: EntityRecognizer,
    R::Error: Display,
{
    /// Rewind to the start of the document
    pub fn restart(&mut self) {
        self.next_block = 0;
        self.pending.clear();
        self.next_ordinal = 0;
        self.recognized_chars = 0;
        self.truncated = false;
        self.finished = false;
    }

    /// Characters passed to the engine so far
    pub fn recognized_chars(&self) -> usize {
        self.recognized_chars
    }

    /// Whether the character budget cut recognition short
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    fn recognize_block(&mut self, index: usize, block: &TextBlock) -> Result<(), RecognizerError> {
        let mut input = block.text();

        if let Some(budget) = self.adapter.char_budget {
            let remaining = budget.saturating_sub(self.recognized_chars);
            if block.char_len() > remaining {
                input = char_prefix(input, remaining);
                self.truncated = true;
                self.finished = true;
            }
        }
        self.recognized_chars += input.chars().count();

        if input.is_empty() {
            return Ok(());
        }

        let raw = self
            .adapter
            .recognizer
            .recognize(input)
            .map_err(|e| RecognizerError::Unavailable(e.to_string()))?;

        let mut located: Vec<(Span, RawEntity)> = raw
            .into_iter()
            .filter_map(|entity| locate(input, block.origin(), entity))
            .collect();
        located.sort_by_key(|(span, _)| (span.start, span.end));

        for (span, entity) in located {
            let text = slice_chars(input, span.start - block.origin(), span.end - block.origin());
            self.pending.push_back(RecognizedEntity::new(
                self.next_ordinal,
                entity.entity_type,
                text,
                span,
                index,
                entity.confidence,
            ));
            self.next_ordinal += 1;
        }
        Ok(())
    }
}

impl<'a, R> Iterator for EntitySequence<'a, R>
where
    R: EntityRecognizer,
    R::Error: Display,
{
    type Item = Result<RecognizedEntity, RecognizerError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entity) = self.pending.pop_front() {
                return Some(Ok(entity));
            }
            if self.finished {
                return None;
            }

            let text = self.text;
            let Some(block) = text.blocks().get(self.next_block) else {
                self.finished = true;
                return None;
            };

            if self.adapter.cancellation.is_cancelled() {
                self.finished = true;
                return Some(Err(RecognizerError::Cancelled));
            }

            let index = self.next_block;
            self.next_block += 1;
            if let Err(e) = self.recognize_block(index, block) {
                self.finished = true;
                self.pending.clear();
                return Some(Err(e));
            }
        }
    }
}

/// Validate a raw report and convert it to a document-level character span
fn locate(block: &str, origin: usize, entity: RawEntity) -> Option<(Span, RawEntity)> {
    let valid = entity.start < entity.end
        && entity.end <= block.len()
        && block.is_char_boundary(entity.start)
        && block.is_char_boundary(entity.end);
    if !valid {
        tracing::warn!(
            entity_type = %entity.entity_type,
            start = entity.start,
            end = entity.end,
            "Dropping entity with malformed span"
        );
        return None;
    }
    if entity.confidence.is_nan() || entity.confidence <= 0.0 {
        tracing::debug!(entity_type = %entity.entity_type, "Dropping zero-confidence entity");
        return None;
    }

    let start = origin + block[..entity.start].chars().count();
    let end = start + block[entity.start..entity.end].chars().count();
    Some((Span::new(start, end), entity))
}

fn char_prefix(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

fn slice_chars(text: &str, start: usize, end: usize) -> String {
    text.chars().skip(start).take(end - start).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockRecognizer;
    use covenant_domain::{BlockRole, EntityType};

    fn sample_text() -> ExtractedText {
        ExtractedText::from_blocks([
            (BlockRole::Heading, "Services Agreement"),
            (BlockRole::Paragraph, "Client: Acme Corp, signed by Jane Doe."),
            (BlockRole::Paragraph, "Questions: jane@acme.com or Acme Corp."),
        ])
    }

    fn mock() -> MockRecognizer {
        let mut mock = MockRecognizer::new();
        mock.add_entity("Acme Corp", EntityType::Org, 0.75);
        mock.add_entity("Jane Doe", EntityType::Person, 0.8);
        mock.add_entity("jane@acme.com", EntityType::Email, 0.95);
        mock
    }

    #[test]
    fn test_spans_index_full_text() {
        let text = sample_text();
        let adapter = EntityRecognizerAdapter::new(Arc::new(mock()));
        let entities: Vec<_> = adapter.recognize(&text).collect::<Result<_, _>>().unwrap();

        assert_eq!(entities.len(), 4);
        let chars: Vec<char> = text.full_text().chars().collect();
        for entity in &entities {
            let span = entity.span();
            let surface: String = chars[span.start..span.end].iter().collect();
            assert_eq!(surface, entity.text());
        }

        let ordinals: Vec<_> = entities.iter().map(|e| e.ordinal()).collect();
        assert_eq!(ordinals, vec![0, 1, 2, 3]);
        assert_eq!(entities[0].block_index(), 1);
        assert_eq!(entities[3].text(), "Acme Corp");
    }

    #[test]
    fn test_sequence_is_lazy() {
        let text = sample_text();
        let engine = Arc::new(mock());
        let adapter = EntityRecognizerAdapter::new(Arc::clone(&engine));

        let mut sequence = adapter.recognize(&text);
        assert_eq!(engine.call_count(), 0);
        sequence.next();
        // the heading has no entities, so the first entity needs two blocks
        assert_eq!(engine.call_count(), 2);
    }

    #[test]
    fn test_restart_repeats_sequence() {
        let text = sample_text();
        let adapter = EntityRecognizerAdapter::new(Arc::new(mock()));

        let mut sequence = adapter.recognize(&text);
        let first: Vec<_> = sequence.by_ref().collect::<Result<_, _>>().unwrap();
        assert!(sequence.next().is_none());

        sequence.restart();
        let second: Vec<_> = sequence.collect::<Result<_, _>>().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_multibyte_offsets_are_converted() {
        let text = ExtractedText::from_blocks([(BlockRole::Paragraph, "Fee: €5,000 due to Société Générale Corp")]);
        let mut engine = MockRecognizer::new();
        engine.add_entity("Société Générale Corp", EntityType::Org, 0.7);
        let adapter = EntityRecognizerAdapter::new(Arc::new(engine));

        let entities: Vec<_> = adapter.recognize(&text).collect::<Result<_, _>>().unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].span(), Span::new(19, 40));
    }

    #[test]
    fn test_malformed_and_zero_confidence_entities_are_dropped() {
        let block = "Acme Corp";
        assert!(locate(block, 0, RawEntity::new(EntityType::Org, 0, 40, "x", 0.5)).is_none());
        assert!(locate(block, 0, RawEntity::new(EntityType::Org, 4, 4, "", 0.5)).is_none());
        assert!(locate(block, 0, RawEntity::new(EntityType::Org, 0, 9, "Acme Corp", 0.0)).is_none());
        assert!(locate(block, 0, RawEntity::new(EntityType::Org, 0, 9, "Acme Corp", f64::NAN)).is_none());
        assert!(locate(block, 10, RawEntity::new(EntityType::Org, 0, 9, "Acme Corp", 0.5)).is_some());

        let accented = "é";
        assert!(locate(accented, 0, RawEntity::new(EntityType::Org, 1, 2, "", 0.5)).is_none());
    }

    #[test]
    fn test_confidence_is_clamped() {
        let text = ExtractedText::from_blocks([(BlockRole::Paragraph, "Acme Corp")]);
        let mut engine = MockRecognizer::new();
        engine.add_entity("Acme Corp", EntityType::Org, 3.0);
        let adapter = EntityRecognizerAdapter::new(Arc::new(engine));

        let entity = adapter.recognize(&text).next().unwrap().unwrap();
        assert_eq!(entity.base_confidence(), 1.0);
    }

    #[test]
    fn test_cancellation_stops_between_blocks() {
        let text = sample_text();
        let flag = CancellationFlag::new();
        let engine = Arc::new(mock());
        let adapter = EntityRecognizerAdapter::new(Arc::clone(&engine)).with_cancellation(flag.clone());

        let mut sequence = adapter.recognize(&text);
        assert!(sequence.next().unwrap().is_ok());
        flag.cancel();

        // entities already recognized in the current block are still delivered
        assert!(sequence.next().unwrap().is_ok());
        assert_eq!(sequence.next(), Some(Err(RecognizerError::Cancelled)));
        assert!(sequence.next().is_none());
        assert_eq!(engine.call_count(), 2);
    }

    #[test]
    fn test_char_budget_truncates() {
        let text = sample_text();
        let adapter = EntityRecognizerAdapter::new(Arc::new(mock())).with_char_budget(30);

        let mut sequence = adapter.recognize(&text);
        let entities: Vec<_> = sequence.by_ref().collect::<Result<_, _>>().unwrap();

        assert!(sequence.truncated());
        assert_eq!(sequence.recognized_chars(), 30);
        // "Services Agreement" (18) + "Client: Acme" (12): Acme Corp is cut off
        assert!(entities.is_empty());
    }

    #[test]
    fn test_engine_error_is_unavailable() {
        let text = sample_text();
        let mut engine = MockRecognizer::new();
        engine.fail_on("Client");
        let adapter = EntityRecognizerAdapter::new(Arc::new(engine));

        let results: Vec<_> = adapter.recognize(&text).collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(RecognizerError::Unavailable(_))));
    }

    #[test]
    fn test_ready_maps_engine_error() {
        let mut engine = MockRecognizer::new();
        engine.set_available(false);
        let adapter = EntityRecognizerAdapter::new(Arc::new(engine));
        assert!(matches!(adapter.ready(), Err(RecognizerError::Unavailable(_))));
    }
}
