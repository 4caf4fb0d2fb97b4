//! Core Extractor implementation

use crate::checks;
use crate::config::ExtractorConfig;
use crate::error::ExtractionError;
use crate::options::ExtractionOptions;
use crate::state::{PipelineStage, StageTracker};
use covenant_domain::traits::{DocumentStore, EntityRecognizer};
use covenant_domain::{
    DocumentId, ExtractedText, ExtractionId, ExtractionMetadata, ExtractionResult, ExtractionWarning, FieldName,
    RawDocument, RecognizedEntity,
};
use covenant_ner::{CancellationFlag, EntityRecognizerAdapter};
use covenant_resolver::{FieldResolver, Resolution};
use covenant_text::DocumentTextExtractor;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// The Extractor turns an uploaded contract into ranked field candidates
///
/// One call runs the whole pipeline for one document: fetch, text
/// extraction, entity recognition, field resolution, cross-field checks.
/// The CPU-bound stages run on tokio's blocking pool under the call's time
/// budget. Calls share nothing but the store and the recognizer, so one
/// `Extractor` can serve concurrent extractions.
pub struct Extractor<S, R> {
    store: Arc<S>,
    recognizer: Arc<R>,
    text_extractor: DocumentTextExtractor,
    resolver: FieldResolver,
    config: ExtractorConfig,
}

impl<S, R> Extractor<S, R>
where
    S: DocumentStore + Send + Sync + 'static,
    S::Error: Display,
    R: EntityRecognizer + Send + Sync + 'static,
    R::Error: Display,
{
    /// Create a new Extractor
    pub fn new(store: S, recognizer: Arc<R>, config: ExtractorConfig) -> Self {
        Self {
            store: Arc::new(store),
            recognizer,
            text_extractor: DocumentTextExtractor::new(),
            resolver: FieldResolver::new(config.resolver.clone()),
            config,
        }
    }

    /// The configuration in use
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// The recognition engine
    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// Options with this extractor's configured defaults
    pub fn default_options(&self) -> ExtractionOptions {
        ExtractionOptions::from_config(&self.config)
    }

    /// Extract contract fields from a stored document
    ///
    /// Every field in `options.field_scope` is a key of the result. Nothing
    /// is retried; calling again with the same document and options yields
    /// the same candidates.
    ///
    /// # Errors
    ///
    /// Fails with [`ExtractionError::RecognitionTimeout`] when the pipeline
    /// does not finish within `options.timeout_seconds`; partial work is
    /// discarded. See [`ExtractionError`] for the other failures.
    pub async fn extract(
        &self,
        document_id: &DocumentId,
        options: &ExtractionOptions,
    ) -> Result<ExtractionResult, ExtractionError> {
        options.validate()?;
        info!(document = %document_id, fields = options.field_scope.len(), "Starting extraction");

        let document = self.fetch(document_id).await?;
        let job = self.job(document_id, document, options);
        let cancellation = job.cancellation.clone();

        let result = self
            .run_blocking(options.timeout(), cancellation, move || job.extract())
            .await;
        match &result {
            Ok(result) => info!(
                document = %document_id,
                extraction = %result.metadata().extraction_id,
                entities = result.metadata().entity_count,
                warnings = result.warnings().len(),
                elapsed_ms = result.metadata().processing_time_ms,
                "Extraction complete"
            ),
            Err(e) => warn!(document = %document_id, class = %e.class(), "Extraction failed: {}", e),
        }
        result
    }

    /// Run text extraction and recognition only
    ///
    /// Used to inspect what the recognizer sees in a document.
    pub async fn recognize(
        &self,
        document_id: &DocumentId,
        options: &ExtractionOptions,
    ) -> Result<Vec<RecognizedEntity>, ExtractionError> {
        options.validate()?;
        let document = self.fetch(document_id).await?;
        let job = self.job(document_id, document, options);
        let cancellation = job.cancellation.clone();

        self.run_blocking(options.timeout(), cancellation, move || {
            let mut tracker = StageTracker::new();
            let text = job.extract_text(&mut tracker).map_err(|e| tracker.fail(e))?;
            let (entities, _) = job.recognize(&text, &mut tracker).map_err(|e| tracker.fail(e))?;
            Ok(entities)
        })
        .await
    }

    /// Fetch a document and enforce the size limit
    async fn fetch(&self, document_id: &DocumentId) -> Result<RawDocument, ExtractionError> {
        let store = Arc::clone(&self.store);
        let id = document_id.clone();

        // Stores may block on I/O
        let fetched = tokio::task::spawn_blocking(move || store.fetch(&id).map_err(|e| e.to_string()))
            .await
            .map_err(|e| ExtractionError::Internal(format!("Store task failed: {}", e)))?;

        let document = match fetched {
            Ok(Some(document)) => document,
            Ok(None) => return Err(ExtractionError::NotFound(document_id.clone())),
            Err(reason) => return Err(ExtractionError::Store(reason)),
        };
        if document.len() > self.config.max_document_bytes {
            return Err(ExtractionError::DocumentTooLarge {
                size: document.len(),
                max: self.config.max_document_bytes,
            });
        }
        debug!(document = %document_id, bytes = document.len(), format = document.declared_format(), "Fetched document");
        Ok(document)
    }

    fn job(&self, document_id: &DocumentId, document: RawDocument, options: &ExtractionOptions) -> Job<R> {
        Job {
            document_id: document_id.clone(),
            document,
            options: options.clone(),
            recognizer: Arc::clone(&self.recognizer),
            text_extractor: self.text_extractor,
            resolver: self.resolver.clone(),
            max_recognized_chars: self.config.max_recognized_chars,
            inversion_penalty: self.config.inversion_penalty,
            cancellation: CancellationFlag::new(),
        }
    }

    /// Run `work` on the blocking pool, cancelling it if `budget` runs out
    async fn run_blocking<T, F>(
        &self,
        budget: Duration,
        cancellation: CancellationFlag,
        work: F,
    ) -> Result<T, ExtractionError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, ExtractionError> + Send + 'static,
    {
        let handle = tokio::task::spawn_blocking(work);
        match timeout(budget, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(ExtractionError::Internal(format!("Extraction task failed: {}", e))),
            Err(_) => {
                // The worker stops at the next block boundary; its output is dropped
                cancellation.cancel();
                Err(ExtractionError::RecognitionTimeout(budget.as_secs()))
            }
        }
    }
}

/// Everything one extraction needs on the blocking pool
struct Job<R> {
    document_id: DocumentId,
    document: RawDocument,
    options: ExtractionOptions,
    recognizer: Arc<R>,
    text_extractor: DocumentTextExtractor,
    resolver: FieldResolver,
    max_recognized_chars: usize,
    inversion_penalty: f64,
    cancellation: CancellationFlag,
}

impl<R> Job<R>
where
    R: EntityRecognizer,
    R::Error: Display,
{
    fn extract(self) -> Result<ExtractionResult, ExtractionError> {
        let mut tracker = StageTracker::new();
        self.run(&mut tracker).map_err(|e| tracker.fail(e))
    }

    fn run(&self, tracker: &mut StageTracker) -> Result<ExtractionResult, ExtractionError> {
        let text = self.extract_text(tracker)?;
        let (entities, truncation) = self.recognize(&text, tracker)?;

        // date checks see every date field; finalize_fields trims to scope
        let mut scope = self.options.field_scope.clone();
        if scope.iter().any(FieldName::is_date) {
            scope.extend(FieldName::DATES);
        }
        let Resolution { mut fields, mut warnings } = self.resolver.resolve(&text, &entities, &scope);
        warnings.extend(truncation);
        tracker.advance(PipelineStage::FieldsResolved)?;

        checks::check_date_order(&mut fields, self.inversion_penalty, &mut warnings);
        checks::check_renewal(&fields, &mut warnings);
        checks::check_ambiguity(&fields, &mut warnings);
        checks::finalize_fields(&mut fields, &self.options.field_scope, self.options.min_confidence);
        for warning in &warnings {
            debug!(document = %self.document_id, %warning, "Extraction warning");
        }

        let metadata = ExtractionMetadata {
            extraction_id: ExtractionId::new(),
            document_id: self.document_id.clone(),
            filename: self.document.filename().to_string(),
            recognizer: self.recognizer.name().to_string(),
            block_count: text.blocks().len(),
            entity_count: entities.len(),
            timestamp: chrono::Utc::now().timestamp().max(0) as u64,
            processing_time_ms: tracker.elapsed_ms(),
        };
        let result = ExtractionResult::new(fields, warnings, metadata);
        tracker.advance(PipelineStage::Completed)?;
        Ok(result)
    }

    fn extract_text(&self, tracker: &mut StageTracker) -> Result<ExtractedText, ExtractionError> {
        let text = self.text_extractor.extract(&self.document)?;
        info!(
            document = %self.document_id,
            blocks = text.blocks().len(),
            chars = text.char_len(),
            "Extracted text"
        );
        tracker.advance(PipelineStage::TextExtracted)?;
        Ok(text)
    }

    fn recognize(
        &self,
        text: &ExtractedText,
        tracker: &mut StageTracker,
    ) -> Result<(Vec<RecognizedEntity>, Option<ExtractionWarning>), ExtractionError> {
        let adapter = EntityRecognizerAdapter::new(Arc::clone(&self.recognizer))
            .with_cancellation(self.cancellation.clone())
            .with_char_budget(self.max_recognized_chars);
        adapter.ready()?;

        let mut sequence = adapter.recognize(text);
        let entities = sequence.by_ref().collect::<Result<Vec<_>, _>>()?;

        let truncation = sequence.truncated().then(|| {
            warn!(
                document = %self.document_id,
                recognized = sequence.recognized_chars(),
                total = text.char_len(),
                "Text truncated for recognition"
            );
            ExtractionWarning::TextTruncated {
                recognized_chars: sequence.recognized_chars(),
                total_chars: text.char_len(),
            }
        });
        info!(
            document = %self.document_id,
            recognizer = adapter.recognizer().name(),
            entities = entities.len(),
            "Recognized entities"
        );
        tracker.advance(PipelineStage::EntitiesRecognized)?;
        Ok((entities, truncation))
    }
}
