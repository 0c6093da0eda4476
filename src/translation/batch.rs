/*!
 * Batch translation processing.
 *
 * Cue lines are grouped into batches bounded by a character budget and a
 * line cap, sent to the provider concurrently, and stitched back in order.
 */

use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Instant;

use crate::errors::{ProviderError, TranslationError};
use crate::providers::{Provider, TranslationRequest};
use crate::subtitle_processor::{LineEdit, LineRange, SubtitleDocument};

/// Smallest accepted character budget per request
pub const MIN_CHARS_PER_REQUEST: usize = 100;

/// Most lines sent in one request
pub const MAX_LINES_PER_BATCH: usize = 40;

/// Batch translator for processing cue lines in batches
#[derive(Debug, Clone)]
pub struct BatchTranslator {
    /// Provider doing the actual translation
    provider: Arc<dyn Provider>,

    /// Character budget per request
    max_chars_per_request: usize,

    /// Maximum number of concurrent requests
    max_concurrent_requests: usize,

    /// Whether to retry lines one by one when a batch fails
    retry_individual_lines: bool,
}

impl BatchTranslator {
    /// Create a new batch translator; the character budget is raised to
    /// `MIN_CHARS_PER_REQUEST` and concurrency to 1 when set lower.
    pub fn new(provider: Arc<dyn Provider>, max_chars_per_request: usize, max_concurrent_requests: usize) -> Self {
        Self {
            provider,
            max_chars_per_request: max_chars_per_request.max(MIN_CHARS_PER_REQUEST),
            max_concurrent_requests: max_concurrent_requests.max(1),
            retry_individual_lines: true,
        }
    }

    pub fn with_retry_individual_lines(mut self, retry: bool) -> Self {
        self.retry_individual_lines = retry;
        self
    }

    pub fn max_chars_per_request(&self) -> usize {
        self.max_chars_per_request
    }

    /// Check that the provider answers before sending any batch
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        self.provider.test_connection().await
    }

    /// Split lines into consecutive batches. A batch closes before it would
    /// exceed the character budget or `MAX_LINES_PER_BATCH` lines; a single
    /// line longer than the budget gets a batch of its own.
    pub fn split_into_batches(&self, lines: &[String]) -> Vec<Vec<String>> {
        let mut batches = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut current_chars = 0;

        for line in lines {
            let chars = line.chars().count();
            let full = current.len() >= MAX_LINES_PER_BATCH || current_chars + chars > self.max_chars_per_request;
            if full && !current.is_empty() {
                batches.push(std::mem::take(&mut current));
                current_chars = 0;
            }
            current.push(line.clone());
            current_chars += chars;
        }
        if !current.is_empty() {
            batches.push(current);
        }

        batches
    }

    /// Translate lines, returning exactly one translated line per input line
    pub async fn translate_lines(
        &self,
        lines: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, TranslationError> {
        let batches = self.split_into_batches(lines);
        let total_batches = batches.len();
        info!(
            "Translating {} lines in {} batches ({} concurrent)",
            lines.len(),
            total_batches,
            self.max_concurrent_requests
        );

        let results = stream::iter(batches.into_iter().enumerate())
            .map(|(batch_index, batch)| async move {
                let start_time = Instant::now();
                let result = self
                    .translate_batch_with_recovery(batch, source_language, target_language)
                    .await;
                match &result {
                    Ok(_) => debug!(
                        "Batch {}/{} completed in {:?}",
                        batch_index + 1,
                        total_batches,
                        start_time.elapsed()
                    ),
                    Err(e) => error!("Batch {}/{} failed: {}", batch_index + 1, total_batches, e),
                }
                (batch_index, result)
            })
            .buffer_unordered(self.max_concurrent_requests)
            .collect::<Vec<_>>()
            .await;

        // Sort results by batch index to maintain original order
        let mut sorted_results = results;
        sorted_results.sort_by_key(|(index, _)| *index);

        let mut translated = Vec::with_capacity(lines.len());
        for (_, result) in sorted_results {
            translated.extend(result?);
        }
        Ok(translated)
    }

    /// Translate one batch, checking the line count of the answer
    async fn translate_batch(
        &self,
        lines: Vec<String>,
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, TranslationError> {
        let expected = lines.len();
        let request = TranslationRequest {
            lines,
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        };

        let translated = self.provider.translate(&request).await?;
        if translated.len() != expected {
            return Err(TranslationError::LineCountMismatch {
                expected,
                found: translated.len(),
            });
        }
        Ok(translated)
    }

    /// Translate a batch, falling back to one request per line when the
    /// whole batch fails and the batch has more than one line
    async fn translate_batch_with_recovery(
        &self,
        lines: Vec<String>,
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, TranslationError> {
        if lines.is_empty() {
            return Ok(Vec::new());
        }

        let single_line = lines.len() == 1;
        let fallback = (self.retry_individual_lines && !single_line).then(|| lines.clone());

        match (self.translate_batch(lines, source_language, target_language).await, fallback) {
            (Ok(translated), _) => Ok(translated),
            (Err(e), None) => Err(e),
            (Err(e), Some(lines)) => {
                warn!("Batch translation failed ({}), retrying {} lines individually", e, lines.len());
                let mut translated = Vec::with_capacity(lines.len());
                for line in lines {
                    translated.extend(self.translate_batch(vec![line], source_language, target_language).await?);
                }
                Ok(translated)
            }
        }
    }

    /// Translate the cue text of a document inside the selections and return
    /// the replacements
    pub async fn translate_document(
        &self,
        document: &SubtitleDocument,
        selections: &[LineRange],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<LineEdit>, TranslationError> {
        let (indices, lines): (Vec<usize>, Vec<String>) = document.translatable_lines(selections).into_iter().unzip();
        if lines.is_empty() {
            return Ok(Vec::new());
        }

        let translated = self.translate_lines(&lines, source_language, target_language).await?;
        Ok(indices
            .into_iter()
            .zip(translated)
            .map(|(index, text)| LineEdit::new(index, text))
            .collect())
    }
}
