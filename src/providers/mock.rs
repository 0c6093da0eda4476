/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds with tagged text
 * - `MockProvider::intermittent(n)` - Fails every nth request
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::dropping()` - Answers with one line too few
 * - `MockProvider::blanking()` - Leaves the first entry of multi-line answers empty
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::{decode_entries, encode_entries, Provider, TranslationRequest};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Drops the last line of every answer
    Dropping,
    /// Answers multi-line requests with an empty first entry
    Blanking,
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that loses a line in every answer
    pub fn dropping() -> Self {
        Self::new(MockBehavior::Dropping)
    }

    /// Create a mock that blanks an entry whenever a request has several lines
    pub fn blanking() -> Self {
        Self::new(MockBehavior::Blanking)
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Translation of one line as this mock produces it
    pub fn translated(line: &str, target_language: &str) -> String {
        format!("[{}] {}", target_language, line)
    }

    /// Round-trip through the marker format, as a real provider answer would
    fn answer(request: &TranslationRequest, lines: &[String]) -> Result<Vec<String>, ProviderError> {
        let translated: Vec<String> = lines
            .iter()
            .map(|line| Self::translated(line, &request.target_language))
            .collect();
        decode_entries(&encode_entries(&translated), translated.len())
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn translate(&self, request: &TranslationRequest) -> Result<Vec<String>, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Working => Self::answer(request, &request.lines),

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                    })
                } else {
                    Self::answer(request, &request.lines)
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),

            MockBehavior::Dropping => {
                let kept = request.lines.len().saturating_sub(1);
                Self::answer(request, &request.lines[..kept])
            }

            MockBehavior::Blanking if request.lines.len() > 1 => {
                let mut lines = request.lines.clone();
                lines[0].clear();
                let text = encode_entries(&lines);
                decode_entries(&text, lines.len())
            }
            MockBehavior::Blanking => Self::answer(request, &request.lines),
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated connection failure".to_string())),
            _ => Ok(()),
        }
    }
}
