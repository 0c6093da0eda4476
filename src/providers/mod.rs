/*!
 * Provider implementations for machine translation of cue text.
 *
 * This module contains client implementations for translation backends:
 * - Ollama: Local LLM server
 * - Mock: Scripted provider for tests
 *
 * Lines travel in one prompt, each introduced by an `<<ENTRY_n>>` marker and
 * closed by `<<END>>`, so a batch can be split back into lines reliably.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Marker closing the last entry of a batch
pub const END_MARKER: &str = "<<END>>";

/// Lines to translate in one provider call
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    /// Cue text lines, in document order
    pub lines: Vec<String>,
    /// Source language code
    pub source_language: String,
    /// Target language code
    pub target_language: String,
}

/// Common trait for all translation providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the batch translator.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Translate every line of the request, returning one line per input line
    async fn translate(&self, request: &TranslationRequest) -> Result<Vec<String>, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

/// Marker introducing entry `index`
pub fn entry_marker(index: usize) -> String {
    format!("<<ENTRY_{}>>", index)
}

/// Join lines into one marked-up text block
pub fn encode_entries(lines: &[String]) -> String {
    let mut text = String::new();
    for (index, line) in lines.iter().enumerate() {
        text.push_str(&entry_marker(index));
        text.push('\n');
        text.push_str(line);
        text.push('\n');
    }
    text.push_str(END_MARKER);
    text
}

/// Split a marked-up text block back into `expected` lines.
///
/// Multi-line entries are joined with a space, since each entry stands for
/// exactly one document line. An empty entry is a parse error: written back,
/// it would put a blank line inside a cue block.
pub fn decode_entries(text: &str, expected: usize) -> Result<Vec<String>, ProviderError> {
    let mut entries = Vec::with_capacity(expected);
    let mut position = 0;

    for index in 0..expected {
        let start_marker = entry_marker(index);
        let end_marker = if index + 1 == expected {
            END_MARKER.to_string()
        } else {
            entry_marker(index + 1)
        };

        let start = text[position..]
            .find(&start_marker)
            .map(|offset| position + offset + start_marker.len())
            .ok_or_else(|| ProviderError::ParseError(format!("Missing marker {}", start_marker)))?;

        // A missing END marker on the last entry means the answer was cut
        let end = text[start..]
            .find(&end_marker)
            .map(|offset| start + offset)
            .ok_or_else(|| ProviderError::ParseError(format!("Missing marker {}", end_marker)))?;

        let entry = text[start..end]
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if entry.is_empty() {
            return Err(ProviderError::ParseError(format!("Empty entry {}", start_marker)));
        }
        entries.push(entry);
        position = end;
    }

    Ok(entries)
}

pub mod mock;
pub mod ollama;
