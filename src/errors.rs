/*!
 * Error types for the subshift application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

/// Errors that can occur while reading or editing subtitle text
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubtitleError {
    /// Text that should have been a timestamp
    #[error("Invalid time '{0}', expected format ±00:00:00,000")]
    InvalidTime(String),

    /// Text that should have been an `old -> new` mapping
    #[error("Invalid time mapping '{0}', expected format 00:00:00,000 -> 00:00:00,000")]
    InvalidMapping(String),

    /// Both correction reference points share the same original time
    #[error("Reference times must differ, both mappings start at {0}")]
    DegenerateInterval(String),

    /// Text that should have been a line range
    #[error("Invalid line range '{0}', expected START-END or LINE (1-based)")]
    InvalidLineRange(String),

    /// Edit addressed past the end of the document
    #[error("Line {line_index} is outside the document ({line_count} lines)")]
    LineOutOfRange {
        /// Zero-based line index of the edit
        line_index: usize,
        /// Number of lines in the document
        line_count: usize,
    },

    /// Unsupported subtitle format name or extension
    #[error("Unknown subtitle format: {0}")]
    UnknownFormat(String),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider answered with a different number of lines
    #[error("Expected {expected} translated lines, got {found}")]
    LineCountMismatch {
        /// Lines sent
        expected: usize,
        /// Lines received
        found: usize,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from the configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),
}
