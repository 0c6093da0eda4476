/*!
 * Tests for error types
 */

use subshift::errors::{AppError, ProviderError, SubtitleError, TranslationError};

/// Test error messages carry the offending input
#[test]
fn test_subtitleError_display_shouldIncludeInput() {
    let error = SubtitleError::InvalidMapping("soon -> later".to_string());
    assert!(error.to_string().contains("soon -> later"));

    let error = SubtitleError::LineOutOfRange {
        line_index: 12,
        line_count: 10,
    };
    assert_eq!(error.to_string(), "Line 12 is outside the document (10 lines)");
}

/// Test conversions up the error hierarchy
#[test]
fn test_errorConversion_shouldWrapInnerErrors() {
    let provider = ProviderError::ApiError {
        status_code: 503,
        message: "busy".to_string(),
    };
    let translation: TranslationError = provider.into();
    assert!(matches!(translation, TranslationError::Provider(_)));

    let app: AppError = translation.into();
    assert!(app.to_string().contains("503 - busy"));

    let app: AppError = SubtitleError::UnknownFormat("ass".to_string()).into();
    assert!(matches!(app, AppError::Subtitle(SubtitleError::UnknownFormat(_))));
}

/// Test that application errors keep the inner message
#[test]
fn test_appError_display_shouldPrefixSource() {
    let app: AppError = SubtitleError::InvalidTime("later".to_string()).into();
    assert_eq!(
        app.to_string(),
        "Subtitle error: Invalid time 'later', expected format ±00:00:00,000"
    );
    assert_eq!(AppError::Config("bad".to_string()).to_string(), "Configuration error: bad");
}
