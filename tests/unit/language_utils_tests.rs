/*!
 * Tests for language utility functions
 */

use subshift::language_utils::{
    get_language_name, language_codes_match, normalize_to_part1_or_part2t, validate_language_code,
};

/// Test validation of language codes
#[test]
fn test_validate_language_code_withValidCodes_shouldSucceed() {
    for code in ["en", "fr", "de", "eng", "fra", "deu", "fre", "ger", " EN ", "ENG"] {
        assert!(validate_language_code(code).is_ok(), "{} should be valid", code);
    }
}

/// Test validation rejects unknown codes
#[test]
fn test_validate_language_code_withInvalidCodes_shouldFail() {
    for code in ["123", "e", "", "english"] {
        assert!(validate_language_code(code).is_err(), "{} should be invalid", code);
    }
}

/// Test normalization prefers two-letter codes
#[test]
fn test_normalize_to_part1_or_part2t_shouldPreferPart1() {
    assert_eq!(normalize_to_part1_or_part2t("eng").unwrap(), "en");
    assert_eq!(normalize_to_part1_or_part2t("fre").unwrap(), "fr");
    assert_eq!(normalize_to_part1_or_part2t("DE").unwrap(), "de");
    assert!(normalize_to_part1_or_part2t("zz").is_err());
}

/// Test matching of different language code formats
#[test]
fn test_language_codes_match_withEquivalentCodes_shouldMatch() {
    assert!(language_codes_match("en", "eng"));
    assert!(language_codes_match("fr", "fre"));
    assert!(language_codes_match("ger", "deu"));
    assert!(!language_codes_match("en", "fr"));
    assert!(!language_codes_match("en", "invalid"));
}

/// Test language names
#[test]
fn test_get_language_name_shouldReturnEnglishName() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("ger").unwrap(), "German");
    assert!(get_language_name("zz").is_err());
}
