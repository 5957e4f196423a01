/*!
 * Tests for language utility functions
 */

use transguard::language_utils::{
    display_name, is_canonical_code, normalize_language_code, resolve_alias,
};

#[test]
fn test_resolveAlias_withKnownAndUnknownCodes() {
    assert_eq!(resolve_alias("kor"), "ko");
    assert_eq!(resolve_alias("en-gb"), "en");
    assert_eq!(resolve_alias("fr"), "fr");
}

#[test]
fn test_isCanonicalCode_shouldCheckShapeOnly() {
    assert!(is_canonical_code("ko"));
    assert!(is_canonical_code("fil"));
    assert!(is_canonical_code("zh-Hans"));
    assert!(!is_canonical_code("EN"));
    assert!(!is_canonical_code("korean"));
    assert!(!is_canonical_code("en_US"));
}

#[test]
fn test_normalizeLanguageCode_shouldBeIdempotent() {
    for raw in ["KR", "en-US", "zh-CN", "ja", "pt-BR"] {
        let once = normalize_language_code(Some(raw));
        let twice = normalize_language_code(once.as_deref());
        assert_eq!(once, twice, "code: {}", raw);
    }
}

#[test]
fn test_normalizeLanguageCode_withDetectorStyleInput() {
    assert_eq!(normalize_language_code(Some(" KO ")), Some("ko".to_string()));
    assert_eq!(normalize_language_code(Some("Korean")), None);
}

#[test]
fn test_displayName_withThreeLetterAndRegionCodes() {
    assert_eq!(display_name("en"), "English (en)");
    assert!(display_name("pt-br").ends_with("(pt-br)"));
    assert_eq!(display_name("zz"), "zz");
}
