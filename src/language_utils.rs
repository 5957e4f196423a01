//! Language utilities for request language codes
//!
//! Codes arriving with a translation request are loosely formatted. This module
//! folds common aliases onto a canonical code, validates the canonical shape and
//! resolves human-readable names for prompts.

use isolang::Language;
use once_cell::sync::Lazy;
use regex::Regex;

/// Canonical code shape: 2-3 lowercase letters with an optional script/region suffix
static CANONICAL_CODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z]{2,3}(?:-[A-Za-z]{2,8})?$").expect("Invalid language code regex")
});

/// Alias table, keyed by lower-cased input
const LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("kr", "ko"),
    ("kor", "ko"),
    ("ko-kr", "ko"),
    ("en-us", "en"),
    ("en-uk", "en"),
    ("en-gb", "en"),
    ("jp", "ja"),
    ("zh-cn", "zh-Hans"),
    ("zh-tw", "zh-Hant"),
    ("zh-hans", "zh-Hans"),
    ("zh-hant", "zh-Hant"),
];

/// Resolve an alias to its canonical code, or return the input unchanged
pub fn resolve_alias(code: &str) -> &str {
    LANGUAGE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == code)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(code)
}

/// Check whether a code has the canonical shape
pub fn is_canonical_code(code: &str) -> bool {
    CANONICAL_CODE_REGEX.is_match(code)
}

/// Normalize a language code
///
/// Trims, lower-cases and resolves aliases. Codes that still do not have the
/// canonical shape are dropped instead of being passed through.
///
/// # Arguments
/// * `code` - Raw code from the request or from language detection
///
/// # Returns
/// * `Option<String>` - The canonical code, or `None` if absent or malformed
pub fn normalize_language_code(code: Option<&str>) -> Option<String> {
    let lowered = code?.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }

    let resolved = resolve_alias(&lowered);
    if is_canonical_code(resolved) {
        Some(resolved.to_string())
    } else {
        None
    }
}

/// Get a display name for a code, for use in prompts
///
/// Falls back to the code itself when isolang does not know the base language
/// (the "auto" sentinel, for instance).
pub fn display_name(code: &str) -> String {
    let base = code.split('-').next().unwrap_or(code).to_lowercase();

    let language = match base.len() {
        2 => Language::from_639_1(&base),
        3 => Language::from_639_3(&base),
        _ => None,
    };

    match language {
        Some(lang) => format!("{} ({})", lang.to_name(), code),
        None => code.to_string(),
    }
}
