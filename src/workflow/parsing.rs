/*!
 * Normalization of free-form capability output.
 *
 * The capability is asked for constrained answers but does not always comply.
 * Everything here is biased toward the safe reading: anything that is not
 * clearly one of the allowed tokens falls back to the caller's default.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::language_utils::normalize_language_code;
use crate::workflow::state::{QcVerdict, SafeguardLabel};

/// Opening fence line with an optional info string, e.g. "```json\n"
///
/// The info string is only dropped when the fence sits on its own line.
static OPENING_FENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^```[A-Za-z0-9_+-]*[ \t]*\n").expect("Invalid opening fence regex")
});

/// Closing fence at the very end
static CLOSING_FENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n?[ \t]*```$").expect("Invalid closing fence regex"));

/// Answer prefix such as "LABEL:" or "Answer :"
static ANSWER_PREFIX_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:ANSWER|LABEL)\s*:\s*").expect("Invalid answer prefix regex"));

/// Remove code fence markers
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_open = OPENING_FENCE_REGEX.replace(trimmed, "");
    let without_close = CLOSING_FENCE_REGEX.replace(&without_open, "");
    without_close.replace("```", "").trim().to_string()
}

/// Remove one layer of symmetric wrapping quotes
pub fn strip_wrapping_quotes(s: &str) -> String {
    let mut chars = s.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if first == last && (first == '"' || first == '\'') => {
            chars.as_str().trim().to_string()
        }
        _ => s.to_string(),
    }
}

/// Post-process a raw translation: fences, then a single layer of quotes
pub fn clean_translation(raw: &str) -> String {
    strip_wrapping_quotes(&strip_code_fences(raw))
}

/// Upper-case the answer, drop fences and prefixes, and return the first token
/// with surrounding punctuation removed
fn first_token(raw: &str) -> String {
    let upper = strip_code_fences(raw).to_uppercase();
    let unprefixed = ANSWER_PREFIX_REGEX.replace(upper.trim(), "");

    unprefixed
        .split_whitespace()
        .next()
        .map(|token| {
            token
                .trim_matches(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .to_string()
        })
        .unwrap_or_default()
}

/// Normalize a classifier answer to one of the four labels
///
/// Out-of-vocabulary answers yield the prior hint, or PASS without one.
pub fn normalize_label(raw: &str, prior: Option<SafeguardLabel>) -> SafeguardLabel {
    first_token(raw)
        .parse::<SafeguardLabel>()
        .unwrap_or_else(|_| prior.unwrap_or(SafeguardLabel::Pass))
}

/// Normalize a quality judgment to YES/NO, NO on anything else
pub fn normalize_yes_no(raw: &str) -> QcVerdict {
    first_token(raw).parse::<QcVerdict>().unwrap_or(QcVerdict::No)
}

#[derive(Debug, Deserialize)]
struct DetectionResponse {
    #[serde(default)]
    language: Option<String>,
}

/// Parse a detection answer of the form `{"language": "ko"}`
///
/// Returns `None` for malformed JSON, a missing field or a code that fails
/// normalization.
pub fn parse_detected_language(raw: &str) -> Option<String> {
    let body = strip_code_fences(raw);
    let parsed: DetectionResponse = serde_json::from_str(&body).ok()?;
    normalize_language_code(parsed.language.as_deref())
}
