//! User-facing messages for blocked requests.

use crate::workflow::state::SafeguardLabel;

/// Text contained personal data
pub const PII_MESSAGE: &str =
    "The text appears to contain personal information and cannot be translated. Please remove it and try again.";

/// Text contained harmful content
pub const HARMFUL_MESSAGE: &str =
    "The text contains harmful or abusive content and cannot be translated.";

/// Text tried to manipulate the system
pub const PROMPT_INJECTION_MESSAGE: &str =
    "The text contains instructions aimed at the translation system and cannot be translated.";

/// Fallback for any other block
pub const GENERAL_MESSAGE: &str = "The request could not be processed due to safety policy.";

/// Message for a blocking label
///
/// `PASS` has no block message of its own and maps to the general fallback.
pub fn message_for(label: SafeguardLabel) -> &'static str {
    match label {
        SafeguardLabel::Pii => PII_MESSAGE,
        SafeguardLabel::Harmful => HARMFUL_MESSAGE,
        SafeguardLabel::PromptInjection => PROMPT_INJECTION_MESSAGE,
        SafeguardLabel::Pass => GENERAL_MESSAGE,
    }
}

/// Message for an optional label, general fallback when absent
pub fn message_for_label(label: Option<SafeguardLabel>) -> &'static str {
    label.map(message_for).unwrap_or(GENERAL_MESSAGE)
}
