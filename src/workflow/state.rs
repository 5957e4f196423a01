/*!
 * The state record threaded through every stage of the workflow.
 *
 * One `TranslationState` is created per request, mutated in place by each
 * stage and discarded once the response has been projected out of it.
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Safety classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafeguardLabel {
    /// Safe to translate
    Pass,
    /// Contains personal data
    Pii,
    /// Harmful content or instructions
    Harmful,
    /// Attempts to manipulate the system
    PromptInjection,
}

impl SafeguardLabel {
    /// All labels, in the order they are presented to the classifier
    pub const ALL: [SafeguardLabel; 4] = [
        SafeguardLabel::Pass,
        SafeguardLabel::Pii,
        SafeguardLabel::Harmful,
        SafeguardLabel::PromptInjection,
    ];

    /// Wire form of the label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Pii => "PII",
            Self::Harmful => "HARMFUL",
            Self::PromptInjection => "PROMPT_INJECTION",
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl fmt::Display for SafeguardLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SafeguardLabel {
    type Err = ();

    /// Exact match on the wire form, no case folding
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|label| label.as_str() == s)
            .ok_or(())
    }
}

/// Quality gate outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QcVerdict {
    Yes,
    No,
}

impl QcVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "YES",
            Self::No => "NO",
        }
    }
}

impl fmt::Display for QcVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QcVerdict {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "YES" => Ok(Self::Yes),
            "NO" => Ok(Self::No),
            _ => Err(()),
        }
    }
}

/// Final outcome marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    /// Set by the fail-response stage when a safeguard blocked the text
    Blocked,
    /// Set by the response stage when an error message drives the result
    Error,
    /// Set by the response stage on the translation path
    Ok,
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Blocked => "BLOCKED",
            Self::Error => "ERROR",
            Self::Ok => "OK",
        };
        f.write_str(s)
    }
}

/// Audit record of a safeguard block
///
/// Deliberately carries no input text, only its length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Event type, e.g. `SAFEGUARD_BLOCK`
    pub event: String,
    /// Label that caused the event
    pub label: SafeguardLabel,
    /// Input length in characters
    pub text_len: usize,
}

/// Shared mutable state record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationState {
    /// Text to translate; trimmed, whitespace-collapsed and length-capped by Normalize
    pub text: String,
    /// Canonical source language code, absent when unknown
    pub source_language: Option<String>,
    /// Canonical target language code
    pub target_language: Option<String>,
    /// Non-fatal notice such as truncation
    pub warning_message: Option<String>,

    /// Caller-supplied hint that the text may contain sensitive data
    #[serde(default)]
    pub has_sensitive_hint: bool,
    /// Safety classification outcome
    pub safeguard_label: Option<SafeguardLabel>,
    /// Derived from the label by the decision stage
    pub safeguard_passed: Option<bool>,
    /// User-facing block or error text
    pub error_message: Option<String>,
    /// Label recorded as the block reason
    pub blocked_reason: Option<SafeguardLabel>,
    /// Audit trail of safeguard events
    #[serde(default)]
    pub audit_log: Vec<AuditEntry>,

    /// Current best translation
    pub translated_text: Option<String>,
    /// Mirror of the translation, kept as retry context
    pub last_translation: Option<String>,
    /// Quality gate outcome
    pub qc_passed: Option<QcVerdict>,
    /// Diagnostic for a NO verdict
    pub qc_reason: Option<String>,

    /// Retries already performed
    #[serde(default)]
    pub retry_count: u32,
    /// Retry budget; zero means "use the default of one"
    #[serde(default)]
    pub max_retry_count: u32,
    pub retry_allowed: Option<bool>,
    pub retry_reason: Option<String>,

    /// Final outcome marker
    pub status: Option<ResponseStatus>,
    pub success: Option<bool>,
}

/// Fields retained after the response stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseProjection {
    pub translated_text: String,
    pub status: Option<ResponseStatus>,
    pub success: bool,
    pub safeguard_label: Option<SafeguardLabel>,
    pub qc_passed: Option<QcVerdict>,
    pub retry_count: u32,
}

impl TranslationState {
    /// Create a state for a request
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Set the source language
    pub fn with_source_language(mut self, code: impl Into<String>) -> Self {
        self.source_language = Some(code.into());
        self
    }

    /// Set the target language
    pub fn with_target_language(mut self, code: impl Into<String>) -> Self {
        self.target_language = Some(code.into());
        self
    }

    /// Set the retry budget
    pub fn with_max_retry_count(mut self, max_retry_count: u32) -> Self {
        self.max_retry_count = max_retry_count;
        self
    }

    /// Flag the text as possibly sensitive
    pub fn with_sensitive_hint(mut self, hint: bool) -> Self {
        self.has_sensitive_hint = hint;
        self
    }

    /// Retry budget actually in force: zero counts as one
    pub fn effective_max_retry_count(&self) -> u32 {
        if self.max_retry_count == 0 {
            1
        } else {
            self.max_retry_count
        }
    }

    /// Error message, if present and non-empty
    pub fn active_error_message(&self) -> Option<&str> {
        self.error_message.as_deref().filter(|m| !m.is_empty())
    }

    /// Project the retained response fields
    ///
    /// The state itself is not pruned; callers that want only the response
    /// surface use this view.
    pub fn retained(&self) -> ResponseProjection {
        ResponseProjection {
            translated_text: self.translated_text.clone().unwrap_or_default(),
            status: self.status,
            success: self.success.unwrap_or(false),
            safeguard_label: self.safeguard_label,
            qc_passed: self.qc_passed,
            retry_count: self.retry_count,
        }
    }
}
