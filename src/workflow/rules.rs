/*!
 * Deterministic safety rules evaluated before any model call.
 *
 * Precedence, first match wins:
 * 1. Empty text passes.
 * 2. Resident ID, email or mobile number patterns force PII.
 * 3. Injection patterns force PROMPT_INJECTION.
 * 4. Profanity or harmful-intent patterns force HARMFUL.
 * 5. A sensitive hint (caller flag or PII-like pattern) becomes a soft PII prior.
 *
 * Only 1-4 are final. Everything else is left to the model classifier,
 * optionally with the step-5 prior.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::workflow::state::SafeguardLabel;

/// Resident registration number, with or without the dash
static RESIDENT_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{6}-?\d{7}\b").expect("Invalid resident id regex"));

/// Email address
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b").expect("Invalid email regex")
});

/// Domestic mobile number
static MOBILE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b01[016789]-?\d{3,4}-?\d{4}\b").expect("Invalid mobile number regex")
});

/// Instruction override, prompt disclosure and jailbreak phrasing
static INJECTION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(ignore (all|previous) instructions|system prompt|developer message|reveal.*prompt|jailbreak|do anything now|\bDAN\b|\bact as\b|you are chatgpt|\boverride|\bbypass|role\s*:\s*system|<\s*system\s*>)",
    )
    .expect("Invalid injection regex")
});

/// Profanity
static PROFANITY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(씨발|시발|ㅅㅂ|좆|병신|개새끼)").expect("Invalid profanity regex"));

/// Weapons, self-harm and fraud phrasing
static HARMFUL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(how to (make|build|create)|instructions for|step[- ]by[- ]step|\bbomb|explosive|poison|\bkill\b|suicide|harm yourself|credit card fraud|phishing|malware|ransomware)",
    )
    .expect("Invalid harmful regex")
});

/// Outcome of the rule pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleVerdict {
    /// A rule decided the label; no model call is needed
    Decided {
        label: SafeguardLabel,
        rule: &'static str,
    },
    /// The model must decide, optionally with a soft prior
    Undecided { prior: Option<SafeguardLabel> },
}

impl RuleVerdict {
    fn decided(label: SafeguardLabel, rule: &'static str) -> Self {
        Self::Decided { label, rule }
    }
}

/// True if the text contains a PII pattern
pub fn contains_forced_pii(text: &str) -> bool {
    RESIDENT_ID_REGEX.is_match(text) || EMAIL_REGEX.is_match(text) || MOBILE_REGEX.is_match(text)
}

/// True if the text looks like a prompt injection attempt
pub fn contains_injection(text: &str) -> bool {
    INJECTION_REGEX.is_match(text)
}

/// True if the text contains profanity or harmful intent
pub fn contains_harmful(text: &str) -> bool {
    PROFANITY_REGEX.is_match(text) || HARMFUL_REGEX.is_match(text)
}

/// Run the rule pass over normalized text
pub fn evaluate(text: &str, has_sensitive_hint: bool) -> RuleVerdict {
    if text.trim().is_empty() {
        return RuleVerdict::decided(SafeguardLabel::Pass, "empty_text");
    }

    if contains_forced_pii(text) {
        return RuleVerdict::decided(SafeguardLabel::Pii, "forced_pii");
    }

    if contains_injection(text) {
        return RuleVerdict::decided(SafeguardLabel::PromptInjection, "injection_pattern");
    }

    if contains_harmful(text) {
        return RuleVerdict::decided(SafeguardLabel::Harmful, "harmful_pattern");
    }

    // The PII-hint patterns are the forced ones, so only the caller flag can
    // still produce a prior here
    let prior = has_sensitive_hint.then_some(SafeguardLabel::Pii);
    RuleVerdict::Undecided { prior }
}
