use async_trait::async_trait;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use super::Stage;
use crate::errors::WorkflowError;
use crate::language_utils::normalize_language_code;
use crate::providers::GenerativeCapability;
use crate::workflow::graph::StageId;
use crate::workflow::parsing::parse_detected_language;
use crate::workflow::prompts;
use crate::workflow::state::TranslationState;

/// Warning recorded when the input had to be cut
pub const TRUNCATION_WARNING: &str = "Input text truncated by max length rule.";

static INLINE_WHITESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+").expect("Invalid inline whitespace regex"));

static BLANK_LINES_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("Invalid blank lines regex"));

/// Clean up raw input text
///
/// Trims, collapses runs of spaces and tabs to one space, collapses three or
/// more newlines to two, then caps the result at `max_chars` characters.
/// Returns the text and whether it was truncated.
pub fn normalize_text(text: &str, max_chars: usize) -> (String, bool) {
    let collapsed = INLINE_WHITESPACE_REGEX.replace_all(text.trim(), " ");
    let collapsed = BLANK_LINES_REGEX.replace_all(&collapsed, "\n\n");

    match collapsed.char_indices().nth(max_chars) {
        Some((byte_index, _)) => (collapsed[..byte_index].to_string(), true),
        None => (collapsed.into_owned(), false),
    }
}

/// Input cleanup, language code normalization and best-effort detection
pub struct NormalizeStage {
    capability: Arc<dyn GenerativeCapability>,
    max_text_chars: usize,
}

impl NormalizeStage {
    pub fn new(capability: Arc<dyn GenerativeCapability>, max_text_chars: usize) -> Self {
        Self {
            capability,
            max_text_chars,
        }
    }

    /// Ask the capability for the source language
    ///
    /// Any failure yields `None`; detection never fails the run.
    async fn detect_language(&self, text: &str) -> Option<String> {
        let prompt = prompts::detect_language(text);
        match self.capability.invoke(&prompt).await {
            Ok(response) => {
                let detected = parse_detected_language(&response.text());
                if detected.is_none() {
                    warn!("Language detection returned an unusable answer, leaving source unset");
                }
                detected
            }
            Err(e) => {
                warn!("Language detection failed via {}: {}", self.capability.name(), e);
                None
            }
        }
    }
}

#[async_trait]
impl Stage for NormalizeStage {
    fn id(&self) -> StageId {
        StageId::Normalize
    }

    async fn apply(&self, state: &mut TranslationState) -> Result<(), WorkflowError> {
        let (text, truncated) = normalize_text(&state.text, self.max_text_chars);
        if truncated {
            warn!(
                "Input truncated from {} to {} characters",
                state.text.chars().count(),
                self.max_text_chars
            );
            state.warning_message = Some(TRUNCATION_WARNING.to_string());
        }
        state.text = text;

        state.source_language = normalize_language_code(state.source_language.as_deref());
        state.target_language = normalize_language_code(state.target_language.as_deref());

        if state.source_language.is_none() && !state.text.is_empty() {
            state.source_language = self.detect_language(&state.text).await;
        }

        debug!(
            "Normalized input: {} chars, source={}, target={}",
            state.text.chars().count(),
            state.source_language.as_deref().unwrap_or("none"),
            state.target_language.as_deref().unwrap_or("none")
        );

        Ok(())
    }
}
