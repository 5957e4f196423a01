/*!
 * Scripted capability for testing.
 *
 * `MockCapability` recognizes which workflow step is calling it from the
 * prompt header and answers with a per-step default, or with the next reply
 * queued for that step:
 * - `MockCapability::working()` - Detects "en", passes, translates, approves
 * - `MockCapability::failing()` - Every call fails with an error
 * - `.failing_on(kind)` - Only one kind of call fails
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::{CapabilityResponse, GenerativeCapability};
use crate::workflow::prompts;

/// Which workflow step a prompt belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    /// Source language detection
    Detect,
    /// Safety classification
    Classify,
    /// First-pass translation
    Translate,
    /// Corrective translation
    Retry,
    /// Quality judgment
    Judge,
    /// Anything without a known header
    Unknown,
}

impl PromptKind {
    /// Classify a prompt by its header line
    pub fn of(prompt: &str) -> Self {
        if prompt.starts_with(prompts::DETECT_HEADER) {
            Self::Detect
        } else if prompt.starts_with(prompts::CLASSIFY_HEADER) {
            Self::Classify
        } else if prompt.starts_with(prompts::TRANSLATE_HEADER) {
            Self::Translate
        } else if prompt.starts_with(prompts::RETRY_HEADER) {
            Self::Retry
        } else if prompt.starts_with(prompts::JUDGE_HEADER) {
            Self::Judge
        } else {
            Self::Unknown
        }
    }
}

/// Behavior for a single call
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Answer with plain text
    Text(String),
    /// Answer with a structured payload
    Response(CapabilityResponse),
    /// Fail with a simulated API error
    Fail,
    /// Answer with plain text after a delay
    Slow { delay_ms: u64, text: String },
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

#[derive(Debug, Default)]
struct Script {
    /// Reply used when the queue for a kind is empty
    defaults: HashMap<PromptKind, MockReply>,
    /// One-shot replies, consumed in order
    queued: HashMap<PromptKind, VecDeque<MockReply>>,
    /// Every prompt received, in order
    received: Vec<(PromptKind, String)>,
}

/// Mock capability for testing workflow behavior
///
/// Clones share the script and the call log.
#[derive(Debug, Clone)]
pub struct MockCapability {
    script: Arc<Mutex<Script>>,
    /// Total calls, including failed ones
    request_count: Arc<AtomicUsize>,
}

impl Default for MockCapability {
    fn default() -> Self {
        Self::working()
    }
}

impl MockCapability {
    /// Create a mock that answers every step successfully
    pub fn working() -> Self {
        let defaults = HashMap::from([
            (PromptKind::Detect, MockReply::text(r#"{"language": "en"}"#)),
            (PromptKind::Classify, MockReply::text("PASS")),
            (PromptKind::Translate, MockReply::text("Bonjour")),
            (PromptKind::Retry, MockReply::text("Bonjour !")),
            (PromptKind::Judge, MockReply::text("YES")),
            (PromptKind::Unknown, MockReply::text("")),
        ]);

        Self {
            script: Arc::new(Mutex::new(Script {
                defaults,
                ..Default::default()
            })),
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock where every call fails
    pub fn failing() -> Self {
        let mock = Self::working();
        {
            let mut script = mock.script.lock();
            for reply in script.defaults.values_mut() {
                *reply = MockReply::Fail;
            }
        }
        mock
    }

    /// Replace the default reply for one kind of call
    pub fn with_reply(self, kind: PromptKind, text: impl Into<String>) -> Self {
        self.with_default(kind, MockReply::Text(text.into()))
    }

    /// Replace the default behavior for one kind of call
    pub fn with_default(self, kind: PromptKind, reply: MockReply) -> Self {
        self.script.lock().defaults.insert(kind, reply);
        self
    }

    /// Make one kind of call always fail
    pub fn failing_on(self, kind: PromptKind) -> Self {
        self.with_default(kind, MockReply::Fail)
    }

    /// Queue a one-shot reply for the next call of a kind
    pub fn push_reply(&self, kind: PromptKind, reply: MockReply) {
        self.script
            .lock()
            .queued
            .entry(kind)
            .or_default()
            .push_back(reply);
    }

    /// Number of calls of one kind
    pub fn calls(&self, kind: PromptKind) -> usize {
        self.script
            .lock()
            .received
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    /// Prompts received for one kind, in order
    pub fn prompts(&self, kind: PromptKind) -> Vec<String> {
        self.script
            .lock()
            .received
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, prompt)| prompt.clone())
            .collect()
    }

    /// Number of calls of every kind
    pub fn total_calls(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn next_reply(&self, kind: PromptKind, prompt: &str) -> MockReply {
        let mut script = self.script.lock();
        script.received.push((kind, prompt.to_string()));

        if let Some(reply) = script.queued.get_mut(&kind).and_then(VecDeque::pop_front) {
            return reply;
        }

        script
            .defaults
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| MockReply::text(""))
    }
}

#[async_trait]
impl GenerativeCapability for MockCapability {
    async fn invoke(&self, prompt: &str) -> Result<CapabilityResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        let kind = PromptKind::of(prompt);

        match self.next_reply(kind, prompt) {
            MockReply::Text(text) => Ok(CapabilityResponse::Text(text)),
            MockReply::Response(response) => Ok(response),
            MockReply::Fail => Err(ProviderError::ApiError {
                status_code: 500,
                message: format!("Simulated provider failure (request #{})", count + 1),
            }),
            MockReply::Slow { delay_ms, text } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(CapabilityResponse::Text(text))
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
