//! Section Generation
//!
//! Turns template sections into generated prose. The layers stack as
//! cache → retry → client: the [`ResilientGenerator`] answers from the
//! [`ResultCache`] when it can, otherwise drives the [`GenerationClient`]
//! through the [`RetryPolicy`]. The [`SectionOrchestrator`] fans every
//! section of a template out to a bounded worker pool and fans the results
//! back in. The [`TextPolisher`] rewrites a whole document in one request
//! and keeps the original on any failure.

pub mod cache;
pub mod client;
pub mod orchestrator;
pub mod polish;
pub mod prompt;
pub mod resilient;
pub mod response;
pub mod retry;
pub mod tone;

pub use cache::{CacheEntry, Fingerprint, ResultCache};
pub use client::GenerationClient;
pub use orchestrator::{DispatchMode, GenerationRun, GenerationSummary, OrchestratorSettings, SectionOrchestrator};
pub use polish::{PolishOutcome, TextPolisher, DEFAULT_MAX_POLISH_CHARS};
pub use resilient::{GenerationOutcome, ResilientGenerator};
pub use retry::{with_retry, RetryOutcome, RetryPolicy};
pub use tone::Tone;

use crate::error::FailureKind;
use serde::{Deserialize, Serialize};

/// System and user text handed to the provider for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Everything needed to generate one section. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    section_id: String,
    instruction_text: String,
    source_excerpt: String,
    tone: Tone,
}

impl GenerationRequest {
    pub fn new(
        section_id: impl Into<String>,
        instruction_text: impl Into<String>,
        source_excerpt: impl Into<String>,
        tone: Tone,
    ) -> Self {
        Self {
            section_id: section_id.into(),
            instruction_text: instruction_text.into(),
            source_excerpt: source_excerpt.into(),
            tone,
        }
    }

    pub fn section_id(&self) -> &str {
        &self.section_id
    }

    pub fn instruction_text(&self) -> &str {
        &self.instruction_text
    }

    pub fn source_excerpt(&self) -> &str {
        &self.source_excerpt
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn to_prompt(&self) -> Prompt {
        prompt::section_prompt(self)
    }

    /// Cache key for this request.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::compute(
            "section",
            &self.source_excerpt,
            &[
                ("section", self.section_id.as_str()),
                ("tone", self.tone.as_str()),
                ("instruction", self.instruction_text.as_str()),
            ],
        )
    }
}

/// Outcome of generating one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationResult {
    Success { text: String },
    Failure { kind: FailureKind, message: String },
}

impl GenerationResult {
    pub fn success(text: impl Into<String>) -> Self {
        GenerationResult::Success { text: text.into() }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        GenerationResult::Failure {
            kind: FailureKind::Transient,
            message: message.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        GenerationResult::Failure {
            kind: FailureKind::Fatal,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GenerationResult::Success { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            GenerationResult::Success { text } => Some(text),
            GenerationResult::Failure { .. } => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            GenerationResult::Success { .. } => None,
            GenerationResult::Failure { kind, .. } => Some(*kind),
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.failure_kind().is_some_and(FailureKind::is_retryable)
    }
}
