//! Whole-document polishing.
//!
//! One provider request rewrites the entire source text. The caller always
//! gets usable text back: oversized input is never sent, and any failure
//! returns the trimmed original.

use super::prompt::polish_prompt;
use super::{Fingerprint, GenerationResult, ResilientGenerator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

pub const DEFAULT_MAX_POLISH_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolishOutcome {
    pub text: String,
    /// True when `text` came from the provider (or its cache).
    pub polished: bool,
    pub attempts: u32,
    /// Why the original text was kept, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl PolishOutcome {
    fn original(text: &str, reason: Option<String>) -> Self {
        Self {
            text: text.to_string(),
            polished: false,
            attempts: 0,
            fallback_reason: reason,
        }
    }
}

pub struct TextPolisher {
    generator: Arc<ResilientGenerator>,
    max_chars: usize,
}

impl TextPolisher {
    pub fn new(generator: Arc<ResilientGenerator>, max_chars: usize) -> Self {
        Self { generator, max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub async fn polish(&self, raw_text: &str) -> PolishOutcome {
        let text = raw_text.trim();
        if text.is_empty() {
            return PolishOutcome::original("", None);
        }

        let chars = text.chars().count();
        if chars > self.max_chars {
            warn!(
                chars,
                max_chars = self.max_chars,
                "Text too long to polish, keeping original"
            );
            return PolishOutcome::original(
                text,
                Some(format!("text has {} characters, limit is {}", chars, self.max_chars)),
            );
        }

        let fingerprint = Fingerprint::compute("polish", text, &[]);
        let outcome = self.generator.run("polish", &polish_prompt(text), fingerprint).await;

        match outcome.result {
            GenerationResult::Success { text: polished } => {
                info!(
                    input_chars = chars,
                    output_chars = polished.chars().count(),
                    from_cache = outcome.from_cache,
                    "Polished text"
                );
                PolishOutcome {
                    text: polished.trim().to_string(),
                    polished: true,
                    attempts: outcome.attempts,
                    fallback_reason: None,
                }
            }
            GenerationResult::Failure { kind, message } => {
                warn!(kind = %kind, error = %message, "Polishing failed, keeping original");
                PolishOutcome {
                    attempts: outcome.attempts,
                    ..PolishOutcome::original(text, Some(message))
                }
            }
        }
    }
}
