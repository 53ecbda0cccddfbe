//! Single-attempt generation call with timeout and failure classification.

use super::{GenerationResult, Prompt};
use crate::provider::{ChatMessage, CompletionOptions, ModelProviderClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct GenerationClient {
    provider: Arc<dyn ModelProviderClient>,
    options: CompletionOptions,
}

impl GenerationClient {
    pub fn new(provider: Arc<dyn ModelProviderClient>, options: CompletionOptions) -> Self {
        Self { provider, options }
    }

    pub fn provider(&self) -> &Arc<dyn ModelProviderClient> {
        &self.provider
    }

    /// Make one call. Never returns an error: every outcome is a
    /// [`GenerationResult`]. Blank responses count as transient failures.
    pub async fn generate(&self, prompt: &Prompt, timeout: Duration) -> GenerationResult {
        let messages = vec![
            ChatMessage::system(prompt.system.clone()),
            ChatMessage::user(prompt.user.clone()),
        ];

        let call = self.provider.complete(messages, self.options.clone());
        match tokio::time::timeout(timeout, call).await {
            Err(_) => {
                debug!(
                    provider = self.provider.provider_name(),
                    timeout_ms = timeout.as_millis() as u64,
                    "Generation call timed out"
                );
                GenerationResult::transient("timeout")
            }
            Ok(Err(err)) => {
                debug!(
                    provider = self.provider.provider_name(),
                    kind = %err.kind(),
                    error = %err,
                    "Generation call failed"
                );
                GenerationResult::Failure {
                    kind: err.kind(),
                    message: err.to_string(),
                }
            }
            Ok(Ok(response)) => {
                let text = response.content.trim();
                if text.is_empty() {
                    GenerationResult::transient("empty response")
                } else {
                    GenerationResult::success(text)
                }
            }
        }
    }
}
