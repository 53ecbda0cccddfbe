//! Cache-fronted, retrying generation.

use super::{with_retry, Fingerprint, GenerationClient, GenerationResult, Prompt, ResultCache, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub result: GenerationResult,
    /// Provider calls made; zero on a cache hit.
    pub attempts: u32,
    pub from_cache: bool,
}

pub struct ResilientGenerator {
    client: GenerationClient,
    cache: Arc<ResultCache>,
    retry: RetryPolicy,
    timeout: Duration,
    cache_ttl: Duration,
}

impl ResilientGenerator {
    pub fn new(
        client: GenerationClient,
        cache: Arc<ResultCache>,
        retry: RetryPolicy,
        timeout: Duration,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            client,
            cache,
            retry,
            timeout,
            cache_ttl,
        }
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Answer from cache, or call the provider under the retry policy and
    /// cache a successful answer.
    pub async fn run(&self, label: &str, prompt: &Prompt, fingerprint: Fingerprint) -> GenerationOutcome {
        if let Some(text) = self.cache.get(&fingerprint) {
            debug!(label, fingerprint = %fingerprint.short(), "Serving generation from cache");
            return GenerationOutcome {
                result: GenerationResult::success(text),
                attempts: 0,
                from_cache: true,
            };
        }

        let outcome = with_retry(&self.retry, label, |_| self.client.generate(prompt, self.timeout)).await;

        if let GenerationResult::Success { text } = &outcome.result {
            self.cache.put(fingerprint, text.clone(), self.cache_ttl);
        }

        GenerationOutcome {
            result: outcome.result,
            attempts: outcome.attempts,
            from_cache: false,
        }
    }
}
