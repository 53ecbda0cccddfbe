//! Bounded retry with exponential backoff.
//!
//! Only transient failures are retried. The delay before retry `k` is
//! `initial_delay * 2^(k-1)`, so two retries from a one second base wait
//! one second and then two. Sleeps use the tokio clock.

use super::GenerationResult;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(31);
        self.initial_delay.saturating_mul(1u32 << exponent)
    }

    /// The full wait schedule for a call that fails every time.
    pub fn schedule(&self) -> Vec<Duration> {
        (1..=self.max_retries).map(|retry| self.delay_for(retry)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryOutcome {
    pub result: GenerationResult,
    pub attempts: u32,
}

/// Run `operation` until it succeeds, fails fatally, or the retry budget is
/// spent. `operation` receives the 1-based attempt number.
pub async fn with_retry<F, Fut>(policy: &RetryPolicy, label: &str, mut operation: F) -> RetryOutcome
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = GenerationResult>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 1;

    loop {
        let result = operation(attempt).await;

        let (kind, message) = match &result {
            GenerationResult::Success { .. } => {
                debug!(label, attempt, "Generation attempt succeeded");
                return RetryOutcome { result, attempts: attempt };
            }
            GenerationResult::Failure { kind, message } => (*kind, message.clone()),
        };

        let will_retry = kind.is_retryable() && attempt < max_attempts;
        if !will_retry {
            warn!(
                label,
                attempt,
                max_attempts,
                kind = %kind,
                error = %message,
                will_retry,
                "Generation failed, giving up"
            );
            return RetryOutcome { result, attempts: attempt };
        }

        let delay = policy.delay_for(attempt);
        warn!(
            label,
            attempt,
            max_attempts,
            kind = %kind,
            error = %message,
            will_retry,
            delay_ms = delay.as_millis() as u64,
            "Generation attempt failed, retrying"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
