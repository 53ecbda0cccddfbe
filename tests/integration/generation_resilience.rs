//! Retry, timeout and cache behavior of a single generation call

use super::test_utils::{capturing_subscriber, generator, LogBuffer};
use docregen::error::{FailureKind, ProviderError};
use docregen::generation::{Fingerprint, GenerationResult, Prompt};
use docregen::provider::{ScriptedProvider, ScriptedReply};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn prompt() -> Prompt {
    Prompt {
        system: "Write plainly.".to_string(),
        user: "Section: Summary".to_string(),
    }
}

fn key(input: &str) -> Fingerprint {
    Fingerprint::compute("section", input, &[("section", "summary")])
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_back_off_one_then_two_seconds() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        ScriptedReply::Error(ProviderError::ServerError {
            status: 503,
            message: "busy".to_string(),
        }),
        ScriptedReply::Error(ProviderError::RateLimited("slow down".to_string())),
        ScriptedReply::text("Recovered text."),
    ]));
    let generator = generator(provider.clone(), 2, Duration::from_secs(15));

    let started = Instant::now();
    let outcome = generator.run("summary", &prompt(), key("a")).await;
    let elapsed = started.elapsed();

    assert_eq!(outcome.result.text(), Some("Recovered text."));
    assert_eq!(outcome.attempts, 3);
    assert_eq!(provider.calls(), 3);
    assert!(elapsed >= Duration::from_secs(3));
    assert!(elapsed < Duration::from_millis(3100));
}

#[tokio::test(start_paused = true)]
async fn test_empty_response_is_retried() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        ScriptedReply::text("   "),
        ScriptedReply::text("Second try."),
    ]));
    let generator = generator(provider.clone(), 1, Duration::from_secs(15));

    let outcome = generator.run("summary", &prompt(), key("b")).await;

    assert_eq!(outcome.result.text(), Some("Second try."));
    assert_eq!(outcome.attempts, 2);
}

#[test]
fn test_retry_decisions_are_logged() {
    let logs = LogBuffer::default();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap();

    let outcome = tracing::subscriber::with_default(capturing_subscriber(&logs), || {
        runtime.block_on(async {
            let provider = Arc::new(ScriptedProvider::new(vec![
                ScriptedReply::text(""),
                ScriptedReply::text("Second try."),
            ]));
            let generator = generator(provider, 1, Duration::from_secs(15));
            generator.run("summary", &prompt(), key("logged")).await
        })
    });

    assert_eq!(outcome.attempts, 2);
    let output = logs.contents();
    let retry_line = output
        .lines()
        .find(|line| line.contains("retrying"))
        .unwrap_or_else(|| panic!("no retry line in:\n{}", output));
    assert!(retry_line.contains("attempt=1"));
    assert!(retry_line.contains("delay_ms=1000"));
    assert!(retry_line.contains("will_retry=true"));
    assert!(output
        .lines()
        .any(|line| line.contains("succeeded") && line.contains("attempt=2")));
}

#[tokio::test(start_paused = true)]
async fn test_retry_budget_exhausted_reports_transient_failure() {
    let provider = Arc::new(ScriptedProvider::always(ScriptedReply::text("")));
    let generator = generator(provider.clone(), 1, Duration::from_secs(15));

    let outcome = generator.run("summary", &prompt(), key("c")).await;

    assert_eq!(outcome.result.failure_kind(), Some(FailureKind::Transient));
    assert_eq!(outcome.attempts, 2);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_fatal_failure_is_not_retried() {
    let provider = Arc::new(ScriptedProvider::always(ScriptedReply::Error(ProviderError::AuthFailed(
        "bad key".to_string(),
    ))));
    let generator = generator(provider.clone(), 2, Duration::from_secs(15));

    let outcome = generator.run("summary", &prompt(), key("d")).await;

    assert_eq!(outcome.result.failure_kind(), Some(FailureKind::Fatal));
    assert_eq!(outcome.attempts, 1);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_slow_provider_times_out_as_transient() {
    let provider = Arc::new(ScriptedProvider::always(ScriptedReply::delayed(
        Duration::from_secs(20),
        ScriptedReply::text("too late"),
    )));
    let generator = generator(provider.clone(), 0, Duration::from_secs(15));

    let outcome = generator.run("summary", &prompt(), key("e")).await;

    assert_eq!(outcome.result, GenerationResult::transient("timeout"));
    assert_eq!(outcome.attempts, 1);
}

#[tokio::test(start_paused = true)]
async fn test_cache_serves_repeat_and_expires_after_ttl() {
    let provider = Arc::new(ScriptedProvider::always(ScriptedReply::text("Cached body.")));
    let generator = generator(provider.clone(), 0, Duration::from_secs(15));

    let first = generator.run("summary", &prompt(), key("f")).await;
    let second = generator.run("summary", &prompt(), key("f")).await;
    assert_eq!(first.result, second.result);
    assert!(second.from_cache);
    assert_eq!(second.attempts, 0);
    assert_eq!(provider.calls(), 1);

    tokio::time::advance(Duration::from_secs(31)).await;
    let third = generator.run("summary", &prompt(), key("f")).await;
    assert!(!third.from_cache);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failures_are_not_cached() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        ScriptedReply::Error(ProviderError::Connection("reset".to_string())),
        ScriptedReply::text("Later success."),
    ]));
    let generator = generator(provider.clone(), 0, Duration::from_secs(15));

    let failed = generator.run("summary", &prompt(), key("g")).await;
    assert!(!failed.result.is_success());

    let retried = generator.run("summary", &prompt(), key("g")).await;
    assert_eq!(retried.result.text(), Some("Later success."));
    assert_eq!(provider.calls(), 2);
}
