//! Parallel section generation through the bounded worker pool

use super::test_utils::{generator, user_text};
use docregen::error::ProviderError;
use docregen::generation::{DispatchMode, OrchestratorSettings, SectionOrchestrator, Tone};
use docregen::provider::{ScriptedProvider, ScriptedReply};
use docregen::template::{Section, Template};
use std::sync::Arc;
use std::time::Duration;

fn template(count: usize) -> Template {
    let sections = (0..count)
        .map(|index| {
            let title = if index % 4 == 3 {
                format!("Broken {}", index)
            } else {
                format!("Part {}", index)
            };
            Section::new(format!("s{}", index), title)
        })
        .collect();
    Template::new("report", "Report", sections)
}

fn settings(max_workers: usize, batch_size_threshold: usize) -> OrchestratorSettings {
    OrchestratorSettings {
        max_workers,
        batch_size_threshold,
        max_excerpt_chars: 4000,
    }
}

#[tokio::test(start_paused = true)]
async fn test_failing_sections_do_not_block_the_rest() {
    let provider = Arc::new(ScriptedProvider::from_fn(|messages| {
        let user = user_text(messages);
        let reply = if user.contains("Section: Broken") {
            ScriptedReply::Error(ProviderError::InvalidRequest {
                status: 400,
                message: "rejected".to_string(),
            })
        } else {
            ScriptedReply::text("Section body.")
        };
        ScriptedReply::delayed(Duration::from_millis(200), reply)
    }));
    let orchestrator = SectionOrchestrator::new(
        generator(provider.clone(), 0, Duration::from_secs(15)),
        settings(3, 1000),
    );

    let run = orchestrator
        .generate_all(&template(8), "", None, Tone::NoPreference)
        .await;

    assert_eq!(run.mode, DispatchMode::PerSection);
    let summary = run.summary();
    assert_eq!(summary.total, 8);
    assert_eq!(summary.succeeded, 6);
    assert_eq!(summary.fatal_failures, 2);
    assert_eq!(run.results.len(), 8);
    assert_eq!(provider.calls(), 8);
    assert_eq!(provider.max_in_flight(), 3);

    let expected_order: Vec<String> = (0..8).map(|index| format!("s{}", index)).collect();
    assert_eq!(run.order, expected_order);

    let texts = run.section_texts();
    assert_eq!(texts["s0"], "Section body.");
    assert_eq!(texts["s3"], "");
}

#[tokio::test(start_paused = true)]
async fn test_single_worker_serializes_calls() {
    let provider = Arc::new(ScriptedProvider::always(ScriptedReply::delayed(
        Duration::from_millis(50),
        ScriptedReply::text("ok"),
    )));
    let orchestrator = SectionOrchestrator::new(
        generator(provider.clone(), 0, Duration::from_secs(15)),
        settings(1, 1000),
    );

    let run = orchestrator
        .generate_all(&template(5), "", None, Tone::Formal)
        .await;

    assert_eq!(run.summary().total, 5);
    assert_eq!(provider.max_in_flight(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_transient_failure_falls_back_to_source_excerpt() {
    let provider = Arc::new(ScriptedProvider::from_fn(|messages| {
        if user_text(messages).contains("Section: Broken") {
            ScriptedReply::Error(ProviderError::ServerError {
                status: 502,
                message: "bad gateway".to_string(),
            })
        } else {
            ScriptedReply::text("Generated.")
        }
    }));
    let orchestrator = SectionOrchestrator::new(
        generator(provider.clone(), 0, Duration::from_secs(15)),
        settings(5, 0),
    );

    let run = orchestrator
        .generate_all(&template(4), "Quarterly numbers improved.", None, Tone::Concise)
        .await;

    assert_eq!(run.mode, DispatchMode::PerSection);
    assert_eq!(run.summary().transient_failures, 1);
    let texts = run.section_texts();
    assert_eq!(texts["s3"], "Quarterly numbers improved.");
    assert_eq!(texts["s0"], "Generated.");
}

#[tokio::test(start_paused = true)]
async fn test_small_source_uses_one_batched_call() {
    let provider = Arc::new(ScriptedProvider::always(ScriptedReply::text(
        r#"{"s0": "First.", "s1": "Second.", "s2": "Third."}"#,
    )));
    let orchestrator = SectionOrchestrator::new(
        generator(provider.clone(), 0, Duration::from_secs(15)),
        settings(5, 1000),
    );

    let run = orchestrator
        .generate_all(&template(3), "Short source.", None, Tone::NoPreference)
        .await;

    assert_eq!(run.mode, DispatchMode::Batched);
    assert_eq!(provider.calls(), 1);
    assert_eq!(run.section_texts()["s2"], "Third.");
}

#[tokio::test(start_paused = true)]
async fn test_batched_omissions_are_requested_individually() {
    let provider = Arc::new(ScriptedProvider::from_fn(|messages| {
        if user_text(messages).starts_with("Write every section") {
            ScriptedReply::text(r#"{"s0": "First."}"#)
        } else {
            ScriptedReply::text("Individually generated.")
        }
    }));
    let orchestrator = SectionOrchestrator::new(
        generator(provider.clone(), 0, Duration::from_secs(15)),
        settings(5, 1000),
    );

    let run = orchestrator
        .generate_all(&template(3), "Short source.", None, Tone::NoPreference)
        .await;

    assert_eq!(provider.calls(), 3);
    let texts = run.section_texts();
    assert_eq!(texts["s0"], "First.");
    assert_eq!(texts["s1"], "Individually generated.");
    assert_eq!(run.summary().succeeded, 3);
}
