//! Full regeneration runs through the pipeline

use super::test_utils::{png_bytes, user_text};
use docregen::assembly::{Block, DocumentWriter, JsonWriter, OutputDocument};
use docregen::assets::{ContentUnit, InMemoryDocument};
use docregen::config::{DocregenConfig, PipelineSettings};
use docregen::error::PipelineError;
use docregen::generation::{DispatchMode, Tone};
use docregen::pipeline::{template_store, usage_sink, RegenerationPipeline, RegenerationRequest};
use docregen::provider::{CompletionOptions, ScriptedProvider, ScriptedReply};
use docregen::usage::JsonLinesUsageSink;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const INCIDENT_TEMPLATE: &str = r#"
id = "incident_review"
name = "Incident Review"
category = "ops"

[[sections]]
id = "background"
title = "Background"
requirements = "Describe what happened"

[[sections]]
id = "handling"
title = "Handling"

[[sections.subsections]]
id = "timeline"
title = "Timeline"

[[sections]]
id = "outcome"
title = "Outcome"
requirements = { guidance = "Results and diagrams", keywords = ["diagram"] }
"#;

fn workspace() -> (TempDir, DocregenConfig) {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("templates")).unwrap();
    std::fs::write(dir.path().join("templates/incident_review.toml"), INCIDENT_TEMPLATE).unwrap();

    let mut config = DocregenConfig::default();
    config.templates.directory = Some(PathBuf::from("templates"));
    config.usage.jsonl = Some(PathBuf::from("usage/records.jsonl"));
    (dir, config)
}

fn pipeline(root: &Path, config: &DocregenConfig, provider: Arc<ScriptedProvider>) -> RegenerationPipeline {
    RegenerationPipeline::new(
        PipelineSettings::default(),
        provider,
        CompletionOptions::default(),
        template_store(config, root),
        usage_sink(config, root),
    )
}

fn source_document() -> InMemoryDocument {
    InMemoryDocument::new(vec![
        ContentUnit::heading("Incident", 1),
        ContentUnit::text("The database failed at noon."),
        ContentUnit::asset("diagram of recovery", &png_bytes(10, 5)),
        ContentUnit::text("Service recovered after failover."),
    ])
}

fn scripted() -> Arc<ScriptedProvider> {
    Arc::new(ScriptedProvider::from_fn(|messages| {
        let user = user_text(messages);
        if user.starts_with("Fields:") {
            ScriptedReply::text(r#"{"cause": "The database failed"}"#)
        } else if user.starts_with("Write every section") {
            ScriptedReply::text(
                r#"{
                    "background": "The primary database failed at noon.",
                    "handling": "The on-call engineer started a failover.\n- paged the team\n- promoted the replica",
                    "timeline": "12:00 failure, 12:20 recovery.",
                    "outcome": "Service recovered after failover."
                }"#,
            )
        } else {
            ScriptedReply::text("Per-section text.")
        }
    }))
}

fn image_count(document: &OutputDocument) -> usize {
    document
        .blocks
        .iter()
        .filter(|block| matches!(block, Block::Image { .. }))
        .count()
}

#[tokio::test]
async fn test_file_template_regenerates_with_assets_and_extraction() {
    let (dir, config) = workspace();
    let provider = scripted();
    let pipeline = pipeline(dir.path(), &config, provider.clone());

    let request = RegenerationRequest::new("incident_review")
        .with_tone(Tone::Formal)
        .with_extract_fields(vec!["cause".to_string()]);
    let output = pipeline.run(&request, &source_document()).await.unwrap();

    assert_eq!(output.generation.mode, DispatchMode::Batched);
    assert_eq!(output.summary().succeeded, 4);
    assert_eq!(provider.calls(), 2);

    let headings: Vec<&str> = output.document.headings().collect();
    assert_eq!(headings, vec!["Background", "Handling", "Timeline", "Outcome"]);
    assert!(output.document.blocks.iter().any(|block| matches!(
        block,
        Block::Heading { level: 2, text } if text == "Timeline"
    )));
    assert!(output.document.blocks.iter().any(|block| matches!(
        block,
        Block::ListItem { ordered: false, text } if text == "promoted the replica"
    )));

    assert_eq!(output.assignments.len(), 1);
    assert_eq!(output.assignments[0].target_section_id, "outcome");
    assert_eq!(image_count(&output.document), 1);
    assert!(matches!(output.document.blocks.last(), Some(Block::Image { .. })));

    let extraction = output.extraction.as_ref().unwrap();
    assert_eq!(extraction.value("cause"), Some("The database failed"));

    let json = JsonWriter { pretty: false }.write(&output.document).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["title"], "Incident Review");

    let records = JsonLinesUsageSink::read_all(&dir.path().join("usage/records.jsonl")).unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].success);
    assert!(records[0].had_source_document);
    assert_eq!(records[0].template_name.as_deref(), Some("Incident Review"));
}

#[tokio::test]
async fn test_repeat_run_is_served_from_cache() {
    let (dir, config) = workspace();
    let provider = scripted();
    let pipeline = pipeline(dir.path(), &config, provider.clone());
    let request = RegenerationRequest::new("incident_review");

    let first = pipeline.run(&request, &source_document()).await.unwrap();
    let calls_after_first = provider.calls();
    let second = pipeline.run(&request, &source_document()).await.unwrap();

    assert_eq!(provider.calls(), calls_after_first);
    assert_eq!(first.document, second.document);
}

#[tokio::test]
async fn test_builtin_template_without_source() {
    let (dir, config) = workspace();
    let provider = scripted();
    let pipeline = pipeline(dir.path(), &config, provider.clone());

    let output = pipeline
        .run(
            &RegenerationRequest::new("weekly_report").with_outline("Finish the migration"),
            &InMemoryDocument::default(),
        )
        .await
        .unwrap();

    assert_eq!(output.generation.mode, DispatchMode::PerSection);
    assert_eq!(output.summary().succeeded, output.template.section_count());
    assert_eq!(image_count(&output.document), 0);
    assert!(provider
        .requests()
        .iter()
        .all(|messages| user_text(messages).contains("Finish the migration")));
}

#[tokio::test]
async fn test_failed_run_is_recorded() {
    let (dir, config) = workspace();
    let pipeline = pipeline(dir.path(), &config, scripted());

    let result = pipeline
        .run(&RegenerationRequest::new("no_such_template"), &source_document())
        .await;
    assert!(matches!(result, Err(PipelineError::TemplateNotFound(_))));

    let records = JsonLinesUsageSink::read_all(&dir.path().join("usage/records.jsonl")).unwrap();
    assert_eq!(records.len(), 1);
    assert!(!records[0].success);
    assert!(records[0].had_source_document);
    assert!(records[0].error.is_some());
}
