//! Structured field extraction against a scripted provider

use super::test_utils::generator;
use docregen::extraction::{
    ExtractionPreset, ExtractionSettings, FabricationPolicy, FieldValue, StructuredExtractor,
};
use docregen::provider::{ScriptedProvider, ScriptedReply};
use std::sync::Arc;
use std::time::Duration;

const INCIDENT: &str = "系统故障。工程师修复。系统恢复。";

fn extractor(provider: Arc<ScriptedProvider>, policy: FabricationPolicy) -> StructuredExtractor {
    StructuredExtractor::new(
        generator(provider, 0, Duration::from_secs(15)),
        ExtractionSettings {
            max_source_chars: 1000,
            policy,
        },
    )
}

#[tokio::test]
async fn test_cause_process_result_from_short_incident() {
    let provider = Arc::new(ScriptedProvider::always(ScriptedReply::text(
        r#"{"原因": "系统故障", "过程": "工程师修复", "结果": "系统恢复"}"#,
    )));
    let extractor = extractor(provider.clone(), FabricationPolicy::KeepWithWarning);

    let report = extractor
        .extract_preset(INCIDENT, ExtractionPreset::CauseProcessResult)
        .await;

    assert_eq!(report.value("原因"), Some("系统故障"));
    assert_eq!(report.value("过程"), Some("工程师修复"));
    assert_eq!(report.value("结果"), Some("系统恢复"));
    assert!(report.suspected().is_empty());
    assert!(report.failure.is_none());

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0][1].content.contains(INCIDENT));
}

#[tokio::test]
async fn test_fenced_json_answer_is_accepted() {
    let provider = Arc::new(ScriptedProvider::always(ScriptedReply::text(
        "```json\n{\"原因\": \"系统故障\", \"过程\": \"\", \"结果\": \"系统恢复\"}\n```",
    )));
    let report = extractor(provider, FabricationPolicy::KeepWithWarning)
        .extract_preset(INCIDENT, ExtractionPreset::CauseProcessResult)
        .await;

    assert_eq!(report.value("原因"), Some("系统故障"));
    assert_eq!(report.field("过程").map(|field| field.value.clone()), Some(FieldValue::Empty));
}

#[tokio::test]
async fn test_unsupported_value_is_flagged_and_kept() {
    let provider = Arc::new(ScriptedProvider::always(ScriptedReply::text(
        r#"{"原因": "系统故障", "过程": "工程师修复", "结果": "客户满意度大幅提升"}"#,
    )));
    let report = extractor(provider, FabricationPolicy::KeepWithWarning)
        .extract_preset(INCIDENT, ExtractionPreset::CauseProcessResult)
        .await;

    assert_eq!(report.suspected(), vec!["结果"]);
    assert_eq!(report.value("结果"), Some("客户满意度大幅提升"));
}

#[tokio::test]
async fn test_blank_policy_empties_unsupported_value() {
    let provider = Arc::new(ScriptedProvider::always(ScriptedReply::text(
        r#"{"原因": "系统故障", "过程": "工程师修复", "结果": "客户满意度大幅提升"}"#,
    )));
    let report = extractor(provider, FabricationPolicy::Blank)
        .extract_preset(INCIDENT, ExtractionPreset::CauseProcessResult)
        .await;

    assert_eq!(report.suspected(), vec!["结果"]);
    assert_eq!(report.value("结果"), None);
    assert_eq!(report.value("原因"), Some("系统故障"));
}

#[tokio::test]
async fn test_retry_policy_replaces_value_supported_on_second_ask() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        ScriptedReply::text(r#"{"原因": "系统故障", "过程": "工程师修复", "结果": "客户满意度大幅提升"}"#),
        ScriptedReply::text(r#"{"原因": "系统故障", "过程": "工程师修复", "结果": "系统恢复"}"#),
    ]));
    let report = extractor(provider.clone(), FabricationPolicy::RetryThenBlank)
        .extract_preset(INCIDENT, ExtractionPreset::CauseProcessResult)
        .await;

    assert_eq!(provider.calls(), 2);
    assert_eq!(report.attempts, 2);
    assert_eq!(report.value("结果"), Some("系统恢复"));
    assert!(report.suspected().is_empty());
}

#[tokio::test]
async fn test_unparseable_answer_yields_empty_fields() {
    let provider = Arc::new(ScriptedProvider::always(ScriptedReply::text("I cannot help with that.")));
    let report = extractor(provider, FabricationPolicy::KeepWithWarning)
        .extract_preset(INCIDENT, ExtractionPreset::CauseProcessResult)
        .await;

    assert_eq!(report.fields.len(), 3);
    assert!(report.fields.iter().all(|field| field.value.is_empty()));
    assert!(report.failure.is_some());
}

#[tokio::test]
async fn test_oversized_source_is_not_sent() {
    let provider = Arc::new(ScriptedProvider::always(ScriptedReply::text("{}")));
    let source = "很长的文本。".repeat(300);
    let report = extractor(provider.clone(), FabricationPolicy::KeepWithWarning)
        .extract(&source, &["原因".to_string()])
        .await;

    assert_eq!(provider.calls(), 0);
    assert!(report.failure.is_some());
    assert_eq!(report.value("原因"), None);
}
