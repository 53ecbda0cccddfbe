//! Integration tests for the docregen binary

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn docregen(workspace: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_docregen"))
        .arg("--workspace")
        .arg(workspace)
        .args(args)
        .env("HOME", workspace)
        .env("XDG_CONFIG_HOME", workspace.join(".config"))
        .env_remove("OPENAI_API_KEY")
        .env_remove("DOCREGEN_LOG")
        .env_remove("DOCREGEN_ENV")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_templates_list_json() {
    let dir = TempDir::new().unwrap();
    let output = docregen(dir.path(), &["templates", "list", "--format", "json"]);
    assert!(output.status.success());

    let listing: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let templates = listing["templates"].as_array().unwrap();
    assert_eq!(listing["total"], templates.len());
    assert!(templates.iter().any(|t| t["id"] == "weekly_report"));
}

#[test]
fn test_templates_list_includes_workspace_directory() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("config")).unwrap();
    std::fs::write(
        dir.path().join("config/config.toml"),
        "[templates]\ndirectory = \"my_templates\"\n",
    )
    .unwrap();
    std::fs::create_dir_all(dir.path().join("my_templates")).unwrap();
    std::fs::write(
        dir.path().join("my_templates/standup.json"),
        r#"{"id": "standup", "name": "Standup", "sections": [{"id": "yesterday", "title": "Yesterday"}]}"#,
    )
    .unwrap();

    let output = docregen(dir.path(), &["templates", "show", "standup"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("ID: standup"));
    assert!(text.contains("Yesterday [yesterday]"));
}

#[test]
fn test_templates_show_unknown_fails() {
    let dir = TempDir::new().unwrap();
    let output = docregen(dir.path(), &["templates", "show", "missing_template"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing_template"));
}

#[test]
fn test_segment_semantic_json() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("notes.txt"),
        "一、背景\n系统在周一出现故障。\n二、处理\n工程师完成修复。",
    )
    .unwrap();

    let output = docregen(
        dir.path(),
        &["segment", "notes.txt", "--mode", "semantic", "--format", "json"],
    );
    assert!(output.status.success());
    let segments: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(segments.as_array().unwrap().len(), 2);
    assert_eq!(segments[1]["heading"], "二、处理");
}

#[test]
fn test_regenerate_without_credentials_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    let output = docregen(dir.path(), &["regenerate", "--template", "weekly_report"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Text generation unavailable"));
}

#[test]
fn test_format_without_ai_needs_no_credentials() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("minutes.txt"),
        "一、议题\n讨论发布计划。\n\n- 周五发布\n- 周一复盘",
    )
    .unwrap();

    let output = docregen(dir.path(), &["format", "minutes.txt", "--no-ai", "--format", "json"]);
    assert!(output.status.success());

    let document: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(document["title"], "minutes");
    assert_eq!(document["blocks"][0]["type"], "heading");
    assert_eq!(document["blocks"][0]["text"], "一、议题");
    assert_eq!(document["blocks"][2]["type"], "list_item");
    assert_eq!(document["blocks"][2]["ordered"], false);
}

#[test]
fn test_format_with_ai_fails_without_credentials() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("minutes.txt"), "内容。").unwrap();

    let output = docregen(dir.path(), &["format", "minutes.txt"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Text generation unavailable"));
}
