//! Layered configuration loading into pipeline settings

use docregen::config::ConfigLoader;
use docregen::error::PipelineError;
use docregen::generation::Tone;
use docregen::pipeline::RegenerationPipeline;
use std::time::Duration;
use tempfile::TempDir;

fn write_workspace_config(dir: &TempDir, contents: &str) {
    let config_dir = dir.path().join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), contents).unwrap();
}

#[test]
fn test_workspace_file_resolves_into_settings() {
    let dir = TempDir::new().unwrap();
    write_workspace_config(
        &dir,
        r#"
[pipeline]
max_workers = 2
retry_count = 1
retry_initial_delay = 0.5
request_timeout = 20.0
tone = "concise"

[logging]
level = "debug"
"#,
    );

    let config = ConfigLoader::new(dir.path())
        .without_global()
        .without_environment()
        .load()
        .unwrap();
    assert_eq!(config.logging.level, "debug");

    let settings = config.pipeline.resolve().unwrap();
    assert_eq!(settings.orchestrator.max_workers, 2);
    assert_eq!(settings.retry.max_retries, 1);
    assert_eq!(settings.retry.initial_delay, Duration::from_millis(500));
    assert_eq!(settings.request_timeout, Duration::from_secs(20));
    assert_eq!(settings.tone, Tone::Concise);
    assert_eq!(settings.cache_ttl, Duration::from_secs(30));
}

#[test]
fn test_explicit_file_wins_over_workspace_file() {
    let dir = TempDir::new().unwrap();
    write_workspace_config(&dir, "[pipeline]\nmax_workers = 2\n");
    let explicit = dir.path().join("override.toml");
    std::fs::write(&explicit, "[pipeline]\nmax_workers = 9\n").unwrap();

    let config = ConfigLoader::new(dir.path())
        .with_file(&explicit)
        .without_global()
        .without_environment()
        .load()
        .unwrap();
    assert_eq!(config.pipeline.max_workers, 9);
}

#[test]
fn test_environment_overrides_files() {
    let dir = TempDir::new().unwrap();
    write_workspace_config(&dir, "[pipeline]\nbatch_size_threshold = 500\n");

    std::env::set_var("DOCREGEN__PIPELINE__BATCH_SIZE_THRESHOLD", "250");
    let result = ConfigLoader::new(dir.path()).without_global().load();
    std::env::remove_var("DOCREGEN__PIPELINE__BATCH_SIZE_THRESHOLD");

    assert_eq!(result.unwrap().pipeline.batch_size_threshold, 250);
}

#[test]
fn test_invalid_values_are_reported_together() {
    let dir = TempDir::new().unwrap();
    write_workspace_config(&dir, "[pipeline]\nmax_workers = 0\nrequest_timeout = -1.0\n");

    let err = ConfigLoader::new(dir.path())
        .without_global()
        .without_environment()
        .load()
        .unwrap_err();
    match err {
        PipelineError::ConfigError(message) => {
            assert!(message.contains("max_workers"));
            assert!(message.contains("request_timeout"));
        }
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn test_pipeline_from_config_needs_provider_credentials() {
    let dir = TempDir::new().unwrap();
    write_workspace_config(
        &dir,
        r#"
[provider]
provider_type = "openai"
api_key = ""
"#,
    );
    let config = ConfigLoader::new(dir.path())
        .without_global()
        .without_environment()
        .load()
        .unwrap();

    std::env::remove_var("OPENAI_API_KEY");
    let result = RegenerationPipeline::from_config(&config, dir.path());
    assert!(result.is_err());
}
