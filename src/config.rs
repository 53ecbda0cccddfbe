//! Configuration System
//!
//! Layered configuration through the `config` crate. Sources, lowest
//! priority first: built-in defaults, the per-user config file, the
//! workspace `config/config.toml`, `config/{DOCREGEN_ENV}.toml`, an explicit
//! file, and `DOCREGEN__SECTION__KEY` environment variables.

mod merge_policy;
mod sources;

pub use sources::global_file::global_config_path;

use crate::assets::{AssignmentStrategy, ScoringWeights};
use crate::error::PipelineError;
use crate::extraction::{ExtractionSettings, FabricationPolicy};
use crate::generation::{OrchestratorSettings, RetryPolicy, Tone, DEFAULT_MAX_POLISH_CHARS};
use crate::logging::LoggingConfig;
use crate::provider::ProviderConfig;
use config::{Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "DOCREGEN";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocregenConfig {
    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub templates: TemplateSourceConfig,

    #[serde(default)]
    pub usage: UsageConfig,
}

/// Tuning for one regeneration run. Durations are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    #[serde(default = "default_retry_initial_delay")]
    pub retry_initial_delay: f64,

    #[serde(default = "default_request_timeout")]
    pub request_timeout: f64,

    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: f64,

    /// Sources up to this many characters are generated in one request
    #[serde(default = "default_batch_size_threshold")]
    pub batch_size_threshold: usize,

    #[serde(default = "default_max_excerpt_chars")]
    pub max_excerpt_chars: usize,

    #[serde(default = "default_max_extraction_chars")]
    pub max_extraction_chars: usize,

    /// Longer documents are formatted without polishing
    #[serde(default = "default_max_polish_chars")]
    pub max_polish_chars: usize,

    /// Content units of context kept on each side of an asset
    #[serde(default = "default_context_window")]
    pub context_window: usize,

    #[serde(default = "default_min_substantive_chars")]
    pub min_substantive_chars: usize,

    #[serde(default = "default_tone")]
    pub tone: String,

    #[serde(default)]
    pub fabrication_policy: FabricationPolicy,

    #[serde(default)]
    pub scoring: ScoringWeights,
}

fn default_max_workers() -> usize {
    5
}

fn default_retry_count() -> u32 {
    2
}

fn default_retry_initial_delay() -> f64 {
    1.0
}

fn default_request_timeout() -> f64 {
    15.0
}

fn default_cache_ttl() -> f64 {
    30.0
}

fn default_batch_size_threshold() -> usize {
    1000
}

fn default_max_excerpt_chars() -> usize {
    4000
}

fn default_max_extraction_chars() -> usize {
    1000
}

fn default_max_polish_chars() -> usize {
    DEFAULT_MAX_POLISH_CHARS
}

fn default_context_window() -> usize {
    3
}

fn default_min_substantive_chars() -> usize {
    100
}

fn default_tone() -> String {
    Tone::default().as_str().to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            retry_count: default_retry_count(),
            retry_initial_delay: default_retry_initial_delay(),
            request_timeout: default_request_timeout(),
            cache_ttl: default_cache_ttl(),
            batch_size_threshold: default_batch_size_threshold(),
            max_excerpt_chars: default_max_excerpt_chars(),
            max_extraction_chars: default_max_extraction_chars(),
            max_polish_chars: default_max_polish_chars(),
            context_window: default_context_window(),
            min_substantive_chars: default_min_substantive_chars(),
            tone: default_tone(),
            fabrication_policy: FabricationPolicy::default(),
            scoring: ScoringWeights::default(),
        }
    }
}

/// Typed, validated form of [`PipelineConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub orchestrator: OrchestratorSettings,
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
    pub cache_ttl: Duration,
    pub extraction: ExtractionSettings,
    pub max_polish_chars: usize,
    pub context_window: usize,
    pub assignment: AssignmentStrategy,
    pub tone: Tone,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            orchestrator: OrchestratorSettings::default(),
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(15),
            cache_ttl: Duration::from_secs(30),
            extraction: ExtractionSettings::default(),
            max_polish_chars: DEFAULT_MAX_POLISH_CHARS,
            context_window: 3,
            assignment: AssignmentStrategy::default(),
            tone: Tone::default(),
        }
    }
}

impl PipelineConfig {
    /// Every problem found, not just the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.max_workers == 0 {
            errors.push("max_workers must be at least 1".to_string());
        }
        if !self.retry_initial_delay.is_finite() || self.retry_initial_delay < 0.0 {
            errors.push(format!(
                "retry_initial_delay must be a non-negative number of seconds, got {}",
                self.retry_initial_delay
            ));
        }
        if !self.request_timeout.is_finite() || self.request_timeout <= 0.0 {
            errors.push(format!(
                "request_timeout must be a positive number of seconds, got {}",
                self.request_timeout
            ));
        }
        if !self.cache_ttl.is_finite() || self.cache_ttl < 0.0 {
            errors.push(format!(
                "cache_ttl must be a non-negative number of seconds, got {}",
                self.cache_ttl
            ));
        }
        if !self.scoring.is_valid() {
            errors.push("scoring weights must be finite and non-negative".to_string());
        }
        if let Err(err) = self.tone.parse::<Tone>() {
            errors.push(err.to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn resolve(&self) -> Result<PipelineSettings, PipelineError> {
        self.validate()
            .map_err(|errors| PipelineError::ConfigError(errors.join("; ")))?;

        Ok(PipelineSettings {
            orchestrator: OrchestratorSettings {
                max_workers: self.max_workers,
                batch_size_threshold: self.batch_size_threshold,
                max_excerpt_chars: self.max_excerpt_chars,
            },
            retry: RetryPolicy::new(self.retry_count, seconds("retry_initial_delay", self.retry_initial_delay)?),
            request_timeout: seconds("request_timeout", self.request_timeout)?,
            cache_ttl: seconds("cache_ttl", self.cache_ttl)?,
            extraction: ExtractionSettings {
                max_source_chars: self.max_extraction_chars,
                policy: self.fabrication_policy,
            },
            max_polish_chars: self.max_polish_chars,
            context_window: self.context_window,
            assignment: AssignmentStrategy::new(self.scoring, self.min_substantive_chars),
            tone: self.tone.parse()?,
        })
    }
}

fn seconds(name: &str, value: f64) -> Result<Duration, PipelineError> {
    Duration::try_from_secs_f64(value)
        .map_err(|e| PipelineError::ConfigError(format!("{}: {}", name, e)))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSourceConfig {
    /// Directory of user templates (`{id}.json` / `{id}.toml`), relative to
    /// the workspace root unless absolute. Built-in templates take priority.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Append records here as JSON lines; otherwise they are logged.
    #[serde(default)]
    pub jsonl: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            jsonl: None,
        }
    }
}

impl DocregenConfig {
    /// Validates the pipeline section. The provider section is checked when
    /// a client is built, so commands that never call the service run
    /// without credentials.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.pipeline.validate().map_err(|errors| {
            let lines: Vec<String> = errors.into_iter().map(|e| format!("pipeline: {}", e)).collect();
            PipelineError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                lines.join("\n")
            ))
        })
    }
}

/// Builds a [`DocregenConfig`] from the layered sources.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    workspace_root: PathBuf,
    explicit_file: Option<PathBuf>,
    include_global: bool,
    include_environment: bool,
}

impl ConfigLoader {
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            explicit_file: None,
            include_global: true,
            include_environment: true,
        }
    }

    /// Layer a required file above the workspace files.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }

    pub fn without_global(mut self) -> Self {
        self.include_global = false;
        self
    }

    pub fn without_environment(mut self) -> Self {
        self.include_environment = false;
        self
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Load and validate.
    pub fn load(&self) -> Result<DocregenConfig, PipelineError> {
        let mut builder = merge_policy::builder_with_defaults()?;
        if self.include_global {
            builder = sources::global_file::add_to_builder(builder);
        }
        builder = sources::workspace_file::add_to_builder(builder, &self.workspace_root);
        if let Some(path) = &self.explicit_file {
            if !path.exists() {
                return Err(PipelineError::ConfigError(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }
        if self.include_environment {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let config: DocregenConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
