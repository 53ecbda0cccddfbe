//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::assembly::OutputFormat;
use crate::assets::{DocumentSource, InMemoryDocument};
use crate::cli::parse::{command_name, split_list, Commands, TemplateCommands};
use crate::cli::presentation::{
    format_extraction, format_format_summary, format_regeneration_summary, format_segments, format_template_list,
    format_template_show,
};
use crate::config::{ConfigLoader, DocregenConfig};
use crate::error::PipelineError;
use crate::extraction::ExtractionPreset;
use crate::pipeline::{format_plain, template_store, RegenerationPipeline, RegenerationRequest};
use crate::segmentation::{HeuristicSegmenter, SegmentMode, Segmenter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Runtime context for CLI execution: workspace root and loaded configuration.
pub struct RunContext {
    workspace_root: PathBuf,
    config: DocregenConfig,
}

impl RunContext {
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, PipelineError> {
        let config = load_config(&workspace_root, config_path.as_deref())?;
        Ok(Self { workspace_root, config })
    }

    pub fn from_config(workspace_root: PathBuf, config: DocregenConfig) -> Self {
        Self { workspace_root, config }
    }

    pub fn config(&self) -> &DocregenConfig {
        &self.config
    }

    /// Execute a command and return what should be printed on stdout.
    pub fn execute(&self, command: &Commands) -> Result<String, PipelineError> {
        let started = Instant::now();
        let result = self.execute_inner(command);
        debug!(
            command = command_name(command),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, PipelineError> {
        match command {
            Commands::Regenerate {
                template,
                input,
                outline,
                tone,
                extract,
                format,
                output,
            } => {
                let format: OutputFormat = format.parse()?;
                let mut request = RegenerationRequest::new(template.clone());
                if let Some(outline) = outline {
                    request = request.with_outline(outline.clone());
                }
                if let Some(tone) = tone {
                    request = request.with_tone(tone.parse()?);
                }
                if let Some(fields) = extract {
                    request = request.with_extract_fields(split_list(fields));
                }
                let document = match input {
                    Some(path) => InMemoryDocument::load(&self.resolve(path))?,
                    None => InMemoryDocument::default(),
                };

                let pipeline = self.pipeline()?;
                let result = runtime()?.block_on(pipeline.run(&request, &document))?;
                let rendered = format.writer().write(&result.document)?;

                match output {
                    Some(path) => {
                        let path = self.resolve(path);
                        write_file(&path, &rendered)?;
                        info!(path = %path.display(), "Wrote regenerated document");
                        Ok(format_regeneration_summary(&result, &path))
                    }
                    None => Ok(rendered),
                }
            }
            Commands::Format {
                file,
                no_ai,
                format,
                output,
            } => {
                let format: OutputFormat = format.parse()?;
                let path = self.resolve(file);
                let document = InMemoryDocument::load(&path)?;
                let title = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().to_string())
                    .unwrap_or_default();

                let result = if *no_ai {
                    format_plain(&self.config.pipeline.resolve()?, &document, &title)
                } else {
                    let pipeline = self.pipeline()?;
                    runtime()?.block_on(pipeline.format(&document, &title))
                };
                let rendered = format.writer().write(&result.document)?;

                match output {
                    Some(path) => {
                        let path = self.resolve(path);
                        write_file(&path, &rendered)?;
                        info!(path = %path.display(), "Wrote formatted document");
                        Ok(format_format_summary(&result, &path))
                    }
                    None => Ok(rendered),
                }
            }
            Commands::Templates { command } => {
                let store = template_store(&self.config, &self.workspace_root);
                match command {
                    TemplateCommands::List { format } => format_template_list(&store.list()?, format),
                    TemplateCommands::Show { template_id, format } => {
                        let template = store
                            .get(template_id)?
                            .ok_or_else(|| PipelineError::TemplateNotFound(template_id.clone()))?;
                        format_template_show(&template, format)
                    }
                }
            }
            Commands::Extract {
                file,
                fields,
                preset,
                format,
            } => {
                let field_names = match (fields, preset) {
                    (Some(fields), _) => split_list(fields),
                    (None, Some(preset)) => preset.parse::<ExtractionPreset>()?.fields(),
                    (None, None) => ExtractionPreset::CauseProcessResult.fields(),
                };
                let document = InMemoryDocument::load(&self.resolve(file))?;
                let source = document.full_text();

                let pipeline = self.pipeline()?;
                let report = runtime()?.block_on(pipeline.extractor().extract(&source, &field_names));
                format_extraction(&report, format)
            }
            Commands::Segment { file, mode, format } => {
                let mode: SegmentMode = mode.parse()?;
                let text = std::fs::read_to_string(self.resolve(file)).map_err(|e| {
                    PipelineError::DocumentUnreadable(format!("{}: {}", file.display(), e))
                })?;
                let segments = HeuristicSegmenter::new().segment(&text, mode);
                format_segments(&segments, format)
            }
        }
    }

    fn pipeline(&self) -> Result<RegenerationPipeline, PipelineError> {
        RegenerationPipeline::from_config(&self.config, &self.workspace_root)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }
}

pub fn load_config(workspace_root: &Path, config_path: Option<&Path>) -> Result<DocregenConfig, PipelineError> {
    let mut loader = ConfigLoader::new(workspace_root);
    if let Some(path) = config_path {
        loader = loader.with_file(path);
    }
    loader.load()
}

fn runtime() -> Result<tokio::runtime::Runtime, PipelineError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(PipelineError::Io)
}

fn write_file(path: &Path, contents: &str) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, contents)?;
    Ok(())
}
