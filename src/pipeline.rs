//! Regeneration Pipeline
//!
//! Wires the components into one run: resolve the template, read the source
//! document, pull out its assets, generate every section (and optionally
//! extract structured fields) concurrently, place the assets, assemble the
//! output and record usage.
//!
//! The template-free format mode reads the same document, optionally
//! polishes its whole text in one request, and lays it out with detected
//! titles and lists.

use crate::assembly::{Assembler, OutputDocument};
use crate::assets::{AssetAssignment, AssetTracker, DocumentSource};
use crate::config::{DocregenConfig, PipelineSettings};
use crate::error::PipelineError;
use crate::extraction::{ExtractionReport, StructuredExtractor};
use crate::generation::{
    GenerationClient, GenerationRun, GenerationSummary, PolishOutcome, ResilientGenerator, ResultCache,
    SectionOrchestrator, TextPolisher, Tone,
};
use crate::provider::{CompletionOptions, ModelProviderClient, ProviderFactory};
use crate::template::{BuiltinTemplates, FileTemplateStore, LayeredTemplateStore, Template, TemplateStore};
use crate::usage::{record_usage, JsonLinesUsageSink, NoopUsageSink, TracingUsageSink, UsageRecord, UsageSink};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegenerationRequest {
    pub template_id: String,
    pub outline: Option<String>,
    /// Overrides the configured tone.
    pub tone: Option<Tone>,
    /// Fields to extract alongside generation; empty skips extraction.
    pub extract_fields: Vec<String>,
}

impl RegenerationRequest {
    pub fn new(template_id: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            outline: None,
            tone: None,
            extract_fields: Vec::new(),
        }
    }

    pub fn with_outline(mut self, outline: impl Into<String>) -> Self {
        let outline = outline.into();
        self.outline = (!outline.trim().is_empty()).then_some(outline);
        self
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = Some(tone);
        self
    }

    pub fn with_extract_fields(mut self, fields: Vec<String>) -> Self {
        self.extract_fields = fields;
        self
    }
}

/// Result of the template-free format mode.
#[derive(Debug, Clone)]
pub struct FormatOutput {
    pub document: OutputDocument,
    /// `None` when polishing was not requested.
    pub polish: Option<PolishOutcome>,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct RegenerationOutput {
    pub template: Template,
    pub document: OutputDocument,
    pub generation: GenerationRun,
    pub assignments: Vec<AssetAssignment>,
    pub extraction: Option<ExtractionReport>,
    pub duration: Duration,
}

impl RegenerationOutput {
    pub fn summary(&self) -> GenerationSummary {
        self.generation.summary()
    }
}

pub struct RegenerationPipeline {
    settings: PipelineSettings,
    templates: Arc<dyn TemplateStore>,
    generator: Arc<ResilientGenerator>,
    orchestrator: SectionOrchestrator,
    extractor: StructuredExtractor,
    polisher: TextPolisher,
    tracker: AssetTracker,
    assembler: Assembler,
    usage: Arc<dyn UsageSink>,
}

impl RegenerationPipeline {
    pub fn new(
        settings: PipelineSettings,
        provider: Arc<dyn ModelProviderClient>,
        options: CompletionOptions,
        templates: Arc<dyn TemplateStore>,
        usage: Arc<dyn UsageSink>,
    ) -> Self {
        let generator = Arc::new(ResilientGenerator::new(
            GenerationClient::new(provider, options),
            Arc::new(ResultCache::new()),
            settings.retry,
            settings.request_timeout,
            settings.cache_ttl,
        ));
        Self {
            orchestrator: SectionOrchestrator::new(Arc::clone(&generator), settings.orchestrator.clone()),
            extractor: StructuredExtractor::new(Arc::clone(&generator), settings.extraction),
            polisher: TextPolisher::new(Arc::clone(&generator), settings.max_polish_chars),
            tracker: AssetTracker::new(settings.context_window),
            assembler: Assembler::default(),
            generator,
            templates,
            usage,
            settings,
        }
    }

    /// Build everything from configuration: the provider client, built-in
    /// templates layered over the configured template directory, and the
    /// usage sink.
    pub fn from_config(config: &DocregenConfig, workspace_root: &Path) -> Result<Self, PipelineError> {
        let settings = config.pipeline.resolve()?;
        let provider = ProviderFactory::create_client(&config.provider)?;
        Ok(Self::new(
            settings,
            provider,
            config.provider.completion_options(),
            template_store(config, workspace_root),
            usage_sink(config, workspace_root),
        ))
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn templates(&self) -> &Arc<dyn TemplateStore> {
        &self.templates
    }

    pub fn generator(&self) -> &Arc<ResilientGenerator> {
        &self.generator
    }

    pub fn extractor(&self) -> &StructuredExtractor {
        &self.extractor
    }

    pub fn polisher(&self) -> &TextPolisher {
        &self.polisher
    }

    /// Polish the whole document text, then lay it out without a template.
    /// Polishing never fails the run; the original text is used instead.
    pub async fn format(&self, document: &dyn DocumentSource, title: &str) -> FormatOutput {
        let started = Instant::now();
        let polish = self.polisher.polish(&document.full_text()).await;
        let output = lay_out(
            &self.tracker,
            &self.assembler,
            document,
            title,
            &polish.text,
            Some(polish.clone()),
            started,
        );
        self.record_format(title, document.unit_count() > 0, output.duration);
        output
    }

    fn record_format(&self, title: &str, had_source_document: bool, duration: Duration) {
        let record = UsageRecord {
            template_id: FORMAT_USAGE_ID.to_string(),
            template_name: Some(title.to_string()),
            had_source_document,
            success: true,
            error: None,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            recorded_at: Utc::now(),
        };
        record_usage(self.usage.as_ref(), &record);
    }

    /// Run one regeneration. Only input problems (unknown or invalid
    /// template) are errors; section and asset failures degrade in place.
    pub async fn run(
        &self,
        request: &RegenerationRequest,
        document: &dyn DocumentSource,
    ) -> Result<RegenerationOutput, PipelineError> {
        let started = Instant::now();
        let had_source_document = document.unit_count() > 0;

        let template = match self.templates.resolve(&request.template_id) {
            Ok(template) => template,
            Err(err) => {
                error!(template = %request.template_id, error = %err, "Regeneration rejected");
                self.record(request, None, had_source_document, Some(&err), started.elapsed());
                return Err(err);
            }
        };

        let output = self.regenerate(request, template, document, started).await;
        self.record(
            request,
            Some(&output.template.name),
            had_source_document,
            None,
            output.duration,
        );
        Ok(output)
    }

    async fn regenerate(
        &self,
        request: &RegenerationRequest,
        template: Template,
        document: &dyn DocumentSource,
        started: Instant,
    ) -> RegenerationOutput {
        let tone = request.tone.unwrap_or(self.settings.tone);
        let source_text = document.full_text();
        let assets = self.tracker.extract_assets(document);
        info!(
            template = %template.id,
            sections = template.section_count(),
            source_chars = source_text.chars().count(),
            assets = assets.len(),
            tone = %tone,
            "Starting regeneration"
        );

        let generation = self
            .orchestrator
            .generate_all(&template, &source_text, request.outline.as_deref(), tone);
        let extraction = async {
            if request.extract_fields.is_empty() {
                None
            } else {
                Some(self.extractor.extract(&source_text, &request.extract_fields).await)
            }
        };
        let (generation, extraction) = tokio::join!(generation, extraction);

        let section_texts = generation.section_texts();
        let assignments = self.settings.assignment.assign(&assets, &section_texts, &template);
        let document = self
            .assembler
            .assemble(&template, &section_texts, &assignments, assets);

        let duration = started.elapsed();
        info!(
            template = %template.id,
            summary = %generation.summary(),
            images = document.stats.images,
            placeholders = document.stats.placeholders,
            duration_ms = duration.as_millis() as u64,
            "Regeneration finished"
        );

        RegenerationOutput {
            template,
            document,
            generation,
            assignments,
            extraction,
            duration,
        }
    }

    fn record(
        &self,
        request: &RegenerationRequest,
        template_name: Option<&str>,
        had_source_document: bool,
        failure: Option<&PipelineError>,
        duration: Duration,
    ) {
        let record = UsageRecord {
            template_id: request.template_id.clone(),
            template_name: template_name.map(str::to_string),
            had_source_document,
            success: failure.is_none(),
            error: failure.map(|err| err.to_string()),
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            recorded_at: Utc::now(),
        };
        record_usage(self.usage.as_ref(), &record);
    }
}

/// Usage records of format runs carry this in place of a template id.
pub const FORMAT_USAGE_ID: &str = "format";

/// Format mode without polishing. Needs no provider.
pub fn format_plain(settings: &PipelineSettings, document: &dyn DocumentSource, title: &str) -> FormatOutput {
    let started = Instant::now();
    lay_out(
        &AssetTracker::new(settings.context_window),
        &Assembler::default(),
        document,
        title,
        &document.full_text(),
        None,
        started,
    )
}

fn lay_out(
    tracker: &AssetTracker,
    assembler: &Assembler,
    document: &dyn DocumentSource,
    title: &str,
    text: &str,
    polish: Option<PolishOutcome>,
    started: Instant,
) -> FormatOutput {
    let assets = tracker.extract_assets(document);
    let document = assembler.format_text(title, text, assets);
    let duration = started.elapsed();
    info!(
        title,
        polished = polish.as_ref().is_some_and(|outcome| outcome.polished),
        headings = document.stats.sections_emitted,
        images = document.stats.images,
        placeholders = document.stats.placeholders,
        duration_ms = duration.as_millis() as u64,
        "Format finished"
    );
    FormatOutput {
        document,
        polish,
        duration,
    }
}

/// Built-in templates first, then the configured directory if any.
pub fn template_store(config: &DocregenConfig, workspace_root: &Path) -> Arc<dyn TemplateStore> {
    let mut layers: Vec<Arc<dyn TemplateStore>> = vec![Arc::new(BuiltinTemplates::new())];
    if let Some(directory) = &config.templates.directory {
        layers.push(Arc::new(FileTemplateStore::new(workspace_root.join(directory))));
    }
    Arc::new(LayeredTemplateStore::new(layers))
}

pub fn usage_sink(config: &DocregenConfig, workspace_root: &Path) -> Arc<dyn UsageSink> {
    match (&config.usage.enabled, &config.usage.jsonl) {
        (false, _) => Arc::new(NoopUsageSink),
        (true, Some(path)) => Arc::new(JsonLinesUsageSink::new(workspace_root.join(path))),
        (true, None) => Arc::new(TracingUsageSink),
    }
}
