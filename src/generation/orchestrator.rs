//! Fan-out of template sections to a bounded worker pool.
//!
//! Every flattened section becomes one task. Tasks wait on a shared
//! semaphore so at most `max_workers` provider calls are in flight; the
//! rest queue. Results are collected into a map keyed by section id, so the
//! completion order of tasks never matters. One failing section never stops
//! the others.
//!
//! Small sources (at most `batch_size_threshold` characters) with more than
//! one section are first tried as a single batched request that returns all
//! sections as a JSON object. Sections missing from that answer, or all of
//! them if the batched call fails, go through the per-section path.

use super::response::{parse_json_object, value_to_text};
use super::{prompt, Fingerprint, GenerationOutcome, GenerationRequest, GenerationResult, ResilientGenerator, Tone};
use crate::error::FailureKind;
use crate::template::{Section, Template};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    PerSection,
    Batched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub max_workers: usize,
    pub batch_size_threshold: usize,
    pub max_excerpt_chars: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_workers: 5,
            batch_size_threshold: 1000,
            max_excerpt_chars: 4000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub total: usize,
    pub succeeded: usize,
    pub transient_failures: usize,
    pub fatal_failures: usize,
}

impl fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "generated {}/{} sections", self.succeeded, self.total)
    }
}

/// Fan-in of one orchestrated run.
#[derive(Debug, Clone)]
pub struct GenerationRun {
    /// Flattened section ids in template order.
    pub order: Vec<String>,
    pub results: HashMap<String, GenerationResult>,
    /// Provider calls spent per section (zero for cache hits).
    pub attempts: HashMap<String, u32>,
    pub mode: DispatchMode,
    pub source_excerpt: String,
}

impl GenerationRun {
    pub fn result(&self, section_id: &str) -> Option<&GenerationResult> {
        self.results.get(section_id)
    }

    pub fn summary(&self) -> GenerationSummary {
        let mut summary = GenerationSummary {
            total: self.order.len(),
            succeeded: 0,
            transient_failures: 0,
            fatal_failures: 0,
        };
        for result in self.results.values() {
            match result.failure_kind() {
                None => summary.succeeded += 1,
                Some(FailureKind::Transient) => summary.transient_failures += 1,
                Some(FailureKind::Fatal) => summary.fatal_failures += 1,
            }
        }
        summary
    }

    /// Text to place in each section: generated text on success, the source
    /// excerpt after a transient failure, nothing after a fatal one.
    pub fn section_texts(&self) -> HashMap<String, String> {
        self.results
            .iter()
            .map(|(section_id, result)| {
                let text = match result {
                    GenerationResult::Success { text } => text.clone(),
                    GenerationResult::Failure {
                        kind: FailureKind::Transient,
                        ..
                    } => self.source_excerpt.clone(),
                    GenerationResult::Failure {
                        kind: FailureKind::Fatal,
                        ..
                    } => String::new(),
                };
                (section_id.clone(), text)
            })
            .collect()
    }
}

pub struct SectionOrchestrator {
    generator: Arc<ResilientGenerator>,
    settings: OrchestratorSettings,
}

impl SectionOrchestrator {
    pub fn new(generator: Arc<ResilientGenerator>, settings: OrchestratorSettings) -> Self {
        Self { generator, settings }
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    pub async fn generate_all(
        &self,
        template: &Template,
        source_text: &str,
        outline: Option<&str>,
        tone: Tone,
    ) -> GenerationRun {
        let sections: Vec<&Section> = template.flatten().into_iter().map(|flat| flat.section).collect();
        let source_excerpt = prompt::excerpt(source_text, self.settings.max_excerpt_chars);
        let source_chars = source_text.trim().chars().count();

        let mut run = GenerationRun {
            order: sections.iter().map(|section| section.id.clone()).collect(),
            results: HashMap::with_capacity(sections.len()),
            attempts: HashMap::with_capacity(sections.len()),
            mode: DispatchMode::PerSection,
            source_excerpt,
        };

        if source_chars > 0 && source_chars <= self.settings.batch_size_threshold && sections.len() > 1 {
            run.mode = DispatchMode::Batched;
            self.generate_batched(template, &sections, outline, tone, &mut run).await;
        }

        let pending: Vec<&Section> = sections
            .iter()
            .copied()
            .filter(|section| !run.results.contains_key(&section.id))
            .collect();
        if !pending.is_empty() {
            self.generate_per_section(&pending, outline, tone, &mut run).await;
        }

        let summary = run.summary();
        info!(
            template = %template.id,
            mode = ?run.mode,
            succeeded = summary.succeeded,
            total = summary.total,
            transient_failures = summary.transient_failures,
            fatal_failures = summary.fatal_failures,
            "Generated {}/{} sections",
            summary.succeeded,
            summary.total
        );
        run
    }

    async fn generate_batched(
        &self,
        template: &Template,
        sections: &[&Section],
        outline: Option<&str>,
        tone: Tone,
        run: &mut GenerationRun,
    ) {
        let section_ids = run.order.join(",");
        let fingerprint = Fingerprint::compute(
            "batch",
            &run.source_excerpt,
            &[
                ("template", template.id.as_str()),
                ("tone", tone.as_str()),
                ("outline", outline.unwrap_or("")),
                ("sections", section_ids.as_str()),
            ],
        );
        let batch_prompt = prompt::batched_prompt(sections, outline, &run.source_excerpt, tone);
        let outcome = self.generator.run("batch", &batch_prompt, fingerprint).await;

        let text = match &outcome.result {
            GenerationResult::Success { text } => text,
            GenerationResult::Failure { kind, message } => {
                warn!(
                    template = %template.id,
                    kind = %kind,
                    error = %message,
                    "Batched generation failed, falling back to per-section requests"
                );
                return;
            }
        };

        let Some(object) = parse_json_object(text) else {
            warn!(
                template = %template.id,
                "Batched response was not a JSON object, falling back to per-section requests"
            );
            return;
        };

        for section in sections {
            let bracketed = format!("[{}]", section.id);
            let value = object
                .get(&section.id)
                .or_else(|| object.get(&bracketed))
                .and_then(value_to_text);
            if let Some(value) = value {
                run.results
                    .insert(section.id.clone(), GenerationResult::success(value));
                run.attempts.insert(section.id.clone(), outcome.attempts);
            }
        }

        let missing = sections.len() - run.results.len();
        if missing > 0 {
            debug!(
                template = %template.id,
                missing,
                "Batched response omitted sections, requesting them individually"
            );
        }
    }

    async fn generate_per_section(
        &self,
        sections: &[&Section],
        outline: Option<&str>,
        tone: Tone,
        run: &mut GenerationRun,
    ) {
        let semaphore = Arc::new(Semaphore::new(self.settings.max_workers.max(1)));
        let mut handles = Vec::with_capacity(sections.len());

        for section in sections {
            let request = GenerationRequest::new(
                section.id.clone(),
                prompt::section_instruction(section, outline),
                run.source_excerpt.clone(),
                tone,
            );
            let generator = Arc::clone(&self.generator);
            let semaphore = Arc::clone(&semaphore);

            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return GenerationOutcome {
                            result: GenerationResult::fatal("worker pool closed"),
                            attempts: 0,
                            from_cache: false,
                        }
                    }
                };
                generator
                    .run(request.section_id(), &request.to_prompt(), request.fingerprint())
                    .await
            });
            handles.push((section.id.clone(), handle));
        }

        let joined = futures::future::join_all(
            handles
                .into_iter()
                .map(|(section_id, handle)| async move { (section_id, handle.await) }),
        )
        .await;

        for (section_id, joined) in joined {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(section = %section_id, error = %err, "Section task did not complete");
                    GenerationOutcome {
                        result: GenerationResult::fatal(format!("section task failed: {}", err)),
                        attempts: 0,
                        from_cache: false,
                    }
                }
            };
            run.attempts.insert(section_id.clone(), outcome.attempts);
            run.results.insert(section_id, outcome.result);
        }
    }
}
