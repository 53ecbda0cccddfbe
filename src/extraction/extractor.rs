//! Provider-backed field extraction.

use super::presence::is_present_in;
use super::{ExtractedField, ExtractionPreset, ExtractionReport, FabricationPolicy, FieldValue};
use crate::generation::response::{parse_json_object, value_to_text};
use crate::generation::{Fingerprint, GenerationResult, Prompt, ResilientGenerator};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

const EXTRACTION_SYSTEM_PROMPT: &str = "You extract structured fields from source text. Copy \
wording from the source. Do not fabricate: if the source does not state a field, return an \
empty string for it. Respond with a single JSON object and nothing else.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionSettings {
    /// Longer sources are not sent at all.
    pub max_source_chars: usize,
    pub policy: FabricationPolicy,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            max_source_chars: 1000,
            policy: FabricationPolicy::default(),
        }
    }
}

pub struct StructuredExtractor {
    generator: Arc<ResilientGenerator>,
    settings: ExtractionSettings,
}

impl StructuredExtractor {
    pub fn new(generator: Arc<ResilientGenerator>, settings: ExtractionSettings) -> Self {
        Self { generator, settings }
    }

    pub fn settings(&self) -> &ExtractionSettings {
        &self.settings
    }

    pub async fn extract_preset(&self, source_text: &str, preset: ExtractionPreset) -> ExtractionReport {
        self.extract(source_text, &preset.fields()).await
    }

    /// Extract `field_names` from `source_text`. Always returns one entry per
    /// requested field; failures leave fields `Empty`.
    pub async fn extract(&self, source_text: &str, field_names: &[String]) -> ExtractionReport {
        let source = source_text.trim();
        if source.is_empty() || field_names.is_empty() {
            debug!(fields = field_names.len(), "Nothing to extract");
            return ExtractionReport::empty(field_names, None);
        }

        let source_chars = source.chars().count();
        if source_chars > self.settings.max_source_chars {
            warn!(
                source_chars,
                max_source_chars = self.settings.max_source_chars,
                "Source text too long for extraction, returning empty fields"
            );
            return ExtractionReport::empty(
                field_names,
                Some(format!(
                    "source has {} characters, limit is {}",
                    source_chars, self.settings.max_source_chars
                )),
            );
        }

        let prompt = extraction_prompt(source, field_names, None);
        let fingerprint = extraction_fingerprint("extract", source, field_names);
        let outcome = self.generator.run("extract", &prompt, fingerprint).await;
        let mut attempts = outcome.attempts;

        let object = match response_object(&outcome.result) {
            Ok(object) => object,
            Err(failure) => {
                warn!(error = %failure, "Extraction failed, returning empty fields");
                let mut report = ExtractionReport::empty(field_names, Some(failure));
                report.attempts = attempts;
                return report;
            }
        };

        let mut fields: Vec<ExtractedField> = field_names
            .iter()
            .map(|name| check_field(name, lookup(&object, name, field_names.len()), source))
            .collect();

        let suspected: Vec<String> = fields
            .iter()
            .filter(|field| field.suspected_fabrication)
            .map(|field| field.name.clone())
            .collect();

        if !suspected.is_empty() {
            match self.settings.policy {
                FabricationPolicy::KeepWithWarning => {}
                FabricationPolicy::Blank => blank_suspected(&mut fields),
                FabricationPolicy::RetryThenBlank => {
                    attempts += self.retry_suspected(source, field_names, &suspected, &mut fields).await;
                    blank_suspected(&mut fields);
                }
            }
        }

        ExtractionReport {
            fields,
            attempts,
            failure: None,
        }
    }

    /// One stricter request for the flagged fields. Values that now pass the
    /// presence check replace the flagged ones.
    async fn retry_suspected(
        &self,
        source: &str,
        field_names: &[String],
        suspected: &[String],
        fields: &mut [ExtractedField],
    ) -> u32 {
        let prompt = extraction_prompt(source, field_names, Some(suspected));
        let fingerprint = extraction_fingerprint("extract_strict", source, field_names);
        let outcome = self.generator.run("extract_strict", &prompt, fingerprint).await;

        let Ok(object) = response_object(&outcome.result) else {
            return outcome.attempts;
        };
        for field in fields.iter_mut().filter(|field| field.suspected_fabrication) {
            let retried = check_field(&field.name, lookup(&object, &field.name, field_names.len()), source);
            if !retried.suspected_fabrication {
                debug!(field = %field.name, "Stricter extraction resolved suspected value");
                *field = retried;
            }
        }
        outcome.attempts
    }
}

fn blank_suspected(fields: &mut [ExtractedField]) {
    for field in fields.iter_mut().filter(|field| field.suspected_fabrication) {
        field.value = FieldValue::Empty;
    }
}

fn extraction_fingerprint(operation: &str, source: &str, field_names: &[String]) -> Fingerprint {
    let fields = field_names.join("\u{1f}");
    Fingerprint::compute(operation, source, &[("fields", fields.as_str())])
}

fn extraction_prompt(source: &str, field_names: &[String], suspected: Option<&[String]>) -> Prompt {
    let mut user = format!(
        "Fields: {}\nReturn a JSON object with exactly these keys. Each value must be taken \
         from the source text; use an empty string when the source does not say.\n",
        field_names.join(", ")
    );
    if let Some(suspected) = suspected {
        user.push_str(&format!(
            "A previous answer contained text not found in the source for: {}. Quote the source \
             verbatim for these fields or leave them empty.\n",
            suspected.join(", ")
        ));
    }
    user.push_str(&format!("\nSource text:\n{}", source));
    Prompt {
        system: EXTRACTION_SYSTEM_PROMPT.to_string(),
        user,
    }
}

fn response_object(result: &GenerationResult) -> Result<Map<String, Value>, String> {
    match result {
        GenerationResult::Failure { kind, message } => Err(format!("{} failure: {}", kind, message)),
        GenerationResult::Success { text } => {
            parse_json_object(text).ok_or_else(|| "response was not a JSON object".to_string())
        }
    }
}

/// Value for `name`. A single requested field also accepts the only value of
/// a single-entry object under a different key.
fn lookup(object: &Map<String, Value>, name: &str, requested: usize) -> Option<String> {
    if let Some(value) = object.get(name) {
        return value_to_text(value);
    }
    if requested == 1 && object.len() == 1 {
        return object.values().next().and_then(value_to_text);
    }
    None
}

fn check_field(name: &str, text: Option<String>, source: &str) -> ExtractedField {
    let value = FieldValue::from_text(text);
    let suspected = match &value {
        FieldValue::Present(text) => !is_present_in(text, source),
        FieldValue::Empty => false,
    };
    if suspected {
        warn!(field = %name, "Extracted value not found in source, suspected fabrication");
    }
    ExtractedField {
        name: name.to_string(),
        value,
        suspected_fabrication: suspected,
    }
}
