//! Structured Field Extraction
//!
//! Pulls named fields out of source text through the provider and checks
//! every returned value against the source, flagging anything that looks
//! invented.

pub mod extractor;
pub mod presence;
pub mod presets;

pub use extractor::{ExtractionSettings, StructuredExtractor};
pub use presence::is_present_in;
pub use presets::ExtractionPreset;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Present(String),
    Empty,
}

impl FieldValue {
    pub fn from_text(text: Option<String>) -> Self {
        match text {
            Some(text) if !text.trim().is_empty() => FieldValue::Present(text.trim().to_string()),
            _ => FieldValue::Empty,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Present(text) => Some(text),
            FieldValue::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedField {
    pub name: String,
    pub value: FieldValue,
    /// Set when the value could not be found in the source text.
    pub suspected_fabrication: bool,
}

impl ExtractedField {
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Empty,
            suspected_fabrication: false,
        }
    }
}

/// What to do with values that fail the presence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FabricationPolicy {
    /// Keep the value, flag it and log a warning.
    #[default]
    KeepWithWarning,
    /// Replace the value with `Empty`, keep the flag.
    Blank,
    /// Ask once more with a stricter prompt, then blank what is still unsupported.
    RetryThenBlank,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// One entry per requested field, in request order.
    pub fields: Vec<ExtractedField>,
    /// Provider calls made, zero when nothing was sent or the cache answered.
    pub attempts: u32,
    /// Why extraction produced nothing, if it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl ExtractionReport {
    pub fn empty(field_names: &[String], failure: Option<String>) -> Self {
        Self {
            fields: field_names.iter().map(ExtractedField::empty).collect(),
            attempts: 0,
            failure,
        }
    }

    pub fn field(&self, name: &str) -> Option<&ExtractedField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(|field| field.value.as_str())
    }

    pub fn suspected(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|field| field.suspected_fabrication)
            .map(|field| field.name.as_str())
            .collect()
    }

    /// Field name to value, with empty fields as empty strings.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .map(|field| {
                (
                    field.name.clone(),
                    field.value.as_str().unwrap_or_default().to_string(),
                )
            })
            .collect()
    }
}
