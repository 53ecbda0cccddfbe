//! Source document boundary.

use crate::error::{AssetError, PipelineError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Read access to a parsed source document as an ordered list of content
/// units (paragraph equivalents).
pub trait DocumentSource: Send + Sync {
    fn unit_count(&self) -> usize;

    fn unit_text(&self, index: usize) -> Option<&str>;

    fn is_heading(&self, _index: usize) -> bool {
        false
    }

    /// Whether the unit carries an embedded asset, per the document's own
    /// structure. Says nothing about whether the payload is readable.
    fn has_asset(&self, index: usize) -> bool;

    fn asset_bytes(&self, index: usize) -> Result<Vec<u8>, AssetError>;

    /// Non-empty unit texts joined by blank lines.
    fn full_text(&self) -> String {
        (0..self.unit_count())
            .filter_map(|index| self.unit_text(index))
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UnitStyle {
    #[default]
    Body,
    Heading {
        level: u8,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentUnit {
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub style: UnitStyle,

    /// Base64 payload, optionally as a `data:` URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
}

impl ContentUnit {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        Self {
            text: text.into(),
            style: UnitStyle::Heading { level },
            asset: None,
        }
    }

    pub fn asset(text: impl Into<String>, payload: &[u8]) -> Self {
        Self {
            text: text.into(),
            style: UnitStyle::Body,
            asset: Some(STANDARD.encode(payload)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub units: usize,
    pub characters: usize,
    pub headings: usize,
    pub assets: usize,
}

/// Document held in memory, loadable from JSON or plain text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub units: Vec<ContentUnit>,
}

impl InMemoryDocument {
    pub fn new(units: Vec<ContentUnit>) -> Self {
        Self { title: None, units }
    }

    /// One unit per blank-line separated paragraph.
    pub fn from_text(text: &str) -> Self {
        let units = text
            .replace("\r\n", "\n")
            .split("\n\n")
            .map(str::trim)
            .filter(|paragraph| !paragraph.is_empty())
            .map(ContentUnit::text)
            .collect();
        Self::new(units)
    }

    pub fn from_json_str(json: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(json).map_err(|e| PipelineError::DocumentUnreadable(e.to_string()))
    }

    /// Load `.json` documents as structured units, anything else as text.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::DocumentUnreadable(format!("{}: {}", path.display(), e))
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents).map_err(|e| match e {
                PipelineError::DocumentUnreadable(reason) => {
                    PipelineError::DocumentUnreadable(format!("{}: {}", path.display(), reason))
                }
                other => other,
            }),
            _ => Ok(Self::from_text(&contents)),
        }
    }

    pub fn stats(&self) -> DocumentStats {
        DocumentStats {
            units: self.units.len(),
            characters: self.units.iter().map(|unit| unit.text.chars().count()).sum(),
            headings: (0..self.units.len()).filter(|&i| self.is_heading(i)).count(),
            assets: (0..self.units.len()).filter(|&i| self.has_asset(i)).count(),
        }
    }
}

impl DocumentSource for InMemoryDocument {
    fn unit_count(&self) -> usize {
        self.units.len()
    }

    fn unit_text(&self, index: usize) -> Option<&str> {
        self.units.get(index).map(|unit| unit.text.as_str())
    }

    fn is_heading(&self, index: usize) -> bool {
        matches!(
            self.units.get(index).map(|unit| unit.style),
            Some(UnitStyle::Heading { .. })
        )
    }

    fn has_asset(&self, index: usize) -> bool {
        self.units
            .get(index)
            .is_some_and(|unit| unit.asset.is_some())
    }

    fn asset_bytes(&self, index: usize) -> Result<Vec<u8>, AssetError> {
        let encoded = self
            .units
            .get(index)
            .and_then(|unit| unit.asset.as_deref())
            .ok_or(AssetError::Missing(index))?;
        let encoded = match encoded.split_once(";base64,") {
            Some((prefix, data)) if prefix.starts_with("data:") => data,
            _ => encoded,
        };
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        STANDARD.decode(compact).map_err(|e| AssetError::Unreadable {
            index,
            reason: e.to_string(),
        })
    }
}
