//! Template lookup.
//!
//! Stores are layered: the first layer that knows an id wins. Built-in
//! templates come first, then files from a templates directory.

use super::validate::is_valid_identifier;
use super::Template;
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateOrigin {
    Builtin,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub category: String,
    pub section_count: usize,
    pub origin: TemplateOrigin,
}

impl TemplateSummary {
    pub fn of(template: &Template, origin: TemplateOrigin) -> Self {
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            category: template.category.clone(),
            section_count: template.section_count(),
            origin,
        }
    }
}

pub trait TemplateStore: Send + Sync {
    /// Look up a template without validating it.
    fn get(&self, template_id: &str) -> Result<Option<Template>, PipelineError>;

    fn list(&self) -> Result<Vec<TemplateSummary>, PipelineError>;

    /// Look up and validate a template.
    fn resolve(&self, template_id: &str) -> Result<Template, PipelineError> {
        let template = self
            .get(template_id)?
            .ok_or_else(|| PipelineError::TemplateNotFound(template_id.to_string()))?;
        template.ensure_valid()?;
        Ok(template)
    }
}

/// Templates stored as `<id>.json` or `<id>.toml` in one directory.
#[derive(Debug, Clone)]
pub struct FileTemplateStore {
    root: PathBuf,
}

impl FileTemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn load(path: &Path) -> Result<Template, PipelineError> {
        let contents = std::fs::read_to_string(path)?;
        let template: Template = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&contents).map_err(|e| {
                PipelineError::Serialization(format!("{}: {}", path.display(), e))
            })?,
            _ => serde_json::from_str(&contents).map_err(|e| {
                PipelineError::Serialization(format!("{}: {}", path.display(), e))
            })?,
        };
        Ok(template)
    }

    fn template_files(&self) -> Result<Vec<PathBuf>, PipelineError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| {
                path.is_file()
                    && matches!(
                        path.extension().and_then(|ext| ext.to_str()),
                        Some("json") | Some("toml")
                    )
            })
            .collect();
        files.sort();
        Ok(files)
    }
}

impl TemplateStore for FileTemplateStore {
    fn get(&self, template_id: &str) -> Result<Option<Template>, PipelineError> {
        if !is_valid_identifier(template_id) {
            return Ok(None);
        }
        for extension in ["json", "toml"] {
            let path = self.root.join(format!("{}.{}", template_id, extension));
            if path.is_file() {
                debug!(path = %path.display(), "Loading template file");
                let mut template = Self::load(&path)?;
                if template.id.is_empty() {
                    template.id = template_id.to_string();
                }
                return Ok(Some(template));
            }
        }
        Ok(None)
    }

    fn list(&self) -> Result<Vec<TemplateSummary>, PipelineError> {
        let mut summaries = Vec::new();
        for path in self.template_files()? {
            match Self::load(&path) {
                Ok(template) => summaries.push(TemplateSummary::of(&template, TemplateOrigin::File)),
                Err(err) => warn!(path = %path.display(), error = %err, "Skipping unreadable template file"),
            }
        }
        Ok(summaries)
    }
}

/// Ordered stack of stores; earlier layers shadow later ones.
#[derive(Clone, Default)]
pub struct LayeredTemplateStore {
    layers: Vec<Arc<dyn TemplateStore>>,
}

impl LayeredTemplateStore {
    pub fn new(layers: Vec<Arc<dyn TemplateStore>>) -> Self {
        Self { layers }
    }

    pub fn push(&mut self, layer: Arc<dyn TemplateStore>) {
        self.layers.push(layer);
    }
}

impl TemplateStore for LayeredTemplateStore {
    fn get(&self, template_id: &str) -> Result<Option<Template>, PipelineError> {
        for layer in &self.layers {
            if let Some(template) = layer.get(template_id)? {
                return Ok(Some(template));
            }
        }
        Ok(None)
    }

    fn list(&self) -> Result<Vec<TemplateSummary>, PipelineError> {
        let mut seen = HashSet::new();
        let mut summaries = Vec::new();
        for layer in &self.layers {
            for summary in layer.list()? {
                if seen.insert(summary.id.clone()) {
                    summaries.push(summary);
                }
            }
        }
        Ok(summaries)
    }
}
