//! Document Templates
//!
//! A template is an ordered tree of sections. Generation, asset assignment
//! and assembly all work on the pre-order flattening of that tree, so the
//! order here is the order of the output document.

pub mod builtin;
pub mod store;
pub mod validate;

pub use builtin::BuiltinTemplates;
pub use store::{FileTemplateStore, LayeredTemplateStore, TemplateOrigin, TemplateStore, TemplateSummary};
pub use validate::{validate_template, ValidationReport};

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Shape hint for a section. Affects prompting and validation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    #[default]
    Heading,
    List,
    Nested,
    Table,
    Optional,
}

/// Writing guidance for a section plus the keywords used to match assets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RequirementsRepr")]
pub struct Requirements {
    pub guidance: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RequirementsRepr {
    Text(String),
    Full {
        #[serde(default)]
        guidance: String,
        #[serde(default)]
        keywords: Vec<String>,
    },
}

impl From<RequirementsRepr> for Requirements {
    fn from(repr: RequirementsRepr) -> Self {
        match repr {
            RequirementsRepr::Text(guidance) => Requirements {
                guidance,
                keywords: Vec::new(),
            },
            RequirementsRepr::Full { guidance, keywords } => Requirements { guidance, keywords },
        }
    }
}

impl Requirements {
    /// Explicit keywords, or the whitespace-separated tokens of the guidance
    /// when none are given. Guidance tokens shorter than two characters are
    /// dropped; explicit keywords are kept at any length.
    pub fn match_keywords(&self) -> Vec<String> {
        if self.keywords.is_empty() {
            return self
                .guidance
                .split_whitespace()
                .map(normalize_keyword)
                .filter(|token| token.chars().count() >= 2)
                .collect();
        }
        self.keywords
            .iter()
            .map(|keyword| normalize_keyword(keyword))
            .filter(|keyword| !keyword.is_empty())
            .collect()
    }
}

fn normalize_keyword(token: &str) -> String {
    token.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,

    #[serde(default)]
    pub kind: SectionKind,

    /// Target length in characters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u32>,

    #[serde(default)]
    pub requirements: Requirements,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bullet_points: Vec<String>,

    #[serde(default)]
    pub optional: bool,

    /// Layout hint such as `"Time: ...\nPlace: ..."`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subsections: Vec<Section>,
}

impl Section {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind: SectionKind::Heading,
            word_count: None,
            requirements: Requirements::default(),
            bullet_points: Vec::new(),
            optional: false,
            placeholder: None,
            subsections: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: SectionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_word_count(mut self, word_count: u32) -> Self {
        self.word_count = Some(word_count);
        self
    }

    pub fn with_guidance(mut self, guidance: impl Into<String>) -> Self {
        self.requirements.guidance = guidance.into();
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requirements.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_bullets(mut self, bullet_points: Vec<String>) -> Self {
        self.bullet_points = bullet_points;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_subsections(mut self, subsections: Vec<Section>) -> Self {
        self.subsections = subsections;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// One entry of a pre-order flattening.
#[derive(Debug, Clone, Copy)]
pub struct FlatSection<'a> {
    pub section: &'a Section,
    /// 0 for top-level sections
    pub depth: usize,
    pub parent_id: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub category: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub sections: Vec<Section>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Template {
    pub fn new(id: impl Into<String>, name: impl Into<String>, sections: Vec<Section>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: String::new(),
            version: default_version(),
            sections,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Every section, parents before their children, siblings in order.
    pub fn flatten(&self) -> Vec<FlatSection<'_>> {
        fn walk<'a>(
            sections: &'a [Section],
            depth: usize,
            parent_id: Option<&'a str>,
            out: &mut Vec<FlatSection<'a>>,
        ) {
            for section in sections {
                out.push(FlatSection {
                    section,
                    depth,
                    parent_id,
                });
                walk(&section.subsections, depth + 1, Some(section.id.as_str()), out);
            }
        }

        let mut out = Vec::new();
        walk(&self.sections, 0, None, &mut out);
        out
    }

    pub fn section(&self, section_id: &str) -> Option<&Section> {
        self.flatten()
            .into_iter()
            .map(|flat| flat.section)
            .find(|section| section.id == section_id)
    }

    pub fn section_count(&self) -> usize {
        self.flatten().len()
    }

    /// Reject structurally invalid templates; log consistency warnings.
    pub fn ensure_valid(&self) -> Result<(), PipelineError> {
        let report = validate_template(self);
        for warning in &report.warnings {
            warn!(template = %self.id, warning = %warning, "Template consistency warning");
        }
        if report.is_valid() {
            Ok(())
        } else {
            Err(PipelineError::InvalidTemplate {
                template_id: self.id.clone(),
                errors: report.errors,
            })
        }
    }
}
