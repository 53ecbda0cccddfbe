//! Structural validation of templates.

use super::{SectionKind, Template};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

pub const MAX_SECTIONS: usize = 50;
pub const MAX_SECTION_WORD_COUNT: u32 = 10_000;
pub const MAX_TOTAL_WORD_COUNT: u64 = 100_000;

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[a-zA-Z0-9_-]+$").expect("valid identifier regex");
}

pub fn is_valid_identifier(value: &str) -> bool {
    IDENTIFIER.is_match(value)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn validate_template(template: &Template) -> ValidationReport {
    let mut report = ValidationReport::default();

    if !is_valid_identifier(&template.id) {
        report.errors.push(format!(
            "template id '{}' must contain only letters, digits, '_' or '-'",
            template.id
        ));
    }
    if template.name.trim().is_empty() {
        report.errors.push("template name is empty".to_string());
    }

    let flat = template.flatten();
    if flat.is_empty() {
        report.errors.push("template has no sections".to_string());
    }
    if flat.len() > MAX_SECTIONS {
        report.errors.push(format!(
            "template has {} sections, at most {} are allowed",
            flat.len(),
            MAX_SECTIONS
        ));
    }

    let mut seen = HashSet::new();
    let mut total_words: u64 = 0;
    for entry in &flat {
        let section = entry.section;

        if !is_valid_identifier(&section.id) {
            report.errors.push(format!(
                "section id '{}' must contain only letters, digits, '_' or '-'",
                section.id
            ));
        }
        if !seen.insert(section.id.as_str()) {
            report.errors.push(format!("duplicate section id '{}'", section.id));
        }
        if section.title.trim().is_empty() {
            report.errors.push(format!("section '{}' has an empty title", section.id));
        }
        if section.kind == SectionKind::List && section.bullet_points.is_empty() {
            report.errors.push(format!(
                "list section '{}' needs at least one bullet point",
                section.id
            ));
        }
        if let Some(word_count) = section.word_count {
            if word_count > MAX_SECTION_WORD_COUNT {
                report.errors.push(format!(
                    "section '{}' word count {} exceeds {}",
                    section.id, word_count, MAX_SECTION_WORD_COUNT
                ));
            }
            total_words += u64::from(word_count);
        }

        if let Some(parent_count) = section.word_count {
            let child_counts: Vec<u32> = section
                .subsections
                .iter()
                .filter_map(|child| child.word_count)
                .collect();
            if !child_counts.is_empty() {
                let child_total: u32 = child_counts.iter().sum();
                let lower = f64::from(parent_count) * 0.5;
                let upper = f64::from(parent_count) * 1.5;
                let child_total = f64::from(child_total);
                if child_total < lower || child_total > upper {
                    report.warnings.push(format!(
                        "subsections of '{}' target {} characters, parent targets {}",
                        section.id, child_total, parent_count
                    ));
                }
            }
        }
        if section.kind == SectionKind::Optional && !section.optional {
            report.warnings.push(format!(
                "section '{}' has kind 'optional' but is not marked optional",
                section.id
            ));
        }
    }

    if total_words > MAX_TOTAL_WORD_COUNT {
        report.errors.push(format!(
            "total word count {} exceeds {}",
            total_words, MAX_TOTAL_WORD_COUNT
        ));
    }

    report
}
