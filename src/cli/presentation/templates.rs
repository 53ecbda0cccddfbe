//! Template command presentation: list and show.

use super::wants_json;
use crate::error::PipelineError;
use crate::template::{Template, TemplateOrigin, TemplateSummary};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;

pub fn format_template_list(summaries: &[TemplateSummary], format: &str) -> Result<String, PipelineError> {
    if wants_json(format)? {
        let out = json!({ "templates": summaries, "total": summaries.len() });
        return Ok(serde_json::to_string_pretty(&out)?);
    }
    if summaries.is_empty() {
        return Ok("No templates found.".to_string());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["ID", "Name", "Category", "Sections", "Source"]);
    for summary in summaries {
        let origin = match summary.origin {
            TemplateOrigin::Builtin => "builtin",
            TemplateOrigin::File => "file",
        };
        table.add_row(vec![
            summary.id.clone(),
            summary.name.clone(),
            summary.category.clone(),
            summary.section_count.to_string(),
            origin.to_string(),
        ]);
    }
    Ok(format!("{}\n\nTotal: {} template(s)", table, summaries.len()))
}

pub fn format_template_show(template: &Template, format: &str) -> Result<String, PipelineError> {
    if wants_json(format)? {
        return Ok(serde_json::to_string_pretty(template)?);
    }

    let mut output = format!("{}\n", template.name.bold());
    output.push_str(&format!("ID: {}\n", template.id));
    if !template.category.is_empty() {
        output.push_str(&format!("Category: {}\n", template.category));
    }
    output.push_str(&format!("Version: {}\n", template.version));
    if !template.description.is_empty() {
        output.push_str(&format!("Description: {}\n", template.description));
    }
    output.push_str(&format!("\nSections ({}):\n", template.section_count()));
    for flat in template.flatten() {
        let section = flat.section;
        let mut line = format!("{}- {} [{}]", "  ".repeat(flat.depth + 1), section.title, section.id);
        if let Some(word_count) = section.word_count {
            line.push_str(&format!(" ~{} chars", word_count));
        }
        if section.optional {
            line.push_str(" (optional)");
        }
        output.push_str(&line);
        output.push('\n');
    }
    Ok(output)
}
