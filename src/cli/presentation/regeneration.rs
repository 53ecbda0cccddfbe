//! Regenerate and format command presentation.

use crate::generation::GenerationResult;
use crate::pipeline::{FormatOutput, RegenerationOutput};
use owo_colors::OwoColorize;
use std::path::Path;

/// Report printed after the document is written to a file.
pub fn format_regeneration_summary(output: &RegenerationOutput, written_to: &Path) -> String {
    let summary = output.summary();
    let stats = &output.document.stats;

    let mut text = format!(
        "{} {}\n",
        "Wrote".bold(),
        written_to.display()
    );
    text.push_str(&format!("Template: {} ({})\n", output.template.name, output.template.id));
    text.push_str(&format!("Sections: {}\n", summary));
    text.push_str(&format!(
        "Assets: {} embedded, {} placeholder(s)\n",
        stats.images, stats.placeholders
    ));
    text.push_str(&format!("Duration: {} ms\n", output.duration.as_millis()));

    let failed: Vec<String> = output
        .generation
        .order
        .iter()
        .filter_map(|section_id| match output.generation.result(section_id) {
            Some(GenerationResult::Failure { kind, message }) => {
                Some(format!("  - {}: {} ({})", section_id, message, kind))
            }
            _ => None,
        })
        .collect();
    if !failed.is_empty() {
        text.push_str(&format!("\nDegraded sections ({}):\n", failed.len()));
        text.push_str(&failed.join("\n"));
        text.push('\n');
    }

    if let Some(extraction) = &output.extraction {
        text.push_str("\nExtracted fields:\n");
        for field in &extraction.fields {
            let flag = if field.suspected_fabrication { " [not found in source]" } else { "" };
            text.push_str(&format!(
                "  {}: {}{}\n",
                field.name,
                field.value.as_str().unwrap_or(""),
                flag
            ));
        }
    }
    text
}

/// Report printed after a formatted document is written to a file.
pub fn format_format_summary(output: &FormatOutput, written_to: &Path) -> String {
    let stats = &output.document.stats;
    let mut text = format!("{} {}\n", "Wrote".bold(), written_to.display());
    let polish = match &output.polish {
        None => "skipped".to_string(),
        Some(outcome) if outcome.polished => "applied".to_string(),
        Some(outcome) => format!(
            "kept original ({})",
            outcome.fallback_reason.as_deref().unwrap_or("no text")
        ),
    };
    text.push_str(&format!("Polish: {}\n", polish));
    text.push_str(&format!("Titles: {}\n", stats.sections_emitted));
    text.push_str(&format!(
        "Assets: {} embedded, {} placeholder(s)\n",
        stats.images, stats.placeholders
    ));
    text.push_str(&format!("Duration: {} ms\n", output.duration.as_millis()));
    text
}
