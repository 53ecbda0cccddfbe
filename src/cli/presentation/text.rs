//! Extract and segment command presentation.

use super::wants_json;
use crate::error::PipelineError;
use crate::extraction::ExtractionReport;
use crate::segmentation::Segment;
use serde_json::json;

pub fn format_extraction(report: &ExtractionReport, format: &str) -> Result<String, PipelineError> {
    if wants_json(format)? {
        let out = json!({
            "fields": report.to_map(),
            "suspected": report.suspected(),
            "failure": report.failure,
            "attempts": report.attempts,
        });
        return Ok(serde_json::to_string_pretty(&out)?);
    }

    let mut lines: Vec<String> = report
        .fields
        .iter()
        .map(|field| {
            let value = field.value.as_str().unwrap_or("(empty)");
            if field.suspected_fabrication {
                format!("{}: {}  [not found in source]", field.name, value)
            } else {
                format!("{}: {}", field.name, value)
            }
        })
        .collect();
    if let Some(failure) = &report.failure {
        lines.push(format!("\nExtraction failed: {}", failure));
    }
    Ok(lines.join("\n"))
}

pub fn format_segments(segments: &[Segment], format: &str) -> Result<String, PipelineError> {
    if wants_json(format)? {
        return Ok(serde_json::to_string_pretty(segments)?);
    }
    if segments.is_empty() {
        return Ok("No segments.".to_string());
    }
    let blocks: Vec<String> = segments
        .iter()
        .map(|segment| match &segment.heading {
            Some(heading) => format!("[{}] {}\n{}", segment.position + 1, heading, segment.text),
            None => format!("[{}] {}", segment.position + 1, segment.text),
        })
        .collect();
    Ok(blocks.join("\n\n"))
}
