//! Prompt construction for section and batched generation.

use super::{GenerationRequest, Prompt, Tone};
use crate::template::Section;

/// Truncate `source` to at most `max_chars` characters, on a char boundary.
pub fn excerpt(source: &str, max_chars: usize) -> String {
    let trimmed = source.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((byte_index, _)) => trimmed[..byte_index].to_string(),
        None => trimmed.to_string(),
    }
}

/// Instruction text for one section: title, guidance, length target,
/// bullet points, placeholder layout and the optional outline.
pub fn section_instruction(section: &Section, outline: Option<&str>) -> String {
    let mut lines = vec![format!("Section: {}", section.title)];

    let guidance = section.requirements.guidance.trim();
    if !guidance.is_empty() {
        lines.push(format!("Guidance: {}", guidance));
    }
    if let Some(word_count) = section.word_count {
        lines.push(format!("Target length: about {} characters.", word_count));
    }
    if !section.bullet_points.is_empty() {
        lines.push("Cover these points as a list, one item per line:".to_string());
        lines.extend(section.bullet_points.iter().map(|point| format!("- {}", point)));
    }
    if let Some(placeholder) = section.placeholder.as_deref().filter(|p| !p.trim().is_empty()) {
        lines.push(format!("Follow this layout: {}", placeholder.trim()));
    }
    if let Some(outline) = outline.map(str::trim).filter(|o| !o.is_empty()) {
        lines.push(format!("Outline from the requester:\n{}", outline));
    }

    lines.join("\n")
}

fn source_block(source_excerpt: &str) -> String {
    if source_excerpt.trim().is_empty() {
        "No source material was provided. Write only what the guidance and outline support."
            .to_string()
    } else {
        format!("Source material:\n{}", source_excerpt)
    }
}

pub fn section_prompt(request: &GenerationRequest) -> Prompt {
    Prompt {
        system: request.tone().system_instruction(),
        user: format!(
            "{}\n\n{}",
            request.instruction_text(),
            source_block(request.source_excerpt())
        ),
    }
}

/// One prompt asking for every section at once as a JSON object keyed by
/// section id.
pub fn batched_prompt(
    sections: &[&Section],
    outline: Option<&str>,
    source_excerpt: &str,
    tone: Tone,
) -> Prompt {
    let mut user = String::from(
        "Write every section listed below. Respond with a single JSON object whose keys are \
         the section ids in square brackets and whose values are the section text. Do not add \
         keys that are not listed.\n",
    );
    for section in sections {
        user.push_str(&format!("\n[{}]\n", section.id));
        user.push_str(&section_instruction(section, None));
        user.push('\n');
    }
    if let Some(outline) = outline.map(str::trim).filter(|o| !o.is_empty()) {
        user.push_str(&format!("\nOutline from the requester:\n{}\n", outline));
    }
    user.push('\n');
    user.push_str(&source_block(source_excerpt));

    Prompt {
        system: tone.system_instruction(),
        user,
    }
}

/// Whole-document rewrite: smoother, more formal, split into paragraphs and
/// points, returned without commentary.
pub fn polish_prompt(text: &str) -> Prompt {
    Prompt {
        system: "You are a document editor who restructures text for clarity.".to_string(),
        user: format!(
            "Polish the text below so it reads smoothly and formally. Split it into paragraphs \
             separated by blank lines and use numbered or dashed points where the content is a \
             list. Return only the rewritten text, without explanation.\n\nText:\n{}",
            text
        ),
    }
}
