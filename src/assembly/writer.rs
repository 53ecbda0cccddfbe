//! Output writers.

use super::{Block, OutputDocument};
use crate::error::PipelineError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt::Write as _;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }

    pub fn writer(self) -> Box<dyn DocumentWriter> {
        match self {
            OutputFormat::Markdown => Box::new(MarkdownWriter),
            OutputFormat::Json => Box::new(JsonWriter { pretty: true }),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = PipelineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            other => Err(PipelineError::UnknownOutputFormat(other.to_string())),
        }
    }
}

pub trait DocumentWriter {
    fn write(&self, document: &OutputDocument) -> Result<String, PipelineError>;
}

/// Markdown with the document title as the top heading and images inlined as
/// data URIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownWriter;

impl DocumentWriter for MarkdownWriter {
    fn write(&self, document: &OutputDocument) -> Result<String, PipelineError> {
        let mut out = String::new();
        let mut ordinal = 0usize;

        writeln!(out, "# {}", document.title).map_err(format_error)?;

        for block in &document.blocks {
            match block {
                Block::ListItem { ordered: true, .. } => ordinal += 1,
                _ => ordinal = 0,
            }
            match block {
                Block::Heading { level, text } => {
                    let hashes = "#".repeat(usize::from(*level).saturating_add(1).min(6));
                    write!(out, "\n{} {}\n", hashes, text).map_err(format_error)?;
                }
                Block::Paragraph { text } => {
                    write!(out, "\n{}\n", text.replace('\n', "  \n")).map_err(format_error)?;
                }
                Block::ListItem { ordered, text } => {
                    if *ordered {
                        writeln!(out, "{}. {}", ordinal, text).map_err(format_error)?;
                    } else {
                        writeln!(out, "- {}", text).map_err(format_error)?;
                    }
                }
                Block::Image {
                    asset_id,
                    format,
                    display_width_in,
                    data,
                    ..
                } => {
                    write!(
                        out,
                        "\n<p align=\"center\"><img alt=\"{}\" width=\"{}in\" src=\"data:{};base64,{}\"></p>\n",
                        asset_id,
                        display_width_in,
                        format.mime_type(),
                        STANDARD.encode(data)
                    )
                    .map_err(format_error)?;
                }
                Block::Placeholder { asset_id, reason } => {
                    write!(out, "\n> [{} unavailable: {}]\n", asset_id, reason).map_err(format_error)?;
                }
            }
        }

        Ok(out)
    }
}

fn format_error(err: std::fmt::Error) -> PipelineError {
    PipelineError::Serialization(err.to_string())
}

#[derive(Debug, Clone, Copy)]
pub struct JsonWriter {
    pub pretty: bool,
}

impl DocumentWriter for JsonWriter {
    fn write(&self, document: &OutputDocument) -> Result<String, PipelineError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(document)?
        } else {
            serde_json::to_string(document)?
        };
        Ok(json)
    }
}
