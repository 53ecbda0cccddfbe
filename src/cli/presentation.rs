//! CLI presentation: text and JSON renderings of command results.

mod regeneration;
mod templates;
mod text;

pub use regeneration::{format_format_summary, format_regeneration_summary};
pub use templates::{format_template_list, format_template_show};
pub use text::{format_extraction, format_segments};

use crate::error::PipelineError;

/// `text` or `json`; anything else is rejected.
pub(crate) fn wants_json(format: &str) -> Result<bool, PipelineError> {
    match format {
        "text" => Ok(false),
        "json" => Ok(true),
        other => Err(PipelineError::UnknownOutputFormat(other.to_string())),
    }
}
