//! CLI domain: parse, route and presentation only.
//! No domain orchestration; a single route table dispatches to domain services.

mod parse;
mod presentation;
mod route;

pub use parse::{command_name, Cli, Commands, TemplateCommands};
pub use presentation::{
    format_extraction, format_regeneration_summary, format_segments, format_template_list, format_template_show,
};
pub use route::{load_config, RunContext};

use crate::error::PipelineError;

/// Map domain errors to the message printed on stderr.
pub fn map_error(e: &PipelineError) -> String {
    match e {
        PipelineError::Provider(provider) => format!("Text generation unavailable: {}", provider),
        other => other.to_string(),
    }
}
