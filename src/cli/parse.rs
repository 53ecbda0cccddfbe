//! CLI parse: clap types for docregen. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Docregen CLI - template-driven document regeneration
#[derive(Debug, Parser)]
#[command(name = "docregen")]
#[command(about = "Regenerate documents from templates, source material and an outline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file layered over the workspace configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a document for a template from a source document
    Regenerate {
        /// Template id
        #[arg(long)]
        template: String,
        /// Source document (.json units, anything else read as text)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Outline or notes from the requester
        #[arg(long)]
        outline: Option<String>,
        /// Tone (no_preference, direct, formal, concise, encouraging)
        #[arg(long)]
        tone: Option<String>,
        /// Comma-separated fields to extract alongside generation
        #[arg(long)]
        extract: Option<String>,
        /// Output format (markdown or json)
        #[arg(long, default_value = "markdown")]
        format: String,
        /// Write the document here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Polish a whole document and lay it out without a template
    Format {
        /// Source document (.json units, anything else read as text)
        file: PathBuf,
        /// Skip polishing; only detect titles and lists and place images
        #[arg(long, default_value = "false")]
        no_ai: bool,
        /// Output format (markdown or json)
        #[arg(long, default_value = "markdown")]
        format: String,
        /// Write the document here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Inspect templates
    Templates {
        #[command(subcommand)]
        command: TemplateCommands,
    },
    /// Extract structured fields from a document
    Extract {
        /// Source document
        file: PathBuf,
        /// Comma-separated field names
        #[arg(long, conflicts_with = "preset")]
        fields: Option<String>,
        /// Named field list (cause_process_result, problem_solution, summary_bullets)
        #[arg(long)]
        preset: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Split a document into paragraphs, sentences or semantic blocks
    Segment {
        /// Source document
        file: PathBuf,
        /// Segmentation mode (paragraph, sentence, semantic)
        #[arg(long, default_value = "paragraph")]
        mode: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum TemplateCommands {
    /// List available templates
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show a template's sections
    Show {
        /// Template id
        template_id: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// Short stable name for logging.
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Regenerate { .. } => "regenerate",
        Commands::Format { .. } => "format",
        Commands::Templates {
            command: TemplateCommands::List { .. },
        } => "templates.list",
        Commands::Templates {
            command: TemplateCommands::Show { .. },
        } => "templates.show",
        Commands::Extract { .. } => "extract",
        Commands::Segment { .. } => "segment",
    }
}

/// Split a comma-separated list, dropping blanks.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split([',', '，'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
