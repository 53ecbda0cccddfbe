//! Docregen CLI Binary

use clap::Parser;
use docregen::cli::{load_config, map_error, Cli, RunContext};
use docregen::config::DocregenConfig;
use docregen::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let loaded = load_config(&cli.workspace, cli.config.as_deref());
    let logging_config = build_logging_config(&cli, loaded.as_ref().ok());

    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    let context = RunContext::from_config(cli.workspace.clone(), config);
    match context.execute(&cli.command) {
        Ok(output) => {
            info!("Command completed successfully");
            println!("{}", output);
        }
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}

/// Logging config from the loaded configuration, overridden by CLI flags.
fn build_logging_config(cli: &Cli, config: Option<&DocregenConfig>) -> LoggingConfig {
    let mut logging = config.map(|c| c.logging.clone()).unwrap_or_default();

    if cli.verbose {
        logging.level = "debug".to_string();
    }
    if let Some(level) = &cli.log_level {
        logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        logging.format = format.clone();
    }
    if let Some(output) = &cli.log_output {
        logging.output = output.clone();
    }
    if let Some(file) = &cli.log_file {
        logging.file = file.clone();
    }
    logging
}
