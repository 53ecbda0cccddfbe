//! Global config file source: $XDG_CONFIG_HOME/docregen/config.toml

use config::builder::DefaultState;
use config::{ConfigBuilder, File};
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::debug;

/// Path to the per-user config file, if a home directory can be determined.
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "docregen").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Add the global config file to the builder when it exists.
pub fn add_to_builder(mut builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    if let Some(path) = global_config_path() {
        if path.exists() {
            debug!(config_path = %path.display(), "Loading global configuration");
            builder = builder.add_source(File::from(path).required(false));
        }
    }
    builder
}
