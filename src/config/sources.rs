//! File sources layered by the config loader.

pub mod global_file;
pub mod workspace_file;
