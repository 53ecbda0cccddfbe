//! Integration tests for the document regeneration pipeline

mod asset_reassembly;
mod cli_commands;
mod config_loading;
mod end_to_end;
mod extraction_flow;
mod fan_out;
mod generation_resilience;
mod test_utils;
