//! Property-based tests for placement, scoring and text handling

mod assignment;
mod text;
