//! Docregen: Template-Driven Document Regeneration
//!
//! Takes a source document, a target template and an optional outline, and
//! produces a new structured document. Every template section is generated
//! in parallel through a bounded worker pool with retry and caching, images
//! from the source are re-attached to the most relevant generated section,
//! and the result is assembled into an ordered block sequence.

pub mod assembly;
pub mod assets;
pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod generation;
pub mod logging;
pub mod pipeline;
pub mod provider;
pub mod segmentation;
pub mod template;
pub mod usage;
