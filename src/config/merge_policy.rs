//! Merge rules: defaults and override order.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// A builder seeded with the defaults every later source overrides.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("pipeline.max_workers", 5)?
        .set_default("pipeline.retry_count", 2)?
        .set_default("pipeline.retry_initial_delay", 1.0)?
        .set_default("pipeline.request_timeout", 15.0)?
        .set_default("pipeline.cache_ttl", 30.0)?
        .set_default("pipeline.batch_size_threshold", 1000)?
        .set_default("pipeline.tone", "no_preference")?
        .set_default("logging.level", "info")?
        .set_default("logging.output", "stderr")
}
