//! Usage Recording
//!
//! One record per regeneration run. Sinks are fire-and-forget from the
//! pipeline's point of view: a failing sink is logged and ignored.

use crate::error::PipelineError;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub template_id: String,
    pub template_name: Option<String>,
    pub had_source_document: bool,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
    pub recorded_at: DateTime<Utc>,
}

pub trait UsageSink: Send + Sync {
    fn record(&self, record: &UsageRecord) -> Result<(), PipelineError>;
}

/// Log the record and drop any sink error.
pub fn record_usage(sink: &dyn UsageSink, record: &UsageRecord) {
    if let Err(err) = sink.record(record) {
        warn!(template = %record.template_id, error = %err, "Failed to record usage");
    }
}

/// Emits each record as a structured log event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingUsageSink;

impl UsageSink for TracingUsageSink {
    fn record(&self, record: &UsageRecord) -> Result<(), PipelineError> {
        info!(
            template = %record.template_id,
            had_source_document = record.had_source_document,
            success = record.success,
            duration_ms = record.duration_ms,
            error = record.error.as_deref().unwrap_or(""),
            "Regeneration finished"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopUsageSink;

impl UsageSink for NoopUsageSink {
    fn record(&self, _record: &UsageRecord) -> Result<(), PipelineError> {
        Ok(())
    }
}

/// Appends one JSON object per line.
pub struct JsonLinesUsageSink {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl JsonLinesUsageSink {
    /// The file is opened lazily on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back every record in the file.
    pub fn read_all(path: &Path) -> Result<Vec<UsageRecord>, PipelineError> {
        let contents = std::fs::read_to_string(path)?;
        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(PipelineError::from))
            .collect()
    }

    fn open(&self) -> Result<File, PipelineError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(OpenOptions::new().create(true).append(true).open(&self.path)?)
    }
}

impl UsageSink for JsonLinesUsageSink {
    fn record(&self, record: &UsageRecord) -> Result<(), PipelineError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut guard = self.file.lock();
        if guard.is_none() {
            *guard = Some(self.open()?);
        }
        if let Some(file) = guard.as_mut() {
            file.write_all(line.as_bytes())?;
            file.flush()?;
        }
        Ok(())
    }
}
