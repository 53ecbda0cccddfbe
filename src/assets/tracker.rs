//! Asset extraction with surrounding context.

use super::{AssetId, AssetRecord, DocumentSource};
use tracing::{debug, warn};

pub struct AssetTracker {
    context_window: usize,
}

impl Default for AssetTracker {
    fn default() -> Self {
        Self::new(3)
    }
}

impl AssetTracker {
    /// `context_window` units of text are taken from each side of an asset.
    pub fn new(context_window: usize) -> Self {
        Self { context_window }
    }

    /// Every readable asset in document order. Unreadable or empty payloads
    /// are skipped with a warning.
    pub fn extract_assets(&self, document: &dyn DocumentSource) -> Vec<AssetRecord> {
        let unit_count = document.unit_count();
        let mut records = Vec::new();

        for index in 0..unit_count {
            if !document.has_asset(index) {
                continue;
            }
            let payload = match document.asset_bytes(index) {
                Ok(payload) if !payload.is_empty() => payload,
                Ok(_) => {
                    warn!(position = index, "Skipping asset with empty payload");
                    continue;
                }
                Err(err) => {
                    warn!(position = index, error = %err, "Skipping unreadable asset");
                    continue;
                }
            };

            let preceding_start = index.saturating_sub(self.context_window);
            let following_end = (index + 1 + self.context_window).min(unit_count);
            let record = AssetRecord::new(
                AssetId(records.len()),
                index,
                document.unit_text(index).unwrap_or_default().trim(),
                join_context(document, preceding_start..index),
                join_context(document, index + 1..following_end),
                payload,
            );
            debug!(
                asset = %record.id,
                position = index,
                format = ?record.format,
                "Extracted asset"
            );
            records.push(record);
        }

        records
    }
}

fn join_context(document: &dyn DocumentSource, range: std::ops::Range<usize>) -> String {
    range
        .filter_map(|index| document.unit_text(index))
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
