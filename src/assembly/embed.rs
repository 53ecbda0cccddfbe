//! Image embedding.

use super::{Alignment, Block};
use crate::assets::{AssetFormat, AssetRecord};
use image::GenericImageView;
use tracing::warn;

/// Display width of every embedded image.
pub const DISPLAY_WIDTH_IN: f64 = 5.91;

/// Space above and below an embedded image.
pub const IMAGE_PADDING_PT: f64 = 12.0;

/// Decode an asset into an image block, or a placeholder when it cannot be
/// decoded.
pub fn embed_asset(record: AssetRecord) -> Block {
    let asset_id = record.id;
    let format = record.format;

    if format == AssetFormat::Unknown {
        warn!(asset = %asset_id, "Unsupported asset format, emitting placeholder");
        return Block::Placeholder {
            asset_id,
            reason: "unsupported format".to_string(),
        };
    }

    let (width_px, height_px) = match image::load_from_memory(record.payload()) {
        Ok(decoded) => decoded.dimensions(),
        Err(err) => {
            warn!(asset = %asset_id, format = ?format, error = %err, "Asset failed to decode, emitting placeholder");
            return Block::Placeholder {
                asset_id,
                reason: format!("decode failed: {}", err),
            };
        }
    };

    if width_px == 0 || height_px == 0 {
        warn!(asset = %asset_id, "Asset has zero size, emitting placeholder");
        return Block::Placeholder {
            asset_id,
            reason: "zero-sized image".to_string(),
        };
    }

    Block::Image {
        asset_id,
        format,
        width_px,
        height_px,
        display_width_in: DISPLAY_WIDTH_IN,
        display_height_in: DISPLAY_WIDTH_IN * f64::from(height_px) / f64::from(width_px),
        padding_pt: IMAGE_PADDING_PT,
        alignment: Alignment::Center,
        data: record.into_payload(),
    }
}
