//! Source Document Assets
//!
//! Embedded images are pulled out of the source document with their
//! surrounding text, then assigned to the generated section they fit best.

pub mod assignment;
pub mod document;
pub mod tracker;

pub use assignment::{AssetAssignment, AssignmentReason, AssignmentStrategy, ScoringWeights};
pub use document::{ContentUnit, DocumentSource, DocumentStats, InMemoryDocument, UnitStyle};
pub use tracker::AssetTracker;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of an asset in extraction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub usize);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    WebP,
    Unknown,
}

impl AssetFormat {
    /// Sniff the format from magic bytes.
    pub fn detect(payload: &[u8]) -> Self {
        match image::guess_format(payload) {
            Ok(image::ImageFormat::Png) => AssetFormat::Png,
            Ok(image::ImageFormat::Jpeg) => AssetFormat::Jpeg,
            Ok(image::ImageFormat::Gif) => AssetFormat::Gif,
            Ok(image::ImageFormat::Bmp) => AssetFormat::Bmp,
            Ok(image::ImageFormat::Tiff) => AssetFormat::Tiff,
            Ok(image::ImageFormat::WebP) => AssetFormat::WebP,
            _ => AssetFormat::Unknown,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            AssetFormat::Png => "image/png",
            AssetFormat::Jpeg => "image/jpeg",
            AssetFormat::Gif => "image/gif",
            AssetFormat::Bmp => "image/bmp",
            AssetFormat::Tiff => "image/tiff",
            AssetFormat::WebP => "image/webp",
            AssetFormat::Unknown => "application/octet-stream",
        }
    }
}

/// An embedded asset and the text around it.
///
/// The payload is owned; handing the record to the assembler hands over the
/// bytes with it.
#[derive(Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub id: AssetId,
    /// Index of the content unit that held the asset
    pub source_position: usize,
    /// Text of that unit itself (often a caption, often empty)
    pub unit_text: String,
    pub preceding_context: String,
    pub following_context: String,
    pub format: AssetFormat,
    payload: Vec<u8>,
}

impl AssetRecord {
    pub fn new(
        id: AssetId,
        source_position: usize,
        unit_text: impl Into<String>,
        preceding_context: impl Into<String>,
        following_context: impl Into<String>,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            id,
            source_position,
            unit_text: unit_text.into(),
            preceding_context: preceding_context.into(),
            following_context: following_context.into(),
            format: AssetFormat::detect(&payload),
            payload,
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

impl fmt::Debug for AssetRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetRecord")
            .field("id", &self.id)
            .field("source_position", &self.source_position)
            .field("unit_text", &self.unit_text)
            .field("preceding_context", &self.preceding_context)
            .field("following_context", &self.following_context)
            .field("format", &self.format)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}
