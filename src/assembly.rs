//! Document Assembly
//!
//! Turns generated section text and assigned assets into an ordered block
//! sequence. Sections are visited in flattened template order; a section
//! with text gets a heading and its body, then every asset assigned to it in
//! extraction order. Sections without text are skipped but keep their
//! assets. Any asset that cannot be embedded becomes a placeholder block.

pub mod embed;
pub mod writer;

pub use embed::{embed_asset, DISPLAY_WIDTH_IN, IMAGE_PADDING_PT};
pub use writer::{DocumentWriter, JsonWriter, MarkdownWriter, OutputFormat};

use crate::assets::{AssetAssignment, AssetFormat, AssetId, AssetRecord};
use crate::segmentation::{HeuristicSegmenter, SegmentMode, Segmenter};
use crate::template::Template;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

lazy_static! {
    static ref ORDERED_ITEM: Regex =
        Regex::new(r"^\d{1,3}(?:[.)]\s+|、\s*)(\S.*)$").expect("valid ordered item regex");
    static ref UNORDERED_ITEM: Regex =
        Regex::new(r"^(?:[-*]\s+|[·•]\s*)(\S.*)$").expect("valid unordered item regex");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        text: String,
    },
    ListItem {
        ordered: bool,
        text: String,
    },
    Image {
        asset_id: AssetId,
        format: AssetFormat,
        width_px: u32,
        height_px: u32,
        display_width_in: f64,
        display_height_in: f64,
        padding_pt: f64,
        alignment: Alignment,
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
    },
    Placeholder {
        asset_id: AssetId,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyStats {
    pub sections_emitted: usize,
    pub sections_skipped: usize,
    pub images: usize,
    pub placeholders: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDocument {
    pub title: String,
    pub blocks: Vec<Block>,
    pub stats: AssemblyStats,
}

impl OutputDocument {
    pub fn headings(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Heading { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

pub struct Assembler {
    segmenter: Arc<dyn Segmenter>,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new(Arc::new(HeuristicSegmenter::new()))
    }
}

impl Assembler {
    pub fn new(segmenter: Arc<dyn Segmenter>) -> Self {
        Self { segmenter }
    }

    /// Build the output document. Consumes the asset records so their
    /// payloads move into the image blocks.
    pub fn assemble(
        &self,
        template: &Template,
        section_texts: &HashMap<String, String>,
        assignments: &[AssetAssignment],
        assets: Vec<AssetRecord>,
    ) -> OutputDocument {
        let mut records: BTreeMap<AssetId, AssetRecord> =
            assets.into_iter().map(|record| (record.id, record)).collect();

        let mut by_section: HashMap<&str, Vec<AssetId>> = HashMap::new();
        for assignment in assignments {
            by_section
                .entry(assignment.target_section_id.as_str())
                .or_default()
                .push(assignment.asset_id);
        }
        for ids in by_section.values_mut() {
            ids.sort();
        }

        let mut blocks = Vec::new();
        let mut stats = AssemblyStats::default();

        for flat in template.flatten() {
            let section = flat.section;
            let text = section_texts
                .get(&section.id)
                .map(|text| text.trim())
                .unwrap_or("");

            if text.is_empty() {
                stats.sections_skipped += 1;
                debug!(section_id = %section.id, "Skipping section without text");
            } else {
                stats.sections_emitted += 1;
                blocks.push(Block::Heading {
                    level: (flat.depth + 1).min(6) as u8,
                    text: section.title.clone(),
                });
                blocks.extend(self.body_blocks(text));
            }

            if let Some(ids) = by_section.get(section.id.as_str()) {
                for id in ids {
                    if let Some(record) = records.remove(id) {
                        push_asset(&mut blocks, &mut stats, record);
                    }
                }
            }
        }

        // Assigned to a section the template does not have, or never assigned.
        for (id, record) in records {
            warn!(asset = %id, "Asset has no placed section, appending at end");
            push_asset(&mut blocks, &mut stats, record);
        }

        debug!(
            template = %template.id,
            blocks = blocks.len(),
            sections_emitted = stats.sections_emitted,
            placeholders = stats.placeholders,
            "Assembled document"
        );

        OutputDocument {
            title: template.name.clone(),
            blocks,
            stats,
        }
    }

    /// Lay out free text without a template. Heading-like lines (`第…章`,
    /// `一、`, `## ...`) become level-1 headings, everything between them
    /// becomes body blocks, and the assets follow in extraction order.
    pub fn format_text(&self, title: &str, text: &str, assets: Vec<AssetRecord>) -> OutputDocument {
        let mut blocks = Vec::new();
        let mut stats = AssemblyStats::default();
        let mut body: Vec<&str> = Vec::new();

        for line in text.lines() {
            let trimmed = line.trim();
            if is_title_line(trimmed) {
                blocks.extend(self.body_blocks(&body.join("\n")));
                body.clear();
                stats.sections_emitted += 1;
                blocks.push(Block::Heading {
                    level: 1,
                    text: trimmed.trim_start_matches('#').trim().to_string(),
                });
            } else {
                body.push(line);
            }
        }
        blocks.extend(self.body_blocks(&body.join("\n")));

        let mut assets = assets;
        assets.sort_by_key(|record| record.id);
        for record in assets {
            push_asset(&mut blocks, &mut stats, record);
        }

        debug!(
            blocks = blocks.len(),
            headings = stats.sections_emitted,
            images = stats.images,
            placeholders = stats.placeholders,
            "Formatted document"
        );

        OutputDocument {
            title: title.to_string(),
            blocks,
            stats,
        }
    }

    fn body_blocks(&self, text: &str) -> Vec<Block> {
        let mut blocks = Vec::new();
        for segment in self.segmenter.segment(text, SegmentMode::Paragraph) {
            let mut pending: Vec<&str> = Vec::new();
            for line in segment.text.lines().map(str::trim).filter(|line| !line.is_empty()) {
                match list_item(line) {
                    Some(item) => {
                        flush_paragraph(&mut blocks, &mut pending);
                        blocks.push(item);
                    }
                    None => pending.push(line),
                }
            }
            flush_paragraph(&mut blocks, &mut pending);
        }
        blocks
    }
}

/// Numbered list items look like headings to the segmenter; they stay items.
fn is_title_line(line: &str) -> bool {
    HeuristicSegmenter::is_heading(line) && list_item(line).is_none()
}

fn list_item(line: &str) -> Option<Block> {
    if let Some(captures) = ORDERED_ITEM.captures(line) {
        return Some(Block::ListItem {
            ordered: true,
            text: captures[1].to_string(),
        });
    }
    UNORDERED_ITEM.captures(line).map(|captures| Block::ListItem {
        ordered: false,
        text: captures[1].to_string(),
    })
}

fn flush_paragraph(blocks: &mut Vec<Block>, pending: &mut Vec<&str>) {
    if !pending.is_empty() {
        blocks.push(Block::Paragraph {
            text: pending.join("\n"),
        });
        pending.clear();
    }
}

fn push_asset(blocks: &mut Vec<Block>, stats: &mut AssemblyStats, record: AssetRecord) {
    let block = embed_asset(record);
    match &block {
        Block::Image { .. } => stats.images += 1,
        _ => stats.placeholders += 1,
    }
    blocks.push(block);
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
