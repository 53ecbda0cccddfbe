//! Text Segmentation
//!
//! Splits plain text into paragraphs, sentences, or heading-led semantic
//! blocks. The assembler uses paragraph mode to turn generated section text
//! into blocks.

use crate::error::PipelineError;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

lazy_static! {
    static ref BLANK_LINES: Regex = Regex::new(r"\n[ \t\r]*\n").expect("valid blank line regex");
    static ref HEADING_PATTERNS: Vec<Regex> = [
        r"^[一二三四五六七八九十百]+[、.．]",
        r"^第[一二三四五六七八九十百0-9]+[章节部分篇条]",
        r"^[（(][一二三四五六七八九十0-9]+[）)]",
        r"^\d+(\.\d+)*[.、．]\s*[^\d\s]",
        r"^#{1,6}\s+\S",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid heading regex"))
    .collect();
}

const SENTENCE_TERMINATORS: [char; 6] = ['。', '！', '？', '!', '?', '；'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentMode {
    #[default]
    Paragraph,
    Sentence,
    Semantic,
}

impl fmt::Display for SegmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentMode::Paragraph => write!(f, "paragraph"),
            SegmentMode::Sentence => write!(f, "sentence"),
            SegmentMode::Semantic => write!(f, "semantic"),
        }
    }
}

impl FromStr for SegmentMode {
    type Err = PipelineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "paragraph" => Ok(SegmentMode::Paragraph),
            "sentence" => Ok(SegmentMode::Sentence),
            "semantic" => Ok(SegmentMode::Semantic),
            other => Err(PipelineError::UnknownSegmentMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub mode: SegmentMode,
    /// 0-based index within the segmentation result
    pub position: usize,
    /// Leading heading line, semantic mode only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
}

pub trait Segmenter: Send + Sync {
    fn segment(&self, text: &str, mode: SegmentMode) -> Vec<Segment>;
}

/// Regex and punctuation based segmenter for Chinese and Latin text.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicSegmenter;

impl HeuristicSegmenter {
    pub fn new() -> Self {
        Self
    }

    pub fn is_heading(line: &str) -> bool {
        let line = line.trim();
        !line.is_empty() && HEADING_PATTERNS.iter().any(|pattern| pattern.is_match(line))
    }

    fn paragraphs(text: &str) -> Vec<String> {
        BLANK_LINES
            .split(&text.replace("\r\n", "\n"))
            .map(str::trim)
            .filter(|paragraph| !paragraph.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn sentences(text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut current = String::new();
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            current.push(c);
            let ends_sentence = if SENTENCE_TERMINATORS.contains(&c) {
                true
            } else if c == '.' {
                chars.peek().map_or(true, |next| next.is_whitespace())
            } else {
                c == '\n' && chars.peek() == Some(&'\n')
            };
            if !ends_sentence {
                continue;
            }
            // Keep runs like "?!" or "……" together.
            while let Some(&next) = chars.peek() {
                if SENTENCE_TERMINATORS.contains(&next) || next == '.' || next == '…' {
                    current.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }

        let rest = current.trim();
        if !rest.is_empty() {
            sentences.push(rest.to_string());
        }
        sentences
    }

    fn semantic_blocks(text: &str) -> Vec<(Option<String>, String)> {
        let mut blocks: Vec<(Option<String>, Vec<&str>)> = Vec::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if Self::is_heading(trimmed) {
                blocks.push((Some(trimmed.to_string()), vec![trimmed]));
            } else if trimmed.is_empty() {
                continue;
            } else if let Some((_, lines)) = blocks.last_mut() {
                lines.push(trimmed);
            } else {
                blocks.push((None, vec![trimmed]));
            }
        }
        blocks
            .into_iter()
            .map(|(heading, lines)| (heading, lines.join("\n")))
            .collect()
    }
}

impl Segmenter for HeuristicSegmenter {
    fn segment(&self, text: &str, mode: SegmentMode) -> Vec<Segment> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let pieces: Vec<(Option<String>, String)> = match mode {
            SegmentMode::Paragraph => Self::paragraphs(text).into_iter().map(|p| (None, p)).collect(),
            SegmentMode::Sentence => Self::sentences(text).into_iter().map(|s| (None, s)).collect(),
            SegmentMode::Semantic => Self::semantic_blocks(text),
        };
        pieces
            .into_iter()
            .enumerate()
            .map(|(position, (heading, text))| Segment {
                text,
                mode,
                position,
                heading,
            })
            .collect()
    }
}
