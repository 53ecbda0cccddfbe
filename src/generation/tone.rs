//! Writing tone selection.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    NoPreference,
    Direct,
    Formal,
    Concise,
    Encouraging,
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::NoPreference,
        Tone::Direct,
        Tone::Formal,
        Tone::Concise,
        Tone::Encouraging,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tone::NoPreference => "no_preference",
            Tone::Direct => "direct",
            Tone::Formal => "formal",
            Tone::Concise => "concise",
            Tone::Encouraging => "encouraging",
        }
    }

    /// Style sentence appended to the system instruction.
    pub fn style_instruction(self) -> &'static str {
        match self {
            Tone::NoPreference => "Write in a clear, natural professional register.",
            Tone::Direct => "Be direct: state facts and conclusions plainly without hedging.",
            Tone::Formal => "Use a formal register suitable for official reports.",
            Tone::Concise => "Be concise: short sentences and no filler.",
            Tone::Encouraging => "Use a positive, encouraging voice while staying factual.",
        }
    }

    /// Full system instruction for section generation.
    pub fn system_instruction(self) -> String {
        format!(
            "You are a professional document writer. Rewrite source material into the requested \
             section. Use only facts present in the source material or outline; never invent \
             names, numbers, dates or events. Output plain text without a section title. {}",
            self.style_instruction()
        )
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = PipelineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        Tone::ALL
            .into_iter()
            .find(|tone| tone.as_str() == normalized)
            .ok_or_else(|| PipelineError::UnknownTone(value.to_string()))
    }
}
