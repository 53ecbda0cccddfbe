//! Named field lists.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionPreset {
    CauseProcessResult,
    ProblemSolution,
    SummaryBullets,
}

impl ExtractionPreset {
    pub const ALL: [ExtractionPreset; 3] = [
        ExtractionPreset::CauseProcessResult,
        ExtractionPreset::ProblemSolution,
        ExtractionPreset::SummaryBullets,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ExtractionPreset::CauseProcessResult => "cause_process_result",
            ExtractionPreset::ProblemSolution => "problem_solution",
            ExtractionPreset::SummaryBullets => "summary_bullets",
        }
    }

    pub fn fields(self) -> Vec<String> {
        let fields: &[&str] = match self {
            ExtractionPreset::CauseProcessResult => &["原因", "过程", "结果"],
            ExtractionPreset::ProblemSolution => &["问题", "原因", "解决方案"],
            ExtractionPreset::SummaryBullets => &["要点"],
        };
        fields.iter().map(|field| field.to_string()).collect()
    }
}

impl FromStr for ExtractionPreset {
    type Err = PipelineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        ExtractionPreset::ALL
            .into_iter()
            .find(|preset| preset.name() == normalized)
            .ok_or_else(|| PipelineError::UnknownExtractionPreset(value.to_string()))
    }
}
