//! Asset-to-section assignment.
//!
//! Each asset is scored against every section. A section earns
//! `title_in_preceding` when its title appears in the text before the asset,
//! `title_in_following` when it appears in the text after, and `keyword` for
//! each of its requirement keywords found in the asset's own unit text. The
//! strictly highest score wins; ties go to the section declared first.
//!
//! When nothing scores above zero the asset still lands somewhere:
//! the first section with substantive generated text, else the last section
//! with any generated text, else the first section of the template.

use super::{AssetId, AssetRecord};
use crate::template::{Section, Template};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_title_weight")]
    pub title_in_preceding: f64,
    #[serde(default = "default_title_weight")]
    pub title_in_following: f64,
    #[serde(default = "default_keyword_weight")]
    pub keyword: f64,
}

fn default_title_weight() -> f64 {
    0.5
}

fn default_keyword_weight() -> f64 {
    0.1
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            title_in_preceding: default_title_weight(),
            title_in_following: default_title_weight(),
            keyword: default_keyword_weight(),
        }
    }
}

impl ScoringWeights {
    pub fn is_valid(&self) -> bool {
        [self.title_in_preceding, self.title_in_following, self.keyword]
            .iter()
            .all(|weight| weight.is_finite() && *weight >= 0.0)
    }
}

/// Which rule placed an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentReason {
    BestScore,
    SubstantiveContent,
    LastGenerated,
    FirstSection,
}

impl fmt::Display for AssignmentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssignmentReason::BestScore => "best_score",
            AssignmentReason::SubstantiveContent => "substantive_content",
            AssignmentReason::LastGenerated => "last_generated",
            AssignmentReason::FirstSection => "first_section",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetAssignment {
    pub asset_id: AssetId,
    pub target_section_id: String,
    pub score: f64,
    pub reason: AssignmentReason,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignmentStrategy {
    pub weights: ScoringWeights,
    /// Generated text must be longer than this to count as substantive.
    pub min_substantive_chars: usize,
}

impl Default for AssignmentStrategy {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            min_substantive_chars: 100,
        }
    }
}

impl AssignmentStrategy {
    pub fn new(weights: ScoringWeights, min_substantive_chars: usize) -> Self {
        Self {
            weights,
            min_substantive_chars,
        }
    }

    pub fn score(&self, asset: &AssetRecord, section: &Section) -> f64 {
        let mut score = 0.0;

        let title = section.title.trim().to_lowercase();
        if !title.is_empty() {
            if asset.preceding_context.to_lowercase().contains(&title) {
                score += self.weights.title_in_preceding;
            }
            if asset.following_context.to_lowercase().contains(&title) {
                score += self.weights.title_in_following;
            }
        }

        let unit_text = asset.unit_text.to_lowercase();
        let keyword_hits = section
            .requirements
            .match_keywords()
            .iter()
            .filter(|keyword| unit_text.contains(keyword.as_str()))
            .count();
        score += self.weights.keyword * keyword_hits as f64;

        score
    }

    /// One assignment per asset, in asset order.
    pub fn assign(
        &self,
        assets: &[AssetRecord],
        generated: &HashMap<String, String>,
        template: &Template,
    ) -> Vec<AssetAssignment> {
        let sections: Vec<&Section> = template.flatten().into_iter().map(|flat| flat.section).collect();
        if sections.is_empty() {
            if !assets.is_empty() {
                warn!(template = %template.id, assets = assets.len(), "Template has no sections, assets cannot be placed");
            }
            return Vec::new();
        }

        assets
            .iter()
            .map(|asset| {
                let assignment = self.assign_one(asset, &sections, generated);
                debug!(
                    asset = %assignment.asset_id,
                    section_id = %assignment.target_section_id,
                    score = assignment.score,
                    reason = %assignment.reason,
                    "Assigned asset"
                );
                assignment
            })
            .collect()
    }

    fn assign_one(
        &self,
        asset: &AssetRecord,
        sections: &[&Section],
        generated: &HashMap<String, String>,
    ) -> AssetAssignment {
        let mut best: Option<(&Section, f64)> = None;
        for section in sections {
            let score = self.score(asset, section);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((*section, score));
            }
        }

        if let Some((section, score)) = best.filter(|(_, score)| *score > 0.0) {
            return AssetAssignment {
                asset_id: asset.id,
                target_section_id: section.id.clone(),
                score,
                reason: AssignmentReason::BestScore,
            };
        }

        let (section, reason) = if let Some(section) = sections.iter().find(|section| {
            generated_text(generated, section.id.as_str()).chars().count() > self.min_substantive_chars
        }) {
            (section, AssignmentReason::SubstantiveContent)
        } else if let Some(section) = sections
            .iter()
            .rev()
            .find(|section| !generated_text(generated, section.id.as_str()).is_empty())
        {
            (section, AssignmentReason::LastGenerated)
        } else {
            (&sections[0], AssignmentReason::FirstSection)
        };

        AssetAssignment {
            asset_id: asset.id,
            target_section_id: section.id.clone(),
            score: 0.0,
            reason,
        }
    }
}

fn generated_text<'a>(generated: &'a HashMap<String, String>, section_id: &str) -> &'a str {
    generated.get(section_id).map(|text| text.trim()).unwrap_or("")
}
