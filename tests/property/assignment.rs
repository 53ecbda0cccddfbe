//! Property-based tests for asset placement

use docregen::assets::{AssetId, AssetRecord, AssignmentStrategy};
use docregen::template::{Section, Template};
use proptest::prelude::*;
use std::collections::HashMap;

const WORDS: [&str; 10] = [
    "overview", "sales", "chart", "revenue", "hiring", "risks", "plan", "figure", "table", "misc",
];

fn phrase() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS.to_vec()), 0..5).prop_map(|words| words.join(" "))
}

fn assets() -> impl Strategy<Value = Vec<AssetRecord>> {
    prop::collection::vec((phrase(), phrase(), phrase()), 0..12).prop_map(|contexts| {
        contexts
            .into_iter()
            .enumerate()
            .map(|(index, (preceding, unit, following))| {
                AssetRecord::new(AssetId(index), index * 2 + 1, unit, preceding, following, vec![0x89, b'P'])
            })
            .collect()
    })
}

fn template(section_count: usize) -> Template {
    let titles = ["Overview", "Sales", "Hiring", "Risks", "Plan", "Appendix"];
    let sections = titles
        .iter()
        .take(section_count)
        .enumerate()
        .map(|(index, title)| {
            Section::new(format!("s{}", index), *title).with_keywords([WORDS[index + 2]])
        })
        .collect();
    Template::new("props", "Props", sections)
}

fn generated(section_count: usize) -> impl Strategy<Value = HashMap<String, String>> {
    prop::collection::vec(0usize..200, section_count).prop_map(|lengths| {
        lengths
            .into_iter()
            .enumerate()
            .map(|(index, length)| (format!("s{}", index), "x".repeat(length)))
            .collect()
    })
}

/// Every asset is placed exactly once, in asset order, on a real section,
/// and the same inputs always give the same placement.
#[test]
fn test_assignment_is_total_and_deterministic() {
    let mut runner = proptest::test_runner::TestRunner::default();
    let strategy = (1usize..=6).prop_flat_map(|count| (Just(count), assets(), generated(count)));

    runner
        .run(&strategy, |(count, assets, texts)| {
            let template = template(count);
            let assigner = AssignmentStrategy::default();

            let first = assigner.assign(&assets, &texts, &template);
            let second = assigner.assign(&assets, &texts, &template);
            prop_assert_eq!(&first, &second);

            prop_assert_eq!(first.len(), assets.len());
            for (assignment, asset) in first.iter().zip(&assets) {
                prop_assert_eq!(assignment.asset_id, asset.id);
                prop_assert!(template.section(&assignment.target_section_id).is_some());
                prop_assert!(assignment.score >= 0.0);
            }
            Ok(())
        })
        .unwrap();
}

/// Adding a keyword to the asset's own text never lowers its score.
#[test]
fn test_keyword_scoring_is_monotonic() {
    let mut runner = proptest::test_runner::TestRunner::default();
    let strategy = (phrase(), phrase(), phrase(), prop::sample::select(WORDS.to_vec()), 0usize..6);

    runner
        .run(&strategy, |(preceding, unit, following, extra, section_index)| {
            let template = template(6);
            let section = &template.sections[section_index];
            let assigner = AssignmentStrategy::default();

            let base = AssetRecord::new(AssetId(0), 1, unit.clone(), preceding.clone(), following.clone(), vec![1]);
            let richer = AssetRecord::new(
                AssetId(0),
                1,
                format!("{} {}", unit, extra),
                preceding,
                following,
                vec![1],
            );
            prop_assert!(assigner.score(&richer, section) >= assigner.score(&base, section));
            Ok(())
        })
        .unwrap();
}

/// With no scoring signal at all, placement only depends on generated text.
#[test]
fn test_unscored_assets_share_one_fallback_section() {
    let mut runner = proptest::test_runner::TestRunner::default();
    let strategy = (1usize..=6).prop_flat_map(|count| (Just(count), generated(count), 1usize..6));

    runner
        .run(&strategy, |(count, texts, asset_count)| {
            let template = template(count);
            let assets: Vec<AssetRecord> = (0..asset_count)
                .map(|index| AssetRecord::new(AssetId(index), index, "", "", "", vec![1]))
                .collect();

            let assignments = AssignmentStrategy::default().assign(&assets, &texts, &template);
            let target = &assignments[0].target_section_id;
            prop_assert!(assignments.iter().all(|a| &a.target_section_id == target));
            Ok(())
        })
        .unwrap();
}
