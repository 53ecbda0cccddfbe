//! Asset extraction, placement and assembly across a whole document

use super::test_utils::png_bytes;
use docregen::assembly::{Assembler, Block, DocumentWriter, MarkdownWriter};
use docregen::assets::{AssetId, AssetTracker, AssignmentReason, AssignmentStrategy, ContentUnit, InMemoryDocument};
use docregen::template::{Section, Template};
use std::collections::{HashMap, HashSet};

const TITLES: [&str; 5] = ["Overview", "Sales", "Hiring", "Risks", "Plan"];

fn template() -> Template {
    let sections = TITLES
        .iter()
        .map(|title| Section::new(title.to_lowercase(), *title))
        .collect();
    Template::new("quarterly", "Quarterly Review", sections)
}

/// Two figures per section, each right after a paragraph naming the section.
fn document() -> InMemoryDocument {
    let mut units = Vec::new();
    for (index, title) in TITLES.iter().enumerate() {
        for figure in 0..2 {
            units.push(ContentUnit::text(format!("Discussion of {} figure {}.", title, figure)));
            units.push(ContentUnit::asset(
                format!("Figure {}", index * 2 + figure),
                &png_bytes(8 + index as u32, 4),
            ));
        }
    }
    InMemoryDocument::new(units)
}

fn generated_texts() -> HashMap<String, String> {
    TITLES
        .iter()
        .map(|title| (title.to_lowercase(), format!("Regenerated {} section.", title)))
        .collect()
}

#[test]
fn test_every_asset_is_placed_exactly_once() {
    let template = template();
    let assets = AssetTracker::new(1).extract_assets(&document());
    assert_eq!(assets.len(), 10);

    let assignments = AssignmentStrategy::default().assign(&assets, &generated_texts(), &template);
    assert_eq!(assignments.len(), 10);

    let ids: HashSet<AssetId> = assignments.iter().map(|a| a.asset_id).collect();
    assert_eq!(ids.len(), 10);
    let section_ids: HashSet<String> = TITLES.iter().map(|title| title.to_lowercase()).collect();
    assert!(assignments
        .iter()
        .all(|a| section_ids.contains(&a.target_section_id)));

    assert_eq!(assignments[0].target_section_id, "overview");
    assert_eq!(assignments[0].reason, AssignmentReason::BestScore);
    assert_eq!(assignments[9].target_section_id, "plan");

    let output = Assembler::default().assemble(&template, &generated_texts(), &assignments, assets);
    assert_eq!(output.stats.images, 10);
    assert_eq!(output.stats.placeholders, 0);
    assert_eq!(output.stats.sections_emitted, 5);

    let embedded: Vec<AssetId> = output
        .blocks
        .iter()
        .filter_map(|block| match block {
            Block::Image { asset_id, .. } => Some(*asset_id),
            _ => None,
        })
        .collect();
    assert_eq!(embedded.len(), 10);
    assert_eq!(embedded.iter().collect::<HashSet<_>>().len(), 10);
}

#[test]
fn test_images_follow_their_section_body() {
    let template = template();
    let assets = AssetTracker::new(1).extract_assets(&document());
    let assignments = AssignmentStrategy::default().assign(&assets, &generated_texts(), &template);
    let output = Assembler::default().assemble(&template, &generated_texts(), &assignments, assets);

    let first_heading = output
        .blocks
        .iter()
        .position(|block| matches!(block, Block::Heading { text, .. } if text == "Overview"))
        .unwrap();
    let first_image = output
        .blocks
        .iter()
        .position(|block| matches!(block, Block::Image { .. }))
        .unwrap();
    assert!(first_image > first_heading);

    match &output.blocks[first_image] {
        Block::Image {
            width_px,
            height_px,
            display_width_in,
            display_height_in,
            ..
        } => {
            assert_eq!((*width_px, *height_px), (8, 4));
            assert!((display_height_in - display_width_in / 2.0).abs() < 1e-9);
        }
        other => panic!("expected image, got {:?}", other),
    }
}

#[test]
fn test_unscored_assets_land_in_substantive_section() {
    let template = template();
    let document = InMemoryDocument::new(vec![
        ContentUnit::text("Unrelated preamble."),
        ContentUnit::asset("", &png_bytes(4, 4)),
    ]);
    let assets = AssetTracker::default().extract_assets(&document);

    let mut texts: HashMap<String, String> = HashMap::new();
    texts.insert("sales".to_string(), "Long sales narrative. ".repeat(10));
    texts.insert("risks".to_string(), "Short.".to_string());

    let assignments = AssignmentStrategy::default().assign(&assets, &texts, &template);
    assert_eq!(assignments[0].target_section_id, "sales");
    assert_eq!(assignments[0].reason, AssignmentReason::SubstantiveContent);
}

#[test]
fn test_broken_payload_becomes_placeholder_in_markdown() {
    let template = Template::new("t", "Doc", vec![Section::new("body", "Body")]);
    let document = InMemoryDocument::new(vec![
        ContentUnit::text("Body text."),
        ContentUnit::asset("Scan", b"not really an image"),
        ContentUnit::asset("Chart", &png_bytes(6, 3)),
    ]);
    let assets = AssetTracker::default().extract_assets(&document);
    let mut texts = HashMap::new();
    texts.insert("body".to_string(), "Regenerated body.".to_string());

    let assignments = AssignmentStrategy::default().assign(&assets, &texts, &template);
    let output = Assembler::default().assemble(&template, &texts, &assignments, assets);
    assert_eq!(output.stats.images, 1);
    assert_eq!(output.stats.placeholders, 1);

    let markdown = MarkdownWriter.write(&output).unwrap();
    assert!(markdown.starts_with("# Doc"));
    assert!(markdown.contains("## Body"));
    assert!(markdown.contains("> [asset-0 unavailable: unsupported format]"));
    assert!(markdown.contains("data:image/png;base64,"));
}
