//! Integration tests for block classification, assembly and refinement.

use docweave::geometry::Rect;
use docweave::model::{
    BlockType, DocumentElement, ElementKind, ExtractedContent, LayoutBlock, TheoremEnv,
};
use docweave::structure::{
    AssemblerConfig, BlockAssembler, BlockClass, BlockClassifier, ClassifierConfig,
    SemanticRefiner,
};
use docweave::{assemble_page, PageInput, PageProcessor};

fn text_block(y0: f32, y1: f32) -> LayoutBlock {
    LayoutBlock::text(Rect::new(0.1, y0, 0.9, y1))
}

fn text(s: &str) -> ExtractedContent {
    ExtractedContent::Text(s.to_string())
}

/// One first page exercising every element kind the assembler produces.
fn paper_page() -> PageInput {
    let mut page = PageInput::default();
    page.push(
        text_block(0.05, 0.08).with_label("Title"),
        text("Reconstructing Scanned Papers"),
    );
    page.push(
        text_block(0.12, 0.16),
        text("Abstract. We describe a pipeline that rebuilds documents."),
    );
    page.push(
        text_block(0.25, 0.27).with_label("Section-header"),
        text("1 Introduction"),
    );
    page.push(text_block(0.30, 0.33), text("Tables are everywhere and"));
    page.push(text_block(0.35, 0.38), text("hard to parse."));
    page.push(
        LayoutBlock::new(BlockType::Math, Rect::new(0.2, 0.40, 0.8, 0.45)),
        ExtractedContent::Latex("a^2 + b^2 = c^2".into()),
    );
    page.push(
        LayoutBlock::text(Rect::new(0.85, 0.40, 0.9, 0.45)),
        text("(1)"),
    );
    page.push(
        text_block(0.50, 0.52).with_label("List-item"),
        text("• First item"),
    );
    page.push(
        text_block(0.53, 0.55).with_label("List-item"),
        text("• Second item"),
    );
    page.push(
        text_block(0.60, 0.63),
        text("THEOREM 2.1. Every table has a grid."),
    );
    page.push(
        text_block(0.69, 0.72),
        text("PROOF. Follows from the construction."),
    );
    page.push(
        LayoutBlock::new(BlockType::Image, Rect::new(0.2, 0.75, 0.8, 0.9)),
        ExtractedContent::ImagePath("figs/p1_0.png".into()),
    );
    page
}

#[test]
fn test_merge_across_blocks() {
    let blocks = vec![text_block(0.40, 0.42), text_block(0.44, 0.46)];
    let contents = vec![text("Experimental"), text("Results")];
    let elements = BlockAssembler::new().unwrap().assemble(&blocks, &contents);

    assert_eq!(
        elements,
        vec![DocumentElement::paragraph("Experimental Results")]
    );
}

#[test]
fn test_theorem_and_proof_retyped() {
    let elements = vec![
        DocumentElement::paragraph("THEOREM 2.1. For all x > 0 we have x^2 > 0."),
        DocumentElement::paragraph("Some remark in between."),
        DocumentElement::paragraph("PROOF. Suppose x > 0. Then the claim follows."),
    ];
    let refined = SemanticRefiner::new().unwrap().refine(elements, 4);

    let kinds: Vec<_> = refined.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![ElementKind::Theorem, ElementKind::Paragraph, ElementKind::Proof]
    );
    assert_eq!(refined[0].label.as_deref(), Some("2.1"));
    assert_eq!(refined[0].environment, Some(TheoremEnv::Theorem));
    assert_eq!(refined[0].text_str(), "For all x > 0 we have x^2 > 0.");
    assert_eq!(refined[2].text_str(), "Suppose x > 0. Then the claim follows.");
}

#[test]
fn test_full_page_kinds() {
    let page = PageProcessor::new().unwrap().process(0, &paper_page());
    let kinds: Vec<_> = page.elements.iter().map(|e| e.kind).collect();

    assert_eq!(
        kinds,
        vec![
            ElementKind::Title,
            ElementKind::Abstract,
            ElementKind::Section,
            ElementKind::Paragraph,
            ElementKind::Math,
            ElementKind::ListItem,
            ElementKind::ListItem,
            ElementKind::Theorem,
            ElementKind::Proof,
            ElementKind::Image,
        ]
    );
    assert_eq!(
        page.elements[3].text_str(),
        "Tables are everywhere and hard to parse."
    );
    assert_eq!(page.elements[4].latex_str(), "a^2 + b^2 = c^2 \\tag{1}");
    assert_eq!(page.elements[7].label.as_deref(), Some("2.1"));

    let metadata = page.elements[0].metadata.as_ref().unwrap();
    assert_eq!(metadata.raw_label.as_deref(), Some("Title"));
}

#[test]
fn test_abstract_only_on_first_page() {
    let page = PageProcessor::new().unwrap().process(1, &paper_page());
    assert_eq!(page.elements[1].kind, ElementKind::Paragraph);
}

#[test]
fn test_assembly_is_deterministic() {
    let input = paper_page();
    let first = assemble_page(&input.blocks, &input.contents).unwrap();
    for _ in 0..5 {
        let again = assemble_page(&input.blocks, &input.contents).unwrap();
        assert_eq!(first, again);
    }
}

#[test]
fn test_section_header_lowercase_downgraded() {
    let classifier = BlockClassifier::new().unwrap();
    let block = text_block(0.5, 0.52).with_label("Section-header");

    assert_eq!(classifier.classify(&block, "Related Work"), BlockClass::Section);
    assert_eq!(
        classifier.classify(&block, "continued from the last page"),
        BlockClass::Text
    );
}

#[test]
fn test_font_thresholds_configurable() {
    let config = ClassifierConfig {
        section_size: 14.0,
        ..Default::default()
    };
    let classifier = BlockClassifier::with_config(config).unwrap();
    let block = text_block(0.2, 0.22).on_page(2).with_font(15.0, false);

    assert_eq!(classifier.classify(&block, "Method Overview"), BlockClass::Section);
    assert_eq!(
        BlockClassifier::new()
            .unwrap()
            .classify(&block, "Method Overview"),
        BlockClass::Text
    );
}

#[test]
fn test_custom_gap_threshold() {
    let blocks = vec![text_block(0.40, 0.42), text_block(0.45, 0.47)];
    let contents = vec![text("Sentence one."), text("Sentence two.")];

    let merged = BlockAssembler::new().unwrap().assemble(&blocks, &contents);
    assert_eq!(merged.len(), 1);

    let config = AssemblerConfig {
        large_gap: 0.02,
        ..Default::default()
    };
    let split = BlockAssembler::with_config(config, ClassifierConfig::default())
        .unwrap()
        .assemble(&blocks, &contents);
    assert_eq!(split.len(), 2);
}

#[test]
fn test_run_on_section_split() {
    let long = "INTRODUCTION AND MOTIVATION Tables carry a large share of the \
                numbers reported in scientific papers, yet scanned copies lose \
                every bit of their structure along the way.";
    let refined = SemanticRefiner::new()
        .unwrap()
        .refine(vec![DocumentElement::paragraph(long)], 3);

    assert_eq!(refined.len(), 2);
    assert_eq!(refined[0].kind, ElementKind::Section);
    assert_eq!(refined[0].text_str(), "INTRODUCTION AND MOTIVATION");
    assert_eq!(refined[1].kind, ElementKind::Paragraph);
    assert!(refined[1].text_str().starts_with("Tables carry"));
}
