//! End-to-end checks: HTML one-pager and deck descriptions through to a
//! written .pptx that is read back.

use chrono::{TimeZone, Utc};
use deck_core::{Color, DeckBuilder, DeckSpec, OnePagerLayout, Theme};
use deck_html::HtmlExtractor;
use deck_pptx::writer::slide_xml;
use deck_pptx::{DeckContents, PptxReader, PptxWriter};
use std::io::Cursor;

const TABBY: &str = r#"<!DOCTYPE html>
<html>
<body>
  <h1>Tabby</h1>
  <div class="overview-text">
    Tabby supports <span class="purple-highlight">air-gapped</span> deployments.
  </div>
  <div class="callout-container critical-finding">
    <div class="callout-title">Risk</div>
    <div class="callout-content">None known</div>
  </div>
  <table>
    <tr><th>Tool</th><th>Score</th></tr>
    <tr><td>Tabby</td><td>9/10</td></tr>
  </table>
  <div class="footer-info">Contact: a@b.com</div>
</body>
</html>"#;

fn convert(html: &str) -> DeckContents {
    let record = HtmlExtractor::new().extract(html);
    let canvas = OnePagerLayout::new().render(&record);
    let bytes = PptxWriter::new().to_bytes(&[canvas]).unwrap();
    PptxReader::new().read(Cursor::new(bytes)).unwrap()
}

#[test]
fn test_tabby_round_trip() {
    let theme = Theme::default();
    let deck = convert(TABBY);

    assert_eq!(deck.slide_size, Some((12_192_000, 6_858_000)));
    assert_eq!(deck.slides.len(), 1);
    let slide = &deck.slides[0];

    assert_eq!(slide.lines().first().copied(), Some("Tabby"));

    let highlighted = slide
        .shapes
        .iter()
        .flat_map(|s| s.runs.iter())
        .find(|r| r.text == "air-gapped")
        .expect("highlight run");
    assert!(highlighted.bold);
    assert_eq!(highlighted.color, Some(Color::rgb(0x75, 0x00, 0xC0)));

    let overview = slide
        .find_text("Tabby supports air-gapped deployments.")
        .expect("overview shape");
    assert_eq!(overview.runs.len(), 3);

    let first_banner = slide
        .shapes
        .iter()
        .find(|s| s.fill.is_some() && s.fill != Some(theme.brand))
        .expect("banner");
    assert_eq!(first_banner.fill, Some(Color::rgb(0xFE, 0xF3, 0xC7)));

    let header_cells = slide
        .shapes
        .iter()
        .filter(|s| s.fill == Some(theme.brand) && !s.text.is_empty())
        .count();
    assert_eq!(header_cells, 2);

    assert!(slide.find_text("Contact: a@b.com").is_some());
    assert!(slide.find_text("Risk").is_some());
    assert!(slide.find_text("9/10").is_some());
}

#[test]
fn test_missing_overview_still_writes() {
    let deck = convert("<h1>Only a title</h1>");
    let slide = &deck.slides[0];

    assert_eq!(slide.lines().first().copied(), Some("Only a title"));
    // overview box is present but empty
    assert!(slide.shapes.iter().filter(|s| s.text.is_empty()).count() >= 2);
}

#[test]
fn test_rendering_is_idempotent() {
    let record = HtmlExtractor::new().extract(TABBY);
    let layout = OnePagerLayout::new();

    let first = layout.render(&record);
    let second = layout.render(&record);
    assert_eq!(first, second);
    assert_eq!(slide_xml(&first).unwrap(), slide_xml(&second).unwrap());

    let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let writer = PptxWriter::new().with_created(created);
    assert_eq!(
        writer.to_bytes(&[first]).unwrap(),
        writer.to_bytes(&[second]).unwrap()
    );
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("01-one-pager.html");
    let output = dir.path().join("01-one-pager.pptx");
    std::fs::write(&input, TABBY).unwrap();

    let record = HtmlExtractor::new().extract_file(&input).unwrap();
    let canvas = OnePagerLayout::new().render(&record);
    PptxWriter::new()
        .with_title(record.title.clone())
        .save(&[canvas], &output)
        .unwrap();

    let deck = PptxReader::new().read_file(&output).unwrap();
    assert_eq!(deck.slides.len(), 1);
    assert!(deck.slides[0].find_text("Tabby").is_some());
}

#[test]
fn test_deck_description_round_trip() {
    let spec = DeckSpec::from_json(
        r#"{
            "slides": [
                { "kind": "title", "title": "AI Coding Tools", "subtitle": "Evaluation" },
                { "kind": "bullets", "title": "Findings", "items": ["One", "Two"] },
                { "kind": "table", "title": "Scores", "headers": ["Tool", "Score"],
                  "rows": [["Tabby", "9.0"], ["Other", "6.5"]] },
                { "kind": "summary", "title": "Wrap-up", "takeaways": ["Ship it"] }
            ]
        }"#,
    )
    .unwrap();

    let canvases = DeckBuilder::new().build(&spec);
    let bytes = PptxWriter::new().to_bytes(&canvases).unwrap();
    let deck = PptxReader::new().read(Cursor::new(bytes)).unwrap();

    assert_eq!(deck.slide_size, Some((spec.slide_width, spec.slide_height)));
    assert_eq!(deck.slides.len(), 4);
    assert_eq!(
        deck.slides.iter().map(|s| s.number).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
    assert!(deck.slides[0].find_text("AI Coding Tools").is_some());
    assert!(deck.slides[2].find_text("Tabby").is_some());
    assert!(deck.slides[3].find_text("Wrap-up").is_some());
}

#[test]
fn test_control_characters_never_reach_slide_xml() {
    let html = "<h1>Tabby\u{1}Pro\u{1B}</h1><div class=\"overview-text\">a\u{8}b</div>";
    let record = HtmlExtractor::new().extract(html);

    assert_eq!(record.title, "TabbyPro");
    assert_eq!(record.overview_text, "ab");

    let canvas = OnePagerLayout::new().render(&record);
    let xml = slide_xml(&canvas).unwrap();
    assert!(!xml
        .chars()
        .any(|c| matches!(c, '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}')));

    let bytes = PptxWriter::new().to_bytes(&[canvas]).unwrap();
    let deck = PptxReader::new().read(Cursor::new(bytes)).unwrap();
    assert_eq!(deck.slides[0].lines().first().copied(), Some("TabbyPro"));
    assert!(deck.slides[0].find_text("ab").is_some());
}
