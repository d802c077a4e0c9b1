//! HTML one-pager extractor implementation.

use deck_core::text::SpannedTextBuilder;
use deck_core::types::FOOTER_SEPARATOR;
use deck_core::{Callout, CalloutKind, Error, ExtractedRecord, Result, TextNormalizer};
use scraper::{ElementRef, Html, Selector};
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static OVERVIEW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.overview-text").unwrap());
static CALLOUT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.callout-container").unwrap());
static CALLOUT_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.callout-title").unwrap());
static CALLOUT_CONTENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.callout-content").unwrap());
static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static HEADER_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").unwrap());
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static DATA_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static FOOTER: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.footer-info").unwrap());

/// Class marking an emphasized span inside the overview.
const HIGHLIGHT_CLASS: &str = "purple-highlight";

/// Elements whose text never reaches a slide.
const SKIPPED_ELEMENTS: &[&str] = &["svg", "script", "style"];

/// Extractor for HTML one-pagers.
///
/// Missing structure never fails extraction; each absent element leaves its
/// field empty.
#[derive(Debug, Clone, Default)]
pub struct HtmlExtractor {
    normalizer: TextNormalizer,
}

impl HtmlExtractor {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom text normalizer.
    pub fn with_normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Read and extract a one-pager from disk.
    pub fn extract_file(&self, path: impl AsRef<Path>) -> Result<ExtractedRecord> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let html = decode(bytes, &path.display().to_string())?;
        Ok(self.extract(&html))
    }

    /// Read and extract a one-pager from a reader.
    pub fn extract_reader<R: Read>(&self, mut reader: R, name: &str) -> Result<ExtractedRecord> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let html = decode(bytes, name)?;
        Ok(self.extract(&html))
    }

    /// Extract a one-pager from HTML text.
    pub fn extract(&self, html: &str) -> ExtractedRecord {
        let document = Html::parse_document(html);
        let mut record = ExtractedRecord::new();

        if let Some(title) = document.select(&TITLE).next() {
            record.title = self.element_text(title);
        }

        if let Some(overview) = document.select(&OVERVIEW).next() {
            let mut builder = self.normalizer.spanned();
            collect_spanned(overview, &mut builder);
            let (text, spans) = builder.finish();

            record.overview_text = text;
            for span in spans {
                record.push_highlight(span);
            }
        } else {
            log::debug!("No overview container found");
        }

        record.callouts = document
            .select(&CALLOUT)
            .filter_map(|container| self.callout(container))
            .collect();

        if let Some(table) = document.select(&TABLE).next() {
            record.table_headers = table
                .select(&HEADER_CELL)
                .map(|th| self.element_text(th))
                .collect();
            record.table_rows = table
                .select(&ROW)
                .skip(1)
                .map(|tr| tr.select(&DATA_CELL).map(|td| self.element_text(td)).collect())
                .collect();
        }

        if let Some(footer) = document.select(&FOOTER).next() {
            let mut fragments = Vec::new();
            collect_text(footer, &mut fragments);
            record.footer_contact = self.normalizer.join_fragments(fragments, FOOTER_SEPARATOR);
        }

        log::debug!(
            "Extracted '{}': {} highlights, {} callouts, {} table rows",
            record.title,
            record.overview_highlights.len(),
            record.callouts.len(),
            record.table_rows.len()
        );

        record
    }

    /// A callout, or `None` when its title or content element is missing.
    fn callout(&self, container: ElementRef<'_>) -> Option<Callout> {
        let title = container.select(&CALLOUT_TITLE).next();
        let content = container.select(&CALLOUT_CONTENT).next();

        match (title, content) {
            (Some(title), Some(content)) => Some(Callout::new(
                CalloutKind::classify(container.value().classes()),
                self.element_text(title),
                self.element_text(content),
            )),
            _ => {
                log::debug!("Skipping callout without title or content");
                None
            }
        }
    }

    fn element_text(&self, element: ElementRef<'_>) -> String {
        let mut fragments = Vec::new();
        collect_text(element, &mut fragments);
        self.normalizer.normalize(&fragments.concat())
    }
}

fn decode(bytes: Vec<u8>, name: &str) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| Error::DecodeError {
        path: name.to_string(),
        message: e.to_string(),
    })
}

fn is_skipped(element: &ElementRef<'_>) -> bool {
    SKIPPED_ELEMENTS.contains(&element.value().name())
}

/// Visible text nodes below `element`, in document order.
fn collect_text<'a>(element: ElementRef<'a>, out: &mut Vec<&'a str>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            if !is_skipped(&child) {
                collect_text(child, out);
            }
        }
    }
}

/// Feed the overview into `builder`, marking highlight spans as they occur.
fn collect_spanned(element: ElementRef<'_>, builder: &mut SpannedTextBuilder<'_>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            builder.push_text(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            if is_skipped(&child) {
                continue;
            }

            let highlight = child.value().name() == "span"
                && child.value().classes().any(|c| c == HIGHLIGHT_CLASS);
            let opened = highlight && builder.begin_emphasis();

            collect_spanned(child, builder);

            if opened {
                builder.end_emphasis();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::HighlightSpan;
    use std::io::Write;

    const ONE_PAGER: &str = r#"<!DOCTYPE html>
<html>
<head><title>ignored</title><style>.x { color: red; }</style></head>
<body>
  <h1>Tabby</h1>
  <div class="overview-text">
    Tabby supports <span class="purple-highlight">air-gapped</span> deployments.
  </div>
  <div class="callout-container critical-finding">
    <div class="callout-title"><svg><text>!</text></svg>Risk</div>
    <div class="callout-content">None known</div>
  </div>
  <table>
    <tr><th>Tool</th><th>Score</th></tr>
    <tr><td>Tabby</td><td> 9/10 </td></tr>
  </table>
  <div class="footer-info"><span>Contact: a@b.com</span></div>
</body>
</html>"#;

    #[test]
    fn test_extract_minimal_one_pager() {
        let record = HtmlExtractor::new().extract(ONE_PAGER);

        assert_eq!(record.title, "Tabby");
        assert_eq!(record.overview_text, "Tabby supports air-gapped deployments.");
        assert_eq!(record.overview_highlights, vec!["air-gapped"]);
        assert_eq!(record.highlight_spans, vec![HighlightSpan::new(15, 25)]);
        assert_eq!(
            record.callouts,
            vec![Callout::new(CalloutKind::Critical, "Risk", "None known")]
        );
        assert_eq!(record.table_headers, vec!["Tool", "Score"]);
        assert_eq!(record.table_rows, vec![vec!["Tabby", "9/10"]]);
        assert_eq!(record.footer_contact, "Contact: a@b.com");
        assert!(record.spans_are_consistent());
    }

    #[test]
    fn test_empty_document_degrades_to_empty_fields() {
        let record = HtmlExtractor::new().extract("<html><body><p>nothing</p></body></html>");
        assert_eq!(record, ExtractedRecord::new());
    }

    #[test]
    fn test_missing_overview() {
        let record = HtmlExtractor::new().extract("<h1>Only a title</h1>");

        assert_eq!(record.title, "Only a title");
        assert!(record.overview_text.is_empty());
        assert!(record.overview_highlights.is_empty());
    }

    #[test]
    fn test_duplicate_highlights_kept_with_positions() {
        let html = r#"<div class="overview-text">
            <span class="purple-highlight">fast</span> setup and
            <span class="purple-highlight">fast</span> answers
        </div>"#;
        let record = HtmlExtractor::new().extract(html);

        assert_eq!(record.overview_text, "fast setup and fast answers");
        assert_eq!(record.overview_highlights, vec!["fast", "fast"]);
        assert_eq!(
            record.highlight_spans,
            vec![HighlightSpan::new(0, 4), HighlightSpan::new(15, 19)]
        );
    }

    #[test]
    fn test_highlight_with_nested_markup() {
        let html = r#"<div class="overview-text">Runs
            <span class="purple-highlight">fully <b>offline</b></span>.</div>"#;
        let record = HtmlExtractor::new().extract(html);

        assert_eq!(record.overview_text, "Runs fully offline.");
        assert_eq!(record.overview_highlights, vec!["fully offline"]);
    }

    #[test]
    fn test_highlight_outside_overview_ignored() {
        let html = r#"<div class="overview-text">plain</div>
            <p><span class="purple-highlight">elsewhere</span></p>"#;
        let record = HtmlExtractor::new().extract(html);

        assert!(record.overview_highlights.is_empty());
    }

    #[test]
    fn test_callout_kinds_and_skips() {
        let html = r#"
            <div class="callout-container recommendation">
              <div class="callout-title">Recommendation</div>
              <div class="callout-content">Pilot with five developers</div>
            </div>
            <div class="callout-container">
              <div class="callout-title">No content here</div>
            </div>
            <div class="callout-container bottom-line">
              <div class="callout-title">Bottom Line</div>
              <div class="callout-content">Proceed</div>
            </div>
            <div class="callout-container mystery">
              <div class="callout-title">Note</div>
              <div class="callout-content">Plain</div>
            </div>"#;
        let record = HtmlExtractor::new().extract(html);
        let kinds: Vec<_> = record.callouts.iter().map(|c| c.kind).collect();

        assert_eq!(
            kinds,
            vec![
                CalloutKind::Recommendation,
                CalloutKind::BottomLine,
                CalloutKind::Default
            ]
        );
        assert_eq!(record.callouts[0].content, "Pilot with five developers");
    }

    #[test]
    fn test_ragged_table_rows_kept() {
        let html = r#"<table>
            <tr><th>A</th><th>B</th><th>C</th></tr>
            <tr><td>1</td></tr>
            <tr><td>1</td><td>2</td><td>3</td><td>4</td></tr>
        </table>
        <table><tr><th>second table</th></tr></table>"#;
        let record = HtmlExtractor::new().extract(html);

        assert_eq!(record.table_headers, vec!["A", "B", "C"]);
        assert_eq!(record.table_rows.len(), 2);
        assert_eq!(record.table_rows[0], vec!["1"]);
        assert_eq!(record.table_rows[1].len(), 4);
    }

    #[test]
    fn test_footer_fragments_joined() {
        let html = r#"<div class="footer-info">
            <span>Contact: a@b.com</span>
            <span>Research Team</span>
            <span>  </span>
            December 2025
        </div>"#;
        let record = HtmlExtractor::new().extract(html);

        assert_eq!(
            record.footer_contact,
            "Contact: a@b.com | Research Team | December 2025"
        );
    }

    #[test]
    fn test_extract_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ONE_PAGER.as_bytes()).unwrap();

        let record = HtmlExtractor::new().extract_file(file.path()).unwrap();
        assert_eq!(record.title, "Tabby");
    }

    #[test]
    fn test_extract_file_missing() {
        let result = HtmlExtractor::new().extract_file("/nonexistent/01-one-pager.html");
        assert!(matches!(result, Err(Error::IoError(_))));
    }

    #[test]
    fn test_extract_reader_rejects_invalid_utf8() {
        let bytes: &[u8] = &[0x3c, 0x68, 0x31, 0x3e, 0xff, 0xfe];
        let result = HtmlExtractor::new().extract_reader(bytes, "broken.html");

        assert!(matches!(result, Err(Error::DecodeError { .. })));
    }
}
