//! Domain types for content extracted from an HTML one-pager.

use serde::{Deserialize, Serialize};

/// Everything the one-pager layout needs, pulled out of a single source document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// Main heading text.
    pub title: String,

    /// Overview paragraph.
    pub overview_text: String,

    /// Emphasized substrings of the overview, in document order (duplicates kept).
    pub overview_highlights: Vec<String>,

    /// Byte offsets of each highlight inside `overview_text`.
    ///
    /// Filled by the extractor while it assembles the overview. Records built by
    /// hand may leave this empty, in which case the layout locates highlights by
    /// substring search.
    #[serde(default)]
    pub highlight_spans: Vec<HighlightSpan>,

    /// Callout blocks, in document order.
    pub callouts: Vec<Callout>,

    /// Column labels of the first table.
    pub table_headers: Vec<String>,

    /// Body rows of the first table. Rows may be ragged.
    pub table_rows: Vec<Vec<String>>,

    /// Footer fragments joined with [`FOOTER_SEPARATOR`].
    pub footer_contact: String,
}

/// Separator placed between footer text fragments.
pub const FOOTER_SEPARATOR: &str = " | ";

impl ExtractedRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a highlight with its location in the overview.
    ///
    /// Keeps `overview_highlights` and `highlight_spans` in step.
    pub fn push_highlight(&mut self, span: HighlightSpan) {
        if let Some(text) = self.overview_text.get(span.start..span.end) {
            self.overview_highlights.push(text.to_string());
            self.highlight_spans.push(span);
        }
    }

    /// Whether the recorded spans agree with the highlight strings and are
    /// ordered without overlap.
    pub fn spans_are_consistent(&self) -> bool {
        if self.highlight_spans.len() != self.overview_highlights.len() {
            return false;
        }

        let mut last_end = 0;
        for (span, text) in self.highlight_spans.iter().zip(&self.overview_highlights) {
            if span.start < last_end || span.start > span.end {
                return false;
            }
            match self.overview_text.get(span.start..span.end) {
                Some(slice) if slice == text => {}
                _ => return false,
            }
            last_end = span.end;
        }

        true
    }

    /// The first body row, which is the only one the one-pager layout shows.
    pub fn summary_row(&self) -> Option<&[String]> {
        self.table_rows.first().map(Vec::as_slice)
    }
}

/// Half-open byte range `[start, end)` into the overview text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
}

impl HighlightSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// A titled block of emphasized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Callout {
    pub kind: CalloutKind,
    pub title: String,
    pub content: String,
}

impl Callout {
    pub fn new(kind: CalloutKind, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Semantic kind of a callout, which picks its colors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalloutKind {
    Critical,
    Recommendation,
    BottomLine,
    #[default]
    Default,
}

/// Class markers checked in priority order; the first one present wins.
pub const CALLOUT_MARKERS: &[(&str, CalloutKind)] = &[
    ("critical-finding", CalloutKind::Critical),
    ("recommendation", CalloutKind::Recommendation),
    ("bottom-line", CalloutKind::BottomLine),
];

impl CalloutKind {
    /// Classify a callout from the classes on its container element.
    pub fn classify<'a, I>(classes: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let classes: Vec<&str> = classes.into_iter().collect();

        CALLOUT_MARKERS
            .iter()
            .find(|(marker, _)| classes.contains(marker))
            .map(|&(_, kind)| kind)
            .unwrap_or(CalloutKind::Default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_markers() {
        assert_eq!(
            CalloutKind::classify(["callout-container", "critical-finding"]),
            CalloutKind::Critical
        );
        assert_eq!(
            CalloutKind::classify(["callout-container", "recommendation"]),
            CalloutKind::Recommendation
        );
        assert_eq!(
            CalloutKind::classify(["bottom-line", "callout-container"]),
            CalloutKind::BottomLine
        );
    }

    #[test]
    fn test_classify_priority_ignores_attribute_order() {
        // critical-finding outranks recommendation wherever it appears
        assert_eq!(
            CalloutKind::classify(["recommendation", "critical-finding"]),
            CalloutKind::Critical
        );
        assert_eq!(
            CalloutKind::classify(["bottom-line", "recommendation"]),
            CalloutKind::Recommendation
        );
    }

    #[test]
    fn test_classify_unknown_is_default() {
        assert_eq!(CalloutKind::classify(["callout-container"]), CalloutKind::Default);
        assert_eq!(CalloutKind::classify(["warning"]), CalloutKind::Default);
        assert_eq!(CalloutKind::classify(Vec::<&str>::new()), CalloutKind::Default);
    }

    #[test]
    fn test_push_highlight_tracks_text() {
        let mut record = ExtractedRecord::new();
        record.overview_text = "Tabby supports air-gapped deployments.".to_string();
        record.push_highlight(HighlightSpan::new(15, 25));

        assert_eq!(record.overview_highlights, vec!["air-gapped"]);
        assert!(record.spans_are_consistent());
    }

    #[test]
    fn test_push_highlight_out_of_range_is_ignored() {
        let mut record = ExtractedRecord::new();
        record.overview_text = "short".to_string();
        record.push_highlight(HighlightSpan::new(2, 40));

        assert!(record.overview_highlights.is_empty());
        assert!(record.highlight_spans.is_empty());
    }

    #[test]
    fn test_spans_inconsistent_when_overlapping() {
        let record = ExtractedRecord {
            overview_text: "abcdef".to_string(),
            overview_highlights: vec!["abcd".to_string(), "cdef".to_string()],
            highlight_spans: vec![HighlightSpan::new(0, 4), HighlightSpan::new(2, 6)],
            ..Default::default()
        };
        assert!(!record.spans_are_consistent());
    }

    #[test]
    fn test_spans_inconsistent_without_spans() {
        let record = ExtractedRecord {
            overview_text: "abc".to_string(),
            overview_highlights: vec!["b".to_string()],
            ..Default::default()
        };
        assert!(!record.spans_are_consistent());
    }

    #[test]
    fn test_record_json_without_spans() {
        let json = r#"{
            "title": "Tabby",
            "overview_text": "Tabby supports air-gapped deployments.",
            "overview_highlights": ["air-gapped"],
            "callouts": [{"kind": "bottom_line", "title": "Bottom Line", "content": "Go"}],
            "table_headers": [],
            "table_rows": [],
            "footer_contact": ""
        }"#;
        let record: ExtractedRecord = serde_json::from_str(json).unwrap();

        assert!(record.highlight_spans.is_empty());
        assert_eq!(record.callouts[0].kind, CalloutKind::BottomLine);
    }
}
