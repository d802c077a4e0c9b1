//! Splitting the overview paragraph into normal and emphasized segments.
//!
//! Segments always concatenate back to the original text. Two strategies are
//! available: exact spans recorded by the extractor, and a substring search
//! for records that only carry highlight strings.

use crate::types::{ExtractedRecord, HighlightSpan};

/// A contiguous piece of the overview text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub emphasized: bool,
}

impl<'a> Segment<'a> {
    fn normal(text: &'a str) -> Self {
        Self {
            text,
            emphasized: false,
        }
    }

    fn emphasized(text: &'a str) -> Self {
        Self {
            text,
            emphasized: true,
        }
    }
}

/// Split using byte spans.
///
/// Spans must be ordered, non-overlapping and on character boundaries; any
/// span that breaks those rules is skipped and its text stays normal.
pub fn split_by_spans<'a>(text: &'a str, spans: &[HighlightSpan]) -> Vec<Segment<'a>> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for span in spans {
        if span.is_empty() || span.start < cursor {
            continue;
        }
        let Some(highlight) = text.get(span.start..span.end) else {
            continue;
        };

        if span.start > cursor {
            segments.push(Segment::normal(&text[cursor..span.start]));
        }
        segments.push(Segment::emphasized(highlight));
        cursor = span.end;
    }

    if cursor < text.len() {
        segments.push(Segment::normal(&text[cursor..]));
    }

    segments
}

/// Locate highlights by substring search.
///
/// Each highlight, in order, is matched at its first occurrence at or after
/// the end of the previous match. A highlight that cannot be found there is
/// skipped. Repeated highlight strings therefore land on successive
/// occurrences, and a highlight lying inside an earlier match is not found.
pub fn locate_highlights(text: &str, highlights: &[String]) -> Vec<HighlightSpan> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    for highlight in highlights {
        if highlight.is_empty() {
            continue;
        }
        match text[cursor..].find(highlight.as_str()) {
            Some(offset) => {
                let start = cursor + offset;
                let end = start + highlight.len();
                spans.push(HighlightSpan::new(start, end));
                cursor = end;
            }
            None => {
                log::debug!("Highlight {:?} not found after byte {}", highlight, cursor);
            }
        }
    }

    spans
}

/// Split using substring search (see [`locate_highlights`]).
pub fn split_by_search<'a>(text: &'a str, highlights: &[String]) -> Vec<Segment<'a>> {
    split_by_spans(text, &locate_highlights(text, highlights))
}

/// Split a record's overview, preferring the extractor's spans when they are
/// consistent with the highlight strings.
pub fn overview_segments(record: &ExtractedRecord) -> Vec<Segment<'_>> {
    if !record.highlight_spans.is_empty() && record.spans_are_consistent() {
        split_by_spans(&record.overview_text, &record.highlight_spans)
    } else {
        split_by_search(&record.overview_text, &record.overview_highlights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join(segments: &[Segment<'_>]) -> String {
        segments.iter().map(|s| s.text).collect()
    }

    fn emphasized<'a>(segments: &[Segment<'a>]) -> Vec<&'a str> {
        segments
            .iter()
            .filter(|s| s.emphasized)
            .map(|s| s.text)
            .collect()
    }

    #[test]
    fn test_single_highlight() {
        let text = "Tabby supports air-gapped deployments.";
        let segments = split_by_search(text, &["air-gapped".to_string()]);

        assert_eq!(
            segments,
            vec![
                Segment::normal("Tabby supports "),
                Segment::emphasized("air-gapped"),
                Segment::normal(" deployments."),
            ]
        );
    }

    #[test]
    fn test_round_trip_with_edges() {
        let text = "alpha beta gamma";
        let highlights = vec!["alpha".to_string(), "gamma".to_string()];
        let segments = split_by_search(text, &highlights);

        assert_eq!(join(&segments), text);
        assert_eq!(emphasized(&segments), vec!["alpha", "gamma"]);
        assert_eq!(segments.len(), 3);
    }

    #[test]
    fn test_unmatched_highlight_is_skipped() {
        let text = "nothing to see";
        let segments = split_by_search(text, &["missing".to_string()]);

        assert_eq!(segments, vec![Segment::normal(text)]);
    }

    #[test]
    fn test_empty_text() {
        assert!(split_by_search("", &["x".to_string()]).is_empty());
        assert!(split_by_spans("", &[]).is_empty());
    }

    #[test]
    fn test_search_duplicate_highlights_use_successive_occurrences() {
        let text = "fast setup, fast answers";
        let highlights = vec!["fast".to_string(), "fast".to_string()];
        let spans = locate_highlights(text, &highlights);

        assert_eq!(spans, vec![HighlightSpan::new(0, 4), HighlightSpan::new(12, 16)]);
        assert_eq!(join(&split_by_search(text, &highlights)), text);
    }

    #[test]
    fn test_search_out_of_order_highlight_is_dropped() {
        // "beta" precedes "alpha"'s match cursor, so only the first is found
        let text = "beta alpha";
        let highlights = vec!["alpha".to_string(), "beta".to_string()];
        let segments = split_by_search(text, &highlights);

        assert_eq!(emphasized(&segments), vec!["alpha"]);
        assert_eq!(join(&segments), text);
    }

    #[test]
    fn test_search_nested_highlight_is_dropped() {
        // the second highlight sits inside the first match
        let text = "self-hosted models";
        let highlights = vec!["self-hosted".to_string(), "hosted".to_string()];
        let segments = split_by_search(text, &highlights);

        assert_eq!(emphasized(&segments), vec!["self-hosted"]);
        assert_eq!(join(&segments), text);
    }

    #[test]
    fn test_spans_skip_invalid_entries() {
        let text = "héllo world";
        // 2 is inside the two-byte 'é'
        let spans = vec![
            HighlightSpan::new(0, 2),
            HighlightSpan::new(7, 12),
            HighlightSpan::new(8, 10),
        ];
        let segments = split_by_spans(text, &spans);

        assert_eq!(join(&segments), text);
        assert_eq!(emphasized(&segments), vec!["world"]);
    }

    #[test]
    fn test_overview_prefers_spans() {
        // the search strategy would pick the first "fast"; the spans say second
        let record = ExtractedRecord {
            overview_text: "fast and fast".to_string(),
            overview_highlights: vec!["fast".to_string()],
            highlight_spans: vec![HighlightSpan::new(9, 13)],
            ..Default::default()
        };
        let segments = overview_segments(&record);

        assert_eq!(
            segments,
            vec![Segment::normal("fast and "), Segment::emphasized("fast")]
        );
    }

    #[test]
    fn test_overview_falls_back_when_spans_disagree() {
        let record = ExtractedRecord {
            overview_text: "fast and fast".to_string(),
            overview_highlights: vec!["and".to_string()],
            highlight_spans: vec![HighlightSpan::new(9, 13)],
            ..Default::default()
        };
        let segments = overview_segments(&record);

        assert_eq!(emphasized(&segments), vec!["and"]);
    }
}
