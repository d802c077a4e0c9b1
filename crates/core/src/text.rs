//! Text cleanup for extracted markup.
//!
//! Markup text arrives as fragments with source indentation and line breaks.
//! Everything shown on a slide is NFC normalized with whitespace runs
//! collapsed to a single space.

use crate::types::HighlightSpan;
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex to collapse any whitespace run (including newlines) into one space.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Control characters other than whitespace never reach a slide; most are
/// not even legal in XML 1.0.
fn is_invisible_control(c: char) -> bool {
    c.is_control() && !c.is_whitespace()
}

/// Normalizer for display text.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    /// Whether to apply Unicode NFC composition.
    compose: bool,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self { compose: true }
    }
}

impl TextNormalizer {
    /// Create a normalizer with NFC composition enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to apply NFC composition.
    pub fn with_composition(mut self, compose: bool) -> Self {
        self.compose = compose;
        self
    }

    /// Normalize a single piece of text: drop control characters, compose,
    /// collapse whitespace, trim.
    pub fn normalize(&self, text: &str) -> String {
        let composed = self.compose_text(text);
        WHITESPACE_COLLAPSE_REGEX
            .replace_all(&composed, " ")
            .trim()
            .to_string()
    }

    /// Normalize each fragment, drop the empty ones, and join the rest.
    pub fn join_fragments<'a, I>(&self, fragments: I, separator: &str) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        fragments
            .into_iter()
            .map(|f| self.normalize(f))
            .filter(|f| !f.is_empty())
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn compose_text(&self, text: &str) -> String {
        let visible = text.chars().filter(|&c| !is_invisible_control(c));
        if self.compose {
            visible.nfc().collect()
        } else {
            visible.collect()
        }
    }

    /// Start assembling text from fragments while recording emphasized spans.
    pub fn spanned(&self) -> SpannedTextBuilder<'_> {
        SpannedTextBuilder {
            normalizer: self,
            text: String::new(),
            pending_space: false,
            emphasis: None,
            spans: Vec::new(),
        }
    }
}

/// Builds normalized text out of fragments and remembers where emphasized
/// regions landed in the output.
///
/// Whitespace is collapsed across fragment boundaries, so offsets refer to the
/// final text. A space that separates an emphasized region from its
/// neighbours is never part of the span.
#[derive(Debug)]
pub struct SpannedTextBuilder<'a> {
    normalizer: &'a TextNormalizer,
    text: String,
    pending_space: bool,
    emphasis: Option<Option<HighlightSpan>>,
    spans: Vec<HighlightSpan>,
}

impl SpannedTextBuilder<'_> {
    /// Append a text fragment.
    pub fn push_text(&mut self, fragment: &str) {
        let composed = self.normalizer.compose_text(fragment);

        for c in composed.chars() {
            if c.is_whitespace() {
                self.pending_space = true;
                continue;
            }

            if self.pending_space && !self.text.is_empty() {
                self.text.push(' ');
            }
            self.pending_space = false;

            let start = self.text.len();
            self.text.push(c);
            let end = self.text.len();

            if let Some(current) = self.emphasis.as_mut() {
                match current {
                    Some(span) => span.end = end,
                    None => *current = Some(HighlightSpan::new(start, end)),
                }
            }
        }
    }

    /// Open an emphasized region. Nested calls are folded into the outer region.
    pub fn begin_emphasis(&mut self) -> bool {
        if self.emphasis.is_some() {
            return false;
        }
        self.emphasis = Some(None);
        true
    }

    /// Close the emphasized region. Regions that produced no visible text are
    /// dropped.
    pub fn end_emphasis(&mut self) {
        if let Some(Some(span)) = self.emphasis.take() {
            self.spans.push(span);
        }
    }

    /// Finish, returning the text and the emphasized spans in order.
    pub fn finish(mut self) -> (String, Vec<HighlightSpan>) {
        self.end_emphasis();
        (self.text, self.spans)
    }
}
