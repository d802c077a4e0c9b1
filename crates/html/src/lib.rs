//! HTML one-pager extractor.
//!
//! Parses the semi-structured one-pager markup (main heading, overview with
//! highlighted spans, callouts, a summary table and a footer) into an
//! [`deck_core::ExtractedRecord`].

pub mod extractor;

pub use extractor::HtmlExtractor;
