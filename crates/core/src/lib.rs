//! Core domain types, text cleanup, slide layouts and deck builders for
//! turning HTML one-pagers and deck descriptions into PowerPoint slides.

pub mod canvas;
pub mod deck;
pub mod error;
pub mod layout;
pub mod segments;
pub mod text;
pub mod theme;
pub mod types;

pub use canvas::{Canvas, Color, Shape};
pub use deck::{DeckBuilder, DeckSpec, SlideSpec};
pub use error::{Error, Result};
pub use layout::OnePagerLayout;
pub use text::TextNormalizer;
pub use theme::Theme;
pub use types::{Callout, CalloutKind, ExtractedRecord, HighlightSpan};
