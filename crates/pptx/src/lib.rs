//! PPTX (Office Open XML) backend for slide decks.
//!
//! Writes rendered canvases as .pptx packages (ZIP archives of XML parts)
//! and reads them back for inspection.

pub mod package;
pub mod reader;
pub mod writer;

pub use reader::{DeckContents, PptxReader, RunContents, ShapeContents, SlideContents};
pub use writer::PptxWriter;
