//! Error types for slide deck generation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading sources or writing decks.
///
/// Missing optional markup is never an error; the extractor degrades to empty
/// fields instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open, read or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The source document is not valid UTF-8.
    #[error("Failed to decode {path}: {message}")]
    DecodeError { path: String, message: String },

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML writing or parsing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),

    /// Deck description, manifest or theme could not be (de)serialized.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A package is missing a required part or is structurally broken.
    #[error("Invalid package: {0}")]
    InvalidPackage(String),
}
