//! Single-document conversion: HTML one-pager to a one-slide .pptx.

use anyhow::{Context, Result};
use deck_core::{ExtractedRecord, OnePagerLayout, Theme};
use deck_html::HtmlExtractor;
use deck_pptx::PptxWriter;
use std::path::{Path, PathBuf};

/// Extract, render and write in one step.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    extractor: HtmlExtractor,
    layout: OnePagerLayout,
    writer: PptxWriter,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.layout = self.layout.with_theme(theme);
        self
    }

    /// Convert `input` and write the result to `output`.
    pub fn convert(&self, input: &Path, output: &Path) -> Result<ExtractedRecord> {
        let record = self
            .extractor
            .extract_file(input)
            .with_context(|| format!("Failed to extract {}", input.display()))?;

        let canvas = self.layout.render(&record);
        let writer = if record.title.is_empty() {
            self.writer.clone()
        } else {
            self.writer.clone().with_title(record.title.clone())
        };

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        writer
            .save(&[canvas], output)
            .with_context(|| format!("Failed to write {}", output.display()))?;

        Ok(record)
    }
}

/// Determine the output path for a converted file.
pub fn get_output_path(input_path: &Path, output_dir: Option<&PathBuf>) -> Result<PathBuf> {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let output_filename = format!("{}.pptx", stem);

    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(output_filename)
        }
        None => match input_path.parent() {
            Some(parent) => parent.join(output_filename),
            None => PathBuf::from(output_filename),
        },
    };

    Ok(output_path)
}
