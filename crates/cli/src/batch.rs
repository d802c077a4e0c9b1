//! Batch conversion driven by a JSON manifest.

use crate::convert::Converter;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

fn default_input_file() -> String {
    "01-one-pager.html".to_string()
}

fn default_output_file() -> String {
    "01-one-pager.pptx".to_string()
}

/// List of report folders to convert.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// Directory the entry folders live in. Relative roots are resolved
    /// against the manifest's own directory.
    pub root: PathBuf,
    #[serde(default = "default_input_file")]
    pub input_file: String,
    #[serde(default = "default_output_file")]
    pub output_file: String,
    pub entries: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    pub folder: String,
    /// Display name used in log output.
    pub name: String,
}

impl Manifest {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        let mut manifest: Manifest = serde_json::from_str(&content)
            .with_context(|| format!("Invalid manifest {}", path.display()))?;

        if manifest.root.is_relative() {
            if let Some(parent) = path.parent() {
                manifest.root = parent.join(&manifest.root);
            }
        }

        Ok(manifest)
    }

    fn input_path(&self, entry: &ManifestEntry) -> PathBuf {
        self.root.join(&entry.folder).join(&self.input_file)
    }

    fn output_path(&self, entry: &ManifestEntry) -> PathBuf {
        self.root.join(&entry.folder).join(&self.output_file)
    }
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub converted: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Convert every entry. Missing inputs are skipped and failures are
/// recorded; neither stops the batch.
pub fn run(manifest: &Manifest, converter: &Converter) -> BatchReport {
    let mut report = BatchReport::default();

    for entry in &manifest.entries {
        let input = manifest.input_path(entry);
        if !input.is_file() {
            log::warn!("Skipping {}: {} not found", entry.name, input.display());
            report.skipped.push(input);
            continue;
        }

        let output = manifest.output_path(entry);
        match converter.convert(&input, &output) {
            Ok(_) => {
                log::info!("Converted {} -> {}", entry.name, output.display());
                report.converted.push(output);
            }
            Err(e) => {
                log::error!("Failed to convert {}: {:#}", entry.name, e);
                report.failed.push((input, format!("{:#}", e)));
            }
        }
    }

    report
}
