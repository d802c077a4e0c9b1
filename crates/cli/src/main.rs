//! CLI tool for turning HTML one-pagers and deck descriptions into PowerPoint files.

mod batch;
mod convert;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use convert::{get_output_path, Converter};
use deck_core::{DeckBuilder, DeckSpec, Theme};
use deck_html::HtmlExtractor;
use deck_pptx::{PptxReader, PptxWriter};
use std::path::{Path, PathBuf};

/// Generate PowerPoint decks from HTML one-pagers and JSON deck descriptions.
#[derive(Parser, Debug)]
#[command(name = "deckgen")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Theme override file (JSON); missing fields keep the default palette
    #[arg(long, global = true)]
    theme: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert HTML one-pager(s) to single-slide .pptx files
    Convert {
        /// Input HTML file(s)
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Output directory (default: same as input file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert every report folder listed in a manifest
    Batch {
        /// Manifest file (JSON)
        manifest: PathBuf,
    },

    /// Build a multi-slide deck from a JSON description
    Deck {
        /// Deck description file (JSON)
        input: PathBuf,

        /// Output .pptx file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the fields extracted from an HTML one-pager as JSON
    Extract {
        /// Input HTML file
        input: PathBuf,
    },

    /// Print the text of each slide in a .pptx file
    Inspect {
        /// Input .pptx file
        input: PathBuf,

        /// Print shapes, runs and colors as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let theme = load_theme(args.theme.as_deref())?;

    match &args.command {
        Command::Convert { input, output } => run_convert(input, output.as_ref(), theme, args.verbose),
        Command::Batch { manifest } => run_batch(manifest, theme),
        Command::Deck { input, output } => run_deck(input, output, theme, args.verbose),
        Command::Extract { input } => run_extract(input),
        Command::Inspect { input, json } => run_inspect(input, *json),
    }
}

fn load_theme(path: Option<&Path>) -> Result<Theme> {
    match path {
        Some(path) => Theme::from_json_file(path)
            .with_context(|| format!("Failed to load theme {}", path.display())),
        None => Ok(Theme::default()),
    }
}

fn run_convert(inputs: &[PathBuf], output_dir: Option<&PathBuf>, theme: Theme, verbose: bool) -> Result<()> {
    let converter = Converter::new().with_theme(theme);
    let mut failures = 0;

    for input_path in inputs {
        if verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        let output_path = get_output_path(input_path, output_dir)?;
        match converter.convert(input_path, &output_path) {
            Ok(_) => {
                if verbose {
                    eprintln!("Written to: {}", output_path.display());
                }
            }
            Err(e) => {
                log::error!("Error processing {}: {:#}", input_path.display(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} documents failed", failures, inputs.len());
    }
    Ok(())
}

fn run_batch(manifest_path: &Path, theme: Theme) -> Result<()> {
    let manifest = batch::Manifest::from_file(manifest_path)?;
    let report = batch::run(&manifest, &Converter::new().with_theme(theme));

    eprintln!(
        "Converted {}, skipped {}, failed {}",
        report.converted.len(),
        report.skipped.len(),
        report.failed.len()
    );

    if !report.is_success() {
        bail!("{} documents failed", report.failed.len());
    }
    Ok(())
}

fn run_deck(input: &Path, output: &Path, theme: Theme, verbose: bool) -> Result<()> {
    let spec = DeckSpec::from_json_file(input)
        .with_context(|| format!("Failed to load deck description {}", input.display()))?;
    let canvases = DeckBuilder::new().with_theme(theme).build(&spec);

    if verbose {
        eprintln!("  Built {} slides", canvases.len());
    }

    PptxWriter::new()
        .save(&canvases, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if verbose {
        eprintln!("Written to: {}", output.display());
    }
    Ok(())
}

fn run_extract(input: &Path) -> Result<()> {
    let record = HtmlExtractor::new()
        .extract_file(input)
        .with_context(|| format!("Failed to extract {}", input.display()))?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn run_inspect(input: &Path, json: bool) -> Result<()> {
    let deck = PptxReader::new()
        .read_file(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&deck)?);
        return Ok(());
    }

    for slide in &deck.slides {
        println!("--- Slide {} ---", slide.number);
        for line in slide.lines() {
            println!("{}", line);
        }
    }
    Ok(())
}
