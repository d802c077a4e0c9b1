//! PPTX file reader, used to inspect generated decks.

use crate::package;
use deck_core::{Color, Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Text and geometry recovered from a PPTX package.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeckContents {
    /// Slide width and height in EMU.
    pub slide_size: Option<(i64, i64)>,
    pub slides: Vec<SlideContents>,
}

impl DeckContents {
    /// Total number of shapes across all slides.
    pub fn shape_count(&self) -> usize {
        self.slides.iter().map(|s| s.shapes.len()).sum()
    }
}

/// One slide's shapes in document order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SlideContents {
    /// 1-based slide number.
    pub number: usize,
    pub background: Option<Color>,
    pub shapes: Vec<ShapeContents>,
}

impl SlideContents {
    fn new(number: usize) -> Self {
        Self {
            number,
            ..Default::default()
        }
    }

    /// Non-empty shape texts, top-to-bottom then left-to-right.
    pub fn lines(&self) -> Vec<&str> {
        let mut shapes: Vec<&ShapeContents> =
            self.shapes.iter().filter(|s| !s.text.is_empty()).collect();
        shapes.sort_by(|a, b| a.y.cmp(&b.y).then(a.x.cmp(&b.x)));
        shapes.into_iter().map(|s| s.text.as_str()).collect()
    }

    /// First shape whose text equals `text`.
    pub fn find_text(&self, text: &str) -> Option<&ShapeContents> {
        self.shapes.iter().find(|s| s.text == text)
    }
}

/// A single `p:sp` element.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ShapeContents {
    pub name: String,
    /// Preset geometry name, e.g. `rect`.
    pub geometry: Option<String>,
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
    pub fill: Option<Color>,
    pub outline: Option<Color>,
    /// Paragraph texts joined with newlines.
    pub text: String,
    pub runs: Vec<RunContents>,
}

/// A single `a:r` text run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunContents {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    /// Font size in hundredths of a point.
    pub size: Option<u32>,
    pub color: Option<Color>,
}

/// Reader for PPTX (Office Open XML) files.
pub struct PptxReader;

impl PptxReader {
    /// Create a new PPTX reader.
    pub fn new() -> Self {
        Self
    }

    /// Read a PPTX file from disk.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<DeckContents> {
        let file = File::open(path.as_ref())?;
        self.read(BufReader::new(file))
    }

    /// Read a PPTX package from a seekable reader.
    pub fn read<R: Read + Seek>(&self, reader: R) -> Result<DeckContents> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let presentation = read_file_from_archive(&mut archive, package::PRESENTATION_PART)?;
        let mut deck = DeckContents {
            slide_size: parse_slide_size(&presentation)?,
            slides: Vec::new(),
        };

        let slide_order = get_slide_order(&mut archive)?;
        for (idx, slide_path) in slide_order.iter().enumerate() {
            let content = read_file_from_archive(&mut archive, slide_path)?;
            deck.slides.push(parse_slide(&content, idx + 1)?);
        }

        log::debug!(
            "Read {} slides with {} shapes",
            deck.slides.len(),
            deck.shape_count()
        );

        Ok(deck)
    }
}

impl Default for PptxReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Get the ordered list of slide paths from the presentation relationships.
fn get_slide_order<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
    let rels_content = read_file_from_archive(archive, package::PRESENTATION_RELS_PART)?;
    let mut slides: Vec<(String, Option<usize>)> = Vec::new();

    let mut reader = Reader::from_str(&rels_content);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let rel_type = attribute(e, b"Type").unwrap_or_default();
                let target = attribute(e, b"Target").unwrap_or_default();

                if rel_type.ends_with("/slide") {
                    let order_num = extract_slide_number(&target);
                    let full_path = match target.strip_prefix('/') {
                        Some(absolute) => absolute.to_string(),
                        None => format!("ppt/{}", target),
                    };
                    slides.push((full_path, order_num));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    slides.sort_by(|a, b| match (a.1, b.1) {
        (Some(na), Some(nb)) => na.cmp(&nb),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.0.cmp(&b.0),
    });

    Ok(slides.into_iter().map(|(path, _)| path).collect())
}

fn parse_slide_size(xml_content: &str) -> Result<Option<(i64, i64)>> {
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                let name = e.name();
                if local_name(name.as_ref()) == b"sldSz" {
                    let cx = attribute(e, b"cx").and_then(|v| v.parse().ok());
                    let cy = attribute(e, b"cy").and_then(|v| v.parse().ok());
                    return Ok(cx.zip(cy));
                }
            }
            Ok(Event::Eof) => return Ok(None),
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation: {}",
                    e
                )));
            }
            _ => {}
        }
    }
}

/// Which colored property a `srgbClr` element belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorTarget {
    Background,
    Fill,
    Outline,
    Run,
}

/// Resolve the owner of a color from the open element path.
fn color_target(path: &[Vec<u8>]) -> Option<ColorTarget> {
    let n = path.len();
    if n < 2 || path[n - 1] != b"solidFill" {
        return None;
    }
    match path[n - 2].as_slice() {
        b"bgPr" => Some(ColorTarget::Background),
        b"spPr" => Some(ColorTarget::Fill),
        b"ln" if n >= 3 && path[n - 3] == b"spPr" => Some(ColorTarget::Outline),
        b"rPr" => Some(ColorTarget::Run),
        _ => None,
    }
}

/// Extract shapes, runs and colors from slide XML.
fn parse_slide(xml_content: &str, number: usize) -> Result<SlideContents> {
    let mut slide = SlideContents::new(number);
    let mut reader = Reader::from_str(xml_content);
    // run text keeps its spaces
    reader.trim_text(false);

    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut current_shape: Option<ShapeContents> = None;
    let mut current_run: Option<RunContents> = None;
    let mut paragraphs: Vec<String> = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                let local = local_name(name.as_ref()).to_vec();

                match local.as_slice() {
                    b"sp" => {
                        current_shape = Some(ShapeContents::default());
                        paragraphs.clear();
                    }
                    b"p" if current_shape.is_some()
                        && path.last().is_some_and(|p| p.as_slice() == b"txBody") =>
                    {
                        paragraphs.push(String::new());
                    }
                    b"r" => current_run = Some(RunContents::default()),
                    b"rPr" => {
                        if let Some(run) = current_run.as_mut() {
                            apply_run_properties(run, e);
                        }
                    }
                    b"t" => in_text = true,
                    _ => apply_shape_attributes(current_shape.as_mut(), &local, e),
                }
                path.push(local);
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());

                match local {
                    b"rPr" => {
                        if let Some(run) = current_run.as_mut() {
                            apply_run_properties(run, e);
                        }
                    }
                    b"srgbClr" => {
                        let color = attribute(e, b"val").and_then(|v| Color::from_hex(&v));
                        match color_target(&path) {
                            Some(ColorTarget::Background) => slide.background = color,
                            Some(ColorTarget::Fill) => {
                                if let Some(shape) = current_shape.as_mut() {
                                    shape.fill = color;
                                }
                            }
                            Some(ColorTarget::Outline) => {
                                if let Some(shape) = current_shape.as_mut() {
                                    shape.outline = color;
                                }
                            }
                            Some(ColorTarget::Run) => {
                                if let Some(run) = current_run.as_mut() {
                                    run.color = color;
                                }
                            }
                            None => {}
                        }
                    }
                    _ => apply_shape_attributes(current_shape.as_mut(), local, e),
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_text {
                    let raw = e
                        .unescape()
                        .map_err(|err| Error::XmlError(format!("Bad run text: {}", err)))?;
                    let text = package::unescape_text(&raw);
                    if let Some(run) = current_run.as_mut() {
                        run.text.push_str(&text);
                    }
                    if let Some(paragraph) = paragraphs.last_mut() {
                        paragraph.push_str(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"sp" => {
                        if let Some(mut shape) = current_shape.take() {
                            shape.text = paragraphs.join("\n").trim().to_string();
                            slide.shapes.push(shape);
                        }
                        paragraphs.clear();
                    }
                    b"r" => {
                        if let (Some(run), Some(shape)) = (current_run.take(), current_shape.as_mut()) {
                            shape.runs.push(run);
                        }
                    }
                    b"t" => in_text = false,
                    _ => {}
                }
                path.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing slide {}: {}",
                    number, e
                )));
            }
            _ => {}
        }
    }

    Ok(slide)
}

fn apply_shape_attributes(shape: Option<&mut ShapeContents>, local: &[u8], e: &BytesStart) {
    let Some(shape) = shape else {
        return;
    };
    let parse = |key: &[u8]| attribute(e, key).and_then(|v| v.parse::<i64>().ok());

    match local {
        b"cNvPr" => shape.name = attribute(e, b"name").unwrap_or_default(),
        b"prstGeom" => shape.geometry = attribute(e, b"prst"),
        b"off" => {
            shape.x = parse(b"x").unwrap_or(shape.x);
            shape.y = parse(b"y").unwrap_or(shape.y);
        }
        b"ext" => {
            shape.cx = parse(b"cx").unwrap_or(shape.cx);
            shape.cy = parse(b"cy").unwrap_or(shape.cy);
        }
        _ => {}
    }
}

fn apply_run_properties(run: &mut RunContents, e: &BytesStart) {
    run.bold = attribute(e, b"b").is_some_and(|v| v == "1" || v == "true");
    run.italic = attribute(e, b"i").is_some_and(|v| v == "1" || v == "true");
    run.size = attribute(e, b"sz").and_then(|v| v.parse().ok());
}

fn attribute(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

/// Read a file from the ZIP archive.
fn read_file_from_archive<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

    Ok(content)
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
