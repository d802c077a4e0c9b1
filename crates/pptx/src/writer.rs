//! PPTX file writer implementation.

use crate::package::{self, content_type as ct, ns, rel};
use chrono::{DateTime, Utc};
use deck_core::canvas::{Align, Anchor, Geometry, Paragraph, Run, Shape, TextFrame};
use deck_core::{Canvas, Error, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Outline width for shapes with a border (1 pt).
const OUTLINE_WIDTH: &str = "12700";

/// Application name recorded in the document properties.
const APPLICATION: &str = "deckgen";

/// Writer that serializes canvases into a PPTX package.
#[derive(Debug, Clone, Default)]
pub struct PptxWriter {
    /// Creation time for `docProps/core.xml`; defaults to now.
    created: Option<DateTime<Utc>>,
    /// Document title for `docProps/core.xml`.
    title: Option<String>,
}

impl PptxWriter {
    /// Create a new PPTX writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the creation timestamp, making the whole package reproducible.
    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Write a deck to a file.
    pub fn save(&self, canvases: &[Canvas], path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut out = self.write(canvases, BufWriter::new(file))?;
        out.flush()?;
        Ok(())
    }

    /// Serialize a deck to bytes.
    pub fn to_bytes(&self, canvases: &[Canvas]) -> Result<Vec<u8>> {
        Ok(self.write(canvases, Cursor::new(Vec::new()))?.into_inner())
    }

    /// Write a deck to a seekable stream, returning the stream.
    pub fn write<W: Write + Seek>(&self, canvases: &[Canvas], out: W) -> Result<W> {
        let first = canvases
            .first()
            .ok_or_else(|| Error::InvalidPackage("a deck needs at least one slide".into()))?;

        if canvases
            .iter()
            .any(|c| c.width != first.width || c.height != first.height)
        {
            log::warn!(
                "Slides differ in size; using {}x{} EMU from the first slide",
                first.width,
                first.height
            );
        }

        let mut zip = ZipWriter::new(out);

        add_part(&mut zip, package::CONTENT_TYPES_PART, &content_types_xml(canvases.len())?)?;
        add_part(&mut zip, package::PACKAGE_RELS_PART, &package_rels_xml()?)?;
        add_part(&mut zip, package::CORE_PART, &self.core_xml()?)?;
        add_part(&mut zip, package::APP_PART, &app_xml(canvases.len())?)?;
        add_part(
            &mut zip,
            package::PRESENTATION_PART,
            &presentation_xml(canvases.len(), first.width, first.height)?,
        )?;
        add_part(
            &mut zip,
            package::PRESENTATION_RELS_PART,
            &presentation_rels_xml(canvases.len())?,
        )?;
        add_part(&mut zip, package::MASTER_PART, package::SLIDE_MASTER_XML)?;
        add_part(&mut zip, package::MASTER_RELS_PART, package::SLIDE_MASTER_RELS_XML)?;
        add_part(&mut zip, package::LAYOUT_PART, package::SLIDE_LAYOUT_XML)?;
        add_part(&mut zip, package::LAYOUT_RELS_PART, package::SLIDE_LAYOUT_RELS_XML)?;
        add_part(&mut zip, package::THEME_PART, package::THEME_XML)?;

        for (idx, canvas) in canvases.iter().enumerate() {
            let number = idx + 1;
            add_part(&mut zip, &package::slide_part(number), &slide_xml(canvas)?)?;
            add_part(&mut zip, &package::slide_rels_part(number), &slide_rels_xml()?)?;
        }

        log::debug!("Wrote {} slides", canvases.len());

        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))
    }

    fn core_xml(&self) -> Result<String> {
        let created = self
            .created
            .unwrap_or_else(Utc::now)
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string();

        let mut xml = XmlBuilder::new()?;
        xml.start(
            "cp:coreProperties",
            &[
                (
                    "xmlns:cp",
                    "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
                ),
                ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
                ("xmlns:dcterms", "http://purl.org/dc/terms/"),
                ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
            ],
        )?;
        if let Some(title) = &self.title {
            xml.leaf("dc:title", &[], title)?;
        }
        xml.leaf("dc:creator", &[], APPLICATION)?;
        xml.leaf("dcterms:created", &[("xsi:type", "dcterms:W3CDTF")], &created)?;
        xml.leaf("dcterms:modified", &[("xsi:type", "dcterms:W3CDTF")], &created)?;
        xml.end("cp:coreProperties")?;
        xml.finish()
    }
}

/// Render the slide part for one canvas.
///
/// Output depends only on the canvas, so equal canvases give identical XML.
pub fn slide_xml(canvas: &Canvas) -> Result<String> {
    let mut xml = XmlBuilder::new()?;
    xml.start(
        "p:sld",
        &[("xmlns:a", ns::A), ("xmlns:r", ns::R), ("xmlns:p", ns::P)],
    )?;
    xml.start("p:cSld", &[])?;

    if let Some(background) = canvas.background {
        xml.start("p:bg", &[])?;
        xml.start("p:bgPr", &[])?;
        solid_fill(&mut xml, &background.to_hex())?;
        xml.empty("a:effectLst", &[])?;
        xml.end("p:bgPr")?;
        xml.end("p:bg")?;
    }

    xml.start("p:spTree", &[])?;
    xml.start("p:nvGrpSpPr", &[])?;
    xml.empty("p:cNvPr", &[("id", "1"), ("name", "")])?;
    xml.empty("p:cNvGrpSpPr", &[])?;
    xml.empty("p:nvPr", &[])?;
    xml.end("p:nvGrpSpPr")?;
    xml.start("p:grpSpPr", &[])?;
    xml.start("a:xfrm", &[])?;
    xml.empty("a:off", &[("x", "0"), ("y", "0")])?;
    xml.empty("a:ext", &[("cx", "0"), ("cy", "0")])?;
    xml.empty("a:chOff", &[("x", "0"), ("y", "0")])?;
    xml.empty("a:chExt", &[("cx", "0"), ("cy", "0")])?;
    xml.end("a:xfrm")?;
    xml.end("p:grpSpPr")?;

    // id 1 is the group itself
    for (idx, shape) in canvas.shapes.iter().enumerate() {
        write_shape(&mut xml, shape, idx as u32 + 2)?;
    }

    xml.end("p:spTree")?;
    xml.end("p:cSld")?;
    xml.start("p:clrMapOvr", &[])?;
    xml.empty("a:masterClrMapping", &[])?;
    xml.end("p:clrMapOvr")?;
    xml.end("p:sld")?;
    xml.finish()
}

fn write_shape(xml: &mut XmlBuilder, shape: &Shape, id: u32) -> Result<()> {
    let id_str = id.to_string();
    let name = match shape.geometry {
        Geometry::TextBox => format!("TextBox {}", id),
        Geometry::Rectangle => format!("Rectangle {}", id),
        Geometry::RoundedRectangle => format!("Rounded Rectangle {}", id),
        Geometry::RightArrow => format!("Right Arrow {}", id),
    };

    xml.start("p:sp", &[])?;
    xml.start("p:nvSpPr", &[])?;
    xml.empty("p:cNvPr", &[("id", id_str.as_str()), ("name", name.as_str())])?;
    if shape.geometry == Geometry::TextBox {
        xml.empty("p:cNvSpPr", &[("txBox", "1")])?;
    } else {
        xml.empty("p:cNvSpPr", &[])?;
    }
    xml.empty("p:nvPr", &[])?;
    xml.end("p:nvSpPr")?;

    let frame = shape.frame;
    let (x, y, cx, cy) = (
        frame.x.to_string(),
        frame.y.to_string(),
        frame.cx.max(0).to_string(),
        frame.cy.max(0).to_string(),
    );

    xml.start("p:spPr", &[])?;
    xml.start("a:xfrm", &[])?;
    xml.empty("a:off", &[("x", x.as_str()), ("y", y.as_str())])?;
    xml.empty("a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    xml.end("a:xfrm")?;
    xml.start("a:prstGeom", &[("prst", shape.geometry.preset())])?;
    xml.empty("a:avLst", &[])?;
    xml.end("a:prstGeom")?;

    match shape.fill {
        Some(fill) => solid_fill(xml, &fill.to_hex())?,
        None => xml.empty("a:noFill", &[])?,
    }

    match shape.outline {
        Some(outline) => {
            xml.start("a:ln", &[("w", OUTLINE_WIDTH)])?;
            solid_fill(xml, &outline.to_hex())?;
            xml.end("a:ln")?;
        }
        None => {
            xml.start("a:ln", &[])?;
            xml.empty("a:noFill", &[])?;
            xml.end("a:ln")?;
        }
    }

    // no inherited shadow
    xml.empty("a:effectLst", &[])?;
    xml.end("p:spPr")?;

    if let Some(text) = &shape.text {
        write_text_body(xml, text)?;
    }

    xml.end("p:sp")
}

fn write_text_body(xml: &mut XmlBuilder, frame: &TextFrame) -> Result<()> {
    let wrap = if frame.wrap { "square" } else { "none" };
    let anchor = match frame.anchor {
        Anchor::Top => "t",
        Anchor::Middle => "ctr",
        Anchor::Bottom => "b",
    };

    xml.start("p:txBody", &[])?;
    xml.empty(
        "a:bodyPr",
        &[("wrap", wrap), ("anchor", anchor), ("rtlCol", "0")],
    )?;
    xml.empty("a:lstStyle", &[])?;

    if frame.paragraphs.is_empty() {
        // a text body needs at least one paragraph
        xml.empty("a:p", &[])?;
    }
    for paragraph in &frame.paragraphs {
        write_paragraph(xml, paragraph)?;
    }

    xml.end("p:txBody")
}

fn write_paragraph(xml: &mut XmlBuilder, paragraph: &Paragraph) -> Result<()> {
    let align = match paragraph.align {
        Align::Left => "l",
        Align::Center => "ctr",
        Align::Right => "r",
    };

    xml.start("a:p", &[])?;
    match paragraph.space_after {
        Some(space) => {
            xml.start("a:pPr", &[("algn", align)])?;
            let points = space.0.to_string();
            xml.start("a:spcAft", &[])?;
            xml.empty("a:spcPts", &[("val", points.as_str())])?;
            xml.end("a:spcAft")?;
            xml.end("a:pPr")?;
        }
        None => xml.empty("a:pPr", &[("algn", align)])?,
    }

    for run in &paragraph.runs {
        write_run(xml, run)?;
    }

    xml.end("a:p")
}

fn write_run(xml: &mut XmlBuilder, run: &Run) -> Result<()> {
    let style = &run.style;
    let size = style.size.map(|s| s.0.to_string());

    let mut attrs: Vec<(&str, &str)> = vec![("lang", "en-US")];
    if let Some(size) = &size {
        attrs.push(("sz", size.as_str()));
    }
    if style.bold {
        attrs.push(("b", "1"));
    }
    if style.italic {
        attrs.push(("i", "1"));
    }
    attrs.push(("dirty", "0"));

    xml.start("a:r", &[])?;
    xml.start("a:rPr", &attrs)?;
    if let Some(color) = style.color {
        solid_fill(xml, &color.to_hex())?;
    }
    if let Some(font) = &style.font {
        xml.empty("a:latin", &[("typeface", font.as_str())])?;
    }
    xml.end("a:rPr")?;
    xml.leaf("a:t", &[], &run.text)?;
    xml.end("a:r")
}

fn solid_fill(xml: &mut XmlBuilder, hex: &str) -> Result<()> {
    xml.start("a:solidFill", &[])?;
    xml.empty("a:srgbClr", &[("val", hex)])?;
    xml.end("a:solidFill")
}

fn content_types_xml(slide_count: usize) -> Result<String> {
    let mut xml = XmlBuilder::new()?;
    xml.start("Types", &[("xmlns", ns::CONTENT_TYPES)])?;
    xml.empty(
        "Default",
        &[("Extension", "rels"), ("ContentType", ct::RELATIONSHIPS)],
    )?;
    xml.empty("Default", &[("Extension", "xml"), ("ContentType", ct::XML)])?;

    let mut overrides = vec![
        (format!("/{}", package::PRESENTATION_PART), ct::PRESENTATION),
        (format!("/{}", package::MASTER_PART), ct::SLIDE_MASTER),
        (format!("/{}", package::LAYOUT_PART), ct::SLIDE_LAYOUT),
        (format!("/{}", package::THEME_PART), ct::THEME),
        (format!("/{}", package::CORE_PART), ct::CORE_PROPERTIES),
        (format!("/{}", package::APP_PART), ct::EXTENDED_PROPERTIES),
    ];
    for number in 1..=slide_count {
        overrides.push((format!("/{}", package::slide_part(number)), ct::SLIDE));
    }

    for (part, content_type) in &overrides {
        xml.empty(
            "Override",
            &[("PartName", part.as_str()), ("ContentType", *content_type)],
        )?;
    }

    xml.end("Types")?;
    xml.finish()
}

fn relationships_xml(relationships: &[(String, &str, String)]) -> Result<String> {
    let mut xml = XmlBuilder::new()?;
    xml.start("Relationships", &[("xmlns", ns::PACKAGE_RELS)])?;
    for (id, rel_type, target) in relationships {
        xml.empty(
            "Relationship",
            &[("Id", id.as_str()), ("Type", *rel_type), ("Target", target.as_str())],
        )?;
    }
    xml.end("Relationships")?;
    xml.finish()
}

fn package_rels_xml() -> Result<String> {
    relationships_xml(&[
        (
            "rId1".to_string(),
            rel::OFFICE_DOCUMENT,
            package::PRESENTATION_PART.to_string(),
        ),
        (
            "rId2".to_string(),
            rel::CORE_PROPERTIES,
            package::CORE_PART.to_string(),
        ),
        (
            "rId3".to_string(),
            rel::EXTENDED_PROPERTIES,
            package::APP_PART.to_string(),
        ),
    ])
}

fn presentation_rels_xml(slide_count: usize) -> Result<String> {
    let mut relationships = vec![
        (
            "rId1".to_string(),
            rel::SLIDE_MASTER,
            "slideMasters/slideMaster1.xml".to_string(),
        ),
        ("rId2".to_string(), rel::THEME, "theme/theme1.xml".to_string()),
    ];
    for number in 1..=slide_count {
        relationships.push((
            package::slide_rel_id(number),
            rel::SLIDE,
            format!("slides/slide{}.xml", number),
        ));
    }
    relationships_xml(&relationships)
}

fn slide_rels_xml() -> Result<String> {
    relationships_xml(&[(
        "rId1".to_string(),
        rel::SLIDE_LAYOUT,
        "../slideLayouts/slideLayout1.xml".to_string(),
    )])
}

fn presentation_xml(slide_count: usize, width: i64, height: i64) -> Result<String> {
    let mut xml = XmlBuilder::new()?;
    xml.start(
        "p:presentation",
        &[("xmlns:a", ns::A), ("xmlns:r", ns::R), ("xmlns:p", ns::P)],
    )?;

    xml.start("p:sldMasterIdLst", &[])?;
    xml.empty("p:sldMasterId", &[("id", "2147483648"), ("r:id", "rId1")])?;
    xml.end("p:sldMasterIdLst")?;

    xml.start("p:sldIdLst", &[])?;
    for number in 1..=slide_count {
        let id = (255 + number).to_string();
        let rel_id = package::slide_rel_id(number);
        xml.empty("p:sldId", &[("id", id.as_str()), ("r:id", rel_id.as_str())])?;
    }
    xml.end("p:sldIdLst")?;

    let (cx, cy) = (width.to_string(), height.to_string());
    xml.empty("p:sldSz", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    xml.empty("p:notesSz", &[("cx", "6858000"), ("cy", "9144000")])?;
    xml.end("p:presentation")?;
    xml.finish()
}

fn app_xml(slide_count: usize) -> Result<String> {
    let mut xml = XmlBuilder::new()?;
    xml.start(
        "Properties",
        &[
            (
                "xmlns",
                "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties",
            ),
            (
                "xmlns:vt",
                "http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes",
            ),
        ],
    )?;
    xml.leaf("Application", &[], APPLICATION)?;
    xml.leaf("Slides", &[], &slide_count.to_string())?;
    xml.end("Properties")?;
    xml.finish()
}

fn add_part<W: Write + Seek>(zip: &mut ZipWriter<W>, name: &str, content: &str) -> Result<()> {
    // fixed timestamp so identical decks produce identical archives
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());

    zip.start_file(name, options)
        .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", name, e)))?;
    zip.write_all(content.as_bytes())?;
    Ok(())
}

/// Thin wrapper over `quick_xml::Writer` producing a UTF-8 string.
struct XmlBuilder {
    writer: Writer<Vec<u8>>,
}

impl XmlBuilder {
    fn new() -> Result<Self> {
        let mut builder = Self {
            writer: Writer::new(Vec::new()),
        };
        builder.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(builder)
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::XmlError(e.to_string()))
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Start(element))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Empty(element))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    /// Element holding only escaped text.
    fn leaf(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<()> {
        self.start(name, attrs)?;
        let text = package::escape_text(text);
        self.event(Event::Text(BytesText::new(&text)))?;
        self.end(name)
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| Error::XmlError(format!("Generated XML is not UTF-8: {}", e)))
    }
}
