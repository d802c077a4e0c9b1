//! Layout commands for a single slide.
//!
//! A [`Canvas`] is the ordered list of shapes a renderer placed on a slide,
//! with all geometry in EMU. It carries no file-format details; the PPTX
//! writer turns it into slide XML.

use serde::{Deserialize, Serialize};

/// English Metric Units per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// Convert inches to EMU, rounding to the nearest unit.
pub fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH as f64).round() as i64
}

/// Font size in hundredths of a point, as stored in DrawingML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSize(pub u32);

impl FontSize {
    pub fn pt(points: u32) -> Self {
        Self(points * 100)
    }
}

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `"7500C0"` or `"#7500c0"`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Upper-case hex without a leading `#`, as used by `a:srgbClr`.
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid color '{}'", value))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Position and size of a shape, in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Rect {
    pub fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.cy
    }
}

/// Preset geometry of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Geometry {
    /// Plain text box with no fill.
    TextBox,
    Rectangle,
    RoundedRectangle,
    RightArrow,
}

impl Geometry {
    /// DrawingML preset name.
    pub fn preset(self) -> &'static str {
        match self {
            Geometry::TextBox | Geometry::Rectangle => "rect",
            Geometry::RoundedRectangle => "roundRect",
            Geometry::RightArrow => "rightArrow",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical anchoring of text inside its frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// Character formatting of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStyle {
    pub font: Option<String>,
    pub size: Option<FontSize>,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<Color>,
}

impl RunStyle {
    pub fn new(size: FontSize, color: Color) -> Self {
        Self {
            size: Some(size),
            color: Some(color),
            ..Default::default()
        }
    }

    pub fn font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

/// A run of uniformly formatted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    pub style: RunStyle,
}

impl Run {
    pub fn new(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub align: Align,
    /// Space after the paragraph, in hundredths of a point.
    pub space_after: Option<FontSize>,
}

impl Paragraph {
    /// A paragraph holding a single run.
    pub fn single(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            runs: vec![Run::new(text, style)],
            ..Default::default()
        }
    }

    pub fn aligned(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn space_after(mut self, space: FontSize) -> Self {
        self.space_after = Some(space);
        self
    }

    /// Concatenated run text.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFrame {
    pub paragraphs: Vec<Paragraph>,
    pub wrap: bool,
    pub anchor: Anchor,
}

impl TextFrame {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            wrap: true,
            anchor: Anchor::Top,
        }
    }

    pub fn anchored(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn no_wrap(mut self) -> Self {
        self.wrap = false;
        self
    }

    /// Paragraph texts joined with newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One drawing primitive on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub geometry: Geometry,
    pub frame: Rect,
    pub fill: Option<Color>,
    pub outline: Option<Color>,
    pub text: Option<TextFrame>,
}

impl Shape {
    /// A transparent text box.
    pub fn text_box(frame: Rect, text: TextFrame) -> Self {
        Self {
            geometry: Geometry::TextBox,
            frame,
            fill: None,
            outline: None,
            text: Some(text),
        }
    }

    /// A filled shape without outline or text.
    pub fn filled(geometry: Geometry, frame: Rect, fill: Color) -> Self {
        Self {
            geometry,
            frame,
            fill: Some(fill),
            outline: None,
            text: None,
        }
    }

    pub fn with_outline(mut self, color: Color) -> Self {
        self.outline = Some(color);
        self
    }

    pub fn with_text(mut self, text: TextFrame) -> Self {
        self.text = Some(text);
        self
    }

    /// Text content of the shape, or an empty string.
    pub fn plain_text(&self) -> String {
        self.text.as_ref().map(TextFrame::text).unwrap_or_default()
    }
}

/// A fixed-size slide surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: i64,
    pub height: i64,
    pub background: Option<Color>,
    pub shapes: Vec<Shape>,
}

impl Canvas {
    pub fn new(width: i64, height: i64) -> Self {
        Self {
            width,
            height,
            background: None,
            shapes: Vec::new(),
        }
    }

    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// Shapes carrying text, in drawing order.
    pub fn text_shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter().filter(|s| s.text.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inches_to_emu() {
        assert_eq!(inches(1.0), 914_400);
        assert_eq!(inches(0.5), 457_200);
        assert_eq!(inches(7.5), 6_858_000);
        assert_eq!(inches(0.03), 27_432);
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::from_hex("#7500c0"), Some(Color::rgb(117, 0, 192)));
        assert_eq!(Color::from_hex("D97706"), Some(Color::rgb(217, 119, 6)));
        assert_eq!(Color::rgb(16, 185, 129).to_hex(), "10B981");
        assert_eq!(Color::from_hex("12345"), None);
        assert_eq!(Color::from_hex("zzzzzz"), None);
    }

    #[test]
    fn test_color_serde_as_hex() {
        let json = serde_json::to_string(&Color::rgb(255, 255, 255)).unwrap();
        assert_eq!(json, "\"FFFFFF\"");

        let back: Color = serde_json::from_str("\"#a055f5\"").unwrap();
        assert_eq!(back, Color::rgb(160, 85, 245));

        assert!(serde_json::from_str::<Color>("\"purple\"").is_err());
    }

    #[test]
    fn test_text_frame_text() {
        let style = RunStyle::new(FontSize::pt(12), Color::rgb(0, 0, 0));
        let frame = TextFrame::new(vec![
            Paragraph {
                runs: vec![Run::new("a", style.clone()), Run::new("b", style.clone().bold())],
                ..Default::default()
            },
            Paragraph::single("c", style),
        ]);
        assert_eq!(frame.text(), "ab\nc");
    }
}
