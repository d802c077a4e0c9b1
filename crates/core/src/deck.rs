//! Multi-slide decks built from a JSON deck description.
//!
//! Each [`SlideSpec`] variant maps to one fixed template. The content itself
//! lives in the description file, so the builders stay pure functions from
//! content to [`Canvas`].

use crate::canvas::{
    inches, Align, Anchor, Canvas, Color, FontSize, Geometry, Paragraph, Rect, RunStyle, Shape,
    TextFrame,
};
use crate::error::Result;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Scores at or above this get the green badge.
const PROCEED_THRESHOLD: f64 = 8.5;

/// A whole deck: canvas size plus slides in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckSpec {
    /// Slide width in EMU (default 10 in).
    #[serde(default = "default_deck_width")]
    pub slide_width: i64,

    /// Slide height in EMU (default 5.63 in, 16:9).
    #[serde(default = "default_deck_height")]
    pub slide_height: i64,

    pub slides: Vec<SlideSpec>,
}

fn default_deck_width() -> i64 {
    inches(10.0)
}

fn default_deck_height() -> i64 {
    inches(5.63)
}

impl DeckSpec {
    /// Load a deck description from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// One slide template and its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlideSpec {
    Title {
        title: String,
        subtitle: String,
        #[serde(default)]
        footer: Option<String>,
    },
    Section {
        title: String,
        #[serde(default)]
        subtitle: Option<String>,
    },
    Bullets {
        title: String,
        items: Vec<String>,
        #[serde(default)]
        highlight_first: bool,
    },
    Table {
        title: String,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        #[serde(default)]
        highlight_col: Option<usize>,
    },
    ToolHighlight {
        name: String,
        score: String,
        path: String,
        features: Vec<String>,
        recommendation: String,
    },
    DecisionMatrix {
        title: String,
        decisions: Vec<Decision>,
    },
    Summary {
        title: String,
        takeaways: Vec<String>,
        #[serde(default)]
        contact: Option<String>,
    },
}

/// A row of the decision matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub need: String,
    pub choice: String,
    pub reason: String,
}

/// Builds one canvas per slide of a deck.
#[derive(Debug, Clone, Default)]
pub struct DeckBuilder {
    theme: Theme,
}

impl DeckBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Build every slide in order.
    pub fn build(&self, deck: &DeckSpec) -> Vec<Canvas> {
        deck.slides
            .iter()
            .map(|slide| self.build_slide(slide, deck.slide_width, deck.slide_height))
            .collect()
    }

    /// Build a single slide on a canvas of the given size.
    pub fn build_slide(&self, slide: &SlideSpec, width: i64, height: i64) -> Canvas {
        let mut canvas = Canvas::new(width, height);

        match slide {
            SlideSpec::Title {
                title,
                subtitle,
                footer,
            } => self.title_slide(&mut canvas, title, subtitle, footer.as_deref()),
            SlideSpec::Section { title, subtitle } => {
                self.section_slide(&mut canvas, title, subtitle.as_deref())
            }
            SlideSpec::Bullets {
                title,
                items,
                highlight_first,
            } => self.bullets_slide(&mut canvas, title, items, *highlight_first),
            SlideSpec::Table {
                title,
                headers,
                rows,
                highlight_col,
            } => self.table_slide(&mut canvas, title, headers, rows, *highlight_col),
            SlideSpec::ToolHighlight {
                name,
                score,
                path,
                features,
                recommendation,
            } => self.tool_slide(&mut canvas, name, score, path, features, recommendation),
            SlideSpec::DecisionMatrix { title, decisions } => {
                self.decision_slide(&mut canvas, title, decisions)
            }
            SlideSpec::Summary {
                title,
                takeaways,
                contact,
            } => self.summary_slide(&mut canvas, title, takeaways, contact.as_deref()),
        }

        canvas
    }

    fn style(&self, points: u32, color: Color) -> RunStyle {
        let style = RunStyle::new(FontSize::pt(points), color);
        match &self.theme.font {
            Some(font) => style.font(font.clone()),
            None => style,
        }
    }

    fn line(&self, text: &str, points: u32, color: Color) -> TextFrame {
        TextFrame::new(vec![Paragraph::single(text, self.style(points, color))])
    }

    /// Full-width purple band across the top with white title text.
    fn title_bar(&self, canvas: &mut Canvas, title: &str, band: f64, points: u32, inset: f64) {
        canvas.push(Shape::filled(
            Geometry::Rectangle,
            Rect::new(0, 0, canvas.width, inches(band)),
            self.theme.brand,
        ));
        let text_top = ((band - 0.5) / 2.0).max(0.1);
        canvas.push(Shape::text_box(
            Rect::new(
                inches(inset),
                inches(text_top),
                canvas.width - 2 * inches(inset),
                inches(0.6),
            ),
            TextFrame::new(vec![Paragraph::single(
                title,
                self.style(points, self.theme.white).bold(),
            )]),
        ));
    }

    fn bullet_frame(
        &self,
        prefix: &str,
        items: &[String],
        points: u32,
        space_after: u32,
        color: Color,
    ) -> TextFrame {
        let paragraphs = items
            .iter()
            .map(|item| {
                Paragraph::single(format!("{} {}", prefix, item), self.style(points, color))
                    .space_after(FontSize::pt(space_after))
            })
            .collect();
        TextFrame::new(paragraphs)
    }

    fn title_slide(&self, canvas: &mut Canvas, title: &str, subtitle: &str, footer: Option<&str>) {
        let text_width = canvas.width - inches(1.0);

        canvas.push(Shape::filled(
            Geometry::Rectangle,
            Rect::new(0, 0, canvas.width, inches(2.5)),
            self.theme.brand,
        ));
        canvas.push(Shape::text_box(
            Rect::new(inches(0.5), inches(0.8), text_width, inches(1.2)),
            TextFrame::new(vec![Paragraph::single(
                title,
                self.style(40, self.theme.white).bold(),
            )]),
        ));
        canvas.push(Shape::text_box(
            Rect::new(inches(0.5), inches(1.9), text_width, inches(0.5)),
            self.line(subtitle, 18, self.theme.white),
        ));

        if let Some(footer) = footer {
            canvas.push(Shape::text_box(
                Rect::new(
                    inches(0.5),
                    canvas.height - inches(0.53),
                    text_width,
                    inches(0.3),
                ),
                self.line(footer, 10, self.theme.light_gray),
            ));
        }
    }

    fn section_slide(&self, canvas: &mut Canvas, title: &str, subtitle: Option<&str>) {
        canvas.push(Shape::filled(
            Geometry::Rectangle,
            Rect::new(0, 0, inches(0.15), canvas.height),
            self.theme.brand,
        ));

        let mut paragraphs = vec![Paragraph::single(
            title,
            self.style(36, self.theme.brand).bold(),
        )];
        if let Some(subtitle) = subtitle {
            paragraphs.push(Paragraph::single(
                subtitle,
                self.style(18, self.theme.dark_gray),
            ));
        }

        canvas.push(Shape::text_box(
            Rect::new(
                inches(0.5),
                inches(2.0),
                canvas.width - inches(1.0),
                inches(1.0),
            ),
            TextFrame::new(paragraphs),
        ));
    }

    fn bullets_slide(
        &self,
        canvas: &mut Canvas,
        title: &str,
        items: &[String],
        highlight_first: bool,
    ) {
        self.title_bar(canvas, title, 1.0, 28, 0.5);

        let mut frame = self.bullet_frame("•", items, 18, 12, self.theme.dark_gray);
        if highlight_first {
            if let Some(first) = frame.paragraphs.first_mut() {
                for run in &mut first.runs {
                    run.style.bold = true;
                    run.style.color = Some(self.theme.brand);
                }
            }
        }

        canvas.push(Shape::text_box(
            Rect::new(
                inches(0.5),
                inches(1.2),
                canvas.width - inches(1.0),
                inches(4.0),
            ),
            frame,
        ));
    }

    fn table_slide(
        &self,
        canvas: &mut Canvas,
        title: &str,
        headers: &[String],
        rows: &[Vec<String>],
        highlight_col: Option<usize>,
    ) {
        self.title_bar(canvas, title, 0.8, 24, 0.3);

        if headers.is_empty() {
            return;
        }

        let left = inches(0.3);
        let top = inches(1.0);
        let table_width = canvas.width - 2 * left;
        let row_height = inches(4.0) / (rows.len() as i64 + 1);
        let col_width = table_width / headers.len() as i64;

        for (col, header) in headers.iter().enumerate() {
            let frame = Rect::new(left + col as i64 * col_width, top, col_width, row_height);
            canvas.push(
                Shape::filled(Geometry::Rectangle, frame, self.theme.brand).with_text(
                    TextFrame::new(vec![Paragraph::single(
                        header,
                        self.style(12, self.theme.white).bold(),
                    )
                    .aligned(Align::Center)])
                    .anchored(Anchor::Middle),
                ),
            );
        }

        for (row_idx, row) in rows.iter().enumerate() {
            let y = top + (row_idx as i64 + 1) * row_height;
            let stripe = if row_idx % 2 == 0 {
                self.theme.stripe
            } else {
                self.theme.white
            };

            for (col, value) in row.iter().take(headers.len()).enumerate() {
                let fill = if highlight_col == Some(col) {
                    self.theme.purple_tint
                } else {
                    stripe
                };
                let frame = Rect::new(left + col as i64 * col_width, y, col_width, row_height);
                canvas.push(
                    Shape::filled(Geometry::Rectangle, frame, fill).with_text(
                        TextFrame::new(vec![Paragraph::single(
                            value,
                            self.style(11, self.theme.dark_gray),
                        )
                        .aligned(Align::Center)])
                        .anchored(Anchor::Middle),
                    ),
                );
            }
        }
    }

    fn tool_slide(
        &self,
        canvas: &mut Canvas,
        name: &str,
        score: &str,
        path: &str,
        features: &[String],
        recommendation: &str,
    ) {
        self.title_bar(canvas, name, 1.0, 28, 0.5);

        let badge = if score_proceeds(score) {
            self.theme.green
        } else {
            self.theme.caution
        };
        canvas.push(
            Shape::filled(
                Geometry::RoundedRectangle,
                Rect::new(inches(7.5), inches(0.15), inches(2.2), inches(0.7)),
                badge,
            )
            .with_text(
                TextFrame::new(vec![Paragraph::single(
                    format!("Score: {}", score),
                    self.style(18, self.theme.white).bold(),
                )
                .aligned(Align::Center)])
                .anchored(Anchor::Middle),
            ),
        );

        canvas.push(Shape::text_box(
            Rect::new(inches(0.5), inches(1.1), inches(9.0), inches(0.4)),
            self.line(&format!("Path: {}", path), 14, self.theme.light_gray),
        ));

        canvas.push(Shape::text_box(
            Rect::new(inches(0.5), inches(1.6), inches(9.0), inches(2.5)),
            self.bullet_frame("✓", features, 16, 8, self.theme.dark_gray),
        ));

        canvas.push(
            Shape::filled(
                Geometry::RoundedRectangle,
                Rect::new(inches(0.5), inches(4.3), inches(9.0), inches(0.8)),
                self.theme.purple_tint,
            )
            .with_outline(self.theme.brand)
            .with_text(
                TextFrame::new(vec![Paragraph::single(
                    format!("Recommendation: {}", recommendation),
                    self.style(14, self.theme.brand).bold(),
                )])
                .anchored(Anchor::Middle),
            ),
        );
    }

    fn decision_slide(&self, canvas: &mut Canvas, title: &str, decisions: &[Decision]) {
        self.title_bar(canvas, title, 0.8, 24, 0.3);

        let mut y = 1.1;
        for decision in decisions {
            canvas.push(Shape::text_box(
                Rect::new(inches(0.3), inches(y), inches(3.2), inches(0.5)),
                self.line(&decision.need, 12, self.theme.dark_gray),
            ));
            canvas.push(Shape::filled(
                Geometry::RightArrow,
                Rect::new(inches(3.5), inches(y + 0.1), inches(0.4), inches(0.25)),
                self.theme.brand,
            ));
            canvas.push(Shape::text_box(
                Rect::new(inches(4.0), inches(y), inches(1.8), inches(0.5)),
                TextFrame::new(vec![Paragraph::single(
                    &decision.choice,
                    self.style(12, self.theme.brand).bold(),
                )]),
            ));
            canvas.push(Shape::text_box(
                Rect::new(inches(5.8), inches(y), inches(4.0), inches(0.5)),
                TextFrame::new(vec![Paragraph::single(
                    &decision.reason,
                    self.style(11, self.theme.light_gray).italic(),
                )]),
            ));
            y += 0.65;
        }
    }

    fn summary_slide(
        &self,
        canvas: &mut Canvas,
        title: &str,
        takeaways: &[String],
        contact: Option<&str>,
    ) {
        canvas.background = Some(self.theme.brand);
        let text_width = canvas.width - inches(1.0);

        canvas.push(Shape::text_box(
            Rect::new(inches(0.5), inches(0.5), text_width, inches(1.0)),
            TextFrame::new(vec![Paragraph::single(
                title,
                self.style(36, self.theme.white).bold(),
            )]),
        ));
        canvas.push(Shape::text_box(
            Rect::new(inches(0.5), inches(1.8), text_width, inches(3.0)),
            self.bullet_frame("→", takeaways, 20, 16, self.theme.white),
        ));

        if let Some(contact) = contact {
            canvas.push(Shape::text_box(
                Rect::new(
                    inches(0.5),
                    canvas.height - inches(0.53),
                    text_width,
                    inches(0.3),
                ),
                self.line(contact, 12, self.theme.muted),
            ));
        }
    }
}

/// Whether a score like `"8.5/10"` reaches the proceed threshold.
///
/// Unparsable scores never do.
pub fn score_proceeds(score: &str) -> bool {
    score
        .split('/')
        .next()
        .and_then(|value| value.trim().parse::<f64>().ok())
        .is_some_and(|value| value >= PROCEED_THRESHOLD)
}
