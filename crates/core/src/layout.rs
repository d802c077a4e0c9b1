//! Fixed single-slide layout for an extracted one-pager.
//!
//! Content flows top to bottom on a 16:9 canvas: title with rule, overview
//! paragraph, up to two callout banners, a one-row table summary, a closing
//! banner and a pinned footer. Nothing is measured or reflowed; content that
//! runs past the bottom edge simply overlaps the footer.

use crate::canvas::{
    inches, Align, Anchor, Canvas, FontSize, Geometry, Paragraph, Rect, Run, RunStyle, Shape,
    TextFrame,
};
use crate::segments::overview_segments;
use crate::theme::{BannerColors, Theme};
use crate::types::{Callout, ExtractedRecord};

/// Widescreen slide width (13.333 in).
pub const ONE_PAGER_WIDTH: i64 = 12_192_000;
/// Widescreen slide height (7.5 in).
pub const ONE_PAGER_HEIGHT: i64 = 6_858_000;

const MARGIN: f64 = 0.5;

const TITLE_HEIGHT: f64 = 0.6;
const RULE_OFFSET: f64 = 0.55;
const RULE_THICKNESS: f64 = 0.03;
const TITLE_ADVANCE: f64 = 0.75;

const OVERVIEW_HEIGHT: f64 = 0.8;
const OVERVIEW_ADVANCE: f64 = 1.0;

const BANNER_HEIGHT: f64 = 0.7;
const BANNER_GUTTER: f64 = 0.15;
const BANNER_TITLE_WIDTH: f64 = 2.5;

const HEADER_HEIGHT: f64 = 0.5;
const ROW_HEIGHT: f64 = 0.9;
const CELL_INSET: f64 = 0.1;
const TABLE_GAP: f64 = 0.35;

const CLOSING_HEIGHT: f64 = 0.6;
const CLOSING_TITLE_WIDTH: f64 = 2.0;
const CLOSING_ADVANCE: f64 = 0.75;

const FOOTER_FROM_BOTTOM: f64 = 0.7;
const FOOTER_TEXT_WIDTH: f64 = 4.0;
const FOOTER_TEXT_FROM_RIGHT: f64 = 4.5;

/// Number of callouts drawn as full-size banners.
const FULL_BANNERS: usize = 2;

/// Glyph drawn at the left of the footer.
pub const FOOTER_MARKER: &str = ">";

/// Lays an [`ExtractedRecord`] onto one canvas.
#[derive(Debug, Clone, Default)]
pub struct OnePagerLayout {
    theme: Theme,
}

impl OnePagerLayout {
    /// Create a layout with the default theme.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Render a record. The same record and theme always give the same canvas.
    pub fn render(&self, record: &ExtractedRecord) -> Canvas {
        let mut canvas = Canvas::new(ONE_PAGER_WIDTH, ONE_PAGER_HEIGHT);
        let margin = inches(MARGIN);
        let content_width = canvas.width - 2 * margin;
        let mut y = margin;

        self.draw_title(&mut canvas, record, margin, y, content_width);
        y += inches(TITLE_ADVANCE);

        self.draw_overview(&mut canvas, record, margin, y, content_width);
        y += inches(OVERVIEW_ADVANCE);

        for callout in record.callouts.iter().take(FULL_BANNERS) {
            self.draw_banner(&mut canvas, callout, margin, y, content_width);
            y += inches(BANNER_HEIGHT + BANNER_GUTTER);
        }

        if !record.table_headers.is_empty() && !record.table_rows.is_empty() {
            y = self.draw_table(&mut canvas, record, margin, y, content_width);
        }

        if let Some(callout) = record.callouts.get(FULL_BANNERS) {
            self.draw_closing_banner(&mut canvas, callout, margin, y, content_width);
            y += inches(CLOSING_ADVANCE);
        }

        if y > canvas.height - inches(FOOTER_FROM_BOTTOM) {
            log::debug!("Content reaches {} EMU and overlaps the footer", y);
        }

        self.draw_footer(&mut canvas, record, margin);

        canvas
    }

    fn style(&self, points: u32) -> RunStyle {
        let style = RunStyle::new(FontSize::pt(points), self.theme.black);
        match &self.theme.font {
            Some(font) => style.font(font.clone()),
            None => style,
        }
    }

    fn draw_title(
        &self,
        canvas: &mut Canvas,
        record: &ExtractedRecord,
        margin: i64,
        y: i64,
        width: i64,
    ) {
        canvas.push(Shape::text_box(
            Rect::new(margin, y, width, inches(TITLE_HEIGHT)),
            TextFrame::new(vec![Paragraph::single(&record.title, self.style(32).bold())]),
        ));
        canvas.push(Shape::filled(
            Geometry::Rectangle,
            Rect::new(margin, y + inches(RULE_OFFSET), width, inches(RULE_THICKNESS)),
            self.theme.brand,
        ));
    }

    fn draw_overview(
        &self,
        canvas: &mut Canvas,
        record: &ExtractedRecord,
        margin: i64,
        y: i64,
        width: i64,
    ) {
        let normal = self.style(18).bold();
        let mut emphasized = normal.clone();
        emphasized.color = Some(self.theme.brand);

        let runs = overview_segments(record)
            .into_iter()
            .filter(|segment| !segment.text.is_empty())
            .map(|segment| {
                let style = if segment.emphasized {
                    emphasized.clone()
                } else {
                    normal.clone()
                };
                Run::new(segment.text, style)
            })
            .collect();

        canvas.push(Shape::text_box(
            Rect::new(margin, y, width, inches(OVERVIEW_HEIGHT)),
            TextFrame::new(vec![Paragraph {
                runs,
                ..Default::default()
            }]),
        ));
    }

    fn draw_banner(
        &self,
        canvas: &mut Canvas,
        callout: &Callout,
        margin: i64,
        y: i64,
        width: i64,
    ) {
        let colors = self.theme.banner_colors(callout.kind);
        let height = inches(BANNER_HEIGHT);
        let title_width = inches(BANNER_TITLE_WIDTH);

        self.push_banner_background(canvas, colors, Rect::new(margin, y, width, height));

        canvas.push(Shape::text_box(
            Rect::new(
                margin + inches(0.2),
                y + inches(0.15),
                title_width,
                inches(0.4),
            ),
            TextFrame::new(vec![Paragraph::single(&callout.title, self.style(16).bold())]),
        ));
        canvas.push(Shape::text_box(
            Rect::new(
                margin + title_width + inches(0.3),
                y + inches(0.1),
                width - title_width - inches(0.5),
                height - inches(0.2),
            ),
            TextFrame::new(vec![Paragraph::single(&callout.content, self.style(12))])
                .anchored(Anchor::Middle),
        ));
    }

    fn push_banner_background(&self, canvas: &mut Canvas, colors: BannerColors, frame: Rect) {
        canvas.push(
            Shape::filled(Geometry::Rectangle, frame, colors.fill).with_outline(colors.border),
        );
    }

    /// Header band plus the first body row. Returns the cursor below the table.
    fn draw_table(
        &self,
        canvas: &mut Canvas,
        record: &ExtractedRecord,
        margin: i64,
        top: i64,
        width: i64,
    ) -> i64 {
        let columns = record.table_headers.len() as i64;
        let col_width = width / columns;
        let header_height = inches(HEADER_HEIGHT);

        let mut header_style = self.style(14).bold();
        header_style.color = Some(self.theme.white);

        for (i, header) in record.table_headers.iter().enumerate() {
            let frame = Rect::new(margin + i as i64 * col_width, top, col_width, header_height);
            canvas.push(
                Shape::filled(Geometry::Rectangle, frame, self.theme.brand).with_text(
                    TextFrame::new(vec![
                        Paragraph::single(header, header_style.clone()).aligned(Align::Center)
                    ])
                    .anchored(Anchor::Middle),
                ),
            );
        }

        let row_top = top + header_height;
        let row_height = inches(ROW_HEIGHT);
        let inset = inches(CELL_INSET);

        if let Some(row) = record.summary_row() {
            if row.len() != record.table_headers.len() {
                log::debug!(
                    "Summary row has {} cells for {} columns",
                    row.len(),
                    record.table_headers.len()
                );
            }
            for (i, cell) in row.iter().take(record.table_headers.len()).enumerate() {
                canvas.push(Shape::text_box(
                    Rect::new(
                        margin + i as i64 * col_width + inset,
                        row_top + inset,
                        col_width - 2 * inset,
                        row_height - 2 * inset,
                    ),
                    TextFrame::new(vec![Paragraph::single(cell, self.style(11))]),
                ));
            }
        }

        if record.table_rows.len() > 1 {
            log::debug!(
                "Showing the first of {} table rows",
                record.table_rows.len()
            );
        }

        row_top + row_height + inches(TABLE_GAP)
    }

    fn draw_closing_banner(
        &self,
        canvas: &mut Canvas,
        callout: &Callout,
        margin: i64,
        y: i64,
        width: i64,
    ) {
        let colors = self.theme.compact_banner_colors(callout.kind);
        let title_width = inches(CLOSING_TITLE_WIDTH);

        self.push_banner_background(
            canvas,
            colors,
            Rect::new(margin, y, width, inches(CLOSING_HEIGHT)),
        );

        canvas.push(Shape::text_box(
            Rect::new(
                margin + inches(0.2),
                y + inches(0.12),
                title_width,
                inches(0.35),
            ),
            TextFrame::new(vec![Paragraph::single(&callout.title, self.style(16).bold())])
                .no_wrap(),
        ));
        canvas.push(Shape::text_box(
            Rect::new(
                margin + title_width + inches(0.3),
                y + inches(0.08),
                width - title_width - inches(0.5),
                inches(0.44),
            ),
            TextFrame::new(vec![Paragraph::single(&callout.content, self.style(11))])
                .anchored(Anchor::Middle),
        ));
    }

    fn draw_footer(&self, canvas: &mut Canvas, record: &ExtractedRecord, margin: i64) {
        let footer_y = canvas.height - inches(FOOTER_FROM_BOTTOM);

        let mut marker_style = self.style(48).bold();
        marker_style.color = Some(self.theme.brand);
        canvas.push(Shape::text_box(
            Rect::new(margin, footer_y, inches(0.5), inches(0.4)),
            TextFrame::new(vec![Paragraph::single(FOOTER_MARKER, marker_style)]).no_wrap(),
        ));

        let mut contact_style = self.style(10);
        contact_style.color = Some(self.theme.footer_gray);
        canvas.push(Shape::text_box(
            Rect::new(
                canvas.width - inches(FOOTER_TEXT_FROM_RIGHT),
                footer_y,
                inches(FOOTER_TEXT_WIDTH),
                inches(0.4),
            ),
            TextFrame::new(vec![
                Paragraph::single(&record.footer_contact, contact_style).aligned(Align::Right)
            ])
            .no_wrap(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CalloutKind, HighlightSpan};

    fn tabby() -> ExtractedRecord {
        ExtractedRecord {
            title: "Tabby".to_string(),
            overview_text: "Tabby supports air-gapped deployments.".to_string(),
            overview_highlights: vec!["air-gapped".to_string()],
            highlight_spans: vec![HighlightSpan::new(15, 25)],
            callouts: vec![Callout::new(CalloutKind::Critical, "Risk", "None known")],
            table_headers: vec!["Tool".to_string(), "Score".to_string()],
            table_rows: vec![vec!["Tabby".to_string(), "9/10".to_string()]],
            footer_contact: "Contact: a@b.com".to_string(),
        }
    }

    fn header_cells(canvas: &Canvas, theme: &Theme) -> usize {
        canvas
            .shapes
            .iter()
            .filter(|s| s.fill == Some(theme.brand) && s.text.is_some())
            .count()
    }

    #[test]
    fn test_tabby_layout() {
        let layout = OnePagerLayout::new();
        let theme = layout.theme().clone();
        let canvas = layout.render(&tabby());

        assert_eq!(canvas.width, ONE_PAGER_WIDTH);
        assert_eq!(canvas.height, ONE_PAGER_HEIGHT);

        // title, then the rule
        assert_eq!(canvas.shapes[0].plain_text(), "Tabby");
        assert_eq!(canvas.shapes[1].fill, Some(theme.brand));
        assert_eq!(canvas.shapes[1].frame.cy, inches(0.03));

        // overview runs
        let overview = canvas.shapes[2].text.as_ref().unwrap();
        let runs = &overview.paragraphs[0].runs;
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[1].text, "air-gapped");
        assert!(runs[1].style.bold);
        assert_eq!(runs[1].style.color, Some(theme.brand));
        assert_eq!(runs[0].style.color, Some(theme.black));

        // banner background uses the critical palette
        assert_eq!(canvas.shapes[3].fill, Some(theme.amber_tint));
        assert_eq!(canvas.shapes[3].outline, Some(theme.amber));
        assert_eq!(canvas.shapes[4].plain_text(), "Risk");
        assert_eq!(canvas.shapes[5].plain_text(), "None known");

        assert_eq!(header_cells(&canvas, &theme), 2);

        let last = canvas.shapes.last().unwrap();
        assert_eq!(last.plain_text(), "Contact: a@b.com");
        assert_eq!(last.text.as_ref().unwrap().paragraphs[0].align, Align::Right);
        assert_eq!(
            canvas.shapes[canvas.shapes.len() - 2].plain_text(),
            FOOTER_MARKER
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let layout = OnePagerLayout::new();
        assert_eq!(layout.render(&tabby()), layout.render(&tabby()));
    }

    #[test]
    fn test_empty_record_still_renders() {
        let canvas = OnePagerLayout::new().render(&ExtractedRecord::new());

        // title, rule, overview, marker, footer
        assert_eq!(canvas.shapes.len(), 5);
        let overview = canvas.shapes[2].text.as_ref().unwrap();
        assert!(overview.paragraphs[0].runs.is_empty());
    }

    #[test]
    fn test_ragged_rows_render_within_header_count() {
        let layout = OnePagerLayout::new();
        let theme = layout.theme().clone();

        let mut wide = tabby();
        wide.table_rows = vec![vec!["a".into(), "b".into(), "c".into()]];
        let canvas = layout.render(&wide);
        assert_eq!(header_cells(&canvas, &theme), 2);
        assert!(canvas.shapes.iter().all(|s| s.plain_text() != "c"));

        let mut narrow = tabby();
        narrow.table_rows = vec![vec!["only".into()]];
        let canvas = layout.render(&narrow);
        assert_eq!(header_cells(&canvas, &theme), 2);
        assert!(canvas.shapes.iter().any(|s| s.plain_text() == "only"));
    }

    #[test]
    fn test_only_first_row_rendered() {
        let mut record = tabby();
        record
            .table_rows
            .push(vec!["Continue.dev".into(), "8.5/10".into()]);
        let canvas = OnePagerLayout::new().render(&record);

        assert!(canvas.shapes.iter().any(|s| s.plain_text() == "9/10"));
        assert!(canvas.shapes.iter().all(|s| s.plain_text() != "Continue.dev"));
    }

    #[test]
    fn test_table_skipped_without_rows() {
        let layout = OnePagerLayout::new();
        let theme = layout.theme().clone();
        let mut record = tabby();
        record.table_rows.clear();

        assert_eq!(header_cells(&layout.render(&record), &theme), 0);
    }

    #[test]
    fn test_closing_banner_palette() {
        let layout = OnePagerLayout::new();
        let theme = layout.theme().clone();
        let mut record = tabby();
        record.callouts = vec![
            Callout::new(CalloutKind::Critical, "Risk", "None known"),
            Callout::new(CalloutKind::Recommendation, "Do", "Pilot it"),
            Callout::new(CalloutKind::Critical, "Bottom Line", "Proceed"),
        ];
        let canvas = layout.render(&record);

        let backgrounds: Vec<_> = canvas
            .shapes
            .iter()
            .filter(|s| s.outline.is_some())
            .map(|s| s.fill)
            .collect();
        assert_eq!(
            backgrounds,
            vec![
                Some(theme.amber_tint),
                Some(theme.green_tint),
                Some(theme.purple_tint)
            ]
        );

        let closing = canvas
            .shapes
            .iter()
            .filter(|s| s.outline.is_some())
            .last()
            .unwrap();
        assert_eq!(closing.frame.cy, inches(0.6));
    }

    #[test]
    fn test_fourth_callout_ignored() {
        let mut record = tabby();
        record.callouts = (0..4)
            .map(|i| Callout::new(CalloutKind::Default, format!("T{}", i), "c"))
            .collect();
        let canvas = OnePagerLayout::new().render(&record);

        assert!(canvas.shapes.iter().any(|s| s.plain_text() == "T2"));
        assert!(canvas.shapes.iter().all(|s| s.plain_text() != "T3"));
    }

    #[test]
    fn test_theme_without_font() {
        let theme = Theme {
            font: None,
            ..Theme::default()
        };
        let canvas = OnePagerLayout::new().with_theme(theme).render(&tabby());
        let title = canvas.shapes[0].text.as_ref().unwrap();

        assert_eq!(title.paragraphs[0].runs[0].style.font, None);
    }
}
