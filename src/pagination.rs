//! Pagination – a page writer that places text cells, wrapped text blocks
//! and images onto book pages.
//!
//! Handles:
//! - a running y cursor per page, reset to the top margin on a new page
//! - automatic page breaks while a text block flows past the bottom margin
//! - justified lines, built as one positioned fragment per word
//! - footer page numbers, switched on and off around the chapter range

use crate::book::PageSize;
use crate::fonts::{wrap_text, FontManager, FontRole, PT_TO_MM};
use crate::layout_config::*;

/// Horizontal padding inside every cell, in millimetres.
pub const CELL_MARGIN_MM: f32 = 1.0;
/// Distance of the footer cell from the bottom edge.
pub const FOOTER_OFFSET_MM: f32 = 12.0;
pub const FOOTER_HEIGHT_MM: f32 = 10.0;
pub const FOOTER_FONT_SIZE: f32 = 6.0;
/// Width of the border drawn around bordered blocks.
pub const BORDER_WIDTH_MM: f32 = 0.2;

/// Face and size of a run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: FontRole,
    /// Size in points.
    pub size: f32,
}

impl TextStyle {
    pub fn new(font: FontRole, size: f32) -> Self {
        Self { font, size }
    }
}

/// Appends positioned boxes to an ordered list of pages.
pub struct PageWriter<'a> {
    config: LayoutConfig,
    margin: f32,
    /// Text may not extend below this y.
    break_trigger: f32,
    y: f32,
    numbering: bool,
    fonts: &'a FontManager,
}

impl<'a> PageWriter<'a> {
    pub fn new(title: &str, page_size: PageSize, fonts: &'a FontManager) -> Self {
        let (width, height) = page_size.dimensions_mm();
        let margin = page_size.margin_mm();
        Self {
            config: LayoutConfig::new(title, width, height),
            margin,
            break_trigger: height - (margin - 2.0),
            y: margin,
            numbering: false,
            fonts,
        }
    }

    pub fn page_width(&self) -> f32 {
        self.config.page_width_mm
    }

    pub fn page_height(&self) -> f32 {
        self.config.page_height_mm
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn page_count(&self) -> usize {
        self.config.pages.len()
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn set_y(&mut self, y: f32) {
        self.y = y;
    }

    /// Pages added while numbering is on carry a footer number.
    pub fn set_numbering(&mut self, on: bool) {
        self.numbering = on;
    }

    /// Start a new page and move the cursor to the top margin.
    pub fn add_page(&mut self, kind: PageKind) {
        let page_index = self.config.pages.len();
        let page_number = self.numbering.then_some(page_index + 1);
        let mut page = PageLayout {
            page_index,
            kind,
            page_number,
            boxes: Vec::new(),
        };
        if let Some(number) = page_number {
            page.boxes.push(self.footer_box(number));
        }
        self.config.pages.push(page);
        self.y = self.margin;
    }

    /// A single line of text in a box of `height` starting at the cursor.
    /// A `width` of 0 extends to the right margin. The cursor does not move.
    pub fn cell(&mut self, width: f32, height: f32, text: &str, style: TextStyle, align: TextAlign) {
        let width = self.resolve_width(width);
        let text_width = self.fonts.text_width_mm(text, style.font, style.size);
        let mut lbox = LayoutBox::new(self.margin, self.y, width, height);
        lbox.text = Some(TextContent {
            lines: vec![TextLine {
                text: text.to_string(),
                x_offset: align_offset(width, text_width, align),
                y_offset: baseline_offset(height, style.size),
            }],
            font: style.font,
            font_size: style.size,
            line_height: height,
            align,
        });
        self.push_box(lbox);
    }

    /// Wrapped text flowing down from the cursor, breaking onto new pages of
    /// the same kind as needed. The cursor ends below the last line.
    pub fn multi_cell(
        &mut self,
        width: f32,
        line_height: f32,
        text: &str,
        style: TextStyle,
        align: TextAlign,
        border: bool,
    ) {
        let width = self.resolve_width(width);
        let inner = width - 2.0 * CELL_MARGIN_MM;
        let wrapped = wrap_text(text, style.font, style.size, inner, self.fonts);
        let space = self.fonts.text_width_mm(" ", style.font, style.size);

        let mut chunk: Vec<TextLine> = Vec::new();
        let mut chunk_top = self.y;

        for line in wrapped {
            if self.y + line_height > self.break_trigger {
                self.flush_chunk(&mut chunk, chunk_top, width, line_height, style, align, border);
                let kind = self.current_kind();
                self.add_page(kind);
                chunk_top = self.y;
            }
            let baseline = (self.y - chunk_top) + baseline_offset(line_height, style.size);
            let justify = align == TextAlign::Justify && !line.ends_paragraph;
            chunk.extend(self.place_line(&line.text, width, space, baseline, style, align, justify));
            self.y += line_height;
        }
        self.flush_chunk(&mut chunk, chunk_top, width, line_height, style, align, border);
    }

    /// Place an image box with its top-left corner at `(x, y)`.
    pub fn image(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let mut lbox = LayoutBox::new(x, y, width, height);
        lbox.image = Some(ImageContent { width, height });
        self.push_box(lbox);
    }

    pub fn finish(self) -> LayoutConfig {
        self.config
    }

    fn resolve_width(&self, width: f32) -> f32 {
        if width > 0.0 {
            width
        } else {
            self.config.page_width_mm - 2.0 * self.margin
        }
    }

    fn current_kind(&self) -> PageKind {
        self.config
            .pages
            .last()
            .map_or(PageKind::Blank, |p| p.kind)
    }

    fn push_box(&mut self, lbox: LayoutBox) {
        if self.config.pages.is_empty() {
            self.add_page(PageKind::Blank);
        }
        if let Some(page) = self.config.pages.last_mut() {
            page.boxes.push(lbox);
        }
    }

    fn footer_box(&self, number: usize) -> LayoutBox {
        let width = self.config.page_width_mm - 2.0 * self.margin;
        let y = self.config.page_height_mm - FOOTER_OFFSET_MM;
        let text = number.to_string();
        let style = TextStyle::new(FontRole::Body, FOOTER_FONT_SIZE);
        let align = if number % 2 == 0 {
            TextAlign::Left
        } else {
            TextAlign::Right
        };
        let text_width = self.fonts.text_width_mm(&text, style.font, style.size);
        let mut lbox = LayoutBox::new(self.margin, y, width, FOOTER_HEIGHT_MM);
        lbox.text = Some(TextContent {
            lines: vec![TextLine {
                text,
                x_offset: align_offset(width, text_width, align),
                y_offset: baseline_offset(FOOTER_HEIGHT_MM, style.size),
            }],
            font: style.font,
            font_size: style.size,
            line_height: FOOTER_HEIGHT_MM,
            align,
        });
        lbox
    }

    #[allow(clippy::too_many_arguments)]
    fn place_line(
        &self,
        text: &str,
        width: f32,
        space: f32,
        baseline: f32,
        style: TextStyle,
        align: TextAlign,
        justify: bool,
    ) -> Vec<TextLine> {
        if text.is_empty() {
            return Vec::new();
        }
        let text_width = self.fonts.text_width_mm(text, style.font, style.size);
        let inner = width - 2.0 * CELL_MARGIN_MM;
        let words: Vec<&str> = text.split_whitespace().collect();

        if !justify || words.len() < 2 || text_width >= inner {
            return vec![TextLine {
                text: text.to_string(),
                x_offset: align_offset(width, text_width, align),
                y_offset: baseline,
            }];
        }

        let indent = &text[..text.len() - text.trim_start().len()];
        let gap = space + (inner - text_width) / (words.len() - 1) as f32;
        let mut x = CELL_MARGIN_MM + self.fonts.text_width_mm(indent, style.font, style.size);
        words
            .into_iter()
            .map(|word| {
                let fragment = TextLine {
                    text: word.to_string(),
                    x_offset: x,
                    y_offset: baseline,
                };
                x += self.fonts.text_width_mm(word, style.font, style.size) + gap;
                fragment
            })
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn flush_chunk(
        &mut self,
        chunk: &mut Vec<TextLine>,
        top: f32,
        width: f32,
        line_height: f32,
        style: TextStyle,
        align: TextAlign,
        border: bool,
    ) {
        let height = self.y - top;
        if height <= 0.0 {
            return;
        }
        let mut lbox = LayoutBox::new(self.margin, top, width, height);
        if border {
            lbox.border = Some(BorderStyle {
                width: BORDER_WIDTH_MM,
            });
        }
        lbox.text = Some(TextContent {
            lines: std::mem::take(chunk),
            font: style.font,
            font_size: style.size,
            line_height,
            align,
        });
        self.push_box(lbox);
    }
}

/// X offset of a line of `text_width` inside a box of `width`.
fn align_offset(width: f32, text_width: f32, align: TextAlign) -> f32 {
    match align {
        TextAlign::Left | TextAlign::Justify => CELL_MARGIN_MM,
        TextAlign::Right => width - CELL_MARGIN_MM - text_width,
        TextAlign::Center => (width - text_width) / 2.0,
    }
}

/// Baseline of text vertically centred in a line of `height`.
fn baseline_offset(height: f32, font_size: f32) -> f32 {
    height / 2.0 + 0.3 * font_size * PT_TO_MM
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer(fonts: &FontManager) -> PageWriter<'_> {
        PageWriter::new("Test", PageSize::Regular, fonts)
    }

    #[test]
    fn add_page_resets_cursor_to_margin() {
        let fonts = FontManager::builtin();
        let mut w = writer(&fonts);
        w.add_page(PageKind::Blank);
        w.set_y(100.0);
        w.add_page(PageKind::Blank);
        assert!((w.y() - w.margin()).abs() < 1e-4);
        assert_eq!(w.page_count(), 2);
    }

    #[test]
    fn right_aligned_cell_ends_at_margin() {
        let fonts = FontManager::builtin();
        let mut w = writer(&fonts);
        w.add_page(PageKind::HalfTitle);
        w.cell(0.0, 3.0, "TITLE", TextStyle::new(FontRole::Title, 8.0), TextAlign::Right);
        let config = w.finish();
        let lbox = &config.pages[0].boxes[0];
        let line = &lbox.text.as_ref().unwrap().lines[0];
        let text_width = fonts.text_width_mm("TITLE", FontRole::Title, 8.0);
        assert!((line.x_offset + text_width + CELL_MARGIN_MM - lbox.width).abs() < 1e-3);
    }

    #[test]
    fn long_text_breaks_onto_same_kind_pages() {
        let fonts = FontManager::builtin();
        let mut w = writer(&fonts);
        w.set_numbering(true);
        w.add_page(PageKind::Chapter);
        w.set_y(60.0);
        let body = "    word ".repeat(3000);
        w.multi_cell(0.0, 4.6, &body, TextStyle::new(FontRole::Body, 8.0), TextAlign::Justify, false);
        let config = w.finish();
        assert!(config.pages.len() > 2);
        for page in &config.pages {
            assert_eq!(page.kind, PageKind::Chapter);
            assert_eq!(page.page_number, Some(page.page_index + 1));
            for lbox in &page.boxes {
                assert!(lbox.y + lbox.height <= config.page_height_mm);
            }
        }
    }

    #[test]
    fn justified_lines_span_the_text_width() {
        let fonts = FontManager::builtin();
        let mut w = writer(&fonts);
        w.add_page(PageKind::Chapter);
        let body = "alpha beta gamma delta ".repeat(20);
        w.multi_cell(0.0, 4.6, &body, TextStyle::new(FontRole::Body, 8.0), TextAlign::Justify, false);
        let config = w.finish();
        let lbox = &config.pages[0].boxes[0];
        let text = lbox.text.as_ref().unwrap();
        let first_baseline = text.lines[0].y_offset;
        let last_on_first_line = text
            .lines
            .iter()
            .filter(|l| (l.y_offset - first_baseline).abs() < 1e-4)
            .last()
            .unwrap();
        let end = last_on_first_line.x_offset
            + fonts.text_width_mm(&last_on_first_line.text, FontRole::Body, 8.0);
        assert!((end - (lbox.width - CELL_MARGIN_MM)).abs() < 0.01);
    }

    #[test]
    fn footer_number_side_alternates() {
        let fonts = FontManager::builtin();
        let mut w = writer(&fonts);
        w.set_numbering(true);
        w.add_page(PageKind::Chapter);
        w.add_page(PageKind::Chapter);
        let config = w.finish();
        let align = |i: usize| config.pages[i].boxes[0].text.as_ref().unwrap().align;
        assert_eq!(align(0), TextAlign::Right);
        assert_eq!(align(1), TextAlign::Left);
    }

    #[test]
    fn bordered_block_gets_a_border() {
        let fonts = FontManager::builtin();
        let mut w = writer(&fonts);
        w.add_page(PageKind::Metadata);
        w.multi_cell(40.0, 3.0, "a\nb", TextStyle::new(FontRole::Body, 5.0), TextAlign::Left, true);
        let config = w.finish();
        let lbox = &config.pages[0].boxes[0];
        assert!(lbox.border.is_some());
        assert!((lbox.height - 6.0).abs() < 1e-4);
        assert!((lbox.width - 40.0).abs() < 1e-4);
    }
}
