//! Layout config – the page-description records passed from composition to
//! rendering. This is the "frozen" structure that encodes exactly what goes
//! on each page of the book.
//!
//! All coordinates are millimetres from the top-left corner of the page.

use serde::{Deserialize, Serialize};

use crate::fonts::FontRole;

/// A complete book layout ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Document title embedded in the PDF metadata.
    #[serde(default = "LayoutConfig::default_title")]
    pub title: String,
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    /// Ordered list of pages.
    pub pages: Vec<PageLayout>,
}

/// What a page is for. Only informational for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageKind {
    HalfTitle,
    Blank,
    TitlePage,
    Metadata,
    Quote,
    Chapter,
    Padding,
    Bio,
}

/// One page of content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_index: usize,
    pub kind: PageKind,
    /// Footer number, when numbering was on for this page.
    pub page_number: Option<usize>,
    pub boxes: Vec<LayoutBox>,
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
    Justify,
}

/// Alignment of chapter titles, as given on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TitleAlign {
    #[default]
    Left,
    Right,
    Center,
}

impl TitleAlign {
    /// `L`, `R` or `C` in any case. Anything else is `Left`.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag.map(|f| f.trim().to_ascii_uppercase()).as_deref() {
            Some("R") => TitleAlign::Right,
            Some("C") => TitleAlign::Center,
            Some("L") | None => TitleAlign::Left,
            Some(other) => {
                log::warn!("Unknown title alignment {other:?}, using L");
                TitleAlign::Left
            }
        }
    }
}

impl From<TitleAlign> for TextAlign {
    fn from(align: TitleAlign) -> Self {
        match align {
            TitleAlign::Left => TextAlign::Left,
            TitleAlign::Right => TextAlign::Right,
            TitleAlign::Center => TextAlign::Center,
        }
    }
}

/// A positioned rectangle with optional content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,

    pub border: Option<BorderStyle>,

    /// Content (mutually exclusive in practice)
    pub text: Option<TextContent>,
    pub image: Option<ImageContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorderStyle {
    /// Line width in millimetres.
    pub width: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextContent {
    /// Pre-wrapped, pre-aligned fragments of text.
    pub lines: Vec<TextLine>,
    pub font: FontRole,
    /// Font size in points.
    pub font_size: f32,
    pub line_height: f32,
    pub align: TextAlign,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    /// X offset of the fragment within the box.
    pub x_offset: f32,
    /// Baseline offset from the top of the box.
    pub y_offset: f32,
}

/// The book logo, scaled to `width` × `height`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageContent {
    pub width: f32,
    pub height: f32,
}

impl LayoutConfig {
    pub fn new(title: &str, page_width_mm: f32, page_height_mm: f32) -> Self {
        Self {
            title: title.to_string(),
            page_width_mm,
            page_height_mm,
            pages: Vec::new(),
        }
    }

    fn default_title() -> String {
        "finalformat book".to_string()
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| e.to_string())
    }

    pub fn pages_of_kind(&self, kind: PageKind) -> impl Iterator<Item = &PageLayout> {
        self.pages.iter().filter(move |p| p.kind == kind)
    }
}

impl PageLayout {
    /// All text on the page, one string per fragment.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.boxes
            .iter()
            .filter_map(|b| b.text.as_ref())
            .flat_map(|t| t.lines.iter().map(|l| l.text.as_str()))
    }
}

impl LayoutBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            border: None,
            text: None,
            image: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_align_flags() {
        assert_eq!(TitleAlign::from_flag(Some("r")), TitleAlign::Right);
        assert_eq!(TitleAlign::from_flag(Some("C")), TitleAlign::Center);
        assert_eq!(TitleAlign::from_flag(Some("L")), TitleAlign::Left);
        assert_eq!(TitleAlign::from_flag(Some("43")), TitleAlign::Left);
        assert_eq!(TitleAlign::from_flag(None), TitleAlign::Left);
    }

    #[test]
    fn json_roundtrip_keeps_pages() {
        let mut config = LayoutConfig::new("Book", 140.0, 210.0);
        config.pages.push(PageLayout {
            page_index: 0,
            kind: PageKind::Blank,
            page_number: None,
            boxes: vec![LayoutBox::new(1.0, 2.0, 3.0, 4.0)],
        });
        let parsed = LayoutConfig::from_json(&config.to_json()).unwrap();
        assert_eq!(parsed.pages.len(), 1);
        assert_eq!(parsed.pages[0].kind, PageKind::Blank);
        assert!((parsed.page_height_mm - 210.0).abs() < 0.01);
    }
}
