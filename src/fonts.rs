//! Font choices, loading, and text measurement using `ttf-parser`.
//!
//! A book uses three faces: the body font, its italic, and the title font.
//! They are loaded from the assets directory. When no files are available
//! (tests, layout previews) [`FontManager::builtin`] supplies synthetic
//! metrics and the renderer falls back to the PDF base-14 fonts.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BookError, Result};

/// Points to millimetres.
pub const PT_TO_MM: f32 = 0.352_778;

/// Body text typeface, picked by index on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BodyFont {
    #[default]
    PtSerif,
    EbGaramond,
    FiraSans,
}

impl BodyFont {
    /// 0: PT Serif, 1: EB Garamond, 2: Fira Sans. Anything else is PT Serif.
    pub fn from_index(index: usize) -> Self {
        match index {
            1 => BodyFont::EbGaramond,
            2 => BodyFont::FiraSans,
            _ => BodyFont::PtSerif,
        }
    }

    /// Parse a command-line value. Anything that is not a known index is
    /// PT Serif.
    pub fn from_flag(flag: &str) -> Self {
        Self::from_index(flag.trim().parse().unwrap_or(0))
    }

    pub fn family(self) -> &'static str {
        match self {
            BodyFont::PtSerif => "PT_Serif",
            BodyFont::EbGaramond => "EB_Garamond",
            BodyFont::FiraSans => "Fira_Sans",
        }
    }

    /// Regular face, relative to the assets directory.
    pub fn regular_path(self) -> &'static str {
        match self {
            BodyFont::PtSerif => "fonts/PT_Serif/PTSerif-Regular.ttf",
            BodyFont::EbGaramond => "fonts/EB_Garamond/EBGaramond-Regular.ttf",
            BodyFont::FiraSans => "fonts/Fira_Sans/FiraSans-Regular.ttf",
        }
    }

    /// Italic face, relative to the assets directory.
    pub fn italic_path(self) -> &'static str {
        match self {
            BodyFont::PtSerif => "fonts/PT_Serif/PTSerif-Italic.ttf",
            BodyFont::EbGaramond => "fonts/EB_Garamond/EBGaramond-Italic.ttf",
            BodyFont::FiraSans => "fonts/Fira_Sans/FiraSans-Italic.ttf",
        }
    }
}

/// Display typeface for titles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TitleFont {
    #[default]
    PlayfairDisplay,
    DmSans,
    Raleway,
    PlayfairDisplaySc,
}

impl TitleFont {
    /// 0: Playfair Display, 1: DM Sans, 2: Raleway, 3: Playfair Display SC.
    /// Anything else is Playfair Display.
    pub fn from_index(index: usize) -> Self {
        match index {
            1 => TitleFont::DmSans,
            2 => TitleFont::Raleway,
            3 => TitleFont::PlayfairDisplaySc,
            _ => TitleFont::PlayfairDisplay,
        }
    }

    pub fn from_flag(flag: &str) -> Self {
        Self::from_index(flag.trim().parse().unwrap_or(0))
    }

    pub fn family(self) -> &'static str {
        match self {
            TitleFont::PlayfairDisplay => "Playfair",
            TitleFont::DmSans => "DMSans",
            TitleFont::Raleway => "Raleway",
            TitleFont::PlayfairDisplaySc => "PlayfairSC",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            TitleFont::PlayfairDisplay => "fonts/Playfair_Display/PlayfairDisplay-Medium.ttf",
            TitleFont::DmSans => "fonts/DM_Sans/DMSans-Medium.ttf",
            TitleFont::Raleway => "fonts/Raleway/Raleway-Medium.ttf",
            TitleFont::PlayfairDisplaySc => {
                "fonts/Playfair_Display_SC/PlayfairDisplaySC-Regular.ttf"
            }
        }
    }
}

/// Which of the three book faces a piece of text is set in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontRole {
    Body,
    BodyItalic,
    Title,
}

/// A loaded font face with metrics.
#[derive(Clone)]
pub struct FontData {
    /// Raw font bytes; empty for the synthetic builtin metrics.
    pub bytes: Vec<u8>,
    pub units_per_em: f32,
}

/// The three faces of a book.
pub struct FontManager {
    fonts: HashMap<FontRole, FontData>,
}

impl FontManager {
    /// Load the chosen faces from `assets_dir`.
    pub fn load(assets_dir: &Path, body: BodyFont, title: TitleFont) -> Result<Self> {
        let mut fonts = HashMap::new();
        let faces = [
            (FontRole::Body, body.family(), body.regular_path()),
            (FontRole::BodyItalic, body.family(), body.italic_path()),
            (FontRole::Title, title.family(), title.path()),
        ];
        for (role, family, rel) in faces {
            let path = assets_dir.join(rel);
            let bytes = fs::read(&path)
                .map_err(|e| BookError::Fonts(format!("{}: {e}", path.display())))?;
            let data = parse_font(bytes)
                .map_err(|e| BookError::Fonts(format!("{}: {e}", path.display())))?;
            log::debug!("Loaded {family} ({role:?}) from {}", path.display());
            fonts.insert(role, data);
        }
        Ok(Self { fonts })
    }

    /// Synthetic Helvetica-like metrics with no font files behind them.
    pub fn builtin() -> Self {
        let synthetic = || FontData {
            bytes: Vec::new(),
            units_per_em: 1000.0,
        };
        let fonts = HashMap::from([
            (FontRole::Body, synthetic()),
            (FontRole::BodyItalic, synthetic()),
            (FontRole::Title, synthetic()),
        ]);
        Self { fonts }
    }

    /// Font bytes for embedding, if a real face is loaded for `role`.
    pub fn font_bytes(&self, role: FontRole) -> Option<&[u8]> {
        self.fonts
            .get(&role)
            .filter(|d| !d.bytes.is_empty())
            .map(|d| d.bytes.as_slice())
    }

    /// Width of `text` at `font_size` points, in points.
    ///
    /// With real font bytes the glyph advances are summed; otherwise an
    /// average width of 0.5 × font size per char is assumed.
    pub fn measure_text_width(&self, text: &str, role: FontRole, font_size: f32) -> f32 {
        let data = match self.fonts.get(&role) {
            Some(d) if !d.bytes.is_empty() => d,
            _ => return text.chars().count() as f32 * font_size * 0.5,
        };

        match ttf_parser::Face::parse(&data.bytes, 0) {
            Ok(face) => {
                let scale = font_size / data.units_per_em;
                text.chars()
                    .map(|ch| match face.glyph_index(ch) {
                        Some(gid) => face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale,
                        None => font_size * 0.5,
                    })
                    .sum()
            }
            Err(_) => text.chars().count() as f32 * font_size * 0.5,
        }
    }

    /// Same as [`measure_text_width`](Self::measure_text_width), in millimetres.
    pub fn text_width_mm(&self, text: &str, role: FontRole, font_size: f32) -> f32 {
        self.measure_text_width(text, role, font_size) * PT_TO_MM
    }
}

impl Default for FontManager {
    fn default() -> Self {
        Self::builtin()
    }
}

fn parse_font(bytes: Vec<u8>) -> std::result::Result<FontData, String> {
    let face = ttf_parser::Face::parse(&bytes, 0).map_err(|e| format!("Failed to parse font: {e}"))?;
    Ok(FontData {
        units_per_em: face.units_per_em() as f32,
        bytes,
    })
}

/// One output line of [`wrap_text`].
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    pub text: String,
    /// True for the final line of a source paragraph (never justified).
    pub ends_paragraph: bool,
}

/// Word-wrap text to fit within `max_width_mm`.
///
/// Explicit newlines always break. Leading whitespace of each paragraph is
/// kept on its first line so indentation survives wrapping.
pub fn wrap_text(
    text: &str,
    role: FontRole,
    font_size: f32,
    max_width_mm: f32,
    fonts: &FontManager,
) -> Vec<WrappedLine> {
    let mut lines = Vec::new();
    let space = fonts.text_width_mm(" ", role, font_size);

    for paragraph in text.split('\n') {
        let trimmed = paragraph.trim_start();
        let indent = &paragraph[..paragraph.len() - trimmed.len()];
        let words: Vec<&str> = trimmed.split_whitespace().collect();
        if words.is_empty() {
            lines.push(WrappedLine {
                text: String::new(),
                ends_paragraph: true,
            });
            continue;
        }

        let mut current = indent.to_string();
        let mut current_width = fonts.text_width_mm(indent, role, font_size);
        let mut has_word = false;
        for word in words {
            let word_width = fonts.text_width_mm(word, role, font_size);
            let candidate = if has_word {
                current_width + space + word_width
            } else {
                current_width + word_width
            };
            if candidate > max_width_mm && has_word {
                lines.push(WrappedLine {
                    text: std::mem::take(&mut current),
                    ends_paragraph: false,
                });
                current.push_str(word);
                current_width = word_width;
            } else {
                if has_word {
                    current.push(' ');
                }
                current.push_str(word);
                current_width = candidate;
            }
            has_word = true;
        }
        lines.push(WrappedLine {
            text: current,
            ends_paragraph: true,
        });
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_text_width() {
        let mgr = FontManager::builtin();
        let w = mgr.measure_text_width("Hello", FontRole::Body, 16.0);
        // 5 chars × 16 × 0.5 = 40
        assert!((w - 40.0).abs() < 0.1);
    }

    #[test]
    fn word_wrap_basic() {
        let mgr = FontManager::builtin();
        let lines = wrap_text("Hello world foo bar", FontRole::Body, 16.0, 20.0, &mgr);
        assert!(lines.len() >= 2, "Expected wrapping, got {:?}", lines);
        assert!(lines.last().unwrap().ends_paragraph);
        assert!(!lines[0].ends_paragraph);
    }

    #[test]
    fn wrap_keeps_paragraph_indent() {
        let mgr = FontManager::builtin();
        let lines = wrap_text("    first\n    second", FontRole::Body, 8.0, 500.0, &mgr);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "    first");
        assert_eq!(lines[1].text, "    second");
    }

    #[test]
    fn blank_paragraphs_become_empty_lines() {
        let mgr = FontManager::builtin();
        let lines = wrap_text("a\n\nb", FontRole::Body, 8.0, 500.0, &mgr);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].text, "");
    }

    #[test]
    fn font_choices_fall_back_to_defaults() {
        assert_eq!(BodyFont::from_index(2), BodyFont::FiraSans);
        assert_eq!(BodyFont::from_index(9), BodyFont::PtSerif);
        assert_eq!(TitleFont::from_index(3), TitleFont::PlayfairDisplaySc);
        assert_eq!(TitleFont::from_index(42), TitleFont::PlayfairDisplay);
    }

    #[test]
    fn font_flags_tolerate_garbage() {
        assert_eq!(BodyFont::from_flag("1"), BodyFont::EbGaramond);
        assert_eq!(BodyFont::from_flag(" 2 "), BodyFont::FiraSans);
        assert_eq!(BodyFont::from_flag("x"), BodyFont::PtSerif);
        assert_eq!(BodyFont::from_flag("-1"), BodyFont::PtSerif);
        assert_eq!(TitleFont::from_flag("3"), TitleFont::PlayfairDisplaySc);
        assert_eq!(TitleFont::from_flag("raleway"), TitleFont::PlayfairDisplay);
        assert_eq!(TitleFont::from_flag(""), TitleFont::PlayfairDisplay);
    }

    #[test]
    fn missing_font_files_are_reported() {
        let dir = std::env::temp_dir().join("finalformat-no-fonts-here");
        let err = FontManager::load(&dir, BodyFont::PtSerif, TitleFont::Raleway)
            .err()
            .expect("fonts should be missing");
        assert!(matches!(err, BookError::Fonts(_)));
    }
}
