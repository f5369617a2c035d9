//! PDF renderer – takes a [`LayoutConfig`] and produces PDF bytes using
//! `printpdf` (v0.8 ops-based API).

use std::collections::HashMap;

use printpdf::*;

use crate::error::{BookError, Result};
use crate::fonts::{FontManager, FontRole};
use crate::layout_config::{LayoutBox, LayoutConfig};

/// A face ready to be referenced from page ops.
#[derive(Clone)]
enum FontHandle {
    Builtin(BuiltinFont),
    Embedded(FontId),
}

/// Base-14 stand-ins used when a role has no font file loaded.
fn builtin_for(role: FontRole) -> BuiltinFont {
    match role {
        FontRole::Body => BuiltinFont::TimesRoman,
        FontRole::BodyItalic => BuiltinFont::TimesItalic,
        FontRole::Title => BuiltinFont::Helvetica,
    }
}

/// The registered logo XObject and its pixel size.
struct ImageResource {
    xobj_id: XObjectId,
    px_width: usize,
    px_height: usize,
}

/// Render a LayoutConfig into PDF bytes.
///
/// `logo` is the encoded image placed wherever the layout has an image box.
/// If it cannot be decoded the image boxes are skipped with a warning.
pub fn render_pdf(config: &LayoutConfig, fonts: &FontManager, logo: Option<&[u8]>) -> Result<Vec<u8>> {
    let page_w = Mm(config.page_width_mm);
    let page_h = Mm(config.page_height_mm);

    let mut doc = PdfDocument::new(&config.title);
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();

    // ── Register fonts ────────────────────────────────────────────────────
    let mut handles: HashMap<FontRole, FontHandle> = HashMap::new();
    for role in [FontRole::Body, FontRole::BodyItalic, FontRole::Title] {
        let handle = match fonts.font_bytes(role) {
            Some(bytes) => {
                let parsed = ParsedFont::from_bytes(bytes, 0, &mut warnings).ok_or_else(|| {
                    BookError::Pdf(format!("cannot embed the {role:?} font"))
                })?;
                FontHandle::Embedded(doc.add_font(&parsed))
            }
            None => FontHandle::Builtin(builtin_for(role)),
        };
        handles.insert(role, handle);
    }

    // ── Register the logo ─────────────────────────────────────────────────
    let image = match logo {
        Some(bytes) => match RawImage::decode_from_bytes(bytes, &mut warnings) {
            Ok(raw) => Some(ImageResource {
                px_width: raw.width,
                px_height: raw.height,
                xobj_id: doc.add_image(&raw),
            }),
            Err(e) => {
                log::warn!("Skipping logo, decode error: {e}");
                None
            }
        },
        None => None,
    };

    // ── Render pages ──────────────────────────────────────────────────────
    let pages: Vec<PdfPage> = config
        .pages
        .iter()
        .map(|page_layout| {
            let mut ops = Vec::new();
            for lbox in &page_layout.boxes {
                render_box(&mut ops, lbox, config.page_height_mm, &handles, image.as_ref());
            }
            PdfPage::new(page_w, page_h, ops)
        })
        .collect();

    doc.with_pages(pages);
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    for w in &warnings {
        log::debug!("printpdf: {w:?}");
    }

    Ok(bytes)
}

/// The base-14 fonts only cover WinAnsi; swap typographic punctuation for
/// plain ASCII and anything else outside Latin-1 for `?`.
fn to_builtin_text(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2022}' => '*',
            '\u{00A0}' => ' ',
            c if (c as u32) < 256 => c,
            _ => '?',
        })
        .collect()
}

fn point(x_mm: f32, y_mm: f32) -> Point {
    Point {
        x: Mm(x_mm).into(),
        y: Mm(y_mm).into(),
    }
}

fn black() -> Color {
    Color::Rgb(Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        icc_profile: None,
    })
}

/// Render one LayoutBox into PDF ops.
fn render_box(
    ops: &mut Vec<Op>,
    lbox: &LayoutBox,
    page_height: f32,
    fonts: &HashMap<FontRole, FontHandle>,
    image: Option<&ImageResource>,
) {
    // PDF coordinate system: origin at bottom-left.
    // Our layout uses origin at top-left. Convert:
    let top = page_height - lbox.y;
    let bottom = top - lbox.height;

    // Border
    if let Some(border) = &lbox.border {
        ops.push(Op::SetOutlineColor { col: black() });
        ops.push(Op::SetOutlineThickness {
            pt: Mm(border.width).into(),
        });
        let (x1, x2) = (lbox.x, lbox.x + lbox.width);
        ops.push(Op::DrawLine {
            line: Line {
                points: [(x1, top), (x2, top), (x2, bottom), (x1, bottom)]
                    .into_iter()
                    .map(|(x, y)| LinePoint {
                        p: point(x, y),
                        bezier: false,
                    })
                    .collect(),
                is_closed: true,
            },
        });
    }

    // Text
    if let Some(text) = &lbox.text {
        let handle = fonts
            .get(&text.font)
            .cloned()
            .unwrap_or(FontHandle::Builtin(builtin_for(text.font)));

        for tline in &text.lines {
            if tline.text.is_empty() {
                continue;
            }
            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: point(lbox.x + tline.x_offset, top - tline.y_offset),
            });
            ops.push(Op::SetFillColor { col: black() });
            match &handle {
                FontHandle::Builtin(font) => {
                    ops.push(Op::SetFontSizeBuiltinFont {
                        size: Pt(text.font_size),
                        font: *font,
                    });
                    ops.push(Op::WriteTextBuiltinFont {
                        items: vec![TextItem::Text(to_builtin_text(&tline.text))],
                        font: *font,
                    });
                }
                FontHandle::Embedded(id) => {
                    ops.push(Op::SetFontSize {
                        size: Pt(text.font_size),
                        font: id.clone(),
                    });
                    ops.push(Op::WriteText {
                        items: vec![TextItem::Text(tline.text.clone())],
                        font: id.clone(),
                    });
                }
            }
            ops.push(Op::EndTextSection);
        }
    }

    // Image – embed from the pre-registered XObject
    if let (Some(img), Some(res)) = (&lbox.image, image) {
        // At dpi=72 printpdf renders 1 px = 1 pt, so
        // scale = desired_pt / px_dim.
        let width_pt: Pt = Mm(img.width).into();
        let height_pt: Pt = Mm(img.height).into();
        let scale_x = if res.px_width > 0 {
            width_pt.0 / res.px_width as f32
        } else {
            1.0
        };
        let scale_y = if res.px_height > 0 {
            height_pt.0 / res.px_height as f32
        } else {
            1.0
        };

        ops.push(Op::UseXobject {
            id: res.xobj_id.clone(),
            transform: XObjectTransform {
                translate_x: Some(Mm(lbox.x).into()),
                translate_y: Some(Mm(page_height - lbox.y - img.height).into()),
                dpi: Some(72.0),
                scale_x: Some(scale_x),
                scale_y: Some(scale_y),
                rotate: None,
            },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::PageSize;
    use crate::layout_config::{PageKind, TextAlign};
    use crate::pagination::{PageWriter, TextStyle};

    #[test]
    fn render_empty_layout() {
        let config = LayoutConfig::new("Empty", 140.0, 210.0);
        let bytes = render_pdf(&config, &FontManager::builtin(), None).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn render_text_and_border() {
        let fonts = FontManager::builtin();
        let mut w = PageWriter::new("Boxed", PageSize::Small, &fonts);
        w.add_page(PageKind::Metadata);
        w.multi_cell(30.0, 3.0, "“curly” – text", TextStyle::new(FontRole::Body, 5.0), TextAlign::Left, true);
        let bytes = render_pdf(&w.finish(), &fonts, None).unwrap();
        assert!(bytes.len() > 100, "PDF should have content");
    }

    #[test]
    fn undecodable_logo_is_skipped() {
        let fonts = FontManager::builtin();
        let mut w = PageWriter::new("Logo", PageSize::Regular, &fonts);
        w.add_page(PageKind::TitlePage);
        w.image(10.0, 10.0, 30.0, 10.0);
        let bytes = render_pdf(&w.finish(), &fonts, Some(b"not an image")).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn builtin_text_stays_latin1() {
        assert_eq!(to_builtin_text("“a” – b ✓ é"), "\"a\" - b ? é");
    }
}
