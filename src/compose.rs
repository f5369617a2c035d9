//! Book composition – the fixed page sequence of a finished book, expressed
//! as page-description records. Nothing is drawn here; see [`crate::render`].

use crate::book::Book;
use crate::fonts::{FontManager, FontRole};
use crate::layout_config::{LayoutConfig, PageKind, TextAlign, TitleAlign};
use crate::pagination::{PageWriter, TextStyle};

/// Line height of chapter body text, in millimetres.
pub const LINE_SPACING: f32 = 4.6;
/// Chapter body text starts at this y.
pub const BODY_TOP_MM: f32 = 60.0;
pub const EDITION_LABEL: &str = "1st edition";
const BIO_LINE_HEIGHT: f32 = 3.0;

/// Pixel size of the logo image, used to keep its aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoSize {
    pub px_width: u32,
    pub px_height: u32,
}

impl LogoSize {
    /// Height for a given width, preserving aspect ratio.
    fn height_for(&self, width: f32) -> f32 {
        if self.px_width == 0 {
            return 0.0;
        }
        width * self.px_height as f32 / self.px_width as f32
    }
}

/// Split a quote at its last `"` into quote text and attribution.
///
/// `"Stay hungry." Steve` gives (`"Stay hungry."`, `Steve`). Without any
/// quotation mark the whole string is the quote and the attribution is empty.
pub fn split_quote(quote: &str) -> (String, String) {
    match quote.rsplit_once('"') {
        Some((text, attribution)) => (
            format!("{}\"", text.trim()),
            attribution.trim().to_string(),
        ),
        None => (quote.to_string(), String::new()),
    }
}

/// The text of the bordered metadata block.
pub fn metadata_block(book: &Book) -> String {
    let m = &book.metadata;
    format!(
        "    {} / {} ; \npowered by finalformat.\n\n    {}\n    {}\n{}\n",
        m.title, m.author, m.date, m.contact, m.license
    )
}

/// Lay out the whole book.
///
/// The resulting page count is always even so the bio lands on the last
/// verso. Chapters start on a recto and only chapter pages are numbered.
pub fn compose_book(
    book: &Book,
    align: TitleAlign,
    fonts: &FontManager,
    logo: Option<LogoSize>,
) -> LayoutConfig {
    let meta = &book.metadata;
    let mut w = PageWriter::new(&meta.title, book.page_size, fonts);
    let (width, height) = (w.page_width(), w.page_height());
    let margin = w.margin();

    let title_font = |size| TextStyle::new(FontRole::Title, size);
    let body_font = |size| TextStyle::new(FontRole::Body, size);
    let italic_font = |size| TextStyle::new(FontRole::BodyItalic, size);

    // Half-title
    w.add_page(PageKind::HalfTitle);
    w.set_y(height / 2.0);
    w.cell(0.0, 3.0, &meta.title.to_uppercase(), title_font(8.0), TextAlign::Right);

    w.add_page(PageKind::Blank);

    // Title page
    w.add_page(PageKind::TitlePage);
    w.set_y(10.0 + height / 3.0);
    w.cell(0.0, 3.0, &meta.author.to_uppercase(), title_font(8.0), TextAlign::Left);
    w.set_y(20.0 + height / 3.0);
    w.cell(0.0, 4.0, &meta.title.to_uppercase(), title_font(22.0), TextAlign::Left);
    w.set_y(30.0 + height / 3.0);
    w.cell(0.0, 3.0, EDITION_LABEL, italic_font(8.0), TextAlign::Right);
    if let Some(logo) = logo {
        w.image(width - margin - 30.0, 10.0 + height / 2.0, 30.0, logo.height_for(30.0));
    }

    // Metadata box
    w.add_page(PageKind::Metadata);
    w.set_y(height - 60.0);
    let box_width = fonts.text_width_mm(
        &format!("{}{}{}", meta.title, meta.author, meta.license),
        FontRole::Body,
        5.0,
    );
    w.multi_cell(box_width, 3.0, &metadata_block(book), body_font(5.0), TextAlign::Left, true);

    w.add_page(PageKind::Blank);
    if !meta.quote.is_empty() {
        let (quote, attribution) = split_quote(&meta.quote);
        w.add_page(PageKind::Quote);
        w.set_y(height / 2.0);
        w.cell(0.0, 3.0, &quote, body_font(8.0), TextAlign::Right);
        w.set_y(4.0 + height / 2.0);
        w.cell(0.0, 3.0, &attribution, italic_font(8.0), TextAlign::Right);
    }

    // First chapter on a recto
    if w.page_count() % 2 == 1 {
        w.add_page(PageKind::Blank);
    }

    w.set_numbering(true);
    for chapter in &book.chapters {
        w.add_page(PageKind::Chapter);
        w.cell(0.0, 0.0, &chapter.title, title_font(20.0), align.into());
        w.set_y(BODY_TOP_MM);
        w.multi_cell(0.0, LINE_SPACING, &chapter.body, body_font(8.0), TextAlign::Justify, false);
    }
    w.set_numbering(false);
    w.add_page(PageKind::Blank);

    // The bio may run over several pages; its last page must be even.
    let bio_pages = bio_page_count(book, fonts);
    let padding = if (w.page_count() + 1 + bio_pages) % 2 == 0 { 1 } else { 2 };
    for _ in 0..padding {
        w.add_page(PageKind::Padding);
    }

    // Bio on the back cover
    w.add_page(PageKind::Bio);
    w.set_y(height / 3.0);
    w.multi_cell(0.0, BIO_LINE_HEIGHT, &meta.bio, body_font(7.0), TextAlign::Center, false);
    w.set_y(w.y().max(20.0 + height / 2.0));
    w.cell(0.0, 3.0, &format!("Published in {}", meta.date), body_font(7.0), TextAlign::Center);
    if let Some(logo) = logo {
        let logo_height = logo.height_for(25.0);
        w.image(width / 2.0 - 12.5, height - 10.0 - logo_height, 25.0, logo_height);
    }

    let config = w.finish();
    log::info!(
        "Composed {} pages for {} chapters",
        config.pages.len(),
        book.chapters.len()
    );
    config
}

/// Number of pages the bio block occupies once it flows from `h/3`.
fn bio_page_count(book: &Book, fonts: &FontManager) -> usize {
    let mut scratch = PageWriter::new("", book.page_size, fonts);
    scratch.add_page(PageKind::Bio);
    scratch.set_y(scratch.page_height() / 3.0);
    scratch.multi_cell(
        0.0,
        BIO_LINE_HEIGHT,
        &book.metadata.bio,
        TextStyle::new(FontRole::Body, 7.0),
        TextAlign::Center,
        false,
    );
    scratch.page_count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{Chapter, Metadata};

    fn book_with(chapters: usize, quote: &str) -> Book {
        let chapters = (0..chapters)
            .map(|i| Chapter::new(format!("Chapter {i}"), format!("    {}", "text ".repeat(50))))
            .collect();
        let metadata = Metadata {
            title: "Night Train".into(),
            author: "A. Writer".into(),
            date: "2024".into(),
            quote: quote.into(),
            bio: "Writes books.".into(),
            ..Metadata::default()
        };
        Book::new(chapters, metadata)
    }

    #[test]
    fn quote_splits_at_last_quotation_mark() {
        assert_eq!(
            split_quote(r#""Stay hungry, stay foolish." Steve Jobs"#),
            (r#""Stay hungry, stay foolish.""#.to_string(), "Steve Jobs".to_string())
        );
    }

    #[test]
    fn quote_without_quotation_mark_has_no_attribution() {
        assert_eq!(
            split_quote("Just words"),
            ("Just words".to_string(), String::new())
        );
    }

    #[test]
    fn page_count_is_always_even() {
        let fonts = FontManager::builtin();
        for chapters in 0..5 {
            for quote in ["", "\"q\" who"] {
                let config = compose_book(&book_with(chapters, quote), TitleAlign::Left, &fonts, None);
                assert_eq!(config.pages.len() % 2, 0, "{chapters} chapters, quote {quote:?}");
                assert_eq!(config.pages.last().unwrap().kind, PageKind::Bio);
            }
        }
    }

    #[test]
    fn long_bio_keeps_page_count_even() {
        let fonts = FontManager::builtin();
        let logo = LogoSize {
            px_width: 100,
            px_height: 100,
        };
        for words in [300, 1500, 2500] {
            let mut book = book_with(1, "");
            book.metadata.bio = "word ".repeat(words);
            let config = compose_book(&book, TitleAlign::Left, &fonts, Some(logo));
            assert_eq!(config.pages.len() % 2, 0, "bio of {words} words");

            let bio_pages: Vec<_> = config.pages_of_kind(PageKind::Bio).collect();
            if words > 300 {
                assert!(bio_pages.len() > 1, "bio of {words} words should overflow");
            }
            let last = bio_pages.last().unwrap();
            assert_eq!(last.page_index, config.pages.len() - 1);
            assert!(last.texts().any(|t| t == "Published in 2024"));
            assert!(last.boxes.iter().any(|b| b.image.is_some()));
        }
    }

    #[test]
    fn chapters_start_on_recto_and_are_numbered() {
        let fonts = FontManager::builtin();
        let config = compose_book(&book_with(3, ""), TitleAlign::Left, &fonts, None);
        let first = config.pages_of_kind(PageKind::Chapter).next().unwrap();
        assert_eq!(first.page_index % 2, 0, "first chapter must be an odd page number");
        for page in &config.pages {
            assert_eq!(page.page_number.is_some(), page.kind == PageKind::Chapter);
        }
    }

    #[test]
    fn front_matter_sequence() {
        let fonts = FontManager::builtin();
        let config = compose_book(&book_with(1, "\"q\" who"), TitleAlign::Left, &fonts, None);
        let kinds: Vec<PageKind> = config.pages.iter().take(7).map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            [
                PageKind::HalfTitle,
                PageKind::Blank,
                PageKind::TitlePage,
                PageKind::Metadata,
                PageKind::Blank,
                PageKind::Quote,
                PageKind::Chapter,
            ]
        );
        let half_title: Vec<&str> = config.pages[0].texts().collect();
        assert_eq!(half_title, ["NIGHT TRAIN"]);
        let quote: Vec<&str> = config.pages[5].texts().collect();
        assert_eq!(quote, ["\"q\"", "who"]);
    }

    #[test]
    fn no_quote_page_without_quote() {
        let fonts = FontManager::builtin();
        let config = compose_book(&book_with(1, ""), TitleAlign::Left, &fonts, None);
        assert_eq!(config.pages_of_kind(PageKind::Quote).count(), 0);
    }

    #[test]
    fn empty_book_still_composes() {
        let fonts = FontManager::builtin();
        let config = compose_book(&Book::default(), TitleAlign::Center, &fonts, None);
        assert_eq!(config.pages_of_kind(PageKind::Chapter).count(), 0);
        assert_eq!(config.pages.len() % 2, 0);
    }

    #[test]
    fn chapter_title_follows_alignment() {
        let fonts = FontManager::builtin();
        for (align, expected) in [
            (TitleAlign::Left, TextAlign::Left),
            (TitleAlign::Right, TextAlign::Right),
            (TitleAlign::Center, TextAlign::Center),
        ] {
            let config = compose_book(&book_with(1, ""), align, &fonts, None);
            let chapter = config.pages_of_kind(PageKind::Chapter).next().unwrap();
            // boxes[0] is the footer number
            let title = chapter.boxes[1].text.as_ref().unwrap();
            assert_eq!(title.lines[0].text, "Chapter 0");
            assert_eq!(title.align, expected);
        }
    }

    #[test]
    fn bio_page_content_and_logo() {
        let fonts = FontManager::builtin();
        let logo = LogoSize {
            px_width: 200,
            px_height: 100,
        };
        let config = compose_book(&book_with(1, ""), TitleAlign::Left, &fonts, Some(logo));
        let bio = config.pages.last().unwrap();
        let texts: Vec<&str> = bio.texts().collect();
        assert_eq!(texts, ["Writes books.", "Published in 2024"]);
        let image = bio.boxes.iter().find_map(|b| b.image.as_ref()).unwrap();
        assert!((image.width - 25.0).abs() < 1e-4);
        assert!((image.height - 12.5).abs() < 1e-4);
    }
}
