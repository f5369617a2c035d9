//! Manuscript reading and chapter splitting.
//!
//! Both input formats are first brought to the same normalized markup: one
//! `<h1>` per chapter title followed by `<p>` paragraphs. The splitter then
//! cuts that markup into [`Chapter`] values in document order.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::book::Chapter;
use crate::docx::read_docx;
use crate::error::{BookError, Result};

/// Spaces prepended to every body line.
pub const INDENTATION_SPACES: usize = 4;

/// Supported manuscript formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Docx,
    Html,
}

impl InputFormat {
    /// Detect the format from the path suffix. A trailing `/` is tolerated.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path.to_string_lossy();
        let name = name.strip_suffix('/').unwrap_or(&name);
        if name.ends_with(".docx") {
            Ok(InputFormat::Docx)
        } else if name.ends_with(".html") {
            Ok(InputFormat::Html)
        } else {
            Err(BookError::UnsupportedFormat(path.display().to_string()))
        }
    }
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static regex"))
}

fn empty_anchor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r#"<a(\w|"|=| )+></a>"#)
}

fn chapter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^([^\n]+)</h1>((?s).*)")
}

/// Read a manuscript and split it into chapters.
///
/// The extension is checked before the file is opened.
pub fn read_manuscript(path: &Path) -> Result<Vec<Chapter>> {
    let markup = match InputFormat::from_path(path)? {
        InputFormat::Docx => {
            let html = read_docx(path)?;
            empty_anchor_re().replace_all(&html, "").into_owned()
        }
        InputFormat::Html => {
            let html = fs::read_to_string(path)?;
            normalize_html(&html)
        }
    };
    let chapters = split_chapters(&markup);
    log::info!("Found {} chapters in {}", chapters.len(), path.display());
    Ok(chapters)
}

/// Reduce a hand-written HTML file to the normalized chapter markup: keep
/// only the `<body>` content and drop attributes from `<h1>` and `<p>`.
pub fn normalize_html(html: &str) -> String {
    static BODY: OnceLock<Regex> = OnceLock::new();
    static H1_OPEN: OnceLock<Regex> = OnceLock::new();
    static H1_CLOSE: OnceLock<Regex> = OnceLock::new();
    static H1_TEXT: OnceLock<Regex> = OnceLock::new();
    static P_OPEN: OnceLock<Regex> = OnceLock::new();
    static P_CLOSE: OnceLock<Regex> = OnceLock::new();

    let body = regex(&BODY, r"(?is)<body[^>]*>(.*?)</body>")
        .captures(html)
        .and_then(|c| c.get(1))
        .map_or(html, |m| m.as_str());
    let body = regex(&H1_OPEN, r"(?i)<h1(\s[^>]*)?>").replace_all(body, "<h1>");
    let body = regex(&H1_CLOSE, r"(?i)</h1\s*>").replace_all(&body, "</h1>");
    let body = regex(&H1_TEXT, r"(?s)<h1>(.*?)</h1>").replace_all(&body, |caps: &Captures| {
        format!("<h1>{}</h1>", caps[1].split_whitespace().collect::<Vec<_>>().join(" "))
    });
    let body = regex(&P_OPEN, r"(?i)<p(\s[^>]*)?>").replace_all(&body, "<p>");
    regex(&P_CLOSE, r"(?i)</p\s*>")
        .replace_all(&body, "</p>")
        .into_owned()
}

/// Partition normalized markup into chapters.
///
/// Segments before the first heading, or without a closing `</h1>` on the
/// heading line, are dropped. No headings means no chapters.
pub fn split_chapters(markup: &str) -> Vec<Chapter> {
    markup
        .split("<h1>")
        .filter_map(|segment| {
            let caps = chapter_re().captures(segment)?;
            let title = decode_entities(replace_tags(caps[1].trim()).as_str());
            Some(Chapter::new(title, format_body(&caps[2])))
        })
        .collect()
}

/// Paragraph markers become newlines and every line is indented.
fn format_body(content: &str) -> String {
    let text = content.replace("<p>", "").replace("</p>", "\n");
    let text = decode_entities(&replace_tags(text.trim()));
    let indent = " ".repeat(INDENTATION_SPACES);
    format!("{indent}{}", text.replace('\n', &format!("\n{indent}")))
}

/// Emphasis becomes double quotes; strong emphasis is dropped.
pub fn replace_tags(s: &str) -> String {
    s.replace("<em>", "\"")
        .replace("</em>", "\"")
        .replace("<strong>", "")
        .replace("</strong>", "")
}

/// Decode the handful of entities a converter emits.
pub fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", "\u{00A0}")
        .replace("&amp;", "&")
}
