//! DOCX → chapter markup.
//!
//! A DOCX file is a ZIP archive of Office Open XML. Only the parts needed to
//! find chapters are read:
//! - `word/styles.xml` maps style ids to their display names
//! - `word/document.xml` paragraphs become `<h1>` or `<p>`
//!
//! Title and heading styles become `<h1>`, `Comment` paragraphs are dropped,
//! empty paragraphs are skipped, italic runs become `<em>` and bold runs
//! `<strong>`. Text is HTML-escaped.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{BookError, Result};

/// Normalized style names that open a new chapter.
const HEADING_STYLES: [&str; 9] = [
    "title",
    "sectiontitle",
    "subsectiontitle",
    "heading1",
    "heading2",
    "heading3",
    "heading4",
    "heading5",
    "heading6",
];

const COMMENT_STYLE: &str = "comment";

/// Read a `.docx` file and convert its body to chapter markup.
pub fn read_docx(path: &Path) -> Result<String> {
    let file = File::open(path)
        .map_err(|e| BookError::Docx(format!("Cannot open {}: {e}", path.display())))?;
    let html = docx_to_html(file)?;
    log::info!("Converted DOCX {} ({} bytes of markup)", path.display(), html.len());
    Ok(html)
}

/// Convert any seekable DOCX stream.
pub fn docx_to_html<R: Read + Seek>(reader: R) -> Result<String> {
    let mut archive = zip::ZipArchive::new(reader)
        .map_err(|e| BookError::Docx(format!("Invalid DOCX ZIP: {e}")))?;

    let styles = match read_zip_string(&mut archive, "word/styles.xml") {
        Ok(xml) => parse_style_names(&xml),
        Err(e) => {
            log::warn!("No style table, falling back to style ids ({e})");
            HashMap::new()
        }
    };

    let doc_xml = read_zip_string(&mut archive, "word/document.xml")
        .map_err(|e| BookError::Docx(format!("Missing word/document.xml: {e}")))?;

    Ok(convert_document(&doc_xml, &styles))
}

fn read_zip_string<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> std::result::Result<String, String> {
    let mut file = archive.by_name(name).map_err(|e| format!("{name}: {e}"))?;
    let mut s = String::new();
    file.read_to_string(&mut s)
        .map_err(|e| format!("{name}: {e}"))?;
    Ok(s)
}

fn attr_value(e: &BytesStart, wanted: &str) -> Option<String> {
    e.attributes().flatten().find_map(|attr| {
        (attr.key.local_name().as_ref() == wanted.as_bytes())
            .then(|| String::from_utf8_lossy(&attr.value).to_string())
    })
}

fn normalize_style(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Parse `word/styles.xml` into a map of style id → display name.
pub fn parse_style_names(xml: &str) -> HashMap<String, String> {
    let mut names = HashMap::new();
    let mut reader = Reader::from_str(xml);
    let mut current_id: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                match e.local_name().as_ref() {
                    b"style" => current_id = attr_value(e, "styleId"),
                    b"name" => {
                        if let (Some(id), Some(name)) = (&current_id, attr_value(e, "val")) {
                            names.insert(id.clone(), name);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"style" => current_id = None,
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("Malformed styles.xml: {e}");
                break;
            }
            _ => {}
        }
    }
    names
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParagraphKind {
    Heading,
    Body,
    Ignored,
}

/// Convert the main document XML into chapter markup.
pub fn convert_document(xml: &str, styles: &HashMap<String, String>) -> String {
    let mut html = String::new();
    let mut reader = Reader::from_str(xml);
    let mut state = ConvertState::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => state.handle_start(e, styles),
            Ok(Event::Empty(ref e)) => state.handle_empty(e, styles),
            Ok(Event::Text(ref e)) => {
                if state.in_text {
                    if let Ok(text) = e.unescape() {
                        state.run_buffer.push_str(&escape_html(&text));
                    }
                }
            }
            Ok(Event::End(ref e)) => state.handle_end(e.local_name().as_ref(), &mut html),
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("Malformed document.xml, stopping early: {e}");
                break;
            }
            _ => {}
        }
    }
    html
}

#[derive(Default)]
struct ConvertState {
    in_paragraph: bool,
    in_run: bool,
    in_run_props: bool,
    in_text: bool,
    bold: bool,
    italic: bool,
    kind: Option<ParagraphKind>,
    para_buffer: String,
    run_buffer: String,
}

impl ConvertState {
    fn handle_start(&mut self, e: &BytesStart, styles: &HashMap<String, String>) {
        match e.local_name().as_ref() {
            b"p" => {
                self.in_paragraph = true;
                self.kind = None;
                self.para_buffer.clear();
            }
            b"r" if self.in_paragraph => {
                self.in_run = true;
                self.bold = false;
                self.italic = false;
                self.run_buffer.clear();
            }
            b"rPr" if self.in_run => self.in_run_props = true,
            b"t" if self.in_run => self.in_text = true,
            _ => self.handle_empty(e, styles),
        }
    }

    fn handle_empty(&mut self, e: &BytesStart, styles: &HashMap<String, String>) {
        match e.local_name().as_ref() {
            b"pStyle" if self.in_paragraph => {
                if let Some(id) = attr_value(e, "val") {
                    let name = styles.get(&id).unwrap_or(&id);
                    self.kind = Some(classify_style(name));
                }
            }
            b"b" if self.in_run_props => self.bold = toggle_on(e),
            b"i" if self.in_run_props => self.italic = toggle_on(e),
            b"tab" if self.in_run && !self.in_run_props => self.run_buffer.push('\t'),
            b"br" | b"cr" if self.in_run => self.run_buffer.push('\n'),
            _ => {}
        }
    }

    fn handle_end(&mut self, local: &[u8], html: &mut String) {
        match local {
            b"t" => self.in_text = false,
            b"rPr" => self.in_run_props = false,
            b"r" if self.in_run => {
                self.in_run = false;
                self.flush_run();
            }
            b"p" if self.in_paragraph => {
                self.in_paragraph = false;
                self.flush_paragraph(html);
            }
            _ => {}
        }
    }

    fn flush_run(&mut self) {
        if self.run_buffer.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.run_buffer);
        let text = if self.italic { format!("<em>{text}</em>") } else { text };
        let text = if self.bold {
            format!("<strong>{text}</strong>")
        } else {
            text
        };
        self.para_buffer.push_str(&text);
    }

    fn flush_paragraph(&mut self, html: &mut String) {
        let content = std::mem::take(&mut self.para_buffer);
        if content.trim().is_empty() {
            return;
        }
        match self.kind.unwrap_or(ParagraphKind::Body) {
            ParagraphKind::Heading => {
                // A chapter title must stay on one line.
                let title = content.replace('\n', " ");
                html.push_str(&format!("<h1>{}</h1>", title.trim()));
            }
            ParagraphKind::Body => html.push_str(&format!("<p>{content}</p>")),
            ParagraphKind::Ignored => {}
        }
    }
}

fn classify_style(name: &str) -> ParagraphKind {
    let normalized = normalize_style(name);
    if HEADING_STYLES.contains(&normalized.as_str()) {
        ParagraphKind::Heading
    } else if normalized == COMMENT_STYLE {
        ParagraphKind::Ignored
    } else {
        ParagraphKind::Body
    }
}

/// `<w:b/>` is on; `<w:b w:val="0"/>` or `"false"` is off.
fn toggle_on(e: &BytesStart) -> bool {
    !matches!(attr_value(e, "val").as_deref(), Some("0") | Some("false") | Some("none"))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
