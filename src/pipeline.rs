//! Pipeline – ties together composition, rendering and the final file write
//! into a single function call.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::book::Book;
use crate::compose::{compose_book, LogoSize};
use crate::error::{BookError, Result};
use crate::fonts::FontManager;
use crate::layout_config::{LayoutConfig, TitleAlign};
use crate::render::render_pdf;

/// Logo location relative to the assets directory.
pub const LOGO_PATH: &str = "png/FinalFormat..png";

/// The encoded logo and its pixel size.
#[derive(Debug, Clone)]
pub struct Logo {
    pub bytes: Vec<u8>,
    pub size: LogoSize,
}

impl Logo {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let img = ::image::load_from_memory(&bytes)
            .map_err(|e| BookError::Pdf(format!("logo decode error: {e}")))?;
        let size = LogoSize {
            px_width: img.width(),
            px_height: img.height(),
        };
        Ok(Self { bytes, size })
    }
}

/// Everything besides the manuscript that a book needs to render.
pub struct Assets {
    pub fonts: FontManager,
    pub logo: Option<Logo>,
}

impl Assets {
    /// Load fonts and logo from `dir`. Missing fonts are an error; a missing
    /// logo is only logged.
    pub fn load(dir: &Path, book: &Book) -> Result<Self> {
        let fonts = FontManager::load(dir, book.body_font, book.title_font)?;
        let logo_path = dir.join(LOGO_PATH);
        let logo = match fs::read(&logo_path).map_err(BookError::from).and_then(Logo::from_bytes) {
            Ok(logo) => Some(logo),
            Err(e) => {
                log::warn!("No logo at {}: {e}", logo_path.display());
                None
            }
        };
        Ok(Self { fonts, logo })
    }

    /// Base-14 fonts and no logo.
    pub fn builtin() -> Self {
        Self {
            fonts: FontManager::builtin(),
            logo: None,
        }
    }
}

/// Result of an attempted write. A failed write is reported, not raised.
#[derive(Debug)]
pub enum WriteOutcome {
    Written { pages: usize, bytes: usize },
    Failed(io::Error),
}

impl WriteOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, WriteOutcome::Written { .. })
    }
}

/// Default output path: the input path with a `.pdf` extension.
pub fn output_path_for(input: &Path) -> PathBuf {
    let trimmed = input.to_string_lossy();
    let mut out = PathBuf::from(trimmed.strip_suffix('/').unwrap_or(&trimmed));
    out.set_extension("pdf");
    out
}

/// Reject an output path that is empty or not a `.pdf`.
pub fn validate_output_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(BookError::OutputPath("empty path".to_string()));
    }
    let is_pdf = path.extension().and_then(|e| e.to_str()) == Some("pdf");
    if !is_pdf {
        return Err(BookError::OutputPath(format!(
            "{} does not end in .pdf",
            path.display()
        )));
    }
    Ok(())
}

/// Compose the book layout without rendering – useful for testing.
pub fn compute_layout_config(book: &Book, align: TitleAlign, assets: &Assets) -> LayoutConfig {
    compose_book(book, align, &assets.fonts, assets.logo.as_ref().map(|l| l.size))
}

/// Full pipeline: book → PDF bytes.
///
/// Returns `(pdf_bytes, layout_config)`.
pub fn generate_pdf(book: &Book, align: TitleAlign, assets: &Assets) -> Result<(Vec<u8>, LayoutConfig)> {
    let layout = compute_layout_config(book, align, assets);
    let bytes = render_pdf(
        &layout,
        &assets.fonts,
        assets.logo.as_ref().map(|l| l.bytes.as_slice()),
    )?;
    Ok((bytes, layout))
}

/// Compose, render and write the book to `output`.
///
/// The path is validated before anything is composed or written. An I/O
/// failure while writing comes back as [`WriteOutcome::Failed`].
pub fn write_pdf(book: &Book, output: &Path, align: TitleAlign, assets: &Assets) -> Result<WriteOutcome> {
    validate_output_path(output)?;
    let (bytes, layout) = generate_pdf(book, align, assets)?;

    let written = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| fs::write(output, &bytes));

    match written {
        Ok(()) => {
            log::info!(
                "Wrote '{}' ({} bytes, {} pages)",
                output.display(),
                bytes.len(),
                layout.pages.len()
            );
            Ok(WriteOutcome::Written {
                pages: layout.pages.len(),
                bytes: bytes.len(),
            })
        }
        Err(e) => {
            log::error!("Error writing '{}': {e}", output.display());
            Ok(WriteOutcome::Failed(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{Chapter, Metadata};

    #[test]
    fn pipeline_basic() {
        let book = Book::new(vec![Chapter::new("Hello", "    World")], Metadata::default());
        let (bytes, config) = generate_pdf(&book, TitleAlign::Left, &Assets::builtin()).unwrap();
        assert!(!config.pages.is_empty());
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn output_path_replaces_extension() {
        assert_eq!(output_path_for(Path::new("files/book.docx")), PathBuf::from("files/book.pdf"));
        assert_eq!(output_path_for(Path::new("book.html/")), PathBuf::from("book.pdf"));
    }

    #[test]
    fn output_path_validation() {
        assert!(validate_output_path(Path::new("")).is_err());
        assert!(validate_output_path(Path::new("files/testing.html")).is_err());
        assert!(validate_output_path(Path::new("files/testing")).is_err());
        assert!(validate_output_path(Path::new("files/testing.PDF")).is_err());
        assert!(validate_output_path(Path::new("files/testing.pdf")).is_ok());
    }
}
