//! # finalformat – manuscript → print-ready PDF book
//!
//! This crate turns a single-author manuscript (`.docx` or `.html`, one
//! top-level heading per chapter) into a formatted PDF book. The pipeline
//! stages are:
//!
//! 1. **Read** – DOCX/HTML → normalized chapter markup ([`docx`], [`splitter`])
//! 2. **Split** – markup → ordered [`book::Chapter`] values ([`splitter`])
//! 3. **Compose** – book → page-description records ([`compose`], [`pagination`])
//! 4. **Render** – emit PDF bytes via printpdf ([`render`])
//!
//! Metadata and chapter order are gathered interactively by [`prompt`].

pub mod book;
pub mod compose;
pub mod docx;
pub mod error;
pub mod fonts;
pub mod layout_config;
pub mod pagination;
pub mod pipeline;
pub mod prompt;
pub mod render;
pub mod splitter;

// Re-exports for convenience
pub use book::{Book, Chapter, Metadata, PageSize};
pub use error::{BookError, ReorderError, Result};
pub use layout_config::TitleAlign;
pub use pipeline::{generate_pdf, write_pdf, Assets, WriteOutcome};
