//! Error types shared by every stage of the conversion.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("DOCX error: {0}")]
    Docx(String),

    #[error("Unable to load fonts: {0}")]
    Fonts(String),

    #[error("Invalid output path: {0}")]
    OutputPath(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Input interrupted")]
    Interrupted,
}

/// Why a batch of chapter swaps was rejected. The reorder dialogue
/// reports it and asks again, so it never becomes a [`BookError`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReorderError {
    #[error("no chapter positions given")]
    Empty,

    #[error("expected pairs of positions, got {0} numbers")]
    OddTokenCount(usize),

    #[error("{0:?} is not a whole number")]
    NotAnInteger(String),

    #[error("position {position} is outside 1..={len}")]
    OutOfRange { position: i64, len: usize },
}

pub type Result<T> = std::result::Result<T, BookError>;
