//! The in-memory manuscript: chapters, metadata, and the layout choices made
//! on the command line.
//!
//! Chapter order is the only thing that changes once a [`Book`] is built;
//! see [`Book::apply_swaps`].

use crate::error::ReorderError;
use crate::fonts::{BodyFont, TitleFont};

/// One title + body unit derived from one source heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub title: String,
    pub body: String,
}

impl Chapter {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Free-text fields collected from the author. Any of them may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    pub author: String,
    pub date: String,
    pub contact: String,
    pub license: String,
    pub quote: String,
    pub bio: String,
}

impl Metadata {
    /// Field names in prompt order.
    pub const FIELDS: [&'static str; 7] =
        ["title", "author", "date", "contact", "license", "quote", "bio"];

    /// Mutable access to a field by its prompt name.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "title" => Some(&mut self.title),
            "author" => Some(&mut self.author),
            "date" => Some(&mut self.date),
            "contact" => Some(&mut self.contact),
            "license" => Some(&mut self.license),
            "quote" => Some(&mut self.quote),
            "bio" => Some(&mut self.bio),
            _ => None,
        }
    }
}

/// Physical book-page presets, in millimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PageSize {
    /// 125 × 180 mm.
    Small,
    /// 140 × 210 mm (default).
    #[default]
    Regular,
}

impl PageSize {
    /// `(width, height)` in millimetres.
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PageSize::Small => (125.0, 180.0),
            PageSize::Regular => (140.0, 210.0),
        }
    }

    /// Side, top, and bottom margin: width / 8.5.
    pub fn margin_mm(self) -> f32 {
        self.dimensions_mm().0 / 8.5
    }
}

/// The full manuscript plus metadata and layout choices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Book {
    pub chapters: Vec<Chapter>,
    pub metadata: Metadata,
    pub body_font: BodyFont,
    pub title_font: TitleFont,
    pub page_size: PageSize,
}

impl Book {
    pub fn new(chapters: Vec<Chapter>, metadata: Metadata) -> Self {
        Self {
            chapters,
            metadata,
            ..Self::default()
        }
    }

    pub fn with_fonts(mut self, body: BodyFont, title: TitleFont) -> Self {
        self.body_font = body;
        self.title_font = title;
        self
    }

    pub fn with_page_size(mut self, size: PageSize) -> Self {
        self.page_size = size;
        self
    }

    /// Swap the chapters at 1-based positions `a` and `b`.
    ///
    /// Positions outside `1..=len` are rejected; nothing is clamped.
    pub fn swap_chapters(&mut self, a: i64, b: i64) -> Result<(), ReorderError> {
        let ia = self.position_index(a)?;
        let ib = self.position_index(b)?;
        self.chapters.swap(ia, ib);
        Ok(())
    }

    /// Apply a whitespace-separated list of position pairs, e.g. `"1 5 3 7"`
    /// swaps 1 with 5, then 3 with 7. Later swaps see earlier ones.
    ///
    /// Every token is parsed before anything moves. A pair that is out of
    /// range stops the batch, but pairs before it stay applied.
    /// Returns the number of swaps performed.
    pub fn apply_swaps(&mut self, input: &str) -> Result<usize, ReorderError> {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(ReorderError::Empty);
        }
        if tokens.len() % 2 != 0 {
            return Err(ReorderError::OddTokenCount(tokens.len()));
        }

        let positions = tokens
            .iter()
            .map(|t| {
                t.parse::<i64>()
                    .map_err(|_| ReorderError::NotAnInteger(t.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for pair in positions.chunks_exact(2) {
            self.swap_chapters(pair[0], pair[1])?;
            log::debug!("Swapped chapters {} and {}", pair[0], pair[1]);
        }
        Ok(positions.len() / 2)
    }

    fn position_index(&self, position: i64) -> Result<usize, ReorderError> {
        let len = self.chapters.len();
        if position >= 1 && (position as u64) <= len as u64 {
            Ok(position as usize - 1)
        } else {
            Err(ReorderError::OutOfRange { position, len })
        }
    }
}
