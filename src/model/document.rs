//! Document-level types produced by the extractor.

use super::TextFragment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything the analyzer needs from one PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Document metadata (title, author, etc.)
    pub metadata: Metadata,

    /// Page sizes, in page order
    pub pages: Vec<PageGeometry>,

    /// Text fragments in page order, top to bottom within a page
    pub fragments: Vec<TextFragment>,

    /// Fragments dropped because their text could not be decoded
    pub skipped_fragments: usize,

    /// File stem of the source, when it was read from disk
    pub source_name: Option<String>,
}

impl ExtractedDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document directly from fragments.
    ///
    /// Pages referenced by the fragments get Letter-size geometry.
    pub fn from_fragments(fragments: Vec<TextFragment>) -> Self {
        let last_page = fragments.iter().map(|f| f.page).max().unwrap_or(0);
        let pages = (1..=last_page).map(PageGeometry::letter).collect();
        let mut doc = Self {
            pages,
            fragments,
            ..Self::default()
        };
        doc.metadata.page_count = last_page;
        doc
    }

    /// Set the metadata title.
    pub fn with_metadata_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }

    /// Set the source file stem.
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    /// Get the geometry of a page by number (1-indexed).
    pub fn page(&self, number: u32) -> Option<&PageGeometry> {
        self.pages.iter().find(|p| p.number == number)
    }

    /// Page height, falling back to Letter when the page is unknown.
    pub fn page_height(&self, number: u32) -> f32 {
        self.page(number)
            .map(|p| p.height)
            .unwrap_or(PageGeometry::LETTER_HEIGHT)
    }

    /// Check if the document has no text.
    pub fn is_empty(&self) -> bool {
        self.fragments.iter().all(|f| f.is_blank())
    }
}

/// Size of a single page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Page number (1-indexed)
    pub number: u32,
    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,
    /// Page height in points
    pub height: f32,
}

impl PageGeometry {
    pub(crate) const LETTER_WIDTH: f32 = 612.0;
    pub(crate) const LETTER_HEIGHT: f32 = 792.0;

    /// Create a page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
        }
    }

    /// Standard Letter size (8.5 x 11 inches).
    pub fn letter(number: u32) -> Self {
        Self::new(number, Self::LETTER_WIDTH, Self::LETTER_HEIGHT)
    }
}

/// Document metadata from the trailer's Info dictionary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Creator application
    pub creator: Option<String>,

    /// PDF producer
    pub producer: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,

    /// PDF version (e.g., "1.7")
    pub pdf_version: String,

    /// Total number of pages
    pub page_count: u32,

    /// Whether the document is encrypted
    pub encrypted: bool,
}

impl Metadata {
    /// Create new metadata with PDF version.
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            pdf_version: version.into(),
            ..Default::default()
        }
    }
}
