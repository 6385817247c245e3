//! Extraction options.

/// Options controlling how text fragments are pulled out of a PDF.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Error handling mode for per-page failures
    pub error_mode: ErrorMode,

    /// Stop after this many pages (0 = all pages)
    pub max_pages: u32,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Fail on the first page that cannot be read.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Skip unreadable pages and continue.
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Limit the number of pages read.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Whether a page number falls within the page limit.
    pub fn includes_page(&self, page: u32) -> bool {
        self.max_pages == 0 || page <= self.max_pages
    }
}

/// Error handling mode during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any page error
    Strict,
    /// Skip invalid pages and continue
    #[default]
    Lenient,
}
