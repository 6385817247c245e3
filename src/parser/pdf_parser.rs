//! PDF document parser producing styled text fragments.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use unicode_normalization::UnicodeNormalization;

use crate::detect::{sniff_bytes, sniff_path};
use crate::error::{Error, Result};
use crate::model::{ExtractedDocument, Metadata, PageGeometry};

use super::backend::{LopdfBackend, PageId, PdfBackend};
use super::layout::{assemble_fragments, ContentInterpreter, PageFragments};
use super::options::{ErrorMode, ParseOptions};

/// PDF document parser.
///
/// Generic over the [`PdfBackend`] so that extraction can be exercised
/// without a real PDF; [`PdfParser::open`] and [`PdfParser::from_bytes`]
/// use lopdf.
pub struct PdfParser<B: PdfBackend = LopdfBackend> {
    backend: B,
    options: ParseOptions,
    source_name: Option<String>,
}

impl PdfParser<LopdfBackend> {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();

        // Verify it's a PDF
        let header = sniff_path(path)?;
        log::debug!("{}: {}", path.display(), header);

        let backend = LopdfBackend::load_file(path)?;
        let source_name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string());

        Ok(Self {
            backend,
            options,
            source_name,
        })
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        sniff_bytes(data)?;
        let backend = LopdfBackend::load_bytes(data)?;
        Ok(Self::with_backend(backend, options))
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Parse a PDF from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Set the name used for the filename title fallback.
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }
}

impl<B: PdfBackend> PdfParser<B> {
    /// Create a parser over an existing backend.
    pub fn with_backend(backend: B, options: ParseOptions) -> Self {
        Self {
            backend,
            options,
            source_name: None,
        }
    }

    /// Extract metadata, page geometry and text fragments.
    pub fn parse(&self) -> Result<ExtractedDocument> {
        let mut document = ExtractedDocument::new();
        document.metadata = self.extract_metadata();
        document.source_name = self.source_name.clone();

        if document.metadata.encrypted {
            log::warn!("Document is encrypted; text may not decode");
        }

        let page_ids = self.backend.pages();
        document.metadata.page_count = page_ids.len() as u32;

        for (&page_num, &page_id) in &page_ids {
            if !self.options.includes_page(page_num) {
                break;
            }

            let (width, height) = self.backend.page_size(page_id).unwrap_or((
                PageGeometry::LETTER_WIDTH,
                PageGeometry::LETTER_HEIGHT,
            ));
            document
                .pages
                .push(PageGeometry::new(page_num, width, height));

            match self.parse_page(page_id, page_num, height) {
                Ok(page) => {
                    if page.skipped > 0 {
                        log::warn!(
                            "Page {}: skipped {} undecodable text run(s)",
                            page_num,
                            page.skipped
                        );
                    }
                    document.skipped_fragments += page.skipped;
                    document.fragments.extend(page.fragments);
                }
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Page {}: {}; continuing without its text", page_num, e);
                }
                Err(Error::PdfParse(msg)) => {
                    return Err(Error::TextExtract(format!("page {}: {}", page_num, msg)));
                }
                Err(e) => return Err(e),
            }
        }

        log::debug!(
            "Extracted {} fragments from {} pages",
            document.fragments.len(),
            document.pages.len()
        );

        Ok(document)
    }

    /// Extract document metadata.
    fn extract_metadata(&self) -> Metadata {
        let mut metadata = Metadata::with_version(self.backend.version());

        metadata.title = self.backend.info_string(b"Title");
        metadata.author = self.backend.info_string(b"Author");
        metadata.subject = self.backend.info_string(b"Subject");
        metadata.creator = self.backend.info_string(b"Creator");
        metadata.producer = self.backend.info_string(b"Producer");
        metadata.created = self
            .backend
            .info_string(b"CreationDate")
            .and_then(|s| parse_pdf_date(&s));
        metadata.modified = self
            .backend
            .info_string(b"ModDate")
            .and_then(|s| parse_pdf_date(&s));
        metadata.encrypted = self.backend.is_encrypted();

        metadata
    }

    fn parse_page(&self, page_id: PageId, page_num: u32, height: f32) -> Result<PageFragments> {
        let fonts: HashMap<Vec<u8>, String> = self
            .backend
            .page_fonts(page_id)?
            .into_iter()
            .map(|font| (font.name, font.base_font))
            .collect();

        let content = self.backend.page_content(page_id)?;
        if content.is_empty() {
            return Ok(PageFragments::default());
        }
        let ops = self.backend.decode_content(&content)?;

        let spans = ContentInterpreter::new(&self.backend, page_id, fonts).spans(&ops);
        let mut page = assemble_fragments(spans, page_num, height);
        for fragment in &mut page.fragments {
            fragment.text = fragment.text.nfkc().collect();
        }
        Ok(page)
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> u32 {
        self.backend.pages().len() as u32
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.backend.is_encrypted()
    }

    /// Get PDF version.
    pub fn version(&self) -> String {
        self.backend.version()
    }
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSSOHH'mm').
///
/// The timezone suffix is applied when present, so the result is true UTC.
fn parse_pdf_date(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let s = s.trim();
    let s = s.strip_prefix("D:").unwrap_or(s);

    // At minimum we need YYYY
    if s.len() < 4 {
        return None;
    }

    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u32 = s.get(4..6).and_then(|m| m.parse().ok()).unwrap_or(1);
    let day: u32 = s.get(6..8).and_then(|d| d.parse().ok()).unwrap_or(1);
    let hour: u32 = s.get(8..10).and_then(|h| h.parse().ok()).unwrap_or(0);
    let minute: u32 = s.get(10..12).and_then(|m| m.parse().ok()).unwrap_or(0);
    let second: u32 = s.get(12..14).and_then(|s| s.parse().ok()).unwrap_or(0);

    let offset_minutes = s.get(14..).map(parse_tz_offset).unwrap_or(0);

    chrono::NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .map(|dt| dt - chrono::Duration::minutes(offset_minutes))
        .map(|dt| chrono::DateTime::from_naive_utc_and_offset(dt, chrono::Utc))
}

/// Offset in minutes from a `+HH'mm'` / `-HH'mm'` / `Z` suffix.
fn parse_tz_offset(tz: &str) -> i64 {
    let sign = match tz.chars().next() {
        Some('+') => 1,
        Some('-') => -1,
        _ => return 0,
    };
    let digits: String = tz[1..].chars().filter(|c| c.is_ascii_digit()).collect();
    let hours: i64 = digits.get(0..2).and_then(|h| h.parse().ok()).unwrap_or(0);
    let minutes: i64 = digits.get(2..4).and_then(|m| m.parse().ok()).unwrap_or(0);
    sign * (hours * 60 + minutes)
}
