//! # pdf-outline
//!
//! Title and heading outline extraction for PDF documents.
//!
//! The library reads the text of a PDF together with its font sizes, weights
//! and positions, and turns it into a title plus a flat list of H1/H2/H3
//! headings. It does not rely on the document's bookmarks; headings are
//! inferred from typography and numbering alone.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf_outline::{extract_outline, render};
//!
//! fn main() -> pdf_outline::Result<()> {
//!     let outline = extract_outline("report.pdf")?;
//!
//!     println!("{}", outline.title);
//!     for entry in &outline.outline {
//!         println!("{} {} (p. {})", entry.level, entry.text, entry.page);
//!     }
//!
//!     let json = render::to_json(&outline, render::JsonFormat::Pretty)?;
//!     std::fs::write("report.json", json)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Typographic signals**: font size rank, weight, isolation and numbering
//! - **Document-wide levels**: heading sizes map to the same level on every page
//! - **Title detection**: metadata first, then the largest text on page 1
//! - **Lenient extraction**: undecodable text and broken pages are skipped
//! - **Parallel batches**: whole directories processed with Rayon

pub mod analysis;
pub mod batch;
pub mod config;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use analysis::{Analysis, AnalysisStats, OutlineAnalyzer};
pub use batch::{BatchProcessor, BatchReport, FileOutcome};
pub use config::{OutlineConfig, DEFAULT_TITLE, MAX_HEADING_LEVELS};
pub use detect::{is_pdf_file, sniff_bytes, sniff_path, PdfHeader};
pub use error::{Error, Result};
pub use model::{
    DocumentOutline, ExtractedDocument, HeadingLevel, Metadata, OutlineEntry, PageGeometry,
    TextFragment,
};
pub use parser::{ErrorMode, ParseOptions, PdfParser};
pub use render::JsonFormat;

use std::io::Read;
use std::path::Path;

/// Extract the outline of a PDF file with the default configuration.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::extract_outline;
///
/// let outline = extract_outline("document.pdf").unwrap();
/// println!("{}: {} headings", outline.title, outline.len());
/// ```
pub fn extract_outline<P: AsRef<Path>>(path: P) -> Result<DocumentOutline> {
    extract_outline_with_config(path, &OutlineConfig::default())
}

/// Extract the outline of a PDF file with a custom configuration.
///
/// The file stem is recorded on the document, so
/// [`OutlineConfig::title_from_filename`] can use it as the fallback title.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::{extract_outline_with_config, OutlineConfig};
///
/// let config = OutlineConfig::new()
///     .with_heading_chars(3, 120)
///     .with_filename_title(true);
/// let outline = extract_outline_with_config("document.pdf", &config).unwrap();
/// ```
pub fn extract_outline_with_config<P: AsRef<Path>>(
    path: P,
    config: &OutlineConfig,
) -> Result<DocumentOutline> {
    config.validate()?;
    let doc = parse_file(path)?;
    Ok(analyze_document(&doc, config))
}

/// Extract the outline of a PDF held in memory.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::{extract_outline_from_bytes, OutlineConfig};
///
/// let data = std::fs::read("document.pdf").unwrap();
/// let outline = extract_outline_from_bytes(&data, &OutlineConfig::default()).unwrap();
/// ```
pub fn extract_outline_from_bytes(data: &[u8], config: &OutlineConfig) -> Result<DocumentOutline> {
    config.validate()?;
    let doc = parse_bytes(data)?;
    Ok(analyze_document(&doc, config))
}

/// Extract the outline of a PDF read from `reader`.
pub fn extract_outline_from_reader<R: Read>(
    reader: R,
    config: &OutlineConfig,
) -> Result<DocumentOutline> {
    config.validate()?;
    let doc = PdfParser::from_reader(reader)?.parse()?;
    Ok(analyze_document(&doc, config))
}

/// Extract the text fragments and metadata of a PDF file.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::parse_file;
///
/// let doc = parse_file("document.pdf").unwrap();
/// println!("{} fragments on {} pages", doc.fragments.len(), doc.pages.len());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<ExtractedDocument> {
    let parser = PdfParser::open(path)?;
    parser.parse()
}

/// Extract the text fragments of a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::{parse_file_with_options, ParseOptions};
///
/// let options = ParseOptions::new().strict().with_max_pages(50);
/// let doc = parse_file_with_options("document.pdf", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(
    path: P,
    options: ParseOptions,
) -> Result<ExtractedDocument> {
    let parser = PdfParser::open_with_options(path, options)?;
    parser.parse()
}

/// Extract the text fragments of a PDF held in memory.
pub fn parse_bytes(data: &[u8]) -> Result<ExtractedDocument> {
    let parser = PdfParser::from_bytes(data)?;
    parser.parse()
}

/// Run the analyzer over an already extracted document.
///
/// Analysis never fails: a document without text yields the fallback title
/// and an empty outline.
pub fn analyze_document(doc: &ExtractedDocument, config: &OutlineConfig) -> DocumentOutline {
    OutlineAnalyzer::new(config.clone()).analyze(doc)
}
