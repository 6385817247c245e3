//! PDF header sniffing.
//!
//! Inputs are checked before they are handed to lopdf so that a batch run
//! can reject non-PDF files with [`Error::UnknownFormat`] instead of a
//! parser error deep inside the xref reader.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Version information read from a PDF header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfHeader {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
    /// Byte offset of the `%PDF-` marker (non-zero when junk precedes it)
    pub offset: usize,
}

impl std::fmt::Display for PdfHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3;

/// Readers tolerate leading garbage before the header within this window.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Read the PDF header of a file on disk.
pub fn sniff_path<P: AsRef<Path>>(path: P) -> Result<PdfHeader> {
    let file = File::open(path)?;
    let mut head = Vec::with_capacity(HEADER_SEARCH_WINDOW);
    file.take(HEADER_SEARCH_WINDOW as u64).read_to_end(&mut head)?;
    sniff_bytes(&head)
}

/// Read the PDF header from the start of an in-memory buffer.
pub fn sniff_bytes(data: &[u8]) -> Result<PdfHeader> {
    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW)];
    let offset = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let start = offset + PDF_MAGIC.len();
    let version_bytes = data
        .get(start..start + VERSION_LEN)
        .ok_or(Error::UnknownFormat)?;
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfHeader { version, offset })
}

fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3
        && matches!(bytes[0], b'1' | b'2')
        && bytes[1] == b'.'
        && bytes[2].is_ascii_digit()
}

/// Whether `path` is a regular file with a `.pdf` extension.
pub fn is_pdf_file<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    let has_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    has_extension && path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_valid_header() {
        let header = sniff_bytes(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3").unwrap();
        assert_eq!(header.version, "1.7");
        assert_eq!(header.offset, 0);
        assert_eq!(header.to_string(), "PDF 1.7");
    }

    #[test]
    fn test_sniff_header_after_junk() {
        let header = sniff_bytes(b"\r\n\x00junk%PDF-2.0\n").unwrap();
        assert_eq!(header.version, "2.0");
        assert_eq!(header.offset, 7);
    }

    #[test]
    fn test_sniff_rejects_other_formats() {
        assert!(matches!(
            sniff_bytes(b"<!DOCTYPE html>"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(sniff_bytes(b"%PDF-"), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_sniff_rejects_bad_version() {
        assert!(matches!(
            sniff_bytes(b"%PDF-9.x\n"),
            Err(Error::UnsupportedVersion(v)) if v == "9.x"
        ));
    }

    #[test]
    fn test_is_pdf_file_requires_extension() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("report.PDF");
        let txt = dir.path().join("notes.txt");
        std::fs::write(&pdf, b"%PDF-1.4\n").unwrap();
        std::fs::write(&txt, b"%PDF-1.4\n").unwrap();

        assert!(is_pdf_file(&pdf));
        assert!(!is_pdf_file(&txt));
        assert!(!is_pdf_file(dir.path().join("missing.pdf")));
    }
}
