//! PDF parsing module.
//!
//! Turns a PDF into an [`ExtractedDocument`](crate::model::ExtractedDocument):
//! metadata, page sizes and styled text fragments.

mod backend;
mod layout;
mod options;
mod pdf_parser;

pub use backend::{
    decode_text_simple, BackendFontInfo, ContentOp, LopdfBackend, PageId, PdfBackend, PdfValue,
};
pub use layout::{assemble_fragments, ContentInterpreter, PageFragments, RawSpan};
pub use options::{ErrorMode, ParseOptions};
pub use pdf_parser::PdfParser;
