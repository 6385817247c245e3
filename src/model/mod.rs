//! Data types shared by the extractor, the analyzer and the renderers.
//!
//! [`ExtractedDocument`] is what the PDF parser produces; [`DocumentOutline`]
//! is what the analyzer hands back. Everything in between lives in
//! [`crate::analysis`].

mod document;
mod fragment;
mod outline;

pub use document::{ExtractedDocument, Metadata, PageGeometry};
pub use fragment::{font_style, is_malformed_text, strip_subset_prefix, TextFragment};
pub use outline::{DocumentOutline, HeadingLevel, OutlineEntry};
