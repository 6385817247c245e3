//! Document title selection.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::config::{OutlineConfig, DEFAULT_TITLE};
use crate::model::{ExtractedDocument, Metadata};

use super::profile::{size_key, FontProfile};
use super::text::{char_count, collapse_whitespace, is_noise, truncate_at_word};

lazy_static! {
    static ref PLACEHOLDER_TITLE: Regex = Regex::new(
        r"(?ix)^(
            untitled(\s+document)?(\s*\d+)?
            | document\s*\d*
            | title
            | no\s+title
            | unknown
            | none | null | n/a
            | slide\s*\d+
            | presentation\s*\d*
            | microsoft\s+(word|powerpoint|excel)\s+-.*
            | .*\.(docx?|pdf|txt|rtf|odt|pptx?)
        )$"
    )
    .unwrap();
}

/// Where the title came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TitleSource {
    /// The Info dictionary's `Title` entry
    Metadata,
    /// The largest text on page 1
    Content,
    /// The input file stem
    Filename,
    /// The configured default title
    Default,
}

/// The chosen title and the fragments it consumed.
#[derive(Debug, Clone, Serialize)]
pub struct TitleChoice {
    /// Title text, never empty
    pub text: String,
    /// Which step produced it
    pub source: TitleSource,
    /// Indices into `ExtractedDocument::fragments` used by a content title
    pub consumed: Vec<usize>,
}

/// Generic values authoring tools leave in the `Title` metadata entry.
pub fn is_placeholder_title(title: &str) -> bool {
    PLACEHOLDER_TITLE.is_match(title.trim())
}

/// Picks a document title from metadata, then page 1, then a fallback.
pub struct TitleExtractor<'a> {
    config: &'a OutlineConfig,
}

impl<'a> TitleExtractor<'a> {
    /// Create an extractor using the given configuration.
    pub fn new(config: &'a OutlineConfig) -> Self {
        Self { config }
    }

    /// Choose the title for `doc`.
    pub fn extract(&self, doc: &ExtractedDocument, profile: &FontProfile) -> TitleChoice {
        if let Some(text) = self.from_metadata(&doc.metadata) {
            log::debug!("Title from metadata: {}", text);
            return TitleChoice {
                text,
                source: TitleSource::Metadata,
                consumed: Vec::new(),
            };
        }

        if let Some((text, consumed)) = self.from_content(doc, profile) {
            log::debug!("Title from page 1 content: {}", text);
            return TitleChoice {
                text,
                source: TitleSource::Content,
                consumed,
            };
        }

        self.fallback(doc)
    }

    fn from_metadata(&self, metadata: &Metadata) -> Option<String> {
        let title = metadata.title.as_deref()?.trim();
        if char_count(title) <= 3 || is_placeholder_title(title) {
            return None;
        }
        Some(truncate_at_word(title, self.config.max_title_chars))
    }

    /// Largest text on page 1, joining adjacent lines of the same size.
    fn from_content(
        &self,
        doc: &ExtractedDocument,
        profile: &FontProfile,
    ) -> Option<(String, Vec<usize>)> {
        let page_one: Vec<usize> = doc
            .fragments
            .iter()
            .enumerate()
            .filter(|(_, f)| {
                f.page == 1 && !f.is_blank() && !f.is_malformed() && !is_noise(f.trimmed())
            })
            .map(|(i, _)| i)
            .collect();

        let max_size = page_one
            .iter()
            .map(|&i| doc.fragments[i].font_size)
            .max_by(|a, b| a.total_cmp(b))?;
        let max_key = size_key(max_size);

        // A lone larger size is a heading over body text, not a title
        let tolerance = self.config.size_tolerance;
        let other_heading_size = profile
            .distinct_sizes_desc
            .iter()
            .any(|&s| size_key(s) != max_key && profile.is_above_body(s, tolerance));
        if !profile.is_above_body(max_size, tolerance) || !other_heading_size {
            return None;
        }

        let mut same_size: Vec<usize> = page_one
            .into_iter()
            .filter(|&i| size_key(doc.fragments[i].font_size) == max_key)
            .collect();
        same_size.sort_by(|&a, &b| {
            let (fa, fb) = (&doc.fragments[a], &doc.fragments[b]);
            fa.y.total_cmp(&fb.y).then_with(|| fa.x.total_cmp(&fb.x))
        });

        let max_gap = max_size * self.config.title_line_gap_factor;
        let mut consumed = vec![same_size[0]];
        for &index in &same_size[1..] {
            let last = &doc.fragments[consumed[consumed.len() - 1]];
            if doc.fragments[index].y - last.y > max_gap {
                break;
            }
            consumed.push(index);
        }

        let joined = consumed
            .iter()
            .map(|&i| collapse_whitespace(&doc.fragments[i].text))
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() {
            return None;
        }

        Some((truncate_at_word(&joined, self.config.max_title_chars), consumed))
    }

    fn fallback(&self, doc: &ExtractedDocument) -> TitleChoice {
        if self.config.title_from_filename {
            if let Some(stem) = doc.source_name.as_deref().map(str::trim) {
                if !stem.is_empty() {
                    return TitleChoice {
                        text: truncate_at_word(stem, self.config.max_title_chars),
                        source: TitleSource::Filename,
                        consumed: Vec::new(),
                    };
                }
            }
        }

        let default_title = self.config.default_title.trim();
        let text = if default_title.is_empty() {
            DEFAULT_TITLE
        } else {
            default_title
        };
        TitleChoice {
            text: text.to_string(),
            source: TitleSource::Default,
            consumed: Vec::new(),
        }
    }
}
