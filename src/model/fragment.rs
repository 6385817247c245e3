//! Styled text fragments, the unit of input to the analyzer.

use serde::{Deserialize, Serialize};

/// A contiguous run of text sharing one font, size and style.
///
/// Positions are in PDF points. `y` grows downward from the top edge of the
/// page, so a smaller `y` means the fragment sits higher on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// The text content
    pub text: String,
    /// Font family name with any subset prefix removed (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Effective font size in points
    pub font_size: f32,
    /// Whether the font appears to be bold
    pub is_bold: bool,
    /// Whether the font appears to be italic
    pub is_italic: bool,
    /// X position (left edge)
    pub x: f32,
    /// Y position measured from the top of the page
    pub y: f32,
    /// Page number (1-indexed)
    pub page: u32,
}

impl TextFragment {
    /// Create a fragment, inferring weight and slant from the font name.
    pub fn new(
        text: impl Into<String>,
        font_name: impl Into<String>,
        font_size: f32,
        x: f32,
        y: f32,
        page: u32,
    ) -> Self {
        let font_name = strip_subset_prefix(&font_name.into()).to_string();
        let (is_bold, is_italic) = font_style(&font_name);
        Self {
            text: text.into(),
            font_name,
            font_size,
            is_bold,
            is_italic,
            x,
            y,
            page,
        }
    }

    /// Override the inferred bold flag.
    pub fn bold(mut self, is_bold: bool) -> Self {
        self.is_bold = is_bold;
        self
    }

    /// Override the inferred italic flag.
    pub fn italic(mut self, is_italic: bool) -> Self {
        self.is_italic = is_italic;
        self
    }

    /// Text with surrounding whitespace removed.
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    /// Whether the text failed to decode cleanly.
    pub fn is_malformed(&self) -> bool {
        is_malformed_text(&self.text)
    }

    /// Whether the fragment carries no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Text containing replacement or control characters could not be decoded.
pub fn is_malformed_text(text: &str) -> bool {
    text.chars()
        .any(|c| c == '\u{FFFD}' || (c.is_control() && !c.is_whitespace()))
}

/// Remove a font subset tag such as `ABCDEF+` from a base font name.
pub fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest))
            if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) && !rest.is_empty() =>
        {
            rest
        }
        _ => name,
    }
}

/// Infer (bold, italic) from a font name.
pub fn font_style(font_name: &str) -> (bool, bool) {
    let lower = font_name.to_lowercase();
    let is_bold = ["bold", "black", "heavy", "semibold", "demi"]
        .iter()
        .any(|w| lower.contains(w));
    let is_italic = lower.contains("italic") || lower.contains("oblique");
    (is_bold, is_italic)
}
