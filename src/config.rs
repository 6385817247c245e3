//! Tuning knobs for outline extraction.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of heading levels an outline can carry (H1, H2, H3).
pub const MAX_HEADING_LEVELS: u8 = 3;

/// Title used when the configured default is blank.
pub const DEFAULT_TITLE: &str = "Untitled Document";

/// Configuration consumed by the outline analyzer.
///
/// Every field has a default, so a partial JSON file only needs to name the
/// knobs it changes:
///
/// ```
/// use pdf_outline::OutlineConfig;
///
/// let config: OutlineConfig = serde_json::from_str(r#"{ "max_heading_chars": 120 }"#).unwrap();
/// assert_eq!(config.max_heading_chars, 120);
/// assert_eq!(config.min_heading_chars, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Shortest heading text accepted, in characters.
    pub min_heading_chars: usize,

    /// Longest heading text accepted, in characters.
    pub max_heading_chars: usize,

    /// Titles longer than this are truncated at a word boundary.
    pub max_title_chars: usize,

    /// Same-size title lines closer than this multiple of the font size are
    /// joined into one title.
    pub title_line_gap_factor: f32,

    /// A fragment is isolated when the gap above it exceeds this multiple of
    /// the document's median line gap.
    pub isolation_gap_factor: f32,

    /// Fraction of the page height, from the top, treated as the upper region.
    pub upper_page_fraction: f32,

    /// Points a size must exceed the body size by to count as a heading size.
    pub size_tolerance: f32,

    /// Profiles with fewer distinct sizes are degenerate.
    pub min_distinct_sizes: usize,

    /// Multiplier applied to size votes in a degenerate profile.
    pub degenerate_size_weight: f32,

    /// Vertical distance (points) within which a larger heading suppresses a
    /// bold body-size candidate on the same page.
    pub competition_window: f32,

    /// Headings matching the title are dropped on pages up to this number.
    pub title_page_window: u32,

    /// Title used when neither metadata nor content yields one.
    pub default_title: String,

    /// Use the input file stem instead of `default_title` when available.
    pub title_from_filename: bool,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            min_heading_chars: 3,
            max_heading_chars: 200,
            max_title_chars: 200,
            title_line_gap_factor: 1.5,
            isolation_gap_factor: 1.2,
            upper_page_fraction: 0.3,
            size_tolerance: 0.5,
            min_distinct_sizes: 2,
            degenerate_size_weight: 0.5,
            competition_window: 24.0,
            title_page_window: 2,
            default_title: DEFAULT_TITLE.to_string(),
            title_from_filename: false,
        }
    }
}

impl OutlineConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Set the accepted heading length range.
    pub fn with_heading_chars(mut self, min: usize, max: usize) -> Self {
        self.min_heading_chars = min;
        self.max_heading_chars = max;
        self
    }

    /// Set the maximum title length.
    pub fn with_max_title_chars(mut self, max: usize) -> Self {
        self.max_title_chars = max;
        self
    }

    /// Set the isolation gap factor.
    pub fn with_isolation_gap_factor(mut self, factor: f32) -> Self {
        self.isolation_gap_factor = factor;
        self
    }

    /// Set the fallback title.
    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    /// Use the file stem as the fallback title.
    pub fn with_filename_title(mut self, enabled: bool) -> Self {
        self.title_from_filename = enabled;
        self
    }

    /// Check that the values are usable together.
    pub fn validate(&self) -> Result<()> {
        if self.min_heading_chars == 0 {
            return Err(Error::Config("min_heading_chars must be at least 1".into()));
        }
        if self.min_heading_chars > self.max_heading_chars {
            return Err(Error::Config(format!(
                "min_heading_chars ({}) exceeds max_heading_chars ({})",
                self.min_heading_chars, self.max_heading_chars
            )));
        }
        if self.max_title_chars == 0 {
            return Err(Error::Config("max_title_chars must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.upper_page_fraction) {
            return Err(Error::Config(format!(
                "upper_page_fraction must be within 0..=1, got {}",
                self.upper_page_fraction
            )));
        }
        let factors = [
            ("title_line_gap_factor", self.title_line_gap_factor),
            ("isolation_gap_factor", self.isolation_gap_factor),
            ("size_tolerance", self.size_tolerance),
            ("degenerate_size_weight", self.degenerate_size_weight),
            ("competition_window", self.competition_window),
        ];
        for (name, value) in factors {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.default_title.trim().is_empty() {
            return Err(Error::Config("default_title must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = OutlineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_title, "Untitled Document");
        assert_eq!(config.min_heading_chars, 3);
        assert_eq!(config.max_heading_chars, 200);
    }

    #[test]
    fn test_builder() {
        let config = OutlineConfig::new()
            .with_heading_chars(2, 80)
            .with_max_title_chars(60)
            .with_default_title("Untitled")
            .with_filename_title(true);

        assert_eq!(config.min_heading_chars, 2);
        assert_eq!(config.max_heading_chars, 80);
        assert_eq!(config.max_title_chars, 60);
        assert_eq!(config.default_title, "Untitled");
        assert!(config.title_from_filename);
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let config = OutlineConfig::new().with_heading_chars(50, 10);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let config = OutlineConfig::new().with_default_title("   ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_round_trip_with_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "default_title": "No Title", "title_page_window": 1 }"#)
            .unwrap();

        let config = OutlineConfig::from_file(&path).unwrap();
        assert_eq!(config.default_title, "No Title");
        assert_eq!(config.title_page_window, 1);
        assert_eq!(config.max_title_chars, 200);

        let saved = dir.path().join("saved.json");
        config.save(&saved).unwrap();
        assert_eq!(OutlineConfig::from_file(&saved).unwrap(), config);
    }

    #[test]
    fn test_from_file_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "upper_page_fraction": 2.5 }"#).unwrap();
        assert!(matches!(
            OutlineConfig::from_file(&path),
            Err(Error::Config(_))
        ));
    }
}
