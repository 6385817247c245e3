//! Outline assembly: ordering, deduplication and title exclusion.

use std::collections::HashSet;

use crate::config::OutlineConfig;
use crate::model::{DocumentOutline, OutlineEntry};

use super::resolver::ResolvedHeading;
use super::text::{collapse_whitespace, normalize_for_match};
use super::title::{TitleChoice, TitleSource};
use super::AnalysisStats;

/// Builds the final [`DocumentOutline`].
pub struct OutlineAssembler<'a> {
    config: &'a OutlineConfig,
}

impl<'a> OutlineAssembler<'a> {
    /// Create an assembler using the given configuration.
    pub fn new(config: &'a OutlineConfig) -> Self {
        Self { config }
    }

    /// Order, dedupe and filter resolved headings into an outline.
    pub fn assemble(
        &self,
        title: &TitleChoice,
        mut headings: Vec<ResolvedHeading>,
        stats: &mut AnalysisStats,
    ) -> DocumentOutline {
        // Stable: same-position headings keep detection order
        headings.sort_by(|a, b| {
            a.candidate
                .page
                .cmp(&b.candidate.page)
                .then_with(|| a.candidate.y.total_cmp(&b.candidate.y))
        });

        // Only titles read from the document itself are repeated in its body
        let title_key = match title.source {
            TitleSource::Metadata | TitleSource::Content => {
                Some(normalize_for_match(&title.text))
            }
            TitleSource::Filename | TitleSource::Default => None,
        };

        let mut seen: HashSet<(String, u32)> = HashSet::new();
        let mut outline = Vec::with_capacity(headings.len());

        for heading in headings {
            let candidate = heading.candidate;
            let key = normalize_for_match(&candidate.text);

            let repeats_title = title_key.as_deref() == Some(key.as_str())
                && candidate.page <= self.config.title_page_window;
            if repeats_title {
                log::debug!(
                    "Dropped title repeat {:?} on page {}",
                    candidate.text,
                    candidate.page
                );
                stats.title_exclusions += 1;
                continue;
            }

            if !seen.insert((key, candidate.page)) {
                log::debug!(
                    "Dropped duplicate {:?} on page {}",
                    candidate.text,
                    candidate.page
                );
                stats.duplicates_removed += 1;
                continue;
            }

            outline.push(OutlineEntry::new(
                heading.level,
                collapse_whitespace(&candidate.text),
                candidate.page,
            ));
        }

        DocumentOutline {
            title: title.text.clone(),
            outline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::detector::HeadingCandidate;
    use crate::analysis::signals::SignalBasis;
    use crate::model::HeadingLevel;

    fn heading(text: &str, level: HeadingLevel, page: u32, y: f32) -> ResolvedHeading {
        ResolvedHeading {
            level,
            candidate: HeadingCandidate {
                text: text.to_string(),
                page,
                font_size: 14.0,
                is_bold: true,
                y,
                pattern_level: None,
                size_rank: Some(1),
                provisional_level: level.depth(),
                basis: SignalBasis::Size,
                confidence: 0.8,
                signals: Vec::new(),
            },
        }
    }

    fn title(text: &str, source: TitleSource) -> TitleChoice {
        TitleChoice {
            text: text.to_string(),
            source,
            consumed: Vec::new(),
        }
    }

    fn texts(outline: &DocumentOutline) -> Vec<&str> {
        outline.outline.iter().map(|e| e.text.as_str()).collect()
    }

    #[test]
    fn test_orders_by_page_then_position() {
        let config = OutlineConfig::default();
        let mut stats = AnalysisStats::default();
        let outline = OutlineAssembler::new(&config).assemble(
            &title("Report", TitleSource::Default),
            vec![
                heading("Third", HeadingLevel::H1, 2, 50.0),
                heading("Second", HeadingLevel::H2, 1, 400.0),
                heading("First", HeadingLevel::H1, 1, 100.0),
            ],
            &mut stats,
        );
        assert_eq!(texts(&outline), vec!["First", "Second", "Third"]);
        assert_eq!(outline.title, "Report");
    }

    #[test]
    fn test_duplicates_on_same_page_are_dropped() {
        let config = OutlineConfig::default();
        let mut stats = AnalysisStats::default();
        let outline = OutlineAssembler::new(&config).assemble(
            &title("Untitled Document", TitleSource::Default),
            vec![
                heading("Methods", HeadingLevel::H2, 3, 100.0),
                heading("  METHODS ", HeadingLevel::H1, 3, 300.0),
                heading("Methods", HeadingLevel::H2, 4, 100.0),
            ],
            &mut stats,
        );
        assert_eq!(outline.len(), 2);
        assert_eq!(outline.outline[0].level, HeadingLevel::H2);
        assert_eq!(outline.outline[1].page, 4);
        assert_eq!(stats.duplicates_removed, 1);
    }

    #[test]
    fn test_title_repeat_excluded_on_early_pages() {
        let config = OutlineConfig::default();
        let mut stats = AnalysisStats::default();
        let outline = OutlineAssembler::new(&config).assemble(
            &title("Understanding  AI", TitleSource::Content),
            vec![
                heading("understanding ai", HeadingLevel::H1, 2, 60.0),
                heading("Understanding AI", HeadingLevel::H1, 3, 60.0),
            ],
            &mut stats,
        );
        assert_eq!(outline.len(), 1);
        assert_eq!(outline.outline[0].page, 3);
        assert_eq!(stats.title_exclusions, 1);
    }

    #[test]
    fn test_default_title_is_not_excluded() {
        let config = OutlineConfig::default();
        let mut stats = AnalysisStats::default();
        let outline = OutlineAssembler::new(&config).assemble(
            &title("Untitled Document", TitleSource::Default),
            vec![heading("Untitled Document", HeadingLevel::H1, 1, 60.0)],
            &mut stats,
        );
        assert_eq!(outline.len(), 1);
    }

    #[test]
    fn test_entry_text_is_collapsed() {
        let config = OutlineConfig::default();
        let mut stats = AnalysisStats::default();
        let outline = OutlineAssembler::new(&config).assemble(
            &title("T", TitleSource::Default),
            vec![heading("1.1   Background\tand Scope", HeadingLevel::H2, 5, 60.0)],
            &mut stats,
        );
        assert_eq!(texts(&outline), vec!["1.1 Background and Scope"]);
    }
}
