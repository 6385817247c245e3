//! Heading candidate detection.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::config::OutlineConfig;
use crate::model::{ExtractedDocument, TextFragment};

use super::profile::FontProfile;
use super::signals::{collect_votes, combine, pattern_level, Signal, SignalBasis, SignalInput};
use super::text::{char_count, collapse_whitespace, is_multi_sentence, is_noise};
use super::AnalysisStats;

/// Fragments whose tops are this close (points) share a line.
const SAME_LINE_TOLERANCE: f32 = 0.5;

/// A fragment that looks like a heading, before its final level is known.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadingCandidate {
    /// Trimmed, whitespace-collapsed text
    pub text: String,
    pub page: u32,
    pub font_size: f32,
    pub is_bold: bool,
    /// Distance from the top of the page
    pub y: f32,
    /// Level implied by numbering, if any
    pub pattern_level: Option<u8>,
    /// Position of the size among the document's distinct sizes
    pub size_rank: Option<usize>,
    /// Level suggested by the strongest signal
    pub provisional_level: u8,
    pub basis: SignalBasis,
    pub confidence: f32,
    pub signals: Vec<Signal>,
}

/// Distinct line positions per page, used for vertical gap measurements.
struct LineIndex {
    /// Every non-blank fragment's `y`, sorted, per page
    fragments: BTreeMap<u32, Vec<f32>>,
    /// Distinct line positions per page
    lines: BTreeMap<u32, Vec<f32>>,
    median_gap: f32,
}

impl LineIndex {
    fn new(fragments: &[TextFragment]) -> Self {
        let mut lines: BTreeMap<u32, Vec<f32>> = BTreeMap::new();
        for fragment in fragments.iter().filter(|f| !f.is_blank()) {
            lines.entry(fragment.page).or_default().push(fragment.y);
        }

        for ys in lines.values_mut() {
            ys.sort_by(|a, b| a.total_cmp(b));
        }
        let fragment_ys = lines.clone();

        let mut gaps = Vec::new();
        for ys in lines.values_mut() {
            ys.dedup_by(|b, a| (*b - *a).abs() <= SAME_LINE_TOLERANCE);
            gaps.extend(ys.windows(2).map(|w| w[1] - w[0]));
        }

        gaps.sort_by(|a, b| a.total_cmp(b));
        let median_gap = if gaps.is_empty() {
            0.0
        } else {
            gaps[gaps.len() / 2]
        };

        Self {
            fragments: fragment_ys,
            lines,
            median_gap,
        }
    }

    /// Number of fragments sitting on the line at `y`, the fragment itself
    /// included.
    fn fragments_on_line(&self, page: u32, y: f32) -> usize {
        self.fragments.get(&page).map_or(0, |ys| {
            ys.iter()
                .filter(|&&other| (other - y).abs() <= SAME_LINE_TOLERANCE)
                .count()
        })
    }

    /// Gap to the closest line above `y`, or `None` on the first line.
    fn gap_above(&self, page: u32, y: f32) -> Option<f32> {
        self.lines
            .get(&page)?
            .iter()
            .rev()
            .find(|&&line| line < y - SAME_LINE_TOLERANCE)
            .map(|line| y - line)
    }
}

/// Scores every fragment and keeps the heading-like ones.
pub struct HeadingDetector<'a> {
    config: &'a OutlineConfig,
    profile: &'a FontProfile,
}

impl<'a> HeadingDetector<'a> {
    /// Create a detector for one document's profile.
    pub fn new(config: &'a OutlineConfig, profile: &'a FontProfile) -> Self {
        Self { config, profile }
    }

    /// Detect candidates, skipping the fragment indices in `excluded`.
    pub fn detect(
        &self,
        doc: &ExtractedDocument,
        excluded: &[usize],
        stats: &mut AnalysisStats,
    ) -> Vec<HeadingCandidate> {
        let excluded: HashSet<usize> = excluded.iter().copied().collect();
        let lines = LineIndex::new(&doc.fragments);
        let mut candidates = Vec::new();

        for (index, fragment) in doc.fragments.iter().enumerate() {
            if excluded.contains(&index) || fragment.is_blank() {
                continue;
            }
            if fragment.is_malformed() {
                log::warn!(
                    "Page {}: skipping undecodable fragment {:?}",
                    fragment.page,
                    fragment.text
                );
                stats.malformed_fragments += 1;
                continue;
            }

            let text = collapse_whitespace(&fragment.text);
            let input = SignalInput {
                fragment,
                text: &text,
                profile: self.profile,
                config: self.config,
                gap_above: lines.gap_above(fragment.page, fragment.y),
                alone_on_line: lines.fragments_on_line(fragment.page, fragment.y) <= 1,
                median_gap: lines.median_gap,
                page_height: doc.page_height(fragment.page),
            };
            let votes = collect_votes(&input);
            let Some(verdict) = combine(&votes) else {
                continue;
            };

            let length = char_count(&text);
            if length < self.config.min_heading_chars || length > self.config.max_heading_chars {
                log::debug!("Rejected {:?}: length {} out of range", text, length);
                stats.rejected_length += 1;
                continue;
            }
            if is_noise(&text) || is_multi_sentence(&text) {
                log::debug!("Rejected {:?}: noise or prose", text);
                stats.rejected_noise += 1;
                continue;
            }

            log::debug!(
                "Candidate {:?} on page {} via {:?} (level {})",
                text,
                fragment.page,
                verdict.basis,
                verdict.level
            );
            candidates.push(HeadingCandidate {
                pattern_level: pattern_level(&text),
                size_rank: self.profile.size_rank(fragment.font_size),
                text,
                page: fragment.page,
                font_size: fragment.font_size,
                is_bold: fragment.is_bold,
                y: fragment.y,
                provisional_level: verdict.level,
                basis: verdict.basis,
                confidence: verdict.confidence,
                signals: verdict.signals,
            });
        }

        let candidates = self.suppress_weak(candidates, stats);
        stats.candidates = candidates.len();
        candidates
    }

    /// Drop weight/position candidates that sit next to a stronger heading.
    fn suppress_weak(
        &self,
        candidates: Vec<HeadingCandidate>,
        stats: &mut AnalysisStats,
    ) -> Vec<HeadingCandidate> {
        let strong: Vec<(u32, f32)> = candidates
            .iter()
            .filter(|c| !c.basis.is_weak())
            .map(|c| (c.page, c.y))
            .collect();
        let window = self.config.competition_window;

        candidates
            .into_iter()
            .filter(|c| {
                let competes = c.basis.is_weak()
                    && strong
                        .iter()
                        .any(|&(page, y)| page == c.page && (y - c.y).abs() <= window);
                if competes {
                    log::debug!("Suppressed {:?}: stronger heading nearby", c.text);
                    stats.suppressed += 1;
                }
                !competes
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(text: &str, font: &str, size: f32, y: f32, page: u32) -> TextFragment {
        TextFragment::new(text, font, size, 72.0, y, page)
    }

    /// Ten body lines 12pt apart starting at `y`.
    fn body(page: u32, y: f32) -> Vec<TextFragment> {
        (0..10)
            .map(|i| frag("plain body text here", "Times-Roman", 10.0, y + i as f32 * 12.0, page))
            .collect()
    }

    fn detect(fragments: Vec<TextFragment>) -> (Vec<HeadingCandidate>, AnalysisStats) {
        detect_with(fragments, &OutlineConfig::default())
    }

    fn detect_with(
        fragments: Vec<TextFragment>,
        config: &OutlineConfig,
    ) -> (Vec<HeadingCandidate>, AnalysisStats) {
        let doc = ExtractedDocument::from_fragments(fragments);
        let profile = FontProfile::from_fragments(&doc.fragments);
        let mut stats = AnalysisStats::default();
        let candidates = HeadingDetector::new(config, &profile).detect(&doc, &[], &mut stats);
        (candidates, stats)
    }

    #[test]
    fn test_size_candidates() {
        let mut fragments = vec![frag("Introduction", "Times-Roman", 18.0, 80.0, 1)];
        fragments.extend(body(1, 110.0));
        let (candidates, stats) = detect(fragments);

        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.text, "Introduction");
        assert_eq!(c.basis, SignalBasis::Size);
        assert_eq!(c.size_rank, Some(0));
        assert_eq!(c.provisional_level, 1);
        assert_eq!(stats.candidates, 1);
    }

    #[test]
    fn test_pattern_candidate_at_body_size() {
        let mut fragments = body(1, 100.0);
        fragments.push(frag("2.3 Sampling Method", "Times-Roman", 10.0, 230.0, 1));
        fragments.extend(body(1, 250.0));
        let (candidates, _) = detect(fragments);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].pattern_level, Some(2));
        assert_eq!(candidates[0].basis, SignalBasis::Pattern);
    }

    #[test]
    fn test_bold_isolated_body_text() {
        let mut fragments = body(1, 100.0);
        fragments.push(frag("Key Findings", "Times-Bold", 10.0, 240.0, 1));
        fragments.extend(body(1, 256.0));
        // Bold inside a paragraph: no gap above
        fragments.push(frag("emphasis", "Times-Bold", 10.0, 376.0, 1));
        let (candidates, _) = detect(fragments);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text, "Key Findings");
        assert_eq!(candidates[0].basis, SignalBasis::WeightPosition);
        assert_eq!(candidates[0].provisional_level, 3);
    }

    #[test]
    fn test_run_in_lead_is_not_a_heading() {
        let mut fragments = body(1, 100.0);
        fragments.push(frag("Warning:", "Times-Bold", 10.0, 230.0, 1));
        fragments.push(TextFragment::new(
            "do not operate the device without the guard.",
            "Times-Roman",
            10.0,
            130.0,
            230.0,
            1,
        ));
        fragments.extend(body(1, 242.0));
        let (candidates, _) = detect(fragments);

        assert!(candidates.is_empty());
    }

    #[test]
    fn test_letter_section_candidate() {
        let mut fragments = body(1, 100.0);
        fragments.push(frag("A. Scope of Work", "Times-Roman", 10.0, 230.0, 1));
        fragments.extend(body(1, 252.0));
        let (candidates, _) = detect(fragments);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].basis, SignalBasis::Letter);
        assert_eq!(candidates[0].pattern_level, None);
        assert_eq!(candidates[0].provisional_level, 3);
    }

    #[test]
    fn test_weak_candidate_suppressed_near_strong_heading() {
        let mut fragments = vec![
            frag("Results", "Times-Roman", 16.0, 60.0, 1),
            frag("Summary Table", "Times-Bold", 10.0, 80.0, 1),
        ];
        fragments.extend(body(1, 120.0));
        fragments.push(frag("Closing Notes", "Times-Bold", 10.0, 300.0, 1));
        let (candidates, stats) = detect(fragments);

        let texts: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["Results", "Closing Notes"]);
        assert_eq!(stats.suppressed, 1);
    }

    #[test]
    fn test_length_and_noise_filters() {
        let mut fragments = vec![
            frag("A", "Times-Roman", 18.0, 40.0, 1),
            frag("- 12 -", "Times-Roman", 18.0, 60.0, 1),
            frag("https://example.com/report", "Times-Roman", 18.0, 80.0, 1),
            frag(
                "This is a paragraph. It has two sentences in a large font.",
                "Times-Roman",
                18.0,
                100.0,
                1,
            ),
        ];
        fragments.extend(body(1, 130.0));
        let (candidates, stats) = detect(fragments);

        assert!(candidates.is_empty());
        assert_eq!(stats.rejected_length, 1);
        assert_eq!(stats.rejected_noise, 3);
    }

    #[test]
    fn test_max_length_is_configurable() {
        let mut fragments = vec![frag("Quite A Long Heading", "Times-Roman", 18.0, 60.0, 1)];
        fragments.extend(body(1, 100.0));
        let config = OutlineConfig::new().with_heading_chars(3, 10);
        let (candidates, stats) = detect_with(fragments, &config);
        assert!(candidates.is_empty());
        assert_eq!(stats.rejected_length, 1);
    }

    #[test]
    fn test_malformed_fragments_are_counted() {
        let mut fragments = vec![frag("Bad \u{FFFD} Heading", "Times-Roman", 18.0, 60.0, 1)];
        fragments.extend(body(1, 100.0));
        let (candidates, stats) = detect(fragments);
        assert!(candidates.is_empty());
        assert_eq!(stats.malformed_fragments, 1);
    }

    #[test]
    fn test_excluded_fragments_are_skipped() {
        let mut fragments = vec![frag("Document Title", "Times-Roman", 24.0, 40.0, 1)];
        fragments.extend(body(1, 100.0));
        let doc = ExtractedDocument::from_fragments(fragments);
        let profile = FontProfile::from_fragments(&doc.fragments);
        let config = OutlineConfig::default();
        let mut stats = AnalysisStats::default();

        let candidates = HeadingDetector::new(&config, &profile).detect(&doc, &[0], &mut stats);
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_line_index_gaps() {
        let fragments = vec![
            frag("a", "Times-Roman", 10.0, 100.0, 1),
            frag("b", "Times-Roman", 10.0, 100.2, 1),
            frag("c", "Times-Roman", 10.0, 112.0, 1),
            frag("d", "Times-Roman", 10.0, 124.0, 1),
            frag("e", "Times-Roman", 10.0, 160.0, 1),
        ];
        let index = LineIndex::new(&fragments);
        assert_eq!(index.median_gap, 12.0);
        assert_eq!(index.gap_above(1, 100.2), None);
        assert_eq!(index.gap_above(1, 160.0), Some(36.0));
        assert_eq!(index.gap_above(2, 10.0), None);
        assert_eq!(index.fragments_on_line(1, 100.0), 2);
        assert_eq!(index.fragments_on_line(1, 160.0), 1);
        assert_eq!(index.fragments_on_line(2, 10.0), 0);
    }
}
