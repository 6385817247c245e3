//! Final heading levels.
//!
//! Levels are assigned in two passes: the first collects the sizes used by
//! size-based candidates across the whole document and maps them onto
//! H1..H3, the second assigns every candidate its level from that map or
//! from its numbering.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::MAX_HEADING_LEVELS;
use crate::model::HeadingLevel;

use super::detector::HeadingCandidate;
use super::profile::size_key;
use super::signals::SignalBasis;

/// A candidate with its resolved level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedHeading {
    pub level: HeadingLevel,
    pub candidate: HeadingCandidate,
}

/// Document-wide mapping from font size to heading level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeLevels {
    levels: BTreeMap<i32, HeadingLevel>,
}

impl SizeLevels {
    /// Map the distinct sizes of size-based candidates, largest first.
    ///
    /// Sizes beyond the third are demoted to the lowest level.
    pub fn from_candidates(candidates: &[HeadingCandidate]) -> Self {
        let mut keys: Vec<i32> = candidates
            .iter()
            .filter(|c| c.basis == SignalBasis::Size)
            .map(|c| size_key(c.font_size))
            .collect();
        keys.sort_unstable_by(|a, b| b.cmp(a));
        keys.dedup();

        let levels = keys
            .into_iter()
            .enumerate()
            .map(|(rank, key)| {
                let depth = (rank + 1).min(MAX_HEADING_LEVELS as usize) as u8;
                (key, HeadingLevel::from_depth(depth))
            })
            .collect();
        Self { levels }
    }

    /// Level for a font size, if the size was mapped.
    pub fn level_for(&self, size: f32) -> Option<HeadingLevel> {
        self.levels.get(&size_key(size)).copied()
    }

    /// Number of mapped sizes.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Check if no sizes were mapped.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Reconciles numbering and size into H1/H2/H3.
#[derive(Debug, Default)]
pub struct LevelResolver;

impl LevelResolver {
    /// Create a resolver.
    pub fn new() -> Self {
        Self
    }

    /// Resolve every candidate.
    ///
    /// Numbering always wins; otherwise candidates of the same size share one
    /// level everywhere in the document, and weight/position candidates take
    /// the lowest level.
    pub fn resolve(&self, candidates: Vec<HeadingCandidate>) -> Vec<ResolvedHeading> {
        let size_levels = SizeLevels::from_candidates(&candidates);
        log::debug!("Size levels: {} distinct heading sizes", size_levels.len());

        candidates
            .into_iter()
            .map(|candidate| {
                let level = match (candidate.pattern_level, candidate.basis) {
                    (Some(depth), _) => HeadingLevel::from_depth(depth),
                    (None, SignalBasis::Size) => size_levels
                        .level_for(candidate.font_size)
                        .unwrap_or_else(HeadingLevel::lowest),
                    (None, _) => HeadingLevel::lowest(),
                };
                ResolvedHeading { level, candidate }
            })
            .collect()
    }
}
