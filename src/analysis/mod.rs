//! Heading classification.
//!
//! The analyzer runs a fixed sequence of stages over an
//! [`ExtractedDocument`]:
//!
//! 1. [`FontProfile`] - font-size histogram and body size
//! 2. [`TitleExtractor`] - metadata, then the largest text on page 1
//! 3. [`HeadingDetector`] - signal votes per fragment
//! 4. [`LevelResolver`] - numbering and document-wide size levels
//! 5. [`OutlineAssembler`] - ordering, deduplication, title exclusion
//!
//! Each stage consumes the previous one's output; nothing is shared between
//! documents.

pub mod assembler;
pub mod detector;
pub mod profile;
pub mod resolver;
pub mod signals;
pub mod text;
pub mod title;

use serde::Serialize;

use crate::config::OutlineConfig;
use crate::model::{DocumentOutline, ExtractedDocument};

pub use assembler::OutlineAssembler;
pub use detector::{HeadingCandidate, HeadingDetector};
pub use profile::FontProfile;
pub use resolver::{LevelResolver, ResolvedHeading, SizeLevels};
pub use signals::{Signal, SignalBasis};
pub use title::{TitleChoice, TitleExtractor, TitleSource};

/// Counters collected while analyzing one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisStats {
    /// Fragments handed to the analyzer
    pub fragments: usize,
    /// Fragments the extractor could not decode
    pub skipped_fragments: usize,
    /// Fragments the analyzer found undecodable
    pub malformed_fragments: usize,
    /// Candidates kept after detection
    pub candidates: usize,
    /// Heading-like fragments outside the length range
    pub rejected_length: usize,
    /// Heading-like fragments that were numbers, links or prose
    pub rejected_noise: usize,
    /// Weak candidates displaced by a nearby stronger heading
    pub suppressed: usize,
    /// Entries repeating an earlier one on the same page
    pub duplicates_removed: usize,
    /// Entries repeating the title
    pub title_exclusions: usize,
}

/// Full result of analyzing one document.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub outline: DocumentOutline,
    pub title: TitleChoice,
    pub profile: FontProfile,
    /// Every resolved candidate, before deduplication
    pub headings: Vec<ResolvedHeading>,
    pub stats: AnalysisStats,
}

/// Turns extracted fragments into a [`DocumentOutline`].
#[derive(Debug, Clone, Default)]
pub struct OutlineAnalyzer {
    config: OutlineConfig,
}

impl OutlineAnalyzer {
    /// Create an analyzer with the given configuration.
    pub fn new(config: OutlineConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    /// Produce the outline for a document.
    pub fn analyze(&self, doc: &ExtractedDocument) -> DocumentOutline {
        self.analyze_detailed(doc).outline
    }

    /// Produce the outline together with intermediate results.
    pub fn analyze_detailed(&self, doc: &ExtractedDocument) -> Analysis {
        let mut stats = AnalysisStats {
            fragments: doc.fragments.len(),
            skipped_fragments: doc.skipped_fragments,
            ..AnalysisStats::default()
        };

        let profile = FontProfile::from_fragments(&doc.fragments);
        let title = TitleExtractor::new(&self.config).extract(doc, &profile);

        let candidates =
            HeadingDetector::new(&self.config, &profile).detect(doc, &title.consumed, &mut stats);
        let headings = LevelResolver::new().resolve(candidates);
        let outline =
            OutlineAssembler::new(&self.config).assemble(&title, headings.clone(), &mut stats);

        log::info!(
            "{}: title {:?} ({:?}), {} headings from {} fragments",
            doc.source_name.as_deref().unwrap_or("document"),
            outline.title,
            title.source,
            outline.len(),
            stats.fragments
        );

        Analysis {
            outline,
            title,
            profile,
            headings,
            stats,
        }
    }
}
