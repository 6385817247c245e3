//! Heading signals.
//!
//! Each evaluator looks at one fragment in isolation and may cast a [`Vote`].
//! [`combine`] turns the votes into a verdict with a single precedence rule:
//! pattern, then size, then weight together with position.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::config::{OutlineConfig, MAX_HEADING_LEVELS};
use crate::model::TextFragment;

use super::profile::FontProfile;

lazy_static! {
    static ref NUMBERED_L3: Regex = Regex::new(r"^\d{1,3}\.\d{1,2}\.\d{1,2}\.?\s+\S").unwrap();
    static ref NUMBERED_L2: Regex = Regex::new(r"^\d{1,3}\.\d{1,2}\.?\s+\S").unwrap();
    static ref NUMBERED_L1: Regex = Regex::new(r"^\d{1,3}\.\s+\S").unwrap();
    static ref ROMAN: Regex = Regex::new(r"^[IVXLC]+\.\s+\S").unwrap();
    static ref DIVISION: Regex =
        Regex::new(r"(?i)^(chapter|part|section)\s+(\d+|[ivxlc]+)\b").unwrap();
    static ref APPENDIX: Regex = Regex::new(r"(?i)^appendix\s+[a-z0-9]\b").unwrap();
    static ref LETTER: Regex = Regex::new(r"^[A-Z]\.\s+\S").unwrap();
}

/// Numbering patterns in the order they are tried, with their level.
fn patterns() -> [(&'static Regex, u8); 6] {
    [
        (&*NUMBERED_L3, 3),
        (&*NUMBERED_L2, 2),
        (&*NUMBERED_L1, 1),
        (&*ROMAN, 1),
        (&*DIVISION, 1),
        (&*APPENDIX, 1),
    ]
}

/// Level implied by explicit numbering such as `1.`, `1.1` or `Chapter 2`.
pub fn pattern_level(text: &str) -> Option<u8> {
    patterns()
        .into_iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, level)| level)
}

/// Lettered section such as `A. Scope of Work`.
///
/// The letter says nothing about depth, so it admits a candidate without
/// implying a level.
pub fn is_letter_section(text: &str) -> bool {
    LETTER.is_match(text)
}

/// Kind of evidence a vote carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Signal {
    Pattern,
    Size,
    Letter,
    Weight,
    Position,
}

/// One evaluator's opinion on a fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vote {
    pub signal: Signal,
    /// Suggested level (1..=3), if the signal implies one
    pub level: Option<u8>,
    pub confidence: f32,
}

/// Everything an evaluator may look at.
#[derive(Debug, Clone, Copy)]
pub struct SignalInput<'a> {
    pub fragment: &'a TextFragment,
    /// Trimmed, whitespace-collapsed text
    pub text: &'a str,
    pub profile: &'a FontProfile,
    pub config: &'a OutlineConfig,
    /// Distance to the nearest line above on the same page; `None` for the
    /// first line of a page
    pub gap_above: Option<f32>,
    /// Whether no other fragment shares this fragment's line
    pub alone_on_line: bool,
    /// Median gap between consecutive lines across the document
    pub median_gap: f32,
    pub page_height: f32,
}

/// A named signal evaluator.
pub struct SignalEvaluator {
    pub name: &'static str,
    pub evaluate: fn(&SignalInput<'_>) -> Option<Vote>,
}

/// All evaluators, in precedence order.
pub const EVALUATORS: [SignalEvaluator; 5] = [
    SignalEvaluator {
        name: "pattern",
        evaluate: pattern_signal,
    },
    SignalEvaluator {
        name: "size",
        evaluate: size_signal,
    },
    SignalEvaluator {
        name: "letter",
        evaluate: letter_signal,
    },
    SignalEvaluator {
        name: "weight",
        evaluate: weight_signal,
    },
    SignalEvaluator {
        name: "position",
        evaluate: position_signal,
    },
];

/// Run every evaluator over one fragment.
pub fn collect_votes(input: &SignalInput<'_>) -> Vec<Vote> {
    EVALUATORS
        .iter()
        .filter_map(|evaluator| {
            let vote = (evaluator.evaluate)(input);
            if let Some(vote) = &vote {
                log::trace!(
                    "{} vote for {:?}: level {:?}",
                    evaluator.name,
                    input.text,
                    vote.level
                );
            }
            vote
        })
        .collect()
}

fn pattern_signal(input: &SignalInput<'_>) -> Option<Vote> {
    pattern_level(input.text).map(|level| Vote {
        signal: Signal::Pattern,
        level: Some(level),
        confidence: 1.0,
    })
}

fn size_signal(input: &SignalInput<'_>) -> Option<Vote> {
    let size = input.fragment.font_size;
    if !input.profile.is_above_body(size, input.config.size_tolerance) {
        return None;
    }
    let rank = input.profile.size_rank(size)?;
    if rank >= MAX_HEADING_LEVELS as usize {
        return None;
    }

    let mut confidence = 0.8;
    if input.profile.is_degenerate(input.config.min_distinct_sizes) {
        confidence *= input.config.degenerate_size_weight;
    }
    Some(Vote {
        signal: Signal::Size,
        level: Some(rank as u8 + 1),
        confidence,
    })
}

fn letter_signal(input: &SignalInput<'_>) -> Option<Vote> {
    (pattern_level(input.text).is_none() && is_letter_section(input.text)).then_some(Vote {
        signal: Signal::Letter,
        level: None,
        confidence: 0.6,
    })
}

fn weight_signal(input: &SignalInput<'_>) -> Option<Vote> {
    let fragment = input.fragment;
    (fragment.is_bold
        && input
            .profile
            .is_body_size(fragment.font_size, input.config.size_tolerance))
    .then_some(Vote {
        signal: Signal::Weight,
        level: Some(MAX_HEADING_LEVELS),
        confidence: 0.3,
    })
}

fn position_signal(input: &SignalInput<'_>) -> Option<Vote> {
    // A run-in lead such as a bold "Note:" shares its line with body text
    if !input.alone_on_line {
        return None;
    }
    let isolated = match input.gap_above {
        None => true,
        Some(gap) => {
            input.median_gap > 0.0 && gap > input.config.isolation_gap_factor * input.median_gap
        }
    };
    if !isolated {
        return None;
    }

    let upper = input.fragment.y <= input.page_height * input.config.upper_page_fraction;
    Some(Vote {
        signal: Signal::Position,
        level: None,
        confidence: if upper { 0.4 } else { 0.3 },
    })
}

/// Which signal admitted a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignalBasis {
    Pattern,
    Size,
    Letter,
    WeightPosition,
}

impl SignalBasis {
    /// Weak candidates give way to nearby pattern or size headings.
    pub fn is_weak(self) -> bool {
        self == SignalBasis::WeightPosition
    }
}

/// Outcome of combining a fragment's votes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub basis: SignalBasis,
    /// Provisional level (1..=3)
    pub level: u8,
    /// Sum of vote confidences, capped at 1
    pub confidence: f32,
    pub signals: Vec<Signal>,
}

/// Apply the precedence rule; `None` when no strong signal fired.
pub fn combine(votes: &[Vote]) -> Option<Verdict> {
    let find = |signal: Signal| votes.iter().find(|v| v.signal == signal);

    let (basis, level) = if let Some(vote) = find(Signal::Pattern) {
        (SignalBasis::Pattern, vote.level?)
    } else if let Some(vote) = find(Signal::Size) {
        (SignalBasis::Size, vote.level?)
    } else if find(Signal::Letter).is_some() {
        (SignalBasis::Letter, MAX_HEADING_LEVELS)
    } else if find(Signal::Weight).is_some() && find(Signal::Position).is_some() {
        (SignalBasis::WeightPosition, MAX_HEADING_LEVELS)
    } else {
        return None;
    };

    Some(Verdict {
        basis,
        level,
        confidence: votes.iter().map(|v| v.confidence).sum::<f32>().min(1.0),
        signals: votes.iter().map(|v| v.signal).collect(),
    })
}
