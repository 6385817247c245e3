//! Document-wide font-size statistics.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::TextFragment;

/// Histogram key for a font size, rounded to 0.1pt.
pub fn size_key(size: f32) -> i32 {
    (size * 10.0).round() as i32
}

fn key_size(key: i32) -> f32 {
    key as f32 / 10.0
}

/// Font statistics for heading detection.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FontProfile {
    /// All observed font sizes (keyed by [`size_key`]) with frequency
    pub size_histogram: BTreeMap<i32, usize>,
    /// Body text font size (most common), 0 for an empty document
    pub body_size: f32,
    /// Distinct sizes, largest first
    pub distinct_sizes_desc: Vec<f32>,
}

impl FontProfile {
    /// Build the profile from every readable, non-blank fragment.
    pub fn from_fragments<'a, I>(fragments: I) -> Self
    where
        I: IntoIterator<Item = &'a TextFragment>,
    {
        let mut profile = Self::default();
        for fragment in fragments {
            if !fragment.is_blank() && !fragment.is_malformed() {
                profile.add_size(fragment.font_size);
            }
        }
        profile.analyze();
        profile
    }

    /// Add a font size observation.
    pub fn add_size(&mut self, size: f32) {
        if size.is_finite() && size > 0.0 {
            *self.size_histogram.entry(size_key(size)).or_insert(0) += 1;
        }
    }

    /// Calculate body size and the ranked size list.
    pub fn analyze(&mut self) {
        // Ascending key order plus a strict `>` keeps the smaller size on ties
        let mut body: Option<(i32, usize)> = None;
        for (&key, &count) in &self.size_histogram {
            if body.map(|(_, best)| count > best).unwrap_or(true) {
                body = Some((key, count));
            }
        }
        self.body_size = body.map(|(key, _)| key_size(key)).unwrap_or(0.0);
        self.distinct_sizes_desc = self
            .size_histogram
            .keys()
            .rev()
            .map(|&k| key_size(k))
            .collect();
    }

    /// Check if no sizes were observed.
    pub fn is_empty(&self) -> bool {
        self.size_histogram.is_empty()
    }

    /// Number of distinct sizes.
    pub fn distinct_count(&self) -> usize {
        self.distinct_sizes_desc.len()
    }

    /// Too few distinct sizes for size to say much about structure.
    pub fn is_degenerate(&self, min_distinct_sizes: usize) -> bool {
        self.distinct_count() < min_distinct_sizes
    }

    /// 0-based position of `size` among the distinct sizes, largest first.
    pub fn size_rank(&self, size: f32) -> Option<usize> {
        let key = size_key(size);
        self.distinct_sizes_desc
            .iter()
            .position(|&s| size_key(s) == key)
    }

    /// Whether `size` is larger than the body size by more than `tolerance`.
    pub fn is_above_body(&self, size: f32, tolerance: f32) -> bool {
        !self.is_empty() && size > self.body_size + tolerance
    }

    /// Whether `size` matches the body size within `tolerance`.
    pub fn is_body_size(&self, size: f32, tolerance: f32) -> bool {
        !self.is_empty() && (size - self.body_size).abs() <= tolerance
    }

    /// Number of fragments seen at `size`.
    pub fn count(&self, size: f32) -> usize {
        self.size_histogram
            .get(&size_key(size))
            .copied()
            .unwrap_or(0)
    }
}
