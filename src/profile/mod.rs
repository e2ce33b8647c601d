//! Pattern frequency profiles.
//!
//! A [`FrequencyProfile`] counts structurally distinct patterns found in
//! one program. Profiles are compared as probability vectors, each divided
//! by its own total, so programs of different sizes are comparable.

pub mod distance;

pub use distance::{
    frequency_distance, frequency_distance_squared, ngram_distance, Verdict, DEFAULT_THRESHOLD,
};

use crate::error::{Result, StylometryError};
use crate::patterns::{InstructionPattern, NGramRange};
use std::collections::HashMap;

/// Occurrence counts of patterns, keyed by structural equality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyProfile {
    counts: HashMap<InstructionPattern, usize>,
    total: usize,
}

impl FrequencyProfile {
    /// Create an empty profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `pattern`.
    pub fn add(&mut self, pattern: &InstructionPattern) {
        if let Some(count) = self.counts.get_mut(pattern) {
            *count += 1;
        } else {
            self.counts.insert(pattern.clone(), 1);
        }
        self.total += 1;
    }

    /// Occurrences of `pattern`.
    pub fn count(&self, pattern: &InstructionPattern) -> usize {
        self.counts.get(pattern).copied().unwrap_or(0)
    }

    /// Share of all occurrences taken by `pattern`. Zero for an empty profile.
    pub fn probability(&self, pattern: &InstructionPattern) -> f64 {
        self.share(self.count(pattern))
    }

    pub(crate) fn share(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64
        }
    }

    /// Total occurrences recorded.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct patterns.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Iterate over `(pattern, count)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&InstructionPattern, usize)> {
        self.counts.iter().map(|(p, &c)| (p, c))
    }

    /// The `limit` most frequent patterns, most frequent first.
    ///
    /// Ties are broken by pattern order so the result is deterministic.
    pub fn most_common(&self, limit: usize) -> Vec<(&InstructionPattern, usize)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(limit);
        entries
    }
}

impl<'a> FromIterator<&'a InstructionPattern> for FrequencyProfile {
    fn from_iter<I: IntoIterator<Item = &'a InstructionPattern>>(iter: I) -> Self {
        let mut profile = FrequencyProfile::new();
        for pattern in iter {
            profile.add(pattern);
        }
        profile
    }
}

impl FromIterator<InstructionPattern> for FrequencyProfile {
    fn from_iter<I: IntoIterator<Item = InstructionPattern>>(iter: I) -> Self {
        let mut profile = FrequencyProfile::new();
        for pattern in iter {
            *profile.counts.entry(pattern).or_insert(0) += 1;
            profile.total += 1;
        }
        profile
    }
}

/// One frequency profile per n-gram window length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NGramProfile {
    range: NGramRange,
    profiles: Vec<FrequencyProfile>,
}

impl NGramProfile {
    /// Assemble from profiles ordered by window length, starting at `range.min()`.
    pub fn new(range: NGramRange, profiles: Vec<FrequencyProfile>) -> Result<Self> {
        if profiles.len() != range.len() {
            return Err(StylometryError::ConfigError {
                message: format!(
                    "n-gram profile for {range} needs {} window lengths, got {}",
                    range.len(),
                    profiles.len()
                ),
            });
        }
        Ok(Self { range, profiles })
    }

    /// Assemble without the length check; callers build one profile per length.
    pub(crate) fn from_aligned(range: NGramRange, profiles: Vec<FrequencyProfile>) -> Self {
        debug_assert_eq!(profiles.len(), range.len());
        Self { range, profiles }
    }

    /// Window lengths covered.
    pub fn range(&self) -> NGramRange {
        self.range
    }

    /// Profile for window length `n`.
    pub fn get(&self, n: usize) -> Option<&FrequencyProfile> {
        n.checked_sub(self.range.min())
            .and_then(|i| self.profiles.get(i))
    }

    /// Profiles in window-length order.
    pub fn profiles(&self) -> &[FrequencyProfile] {
        &self.profiles
    }

    /// Iterate over `(n, profile)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &FrequencyProfile)> {
        self.range.iter().zip(self.profiles.iter())
    }
}

/// A program's profile under one pattern source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramProfile {
    /// Dictionary tokenization
    Dictionary(FrequencyProfile),
    /// Automatic n-gram windows
    NGram(NGramProfile),
}

impl ProgramProfile {
    /// Distance to another profile built from the same pattern source.
    pub fn distance(&self, other: &ProgramProfile) -> Result<f64> {
        match (self, other) {
            (ProgramProfile::Dictionary(a), ProgramProfile::Dictionary(b)) => {
                Ok(frequency_distance(a, b))
            }
            (ProgramProfile::NGram(a), ProgramProfile::NGram(b)) if a.range == b.range => {
                Ok(ngram_distance(&a.profiles, &b.profiles))
            }
            _ => Err(StylometryError::ConfigError {
                message: "cannot compare profiles built from different pattern sources".into(),
            }),
        }
    }

    /// Total pattern occurrences across all contained profiles.
    pub fn total(&self) -> usize {
        match self {
            ProgramProfile::Dictionary(p) => p.total(),
            ProgramProfile::NGram(p) => p.profiles.iter().map(FrequencyProfile::total).sum(),
        }
    }

    /// Distinct patterns across all contained profiles.
    pub fn distinct(&self) -> usize {
        match self {
            ProgramProfile::Dictionary(p) => p.distinct(),
            ProgramProfile::NGram(p) => p.profiles.iter().map(FrequencyProfile::distinct).sum(),
        }
    }
}
