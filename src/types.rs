//! Core types for stylometric analysis.
//!
//! This module defines the run configuration ([`AnalysisOptions`]) and the
//! per-program summary reported alongside verdicts.

use crate::patterns::NGramRange;
use crate::profile::DEFAULT_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where patterns come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternSource {
    /// Patterns listed in a dictionary file, matched greedily
    Dictionary,
    /// Every contiguous window over a range of lengths
    #[serde(rename = "ngram")]
    NGram(NGramRange),
}

impl PatternSource {
    /// Short name used in reports.
    pub fn name(&self) -> &'static str {
        match self {
            PatternSource::Dictionary => "dictionary",
            PatternSource::NGram(_) => "ngram",
        }
    }
}

impl fmt::Display for PatternSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternSource::Dictionary => f.write_str("dictionary"),
            PatternSource::NGram(range) => write!(f, "ngram {range}"),
        }
    }
}

/// Options for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Pattern source used to build profiles
    pub source: PatternSource,
    /// Distances below this are reported as the same author
    pub threshold: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisOptions {
    /// Create options with default settings (dictionary mode).
    pub fn new() -> Self {
        Self::dictionary()
    }

    /// Options for dictionary tokenization.
    pub fn dictionary() -> Self {
        Self {
            source: PatternSource::Dictionary,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Options for n-gram profiling over `range`.
    pub fn ngram(range: NGramRange) -> Self {
        Self {
            source: PatternSource::NGram(range),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Replace the verdict threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}

/// What profiling found in one program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSummary {
    /// Program name as given on input
    pub name: String,
    /// Bits read from the input
    pub total_bits: usize,
    /// Trailing bits that completed no instruction
    pub discarded_bits: usize,
    /// Instructions decoded
    pub instructions: usize,
    /// Pattern occurrences recorded, over all window lengths in n-gram mode
    pub occurrences: usize,
    /// Distinct patterns recorded, over all window lengths in n-gram mode
    pub distinct_patterns: usize,
    /// Instructions consumed by dictionary matches (dictionary mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub covered: Option<usize>,
}

impl ProgramSummary {
    /// Share of decoded instructions covered by dictionary matches.
    pub fn coverage(&self) -> Option<f64> {
        let covered = self.covered?;
        if self.instructions == 0 {
            Some(0.0)
        } else {
            Some(covered as f64 / self.instructions as f64)
        }
    }
}
