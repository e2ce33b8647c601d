//! Frequency distance and authorship verdicts.

use super::FrequencyProfile;
use serde::{Deserialize, Serialize};

/// Distances below this value are reported as the same author.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Squared Euclidean distance between two profiles' probability vectors.
///
/// Keys present in only one profile contribute their own squared
/// probability. Terms are summed in sorted order, which makes the result
/// independent of argument order and map iteration order.
pub fn frequency_distance_squared(a: &FrequencyProfile, b: &FrequencyProfile) -> f64 {
    let mut terms: Vec<f64> = Vec::with_capacity(a.distinct() + b.distinct());

    for (pattern, count) in a.iter() {
        let diff = a.share(count) - b.probability(pattern);
        terms.push(diff * diff);
    }
    for (pattern, count) in b.iter() {
        if a.count(pattern) == 0 {
            let p = b.share(count);
            terms.push(p * p);
        }
    }

    terms.sort_by(f64::total_cmp);
    terms.iter().sum()
}

/// Euclidean distance between two profiles (dictionary mode metric).
pub fn frequency_distance(a: &FrequencyProfile, b: &FrequencyProfile) -> f64 {
    frequency_distance_squared(a, b).sqrt()
}

/// Aggregate distance over aligned per-window-length profiles (n-gram mode).
///
/// Squared distances are summed across window lengths, square-rooted once,
/// then divided by the number of window lengths.
pub fn ngram_distance(a: &[FrequencyProfile], b: &[FrequencyProfile]) -> f64 {
    let count = a.len().min(b.len());
    if count == 0 {
        return 0.0;
    }
    let total: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| frequency_distance_squared(x, y))
        .sum();
    total.sqrt() / count as f64
}

/// Same-author decision for one pair of programs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the programs look like work of the same author
    pub same_author: bool,
    /// Distance the decision was made from
    pub distance: f64,
    /// Confidence in the decision, in percent (0 - 100)
    pub probability: f64,
}

impl Verdict {
    /// Decide from a distance with the default threshold.
    pub fn from_distance(distance: f64) -> Self {
        Self::with_threshold(distance, DEFAULT_THRESHOLD)
    }

    /// Decide from a distance: below `threshold` means same author with
    /// confidence `100 * (1 - distance)`, otherwise different authors with
    /// confidence `100 * distance`. Confidence is clamped to 0..=100.
    pub fn with_threshold(distance: f64, threshold: f64) -> Self {
        let same_author = distance < threshold;
        let raw = if same_author {
            100.0 * (1.0 - distance)
        } else {
            100.0 * distance
        };
        Self {
            same_author,
            distance,
            probability: raw.clamp(0.0, 100.0),
        }
    }
}
