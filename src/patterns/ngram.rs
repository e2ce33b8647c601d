//! Automatic n-gram patterns.
//!
//! Every contiguous window of `n` instructions becomes a pattern. Opcodes
//! are canonicalized through the shared [`OpcodeTable`]; arguments are
//! renumbered per window in first-seen order, with bit-identical arguments
//! sharing a slot.

use super::{InstructionPattern, SimplifiedInstruction};
use crate::bits::BitSequence;
use crate::decoder::BinaryInstruction;
use crate::error::{Result, StylometryError};
use crate::opcodes::{OpcodeId, OpcodeTable};
use crate::profile::{FrequencyProfile, NGramProfile};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;

/// Inclusive range of n-gram window lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawNGramRange")]
pub struct NGramRange {
    min: usize,
    max: usize,
}

/// Unchecked bounds as they appear in serialized form.
#[derive(Deserialize)]
struct RawNGramRange {
    min: usize,
    max: usize,
}

impl TryFrom<RawNGramRange> for NGramRange {
    type Error = StylometryError;

    fn try_from(raw: RawNGramRange) -> Result<Self> {
        NGramRange::new(raw.min, raw.max)
    }
}

impl NGramRange {
    /// Default shortest window.
    pub const DEFAULT_MIN: usize = 3;
    /// Default longest window.
    pub const DEFAULT_MAX: usize = 12;

    /// Create a range; both bounds must be at least 1 and `min <= max`.
    pub fn new(min: usize, max: usize) -> Result<Self> {
        if min == 0 || min > max {
            return Err(StylometryError::InvalidNGramRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Shortest window length.
    pub fn min(&self) -> usize {
        self.min
    }

    /// Longest window length.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Number of window lengths.
    pub fn len(&self) -> usize {
        self.max - self.min + 1
    }

    /// Always false: a valid range holds at least one length.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Window lengths in increasing order.
    pub fn iter(&self) -> RangeInclusive<usize> {
        self.min..=self.max
    }
}

impl Default for NGramRange {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

impl fmt::Display for NGramRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

/// Build the pattern for one window, interning its opcodes.
pub fn window_pattern(window: &[BinaryInstruction], opcodes: &OpcodeTable) -> InstructionPattern {
    let ids: Vec<OpcodeId> = window.iter().map(|i| opcodes.intern(&i.opcode)).collect();
    build_pattern(window, &ids)
}

fn build_pattern(window: &[BinaryInstruction], ids: &[OpcodeId]) -> InstructionPattern {
    let mut slots_by_value: HashMap<&BitSequence, usize> = HashMap::new();
    let mut instructions = Vec::with_capacity(window.len());

    for (insn, &opcode) in window.iter().zip(ids) {
        let mut slots = Vec::with_capacity(insn.arguments.len());
        for argument in &insn.arguments {
            let next = slots_by_value.len();
            slots.push(*slots_by_value.entry(argument).or_insert(next));
        }
        instructions.push(SimplifiedInstruction::new(opcode, slots));
    }

    InstructionPattern::new(instructions)
}

/// Profile of all windows of length `n`. Empty when `n` is 0 or longer
/// than the stream.
pub fn ngram_profile(
    stream: &[BinaryInstruction],
    n: usize,
    opcodes: &OpcodeTable,
) -> FrequencyProfile {
    let ids: Vec<OpcodeId> = stream.iter().map(|i| opcodes.intern(&i.opcode)).collect();
    profile_with_ids(stream, &ids, n)
}

fn profile_with_ids(stream: &[BinaryInstruction], ids: &[OpcodeId], n: usize) -> FrequencyProfile {
    if n == 0 || n > stream.len() {
        return FrequencyProfile::new();
    }
    stream
        .windows(n)
        .zip(ids.windows(n))
        .map(|(window, window_ids)| build_pattern(window, window_ids))
        .collect()
}

/// One profile per window length in `range`.
pub fn ngram_profiles(
    stream: &[BinaryInstruction],
    range: NGramRange,
    opcodes: &OpcodeTable,
) -> NGramProfile {
    let ids: Vec<OpcodeId> = stream.iter().map(|i| opcodes.intern(&i.opcode)).collect();
    let profiles = range
        .iter()
        .map(|n| profile_with_ids(stream, &ids, n))
        .collect();
    NGramProfile::from_aligned(range, profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bits(s: &str) -> BitSequence {
        s.parse().unwrap()
    }

    fn insn(opcode: &str, args: &[&str]) -> BinaryInstruction {
        BinaryInstruction {
            opcode: bits(opcode),
            arguments: args.iter().map(|a| bits(a)).collect(),
        }
    }

    #[test]
    fn test_range_validation() {
        assert!(NGramRange::new(0, 3).is_err());
        assert!(NGramRange::new(4, 3).is_err());
        let range = NGramRange::new(2, 2).unwrap();
        assert_eq!(range.len(), 1);
        assert_eq!(NGramRange::default().len(), 10);
        assert_eq!(NGramRange::default().to_string(), "3..=12");
    }

    #[test]
    fn test_deserialization_is_validated() {
        let range: NGramRange = serde_json::from_str(r#"{"min":2,"max":5}"#).unwrap();
        assert_eq!(range.len(), 4);
        assert!(serde_json::from_str::<NGramRange>(r#"{"min":5,"max":2}"#).is_err());
        assert!(serde_json::from_str::<NGramRange>(r#"{"min":0,"max":2}"#).is_err());
    }

    #[test]
    fn test_window_arguments_numbered_by_value() {
        let opcodes = OpcodeTable::new();
        let window = vec![
            insn("00", &["101", "11"]),
            insn("01", &["11", "0"]),
            insn("00", &["101"]),
        ];
        let pattern = window_pattern(&window, &opcodes);
        assert_eq!(
            pattern.instructions(),
            &[
                SimplifiedInstruction::new(0, vec![0, 1]),
                SimplifiedInstruction::new(1, vec![1, 2]),
                SimplifiedInstruction::new(0, vec![0]),
            ]
        );
    }

    #[test]
    fn test_numbering_is_local_to_each_window() {
        let opcodes = OpcodeTable::new();
        let stream = vec![
            insn("1", &["00"]),
            insn("1", &["01"]),
            insn("1", &["01"]),
        ];
        let profile = ngram_profile(&stream, 2, &opcodes);
        // "00,01" and "01,01" windows have different shapes.
        assert_eq!(profile.total(), 2);
        assert_eq!(profile.distinct(), 2);
        let repeated = InstructionPattern::new(vec![
            SimplifiedInstruction::new(0, vec![0]),
            SimplifiedInstruction::new(0, vec![0]),
        ]);
        assert_eq!(profile.count(&repeated), 1);
    }

    #[test]
    fn test_same_shape_windows_share_a_key() {
        let opcodes = OpcodeTable::new();
        let stream = vec![
            insn("1", &["00"]),
            insn("1", &["01"]),
            insn("1", &["10"]),
            insn("1", &["11"]),
        ];
        let profile = ngram_profile(&stream, 2, &opcodes);
        assert_eq!(profile.total(), 3);
        assert_eq!(profile.distinct(), 1);
    }

    #[test]
    fn test_short_streams_give_empty_profiles() {
        let opcodes = OpcodeTable::new();
        let stream = vec![insn("1", &[]), insn("0", &[])];
        let range = NGramRange::new(1, 4).unwrap();
        let profiles = ngram_profiles(&stream, range, &opcodes);
        let totals: Vec<usize> = profiles.profiles().iter().map(FrequencyProfile::total).collect();
        assert_eq!(totals, vec![2, 1, 0, 0]);
        assert!(ngram_profile(&stream, 0, &opcodes).is_empty());
    }
}
