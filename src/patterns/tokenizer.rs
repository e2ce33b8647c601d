//! Greedy dictionary tokenization.

use super::{Bindings, Dictionary, InstructionPattern};
use crate::decoder::BinaryInstruction;
use crate::opcodes::{OpcodeId, OpcodeTable};
use crate::profile::FrequencyProfile;
use tracing::trace;

/// Outcome of tokenizing one instruction stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokenization {
    /// Matched dictionary patterns
    pub profile: FrequencyProfile,
    /// Instructions consumed by some pattern
    pub covered: usize,
    /// Instructions no pattern started at
    pub skipped: usize,
}

/// Tokenize `stream` with `dictionary`, left to right.
///
/// At each position the first dictionary pattern (in dictionary order)
/// that matches is recorded and the scan jumps past it. Where nothing
/// matches, the instruction is skipped and contributes to no pattern.
pub fn tokenize(
    stream: &[BinaryInstruction],
    dictionary: &Dictionary,
    opcodes: &OpcodeTable,
) -> Tokenization {
    let ids: Vec<Option<OpcodeId>> = stream.iter().map(|i| opcodes.lookup(&i.opcode)).collect();
    let mut bindings = Bindings::default();
    let mut result = Tokenization::default();
    let mut position = 0;

    while position < stream.len() {
        let matched = dictionary
            .iter()
            .find(|pattern| matches_here(pattern, stream, &ids, position, &mut bindings));

        match matched {
            Some(pattern) => {
                trace!(position, pattern = %pattern, "dictionary match");
                result.profile.add(pattern);
                result.covered += pattern.len();
                position += pattern.len();
            }
            None => {
                result.skipped += 1;
                position += 1;
            }
        }
    }

    result
}

fn matches_here<'a>(
    pattern: &InstructionPattern,
    stream: &'a [BinaryInstruction],
    ids: &[Option<OpcodeId>],
    position: usize,
    bindings: &mut Bindings<'a>,
) -> bool {
    let end = position + pattern.len();
    !pattern.is_empty()
        && end <= stream.len()
        && pattern.matches_window(&stream[position..end], &ids[position..end], bindings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::FormatTable;
    use pretty_assertions::assert_eq;

    fn decode(table: &FormatTable, bits: &str) -> Vec<BinaryInstruction> {
        table
            .decode_bits(bits.chars().filter(|c| !c.is_whitespace()).map(|c| c == '1'))
            .instructions
    }

    #[test]
    fn test_single_pattern_counted_twice() {
        let table = FormatTable::parse("000aa").unwrap();
        let opcodes = OpcodeTable::new();
        let dict = Dictionary::parse("000xx", &table, &opcodes).unwrap();
        let stream = decode(&table, "00011 00010");

        assert_eq!(opcodes.lookup(&stream[0].opcode), Some(0));
        assert_eq!(opcodes.lookup(&stream[1].opcode), Some(0));

        let result = tokenize(&stream, &dict, &opcodes);
        assert_eq!(result.profile.distinct(), 1);
        assert_eq!(result.profile.total(), 2);
        assert_eq!(result.profile.count(&dict.patterns()[0]), 2);
        assert_eq!(result.covered, 2);
        assert_eq!(result.skipped, 0);
    }

    #[test]
    fn test_first_dictionary_pattern_wins() {
        let table = FormatTable::parse("0aa\n1aa").unwrap();
        let opcodes = OpcodeTable::new();
        // Pair pattern listed first takes precedence over the single.
        let dict = Dictionary::parse("0xx\n1xx\n\n0yy", &table, &opcodes).unwrap();
        let stream = decode(&table, "001 101 001 010");

        let result = tokenize(&stream, &dict, &opcodes);
        assert_eq!(result.profile.count(&dict.patterns()[0]), 1);
        assert_eq!(result.profile.count(&dict.patterns()[1]), 2);
        assert_eq!(result.covered, 4);
    }

    #[test]
    fn test_unmatched_instructions_are_skipped() {
        let table = FormatTable::parse("0aa\n1aa").unwrap();
        let opcodes = OpcodeTable::new();
        let dict = Dictionary::parse("0xx\n0xx", &table, &opcodes).unwrap();
        // Second pair has differing arguments; the last opcode is never listed.
        let stream = decode(&table, "011 011 001 010 100");

        let result = tokenize(&stream, &dict, &opcodes);
        assert_eq!(result.profile.total(), 1);
        assert_eq!(result.covered, 2);
        assert_eq!(result.skipped, 3);
    }

    #[test]
    fn test_empty_patterns_are_ignored() {
        let table = FormatTable::parse("0aa").unwrap();
        let opcodes = OpcodeTable::new();
        let dict = Dictionary::new(vec![InstructionPattern::default()]);
        let stream = decode(&table, "001 001");

        let result = tokenize(&stream, &dict, &opcodes);
        assert!(result.profile.is_empty());
        assert_eq!(result.skipped, 2);
    }
}
