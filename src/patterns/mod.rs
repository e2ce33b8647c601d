//! Structural instruction patterns and unification matching.
//!
//! A pattern is a short sequence of [`SimplifiedInstruction`]s: a canonical
//! opcode id plus one slot index per argument. Slot indices are symbolic;
//! wherever the same index appears twice in a pattern, the matched stream
//! must carry bit-identical arguments at both places.
//!
//! Matching is single-pass: slots bind in instruction order, then argument
//! order, and the first binding of a slot is final. There is no
//! backtracking.

pub mod dictionary;
pub mod ngram;
pub mod tokenizer;

pub use dictionary::Dictionary;
pub use ngram::{ngram_profile, ngram_profiles, window_pattern, NGramRange};
pub use tokenizer::{tokenize, Tokenization};

use crate::bits::BitSequence;
use crate::decoder::BinaryInstruction;
use crate::opcodes::{OpcodeId, OpcodeTable};
use std::fmt;

/// Opcode id plus argument slot indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimplifiedInstruction {
    /// Canonical opcode id
    pub opcode: OpcodeId,
    /// Slot index per argument, in argument order
    pub slots: Vec<usize>,
}

impl SimplifiedInstruction {
    /// Create an instruction with the given opcode and slots.
    pub fn new(opcode: OpcodeId, slots: Vec<usize>) -> Self {
        Self { opcode, slots }
    }
}

/// A sequence of simplified instructions, compared structurally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstructionPattern {
    instructions: Vec<SimplifiedInstruction>,
    slot_count: usize,
}

impl InstructionPattern {
    /// Create a pattern from its instructions.
    pub fn new(instructions: Vec<SimplifiedInstruction>) -> Self {
        let slot_count = instructions
            .iter()
            .flat_map(|i| i.slots.iter())
            .max()
            .map_or(0, |&max| max + 1);
        Self {
            instructions,
            slot_count,
        }
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether the pattern has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// The pattern's instructions.
    pub fn instructions(&self) -> &[SimplifiedInstruction] {
        &self.instructions
    }

    /// One past the largest slot index used.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Whether the pattern matches `stream` starting at `start`.
    ///
    /// Fails if fewer than `self.len()` instructions remain, if a stream
    /// opcode was never registered in `opcodes` or differs from the
    /// pattern's, if argument counts differ, or if a repeated slot would
    /// bind to two different values.
    pub fn matches_at(
        &self,
        stream: &[BinaryInstruction],
        start: usize,
        opcodes: &OpcodeTable,
    ) -> bool {
        let Some(window) = stream.get(start..start.saturating_add(self.len())) else {
            return false;
        };
        let ids: Vec<Option<OpcodeId>> = window.iter().map(|i| opcodes.lookup(&i.opcode)).collect();
        self.matches_window(window, &ids, &mut Bindings::default())
    }

    /// Match against a window whose opcodes are already resolved.
    ///
    /// `window` and `ids` must both have exactly `self.len()` entries.
    /// `bindings` is cleared first, so one buffer can serve many attempts.
    pub(crate) fn matches_window<'a>(
        &self,
        window: &'a [BinaryInstruction],
        ids: &[Option<OpcodeId>],
        bindings: &mut Bindings<'a>,
    ) -> bool {
        if window.len() != self.len() || ids.len() != self.len() {
            return false;
        }

        bindings.reset(self.slot_count);
        for ((expected, actual), id) in self.instructions.iter().zip(window).zip(ids) {
            if *id != Some(expected.opcode) || expected.slots.len() != actual.arguments.len() {
                return false;
            }
            for (&slot, argument) in expected.slots.iter().zip(&actual.arguments) {
                if !bindings.unify(slot, argument) {
                    return false;
                }
            }
        }
        true
    }
}

impl fmt::Display for InstructionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, insn) in self.instructions.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "op{}(", insn.opcode)?;
            for (j, slot) in insn.slots.iter().enumerate() {
                if j > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "${slot}")?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// Slot bindings for one match attempt.
#[derive(Debug, Clone, Default)]
pub struct Bindings<'a> {
    slots: Vec<Option<&'a BitSequence>>,
}

impl<'a> Bindings<'a> {
    /// Create bindings with `slot_count` unbound slots.
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![None; slot_count],
        }
    }

    /// Unbind everything and size for `slot_count` slots, keeping the allocation.
    pub fn reset(&mut self, slot_count: usize) {
        self.slots.clear();
        self.slots.resize(slot_count, None);
    }

    /// Bind `slot` to `value`, or check it against the existing binding.
    ///
    /// Returns false only when the slot is already bound to a different value.
    pub fn unify(&mut self, slot: usize, value: &'a BitSequence) -> bool {
        if slot >= self.slots.len() {
            self.slots.resize(slot + 1, None);
        }
        match self.slots[slot] {
            Some(bound) => bound == value,
            None => {
                self.slots[slot] = Some(value);
                true
            }
        }
    }

    /// Current binding of `slot`.
    pub fn get(&self, slot: usize) -> Option<&'a BitSequence> {
        self.slots.get(slot).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> BitSequence {
        s.parse().unwrap()
    }

    fn insn(opcode: &str, args: &[&str]) -> BinaryInstruction {
        BinaryInstruction {
            opcode: bits(opcode),
            arguments: args.iter().map(|a| bits(a)).collect(),
        }
    }

    /// Two instructions with opcode "01" sharing slot 0.
    fn shared_slot_pattern(opcodes: &OpcodeTable) -> InstructionPattern {
        let op = opcodes.intern(&bits("01"));
        InstructionPattern::new(vec![
            SimplifiedInstruction::new(op, vec![0, 1]),
            SimplifiedInstruction::new(op, vec![2, 0]),
        ])
    }

    #[test]
    fn test_unification_accepts_identical_arguments() {
        let opcodes = OpcodeTable::new();
        let pattern = shared_slot_pattern(&opcodes);
        for width in [1usize, 3, 8, 17] {
            let a: String = "10".repeat(width).chars().take(width).collect();
            let b: String = "1".repeat(width);
            let stream = vec![insn("01", &[&a, &b]), insn("01", &[&b, &a])];
            assert!(pattern.matches_at(&stream, 0, &opcodes), "width {width}");
        }
    }

    #[test]
    fn test_unification_rejects_differing_arguments() {
        let opcodes = OpcodeTable::new();
        let pattern = shared_slot_pattern(&opcodes);
        for width in [1usize, 4, 9] {
            let a = "0".repeat(width);
            let mut c = "0".repeat(width - 1);
            c.push('1');
            let stream = vec![insn("01", &[&a, &a]), insn("01", &[&a, &c])];
            assert!(!pattern.matches_at(&stream, 0, &opcodes), "width {width}");
        }
    }

    #[test]
    fn test_distinct_slots_may_bind_equal_values() {
        let opcodes = OpcodeTable::new();
        let pattern = shared_slot_pattern(&opcodes);
        let stream = vec![insn("01", &["11", "11"]), insn("01", &["11", "11"])];
        assert!(pattern.matches_at(&stream, 0, &opcodes));
    }

    #[test]
    fn test_not_enough_instructions_remaining() {
        let opcodes = OpcodeTable::new();
        let pattern = shared_slot_pattern(&opcodes);
        let stream = vec![insn("01", &["1", "0"]), insn("01", &["0", "1"])];
        assert!(!pattern.matches_at(&stream, 1, &opcodes));
        assert!(!pattern.matches_at(&stream, 5, &opcodes));
    }

    #[test]
    fn test_unregistered_opcode_never_matches() {
        let opcodes = OpcodeTable::new();
        let pattern = shared_slot_pattern(&opcodes);
        let stream = vec![insn("11", &["1", "0"]), insn("01", &["0", "1"])];
        assert!(!pattern.matches_at(&stream, 0, &opcodes));
        assert_eq!(opcodes.lookup(&bits("11")), None);
    }

    #[test]
    fn test_argument_count_mismatch() {
        let opcodes = OpcodeTable::new();
        let pattern = shared_slot_pattern(&opcodes);
        let stream = vec![insn("01", &["1"]), insn("01", &["0", "1"])];
        assert!(!pattern.matches_at(&stream, 0, &opcodes));
    }

    #[test]
    fn test_slot_count_and_display() {
        let pattern = InstructionPattern::new(vec![
            SimplifiedInstruction::new(3, vec![0, 2]),
            SimplifiedInstruction::new(1, vec![]),
        ]);
        assert_eq!(pattern.slot_count(), 3);
        assert_eq!(pattern.to_string(), "op3($0, $2); op1()");
        assert_eq!(InstructionPattern::default().slot_count(), 0);
    }

    #[test]
    fn test_slot_count_fixed_at_construction() {
        let pattern = InstructionPattern::new(vec![
            SimplifiedInstruction::new(0, vec![4]),
            SimplifiedInstruction::new(0, vec![1, 0]),
        ]);
        assert_eq!(pattern.slot_count(), 5);
        assert_eq!(pattern, pattern.clone());
    }

    #[test]
    fn test_bindings_reused_across_attempts() {
        let opcodes = OpcodeTable::new();
        let pattern = shared_slot_pattern(&opcodes);
        let op = opcodes.lookup(&bits("01"));
        let ids = [op, op];
        let ones = vec![insn("01", &["1", "0"]), insn("01", &["1", "1"])];
        let zeros = vec![insn("01", &["0", "1"]), insn("01", &["1", "0"])];
        let bad = vec![insn("01", &["0", "0"]), insn("01", &["1", "1"])];

        // Slot 0 binds to "1", then "0", then fails: earlier attempts never leak.
        let mut bindings = Bindings::default();
        assert!(pattern.matches_window(&ones, &ids, &mut bindings));
        assert!(pattern.matches_window(&zeros, &ids, &mut bindings));
        assert!(!pattern.matches_window(&bad, &ids, &mut bindings));
        assert!(pattern.matches_window(&ones, &ids, &mut bindings));
    }

    #[test]
    fn test_bindings_first_binding_wins() {
        let x = bits("10");
        let y = bits("01");
        let mut bindings = Bindings::new(1);
        assert!(bindings.unify(0, &x));
        assert!(!bindings.unify(0, &y));
        assert_eq!(bindings.get(0), Some(&x));
        assert!(bindings.unify(4, &y));
        assert_eq!(bindings.get(3), None);
    }
}
