//! Dictionary pattern parsing.
//!
//! A dictionary is text made of pattern blocks separated by blank lines.
//! Each line of a block is an instruction written in the format-table
//! alphabet, with letters standing for that pattern's argument variables:
//!
//! ```text
//! 0001aabb
//! 0010bbcc
//!
//! 0001aaaa
//! ```
//!
//! Lines are matched to templates by text. The opcode comes from the
//! matching template's literal bits; each argument field takes the letter
//! found in the line at the field's first position. Letters are numbered
//! in first-seen order across the whole block, so `b` above is the same
//! slot in both instructions of the first pattern.

use super::{InstructionPattern, SimplifiedInstruction};
use crate::decoder::FormatTable;
use crate::error::{Result, StylometryError};
use crate::opcodes::OpcodeTable;
use std::collections::HashMap;
use tracing::debug;

/// An ordered list of dictionary patterns. Order is match priority.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    patterns: Vec<InstructionPattern>,
}

impl Dictionary {
    /// Create a dictionary from already-built patterns.
    pub fn new(patterns: Vec<InstructionPattern>) -> Self {
        Self { patterns }
    }

    /// Parse dictionary text, interning every pattern opcode in `opcodes`.
    ///
    /// Runs of blank lines separate blocks and never produce empty patterns.
    pub fn parse(text: &str, formats: &FormatTable, opcodes: &OpcodeTable) -> Result<Self> {
        let mut patterns = Vec::new();
        let mut block: Vec<(usize, &str)> = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                if !block.is_empty() {
                    patterns.push(parse_pattern(&block, patterns.len() + 1, formats, opcodes)?);
                    block.clear();
                }
            } else {
                block.push((index + 1, line));
            }
        }
        if !block.is_empty() {
            patterns.push(parse_pattern(&block, patterns.len() + 1, formats, opcodes)?);
        }

        debug!(
            patterns = patterns.len(),
            opcodes = opcodes.len(),
            "parsed dictionary"
        );
        Ok(Self { patterns })
    }

    /// Number of patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the dictionary has no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns in priority order.
    pub fn patterns(&self) -> &[InstructionPattern] {
        &self.patterns
    }

    /// Iterate over patterns in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &InstructionPattern> {
        self.patterns.iter()
    }
}

/// Parse one block of `(line number, text)` pairs into a pattern.
fn parse_pattern(
    lines: &[(usize, &str)],
    block: usize,
    formats: &FormatTable,
    opcodes: &OpcodeTable,
) -> Result<InstructionPattern> {
    let mut letters: HashMap<char, usize> = HashMap::new();
    let mut instructions = Vec::with_capacity(lines.len());

    for &(line_no, text) in lines {
        let format = formats
            .find_text(text)
            .ok_or_else(|| StylometryError::UnmatchedPatternLine {
                block,
                line: line_no,
                text: text.to_string(),
            })?;

        let chars: Vec<char> = text.chars().collect();
        let slots = (0..format.len())
            .filter(|&k| format.is_field_start(k))
            .map(|k| {
                let next = letters.len();
                *letters.entry(chars[k]).or_insert(next)
            })
            .collect();

        let opcode = opcodes.intern(&format.opcode_bits());
        instructions.push(SimplifiedInstruction::new(opcode, slots));
    }

    Ok(InstructionPattern::new(instructions))
}
