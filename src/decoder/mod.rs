//! Template-driven instruction decoding.
//!
//! An instruction format is a template string over `0`, `1` and field
//! letters. Literal positions make up the opcode; each maximal run of one
//! field letter is one argument. A [`FormatTable`] segments a raw bit stream
//! into [`BinaryInstruction`]s by growing an accumulator one bit at a time
//! and emitting an instruction as soon as some template matches it exactly.

pub mod reader;

pub use reader::BitReader;

use crate::bits::BitSequence;
use crate::error::{Result, StylometryError};
use tracing::{debug, warn};

/// One position of an instruction template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateChar {
    /// Literal zero bit (part of the opcode)
    Zero,
    /// Literal one bit (part of the opcode)
    One,
    /// Argument field position, named by its letter
    Field(char),
}

impl TemplateChar {
    fn from_char(c: char) -> Self {
        match c {
            '0' => TemplateChar::Zero,
            '1' => TemplateChar::One,
            other => TemplateChar::Field(other),
        }
    }

    /// The literal bit at this position, if any.
    pub fn literal(self) -> Option<bool> {
        match self {
            TemplateChar::Zero => Some(false),
            TemplateChar::One => Some(true),
            TemplateChar::Field(_) => None,
        }
    }
}

/// A decoded instruction: opcode bits plus argument fields in template order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinaryInstruction {
    /// Literal-bit positions of the matching template, in order
    pub opcode: BitSequence,
    /// One entry per field run of the matching template
    pub arguments: Vec<BitSequence>,
}

/// A single instruction format template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionFormat {
    template: String,
    chars: Vec<TemplateChar>,
}

impl InstructionFormat {
    /// Build a format from its template text.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
            chars: template.chars().map(TemplateChar::from_char).collect(),
        }
    }

    /// The template text.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Template length in bits.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the template is empty.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Template positions.
    pub fn chars(&self) -> &[TemplateChar] {
        &self.chars
    }

    /// Whether position `index` starts a new argument field.
    ///
    /// A field starts wherever a field letter differs from the character
    /// before it, including at position 0.
    pub fn is_field_start(&self, index: usize) -> bool {
        match self.chars.get(index) {
            Some(c @ TemplateChar::Field(_)) => index == 0 || self.chars[index - 1] != *c,
            _ => false,
        }
    }

    /// Number of argument fields.
    pub fn field_count(&self) -> usize {
        (0..self.chars.len())
            .filter(|&i| self.is_field_start(i))
            .count()
    }

    /// The template's literal bits, i.e. the opcode every match produces.
    pub fn opcode_bits(&self) -> BitSequence {
        self.chars.iter().filter_map(|c| c.literal()).collect()
    }

    /// Whether `bits` has exactly this template's length and agrees with
    /// every literal position.
    pub fn matches(&self, bits: &BitSequence) -> bool {
        if bits.len() != self.chars.len() {
            return false;
        }
        self.chars
            .iter()
            .zip(bits.iter())
            .all(|(c, bit)| c.literal().map_or(true, |lit| lit == bit))
    }

    /// Split `bits` into opcode and arguments if this template matches.
    pub fn try_match(&self, bits: &BitSequence) -> Option<BinaryInstruction> {
        if !self.matches(bits) {
            return None;
        }

        let mut opcode = BitSequence::new();
        let mut arguments: Vec<BitSequence> = Vec::new();
        for (i, bit) in bits.iter().enumerate() {
            if self.chars[i].literal().is_some() {
                opcode.push(bit);
                continue;
            }
            if self.is_field_start(i) {
                arguments.push(BitSequence::new());
            }
            if let Some(arg) = arguments.last_mut() {
                arg.push(bit);
            }
        }

        Some(BinaryInstruction { opcode, arguments })
    }

    /// Whether a textual instruction line fits this template.
    ///
    /// The line must have the template's length and must not put a literal
    /// `0` where the template has `1` or the reverse. Any other character
    /// pairing is accepted.
    pub fn matches_text(&self, line: &str) -> bool {
        if line.chars().count() != self.chars.len() {
            return false;
        }
        self.chars.iter().zip(line.chars()).all(|(c, l)| {
            !matches!(
                (c, l),
                (TemplateChar::One, '0') | (TemplateChar::Zero, '1')
            )
        })
    }

    /// Whether every bit string this format accepts is also accepted by
    /// `earlier`, making this format unreachable behind it.
    fn is_shadowed_by(&self, earlier: &InstructionFormat) -> bool {
        self.chars.len() == earlier.chars.len()
            && self
                .chars
                .iter()
                .zip(&earlier.chars)
                .all(|(mine, theirs)| match theirs.literal() {
                    Some(lit) => mine.literal() == Some(lit),
                    None => true,
                })
    }
}

/// Result of decoding one program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedProgram {
    /// Instructions in stream order
    pub instructions: Vec<BinaryInstruction>,
    /// Total bits read from the input
    pub total_bits: usize,
    /// Trailing bits that never completed an instruction
    pub discarded_bits: usize,
}

impl DecodedProgram {
    /// Number of decoded instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether nothing was decoded.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Ordered list of instruction formats. Declaration order is match priority.
#[derive(Debug, Clone)]
pub struct FormatTable {
    formats: Vec<InstructionFormat>,
    max_len: usize,
}

impl FormatTable {
    /// Build a table from template strings, skipping blank entries.
    pub fn new<I, S>(templates: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let formats: Vec<InstructionFormat> = templates
            .into_iter()
            .filter(|t| !t.as_ref().is_empty())
            .map(|t| InstructionFormat::new(t.as_ref()))
            .collect();

        if formats.is_empty() {
            return Err(StylometryError::EmptyFormatTable);
        }

        for (i, later) in formats.iter().enumerate() {
            if let Some(earlier) = formats[..i].iter().find(|e| later.is_shadowed_by(e)) {
                warn!(
                    template = later.template(),
                    shadowed_by = earlier.template(),
                    "instruction format can never match"
                );
            }
        }

        let max_len = formats.iter().map(InstructionFormat::len).max().unwrap_or(0);
        Ok(Self { formats, max_len })
    }

    /// Parse a format table from text, one template per line.
    ///
    /// Lines are trimmed of surrounding whitespace, the same way dictionary
    /// lines are, so both files compare as written.
    pub fn parse(text: &str) -> Result<Self> {
        Self::new(text.lines().map(str::trim))
    }

    /// Number of formats.
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    /// Whether the table is empty. Always false for a constructed table.
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Length of the longest template.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Iterate over formats in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &InstructionFormat> {
        self.formats.iter()
    }

    /// Decode `bits` with the first matching format.
    pub fn try_match(&self, bits: &BitSequence) -> Option<BinaryInstruction> {
        self.formats.iter().find_map(|f| f.try_match(bits))
    }

    /// First format a textual instruction line fits.
    pub fn find_text(&self, line: &str) -> Option<&InstructionFormat> {
        self.formats.iter().find(|f| f.matches_text(line))
    }

    /// Decode a raw program, reading each byte most significant bit first.
    pub fn decode(&self, data: &[u8]) -> DecodedProgram {
        self.decode_bits(BitReader::new(data))
    }

    /// Decode an arbitrary bit stream.
    ///
    /// Bits accumulate until some format matches the accumulator exactly,
    /// at which point the instruction is emitted and the accumulator reset.
    /// Once the accumulator reaches the longest template length without a
    /// match, no later bit can complete an instruction, so the rest of the
    /// stream is counted as discarded.
    pub fn decode_bits<I>(&self, bits: I) -> DecodedProgram
    where
        I: IntoIterator<Item = bool>,
    {
        let mut bits = bits.into_iter();
        let mut instructions = Vec::new();
        let mut accumulator = BitSequence::with_capacity(self.max_len);
        let mut total_bits = 0;

        for bit in bits.by_ref() {
            total_bits += 1;
            accumulator.push(bit);
            if let Some(instruction) = self.try_match(&accumulator) {
                instructions.push(instruction);
                accumulator = BitSequence::with_capacity(self.max_len);
            } else if accumulator.len() >= self.max_len {
                let rest = bits.count();
                warn!(
                    offset = total_bits - accumulator.len(),
                    discarded = accumulator.len() + rest,
                    "bit stream matches no instruction format; discarding remainder"
                );
                total_bits += rest;
                return DecodedProgram {
                    instructions,
                    total_bits,
                    discarded_bits: accumulator.len() + rest,
                };
            }
        }

        if !accumulator.is_empty() {
            debug!(bits = accumulator.len(), "dropping truncated trailing instruction");
        }

        DecodedProgram {
            instructions,
            total_bits,
            discarded_bits: accumulator.len(),
        }
    }
}
