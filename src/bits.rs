//! Variable-length bit sequences.
//!
//! [`BitSequence`] is the key type for everything downstream: opcode bits,
//! argument fields and the decoder's accumulator are all bit sequences, and
//! they are compared and hashed by value.

use crate::error::StylometryError;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// An append-only sequence of bits with value equality.
///
/// Bits are packed eight to a byte, bit `i` living in byte `i / 8` at
/// position `i % 8`. Storage bits past `len` are always zero, so two
/// sequences are equal exactly when their lengths and packed bytes are.
/// The empty sequence is a valid value distinct from every non-empty one.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BitSequence {
    bytes: Vec<u8>,
    len: usize,
}

impl BitSequence {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty sequence with room for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity((bits + 7) / 8),
            len: 0,
        }
    }

    /// Append one bit.
    pub fn push(&mut self, bit: bool) {
        let offset = self.len & 7;
        if offset == 0 {
            self.bytes.push(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 1 << offset;
            }
        }
        self.len += 1;
    }

    /// Bit at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<bool> {
        if index < self.len {
            Some(self.bytes[index >> 3] >> (index & 7) & 1 == 1)
        } else {
            None
        }
    }

    /// Bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn bit(&self, index: usize) -> bool {
        assert!(
            index < self.len,
            "bit index {index} out of range for sequence of length {}",
            self.len
        );
        self.bytes[index >> 3] >> (index & 7) & 1 == 1
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the sequence holds no bits.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over the bits in order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.bit(i))
    }

    /// Interpret the sequence as an unsigned integer, first bit most significant.
    ///
    /// Returns `None` for sequences longer than 64 bits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.len > 64 {
            return None;
        }
        Some(self.iter().fold(0u64, |acc, bit| (acc << 1) | u64::from(bit)))
    }
}

impl Hash for BitSequence {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len);
        state.write(&self.bytes);
    }
}

impl FromIterator<bool> for BitSequence {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut seq = BitSequence::new();
        seq.extend(iter);
        seq
    }
}

impl Extend<bool> for BitSequence {
    fn extend<I: IntoIterator<Item = bool>>(&mut self, iter: I) {
        for bit in iter {
            self.push(bit);
        }
    }
}

impl FromStr for BitSequence {
    type Err = StylometryError;

    /// Parse a string of `0` and `1` characters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(StylometryError::ConfigError {
                    message: format!("invalid bit character {other:?} in {s:?}"),
                }),
            })
            .collect()
    }
}

impl fmt::Display for BitSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitSequence(\"{self}\")")
    }
}
