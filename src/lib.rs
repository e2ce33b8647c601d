//! Binary Stylometry - Authorship Verdicts From Instruction Patterns
//!
//! This library decodes fixed-format binary instruction streams, counts
//! recurring structural instruction patterns, and compares the resulting
//! frequency profiles to estimate whether two programs share an author.
//!
//! # Features
//!
//! - **Template Decoding**: Segments raw bits into opcode and argument fields
//!   using an ordered table of `0`/`1`/letter templates
//! - **Opcode Canonicalization**: A run-wide [`OpcodeTable`] gives every distinct
//!   opcode a small stable id
//! - **Unifying Patterns**: Dictionary patterns with shared argument slots that
//!   must bind to bit-identical values
//! - **N-gram Profiles**: Automatic patterns from every window of 3 to 12
//!   instructions by default
//! - **Frequency Distance**: Euclidean distance between probability vectors,
//!   turned into a same-author verdict
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use binary_stylometry::{compare_files, AnalysisOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = compare_files(
//!         "formats.txt",
//!         "dict.txt",
//!         &["a.bin", "b.bin"],
//!         AnalysisOptions::new(),
//!     )?;
//!     for cmp in &report.comparisons {
//!         println!("{} vs {}: {:.1}%", cmp.left, cmp.right, cmp.verdict.probability);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Input Formats
//!
//! - Format table: one template per line, first matching template wins
//! - Dictionary: pattern blocks separated by blank lines, written in the
//!   template alphabet with letters as pattern variables
//! - Programs: raw bytes, read most significant bit first

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::similar_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::cast_precision_loss)]

pub mod analyzer;
pub mod bits;
pub mod decoder;
pub mod error;
pub mod formatter;
pub mod loader;
pub mod opcodes;
pub mod patterns;
pub mod profile;
pub mod types;

pub use analyzer::{AnalysisReport, Analyzer, Comparison, ProfiledProgram};
pub use bits::BitSequence;
pub use decoder::{BinaryInstruction, DecodedProgram, FormatTable, InstructionFormat};
pub use error::{Result, StylometryError};
pub use opcodes::{OpcodeId, OpcodeTable};
pub use patterns::{Dictionary, InstructionPattern, NGramRange, SimplifiedInstruction};
pub use profile::{FrequencyProfile, NGramProfile, ProgramProfile, Verdict};
pub use types::{AnalysisOptions, PatternSource, ProgramSummary};

use std::path::Path;

/// Compare program files against a format table and dictionary on disk.
///
/// This is the primary entry point for file-based analysis. In n-gram mode
/// the dictionary path is not read.
///
/// # Arguments
///
/// * `formats` - Path to the format table
/// * `dictionary` - Path to the dictionary
/// * `programs` - Two or more program files
/// * `options` - Pattern source and verdict threshold
///
/// # Returns
///
/// * `Ok(AnalysisReport)` - One comparison per unordered pair, in input order
/// * `Err(StylometryError)` - If fewer than two programs are given or a file
///   cannot be read or parsed
pub fn compare_files<F, D, P>(
    formats: F,
    dictionary: D,
    programs: &[P],
    options: AnalysisOptions,
) -> Result<AnalysisReport>
where
    F: AsRef<Path>,
    D: AsRef<Path>,
    P: AsRef<Path> + Sync,
{
    Analyzer::from_paths(formats, dictionary, options)?.analyze_files(programs)
}

/// Compare two in-memory programs with dictionary patterns.
///
/// # Example
///
/// ```rust
/// use binary_stylometry::compare_bytes;
///
/// let verdict = compare_bytes("0000aaaa\n1111bbbb", "0000xxxx", &[0x01, 0x02], &[0x03])?;
/// assert!(verdict.same_author);
/// # Ok::<(), binary_stylometry::StylometryError>(())
/// ```
pub fn compare_bytes(formats: &str, dictionary: &str, left: &[u8], right: &[u8]) -> Result<Verdict> {
    let analyzer =
        Analyzer::with_dictionary(FormatTable::parse(formats)?, dictionary, AnalysisOptions::new())?;
    let left = analyzer.profile_bytes("left", left);
    let right = analyzer.profile_bytes("right", right);
    Ok(analyzer.compare(&left, &right)?.verdict)
}

/// Get version information for this library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
