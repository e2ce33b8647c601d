//! Error types for binary stylometry.
//!
//! Decoding and matching never fail on program input: unknown opcodes and
//! truncated tails are ordinary outcomes. Errors come from I/O and from
//! format tables or dictionaries that cannot be used as written.

use thiserror::Error;

/// Primary error type for the stylometry library.
#[derive(Debug, Error)]
pub enum StylometryError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The format table contains no templates.
    #[error("Format table is empty: at least one instruction template is required")]
    EmptyFormatTable,

    /// A dictionary line does not correspond to any format template.
    #[error("Dictionary pattern {block}, line {line}: `{text}` matches no instruction format")]
    UnmatchedPatternLine {
        /// 1-based pattern block
        block: usize,
        /// 1-based line in the dictionary text
        line: usize,
        /// The offending line
        text: String,
    },

    /// The configured n-gram window range is unusable.
    #[error("Invalid n-gram range {min}..={max}: lengths must be at least 1 and min <= max")]
    InvalidNGramRange {
        /// Requested shortest window
        min: usize,
        /// Requested longest window
        max: usize,
    },

    /// Comparison needs at least two programs.
    #[error("Please provide at least 2 files for comparison (got {count})")]
    NotEnoughPrograms {
        /// Programs actually given
        count: usize,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },
}

/// Result type alias for stylometry operations.
pub type Result<T> = std::result::Result<T, StylometryError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| StylometryError::ConfigError {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}
