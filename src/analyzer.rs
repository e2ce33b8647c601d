//! Run orchestration: decode, profile and compare programs.
//!
//! An [`Analyzer`] owns everything shared across the programs of one run:
//! the format table, the [`OpcodeTable`] and, in dictionary mode, the
//! dictionary. Programs are profiled independently and compared pairwise.

use crate::decoder::{DecodedProgram, FormatTable};
use crate::error::{Result, ResultExt, StylometryError};
use crate::loader;
use crate::opcodes::OpcodeTable;
use crate::patterns::{ngram_profiles, tokenize, Dictionary};
use crate::profile::{ProgramProfile, Verdict};
use crate::types::{AnalysisOptions, PatternSource, ProgramSummary};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One program's profile together with its summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfiledProgram {
    /// Counts and sizes reported for the program
    pub summary: ProgramSummary,
    /// Pattern frequencies used for comparison
    pub profile: ProgramProfile,
}

impl ProfiledProgram {
    /// Program name as given on input.
    pub fn name(&self) -> &str {
        &self.summary.name
    }
}

/// Verdict for one unordered pair of programs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    /// First program, in input order
    pub left: String,
    /// Second program, in input order
    pub right: String,
    /// Same-author decision
    #[serde(flatten)]
    pub verdict: Verdict,
}

/// Everything a run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Pattern source the profiles were built from
    pub source: PatternSource,
    /// Per-program summaries, in input order
    pub programs: Vec<ProgramSummary>,
    /// One entry per pair `(i, j)` with `i < j`, in input order
    pub comparisons: Vec<Comparison>,
}

/// Profiles and compares programs against one format table.
#[derive(Debug)]
pub struct Analyzer {
    formats: FormatTable,
    opcodes: OpcodeTable,
    dictionary: Dictionary,
    options: AnalysisOptions,
}

impl Analyzer {
    /// Create an analyzer with an empty dictionary.
    ///
    /// Suited to n-gram mode; in dictionary mode every profile stays empty.
    pub fn new(formats: FormatTable, options: AnalysisOptions) -> Self {
        Self {
            formats,
            opcodes: OpcodeTable::new(),
            dictionary: Dictionary::default(),
            options,
        }
    }

    /// Create an analyzer, parsing `dictionary` text against `formats`.
    pub fn with_dictionary(
        formats: FormatTable,
        dictionary: &str,
        options: AnalysisOptions,
    ) -> Result<Self> {
        let mut analyzer = Self::new(formats, options);
        analyzer.dictionary = Dictionary::parse(dictionary, &analyzer.formats, &analyzer.opcodes)?;
        Ok(analyzer)
    }

    /// Create an analyzer from a format table file and, in dictionary mode,
    /// a dictionary file.
    pub fn from_paths<P, Q>(formats: P, dictionary: Q, options: AnalysisOptions) -> Result<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let mut analyzer = Self::new(loader::load_formats(formats)?, options);
        if options.source == PatternSource::Dictionary {
            analyzer.dictionary =
                loader::load_dictionary(dictionary, &analyzer.formats, &analyzer.opcodes)?;
        }
        Ok(analyzer)
    }

    /// The format table.
    pub fn formats(&self) -> &FormatTable {
        &self.formats
    }

    /// The run-wide opcode table.
    pub fn opcodes(&self) -> &OpcodeTable {
        &self.opcodes
    }

    /// The dictionary (empty in n-gram mode).
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Options for this run.
    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Decode raw program bytes.
    pub fn decode(&self, data: &[u8]) -> DecodedProgram {
        self.formats.decode(data)
    }

    /// Decode and profile raw program bytes.
    pub fn profile_bytes(&self, name: &str, data: &[u8]) -> ProfiledProgram {
        let decoded = self.decode(data);
        let stream = &decoded.instructions;

        let (profile, covered) = match self.options.source {
            PatternSource::Dictionary => {
                let tokens = tokenize(stream, &self.dictionary, &self.opcodes);
                (ProgramProfile::Dictionary(tokens.profile), Some(tokens.covered))
            }
            PatternSource::NGram(range) => (
                ProgramProfile::NGram(ngram_profiles(stream, range, &self.opcodes)),
                None,
            ),
        };

        let summary = ProgramSummary {
            name: name.to_string(),
            total_bits: decoded.total_bits,
            discarded_bits: decoded.discarded_bits,
            instructions: decoded.len(),
            occurrences: profile.total(),
            distinct_patterns: profile.distinct(),
            covered,
        };
        debug!(
            program = name,
            instructions = summary.instructions,
            occurrences = summary.occurrences,
            distinct = summary.distinct_patterns,
            "profiled program"
        );

        ProfiledProgram { summary, profile }
    }

    /// Read and profile a program file.
    pub fn profile_file<P: AsRef<Path>>(&self, path: P) -> Result<ProfiledProgram> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(StylometryError::from)
            .context(format!("cannot read {}", path.display()))?;
        Ok(self.profile_bytes(&path.display().to_string(), &data))
    }

    /// Profile several program files, keeping input order.
    #[cfg(not(feature = "parallel"))]
    pub fn profile_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<ProfiledProgram>> {
        paths.iter().map(|p| self.profile_file(p)).collect()
    }

    /// Profile several program files concurrently, keeping input order.
    #[cfg(feature = "parallel")]
    pub fn profile_files<P: AsRef<Path> + Sync>(
        &self,
        paths: &[P],
    ) -> Result<Vec<ProfiledProgram>> {
        paths.par_iter().map(|p| self.profile_file(p)).collect()
    }

    /// Compare two profiled programs.
    pub fn compare(&self, left: &ProfiledProgram, right: &ProfiledProgram) -> Result<Comparison> {
        let distance = left.profile.distance(&right.profile)?;
        let verdict = Verdict::with_threshold(distance, self.options.threshold);
        debug!(
            left = left.name(),
            right = right.name(),
            distance,
            same_author = verdict.same_author,
            "compared programs"
        );
        Ok(Comparison {
            left: left.name().to_string(),
            right: right.name().to_string(),
            verdict,
        })
    }

    /// Compare every unordered pair `(i, j)` with `i < j`, in input order.
    pub fn compare_all(&self, programs: &[ProfiledProgram]) -> Result<Vec<Comparison>> {
        if programs.len() < 2 {
            return Err(StylometryError::NotEnoughPrograms {
                count: programs.len(),
            });
        }
        let pairs: Vec<(usize, usize)> = (0..programs.len())
            .flat_map(|i| (i + 1..programs.len()).map(move |j| (i, j)))
            .collect();

        #[cfg(feature = "parallel")]
        let comparisons = pairs
            .par_iter()
            .map(|&(i, j)| self.compare(&programs[i], &programs[j]))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let comparisons = pairs
            .iter()
            .map(|&(i, j)| self.compare(&programs[i], &programs[j]))
            .collect();

        comparisons
    }

    /// Profile and compare program files.
    #[cfg(not(feature = "parallel"))]
    pub fn analyze_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<AnalysisReport> {
        self.analyze_profiled(paths.len(), || self.profile_files(paths))
    }

    /// Profile and compare program files.
    #[cfg(feature = "parallel")]
    pub fn analyze_files<P: AsRef<Path> + Sync>(&self, paths: &[P]) -> Result<AnalysisReport> {
        self.analyze_profiled(paths.len(), || self.profile_files(paths))
    }

    fn analyze_profiled<F>(&self, count: usize, profile: F) -> Result<AnalysisReport>
    where
        F: FnOnce() -> Result<Vec<ProfiledProgram>>,
    {
        if count < 2 {
            return Err(StylometryError::NotEnoughPrograms { count });
        }
        let programs = profile()?;
        let comparisons = self.compare_all(&programs)?;
        Ok(AnalysisReport {
            source: self.options.source,
            programs: programs.into_iter().map(|p| p.summary).collect(),
            comparisons,
        })
    }
}
