//! Binary Stylometry CLI
//!
//! Command-line tool for estimating whether binary programs share an author.

use anyhow::Context;
use binary_stylometry::formatter::{HumanFormatter, JsonFormatter, ReportFormatter, ShortFormatter};
use binary_stylometry::{AnalysisOptions, Analyzer, NGramRange};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

/// Binary code authorship comparison.
///
/// Decodes every program with an instruction format table, counts
/// instruction patterns, and reports a same-author verdict for each pair.
#[derive(Parser, Debug)]
#[command(name = "stylometry")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Program files to compare (at least two)
    files: Vec<PathBuf>,

    /// Instruction format table
    #[arg(long, env = "STYLOMETRY_FORMATS", default_value = "formats.txt")]
    formats: PathBuf,

    /// Pattern dictionary (dictionary mode)
    #[arg(long, env = "STYLOMETRY_DICTIONARY", default_value = "dict.txt")]
    dictionary: PathBuf,

    /// Pattern source
    #[arg(short, long, default_value = "dictionary")]
    mode: Mode,

    /// Shortest n-gram window (ngram mode)
    #[arg(long, default_value_t = NGramRange::DEFAULT_MIN)]
    min_n: usize,

    /// Longest n-gram window (ngram mode)
    #[arg(long, default_value_t = NGramRange::DEFAULT_MAX)]
    max_n: usize,

    /// Distances below this are reported as the same author
    #[arg(short, long, default_value = "0.5")]
    threshold: f64,

    /// Output format
    #[arg(short, long, default_value = "human")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (only output verdict lines)
    #[arg(short, long)]
    quiet: bool,
}

/// Pattern source options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Greedy matching against a pattern dictionary
    Dictionary,
    /// Automatic patterns from every instruction window
    Ngram,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
    /// Compact tab-separated output
    Short,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging if verbose
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("binary_stylometry=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    if let Some(message) = usage_error(&args) {
        eprintln!("{message}");
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Message for a run that cannot compare anything. Not a failure.
fn usage_error(args: &Args) -> Option<String> {
    (args.files.len() < 2).then(|| {
        format!(
            "Please provide at least 2 files for comparison (got {})",
            args.files.len()
        )
    })
}

fn options(args: &Args) -> anyhow::Result<AnalysisOptions> {
    let options = match args.mode {
        Mode::Dictionary => AnalysisOptions::dictionary(),
        Mode::Ngram => AnalysisOptions::ngram(NGramRange::new(args.min_n, args.max_n)?),
    };
    Ok(options.with_threshold(args.threshold))
}

fn run(args: &Args) -> anyhow::Result<String> {
    let options = options(args)?;
    let analyzer = Analyzer::from_paths(&args.formats, &args.dictionary, options)
        .context("failed to load pattern configuration")?;
    let report = analyzer
        .analyze_files(&args.files)
        .context("failed to analyze programs")?;

    let formatter: Box<dyn ReportFormatter> = match args.output {
        OutputFormat::Human => Box::new(HumanFormatter {
            verbose: args.verbose,
            quiet: args.quiet,
        }),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
        OutputFormat::Short => Box::new(ShortFormatter::new()),
    };
    Ok(formatter.format_report(&report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_args_parsing() {
        let args = Args::try_parse_from(["stylometry", "a.bin", "b.bin"]).unwrap();
        assert_eq!(args.files.len(), 2);
        assert_eq!(args.mode, Mode::Dictionary);
        assert_eq!(args.min_n, 3);
        assert_eq!(args.max_n, 12);
        assert!(!args.verbose);
    }

    #[test]
    fn test_too_few_files_is_a_usage_message() {
        // Too few files is reported after parsing, not by the parser.
        let args = Args::try_parse_from(["stylometry", "a.bin"]).unwrap();
        assert_eq!(
            usage_error(&args).as_deref(),
            Some("Please provide at least 2 files for comparison (got 1)")
        );

        let args = Args::try_parse_from(["stylometry"]).unwrap();
        assert!(usage_error(&args).unwrap().contains("(got 0)"));

        let args = Args::try_parse_from(["stylometry", "a.bin", "b.bin"]).unwrap();
        assert_eq!(usage_error(&args), None);
    }

    #[test]
    fn test_ngram_options() {
        let args = Args::try_parse_from([
            "stylometry", "--mode", "ngram", "--min-n", "2", "--max-n", "4", "a", "b",
        ])
        .unwrap();
        let options = options(&args).unwrap();
        assert_eq!(options.source.to_string(), "ngram 2..=4");
    }

    #[test]
    fn test_invalid_ngram_range() {
        let args =
            Args::try_parse_from(["stylometry", "-m", "ngram", "--min-n", "5", "--max-n", "2", "a", "b"])
                .unwrap();
        assert!(options(&args).is_err());
    }

    #[test]
    fn test_format_options() {
        let args = Args::try_parse_from(["stylometry", "-o", "json", "a", "b"]).unwrap();
        assert!(matches!(args.output, OutputFormat::Json));
    }

    #[test]
    fn test_run_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = |name: &str| dir.path().join(name);
        fs::write(path("formats.txt"), "0000aaaa\n1111bbbb\n").unwrap();
        fs::write(path("dict.txt"), "0000xxxx\n\n1111yyyy\n").unwrap();
        fs::write(path("a.bin"), [0x01, 0xF2]).unwrap();
        fs::write(path("b.bin"), [0x03, 0xF4]).unwrap();

        let args = Args::try_parse_from([
            "stylometry".to_string(),
            "--formats".to_string(),
            path("formats.txt").display().to_string(),
            "--dictionary".to_string(),
            path("dict.txt").display().to_string(),
            path("a.bin").display().to_string(),
            path("b.bin").display().to_string(),
        ])
        .unwrap();

        let output = run(&args).unwrap();
        assert_eq!(
            output,
            format!(
                "Programs {} and {} are work of the same author with probability 100%\n",
                path("a.bin").display(),
                path("b.bin").display()
            )
        );
    }
}
