//! Output formatters for analysis reports.
//!
//! This module provides trait-based formatters for rendering verdicts in
//! various output formats (human-readable, JSON, compact).

use crate::analyzer::{AnalysisReport, Comparison};
use crate::types::ProgramSummary;

/// Trait for formatting analysis reports.
///
/// Implementors render per-program summaries and pairwise comparisons,
/// plus the complete report.
pub trait ReportFormatter {
    /// Format one program's summary.
    fn format_program(&self, summary: &ProgramSummary) -> Option<String>;

    /// Format one pairwise comparison.
    fn format_comparison(&self, comparison: &Comparison) -> String;

    /// Format the complete report.
    ///
    /// Default implementation concatenates program summaries, then
    /// comparisons, both in input order.
    fn format_report(&self, report: &AnalysisReport) -> String {
        let mut parts = Vec::new();

        for summary in &report.programs {
            if let Some(s) = self.format_program(summary) {
                parts.push(s);
            }
        }
        for comparison in &report.comparisons {
            parts.push(self.format_comparison(comparison));
        }

        parts.join("")
    }
}

/// Render a percentage with at most four decimals, trailing zeros trimmed.
pub fn format_percent(value: f64) -> String {
    let s = format!("{value:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Human-readable output formatter.
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter {
    /// Show per-program summaries and raw distances
    pub verbose: bool,
    /// Quiet mode (verdict lines only, overrides verbose)
    pub quiet: bool,
}

impl HumanFormatter {
    /// Create a new human formatter with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a verbose formatter.
    pub fn verbose() -> Self {
        Self {
            verbose: true,
            quiet: false,
        }
    }

    /// Create a quiet formatter.
    pub fn quiet() -> Self {
        Self {
            verbose: false,
            quiet: true,
        }
    }

    fn show_details(&self) -> bool {
        self.verbose && !self.quiet
    }
}

impl ReportFormatter for HumanFormatter {
    fn format_program(&self, summary: &ProgramSummary) -> Option<String> {
        if !self.show_details() {
            return None;
        }

        let mut s = format!("Program {}:\n", summary.name);
        s.push_str(&format!(
            "  Instructions: {} ({} bits, {} discarded)\n",
            summary.instructions, summary.total_bits, summary.discarded_bits
        ));
        s.push_str(&format!(
            "  Patterns:     {} occurrences, {} distinct\n",
            summary.occurrences, summary.distinct_patterns
        ));
        if let (Some(covered), Some(coverage)) = (summary.covered, summary.coverage()) {
            s.push_str(&format!(
                "  Coverage:     {} instructions ({}%)\n",
                covered,
                format_percent(coverage * 100.0)
            ));
        }
        Some(s)
    }

    fn format_comparison(&self, comparison: &Comparison) -> String {
        let relation = if comparison.verdict.same_author {
            "are work of the same author"
        } else {
            "are not work of the same author"
        };
        let mut s = format!(
            "Programs {} and {} {} with probability {}%",
            comparison.left,
            comparison.right,
            relation,
            format_percent(comparison.verdict.probability)
        );
        if self.show_details() {
            s.push_str(&format!(" (distance {:.6})", comparison.verdict.distance));
        }
        s.push('\n');
        s
    }
}

/// JSON output formatter.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    /// Pretty-print JSON
    pub pretty: bool,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl JsonFormatter {
    /// Create a new JSON formatter with pretty printing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compact JSON formatter.
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    fn render<T: serde::Serialize>(&self, value: &T) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.unwrap_or_else(|_| "{}".to_string())
    }
}

impl ReportFormatter for JsonFormatter {
    fn format_program(&self, summary: &ProgramSummary) -> Option<String> {
        Some(format!("{}\n", self.render(summary)))
    }

    fn format_comparison(&self, comparison: &Comparison) -> String {
        format!("{}\n", self.render(comparison))
    }

    fn format_report(&self, report: &AnalysisReport) -> String {
        format!("{}\n", self.render(report))
    }
}

/// Compact tab-separated output formatter.
#[derive(Debug, Clone, Default)]
pub struct ShortFormatter;

impl ShortFormatter {
    /// Create a new short formatter.
    pub fn new() -> Self {
        Self
    }
}

impl ReportFormatter for ShortFormatter {
    fn format_program(&self, _summary: &ProgramSummary) -> Option<String> {
        None
    }

    fn format_comparison(&self, comparison: &Comparison) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{:.6}\n",
            comparison.left,
            comparison.right,
            if comparison.verdict.same_author {
                "same"
            } else {
                "different"
            },
            format_percent(comparison.verdict.probability),
            comparison.verdict.distance
        )
    }
}
