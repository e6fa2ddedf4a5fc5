//! Run reports and structured output for the collector.
//!
//! Shared report types returned by the collector operations, with CLI-friendly
//! display formatters for human-readable output.

use std::path::PathBuf;
use std::time::Duration;

/// How a target's sources were made available for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    /// Benchmarked from a directory shipped with the repository
    Local,
    /// Clone already present; nothing was fetched
    Present,
    /// Freshly cloned during this run
    Cloned,
}

impl SourceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SourceStatus::Local => "local",
            SourceStatus::Present => "cached",
            SourceStatus::Cloned => "cloned",
        }
    }
}

/// Outcome of one successful target run
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub name: String,
    pub output: PathBuf,
    pub source: SourceStatus,
    pub setup_duration: Duration,
    pub bench_duration: Duration,
    pub bytes_written: u64,
}

impl TargetReport {
    pub fn total_duration(&self) -> Duration {
        self.setup_duration + self.bench_duration
    }

    /// Output size in KB
    pub fn output_size_kb(&self) -> f64 {
        self.bytes_written as f64 / 1024.0
    }

    /// Format as a human-readable one-liner
    pub fn format(&self) -> String {
        format!(
            "{} → {} ({:.1} KB, bench {:.1}s, setup {:.1}s, {})",
            self.name,
            self.output.display(),
            self.output_size_kb(),
            self.bench_duration.as_secs_f64(),
            self.setup_duration.as_secs_f64(),
            self.source.label()
        )
    }
}

/// Aggregate over a sequence of target runs
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub reports: Vec<TargetReport>,
}

impl RunSummary {
    pub fn total_duration(&self) -> Duration {
        self.reports.iter().map(TargetReport::total_duration).sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.reports.iter().map(|r| r.bytes_written).sum()
    }

    /// Format the summary as a table for CLI output
    pub fn format_table(&self) -> String {
        let mut output = String::new();
        output.push_str("  ┌──────────────────────┬───────────┬───────────┬────────────┐\n");
        output.push_str("  │ Target               │ Bench     │ Setup     │ Output     │\n");
        output.push_str("  ├──────────────────────┼───────────┼───────────┼────────────┤\n");

        for report in &self.reports {
            output.push_str(&format!(
                "  │ {:<20} │ {:>8.1}s │ {:>8.1}s │ {:>7.1} KB │\n",
                truncate(&report.name, 20),
                report.bench_duration.as_secs_f64(),
                report.setup_duration.as_secs_f64(),
                report.output_size_kb()
            ));
        }

        output.push_str("  ├──────────────────────┼───────────┴───────────┼────────────┤\n");
        output.push_str(&format!(
            "  │ Total ({:>3} targets)  │ {:>20.1}s │ {:>7.1} KB │\n",
            self.reports.len(),
            self.total_duration().as_secs_f64(),
            self.total_bytes() as f64 / 1024.0
        ));
        output.push_str("  └──────────────────────┴───────────────────────┴────────────┘\n");
        output
    }
}

/// Outcome of `clean`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// Paths that existed and were deleted
    pub removed: Vec<PathBuf>,
    /// Paths that were already absent
    pub skipped: Vec<PathBuf>,
}

impl CleanReport {
    pub fn format(&self) -> String {
        format!(
            "Removed {} path(s), {} already absent",
            self.removed.len(),
            self.skipped.len()
        )
    }
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        name.to_string()
    } else {
        let mut short: String = name.chars().take(width - 1).collect();
        short.push('…');
        short
    }
}
