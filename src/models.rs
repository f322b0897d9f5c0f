//! Core data structures for export consolidation.
//!
//! Defines reporting periods, source files, per-file outcomes, the
//! consolidated dataset and processing statistics.

use crate::diagnostics::Diagnostic;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Calendar quarter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    /// Quarter containing a calendar month (1-12)
    pub fn from_month(month: u32) -> Option<Self> {
        match month {
            1..=3 => Some(Quarter::Q1),
            4..=6 => Some(Quarter::Q2),
            7..=9 => Some(Quarter::Q3),
            10..=12 => Some(Quarter::Q4),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Q4",
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reporting period inferred from an export filename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportingPeriod {
    pub year: i32,
    pub quarter: Quarter,
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.year, self.quarter)
    }
}

/// An export file with its inferred period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub period: ReportingPeriod,
}

impl SourceFile {
    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }
}

/// Why a file contributed no rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Filename carries no parseable start date
    MalformedFilename(String),
    /// Header present but no data rows followed it
    EmptyBlock,
    /// Fixed-offset read failed or the block could not be repaired
    ExtractionFailure(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MalformedFilename(reason) => write!(f, "malformed filename: {}", reason),
            SkipReason::EmptyBlock => f.write_str("no data rows"),
            SkipReason::ExtractionFailure(reason) => write!(f, "extraction failed: {}", reason),
        }
    }
}

/// Result of processing one discovered file
#[derive(Debug)]
pub enum FileOutcome {
    /// Normalized, period-tagged rows ready to merge
    Processed { file: SourceFile, frame: DataFrame },
    /// File skipped; contributes zero rows
    Skipped { path: PathBuf, reason: SkipReason },
}

/// Merged output for one data source
#[derive(Debug, Clone)]
pub struct ConsolidatedDataset {
    pub source_name: String,
    pub frame: DataFrame,
    pub files_merged: usize,
}

impl ConsolidatedDataset {
    pub fn height(&self) -> usize {
        self.frame.height()
    }
}

/// Processing statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub files_discovered: usize,
    pub files_processed: usize,
    pub files_skipped: usize,
    pub total_rows: usize,
    pub output_path: PathBuf,
    pub processing_time_ms: u128,
}

/// Everything a run produced
#[derive(Debug)]
pub struct ConsolidationReport {
    /// None in discovery-only mode
    pub dataset: Option<ConsolidatedDataset>,
    pub stats: ProcessingStats,
    /// Files with an inferred period: every resolvable file in
    /// discovery-only mode, the merged files otherwise
    pub discovered: Vec<SourceFile>,
    pub skipped: Vec<(PathBuf, SkipReason)>,
    pub diagnostics: Vec<Diagnostic>,
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
