//! Non-fatal diagnostics raised while coercing field values.
//!
//! Components receive a `&mut DiagnosticSink` instead of printing; every
//! record is mirrored to `tracing` at warn level.

use std::fmt;
use tracing::warn;

/// How a bad value was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Replaced with a missing value
    Missing,
    /// Replaced with a zero duration
    ZeroDuration,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Missing => f.write_str("missing"),
            Resolution::ZeroDuration => f.write_str("zero duration"),
        }
    }
}

/// A single value that failed to parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: String,
    pub column: String,
    pub row: usize,
    pub raw_value: String,
    pub resolution: Resolution,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: column '{}' row {}: could not parse '{}', using {}",
            self.file, self.column, self.row, self.raw_value, self.resolution
        )
    }
}

/// Collects diagnostics for one run
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    records: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.records.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Diagnostic> {
        self.records
    }
}
