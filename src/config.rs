//! Configuration management and validation.
//!
//! Provides the directory conventions, the fixed export layout used by the
//! extractor and the known-column schema used by the normalizer.

use crate::constants::*;
use crate::error::{ConsolidateError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fixed layout of one export file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Metadata lines skipped before the column header
    pub skip_lines: usize,

    /// Maximum data rows read after the header
    pub max_rows: usize,

    /// Thousands grouping character in numeric fields
    pub grouping_char: char,

    /// Label given to the aggregate (second-to-last) row
    pub aggregate_label: String,

    /// First-column value identifying an echoed header row
    pub echoed_header_label: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            skip_lines: METADATA_LINES,
            max_rows: MAX_DATA_ROWS,
            grouping_char: GROUPING_CHAR,
            aggregate_label: AGGREGATE_LABEL.to_string(),
            echoed_header_label: ECHOED_HEADER_LABEL.to_string(),
        }
    }
}

/// Kind of coercion applied to a known column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Percentage,
    Duration,
    Numeric,
}

/// Known columns by coercion kind
///
/// Every entry is optional in practice: the export schema changes between
/// versions, so a listed column that is absent from a file is skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub percentage: Vec<String>,
    pub duration: Vec<String>,
    pub numeric: Vec<String>,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        let owned = |names: &[&str]| names.iter().map(|s| s.to_string()).collect();
        Self {
            percentage: owned(PERCENTAGE_COLUMNS),
            duration: owned(DURATION_COLUMNS),
            numeric: owned(NUMERIC_COLUMNS),
        }
    }
}

impl ColumnSchema {
    /// Look up the coercion kind for a column name (exact match)
    pub fn kind_of(&self, column: &str) -> Option<ColumnKind> {
        let contains = |names: &[String]| names.iter().any(|n| n == column);
        if contains(&self.percentage) {
            Some(ColumnKind::Percentage)
        } else if contains(&self.duration) {
            Some(ColumnKind::Duration)
        } else if contains(&self.numeric) {
            Some(ColumnKind::Numeric)
        } else {
            None
        }
    }
}

/// Global configuration for a consolidation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidatorConfig {
    /// Directory holding one folder per data source
    pub root_dir: PathBuf,

    /// Directory receiving `<source>/consolidated-<tag>.csv`
    pub output_root: PathBuf,

    /// Export layout
    pub extraction: ExtractionConfig,

    /// Known-column schema
    pub columns: ColumnSchema,

    /// Scan and infer periods then exit (no extraction or output)
    pub discovery_only: bool,

    /// Draw a progress bar while processing files
    pub show_progress: bool,
}

impl Default for ConsolidatorConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from(DEFAULT_ROOT_DIR),
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            extraction: ExtractionConfig::default(),
            columns: ColumnSchema::default(),
            discovery_only: false,
            show_progress: true,
        }
    }
}

impl ConsolidatorConfig {
    /// Set the source root directory
    pub fn with_root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = root_dir.into();
        self
    }

    /// Set the output root directory
    pub fn with_output_root(mut self, output_root: impl Into<PathBuf>) -> Self {
        self.output_root = output_root.into();
        self
    }

    /// Replace the known-column schema
    pub fn with_columns(mut self, columns: ColumnSchema) -> Self {
        self.columns = columns;
        self
    }

    /// Enable discovery only mode
    pub fn with_discovery_only(mut self) -> Self {
        self.discovery_only = true;
        self
    }

    /// Disable the progress bar (tests, non-interactive runs)
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Directory of a named data source
    pub fn source_dir(&self, source_name: &str) -> PathBuf {
        self.root_dir.join(source_name)
    }

    /// Artifact path for a source and tag
    pub fn artifact_path(&self, source_name: &str, artifact_tag: &str) -> PathBuf {
        artifact_path_in(&self.output_root, source_name, artifact_tag)
    }

    /// Reject settings the extractor cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.extraction.max_rows == 0 {
            return Err(ConsolidateError::Configuration {
                message: "max_rows must be at least 1".to_string(),
            });
        }
        if self.extraction.grouping_char.is_alphanumeric() {
            return Err(ConsolidateError::Configuration {
                message: format!(
                    "grouping character '{}' would corrupt numeric values",
                    self.extraction.grouping_char
                ),
            });
        }
        Ok(())
    }
}

fn artifact_path_in(output_root: &Path, source_name: &str, artifact_tag: &str) -> PathBuf {
    output_root
        .join(source_name)
        .join(format!("{}-{}.csv", ARTIFACT_PREFIX, artifact_tag))
}
