//! Error handling for export consolidation.
//!
//! Batch-level variants abort a run; file-level variants are caught at the
//! per-file boundary and turned into a skipped file.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsolidateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Data source directory not found at path: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("No CSV files found in: {path}")]
    EmptyInput { path: PathBuf },

    #[error("Malformed filename '{file_name}': {reason}")]
    MalformedFilename { file_name: String, reason: String },

    #[error("Extraction failed for file: {path} - {reason}")]
    ExtractionFailure { path: PathBuf, reason: String },

    #[error("No data to merge for source '{source_name}' ({files_skipped} files skipped)")]
    NoData {
        source_name: String,
        files_skipped: usize,
    },

    #[error("Failed to write output: {path} - {reason}")]
    OutputFailed { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl ConsolidateError {
    /// True for the conditions that abort the whole batch
    pub fn is_batch_fatal(&self) -> bool {
        matches!(
            self,
            ConsolidateError::DirectoryNotFound { .. }
                | ConsolidateError::EmptyInput { .. }
                | ConsolidateError::NoData { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ConsolidateError>;
