//! Fixed-offset record extraction
//!
//! Every export starts with the same number of metadata lines, followed by
//! the column header and the data rows. The extractor skips the metadata by
//! position, takes the header and at most `max_rows` data lines, and hands
//! that block to the polars CSV reader with every column read as a string.

use crate::config::ExtractionConfig;
use crate::constants::UTF8_BOM;
use crate::error::{ConsolidateError, Result};
use crate::models::SourceFile;
use polars::prelude::*;
use std::io::Cursor;
use tokio::fs;
use tracing::{debug, warn};

/// Rows extracted from one export, before repair
#[derive(Debug, Clone)]
pub struct RawRecordBlock {
    pub file: SourceFile,
    /// All columns are `String`, in header order
    pub frame: DataFrame,
}

impl RawRecordBlock {
    pub fn height(&self) -> usize {
        self.frame.height()
    }
}

/// Reads the tabular block out of export files
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    config: ExtractionConfig,
}

impl RecordExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Read and extract the block of one file
    ///
    /// Returns `Ok(None)` when the header is present but no data rows follow.
    pub async fn extract(&self, file: &SourceFile) -> Result<Option<RawRecordBlock>> {
        let bytes = fs::read(&file.path)
            .await
            .map_err(|e| self.failure(file, format!("failed to read file: {}", e)))?;
        self.extract_from_bytes(file, &bytes)
    }

    /// Extract the block from file contents already in memory
    pub fn extract_from_bytes(
        &self,
        file: &SourceFile,
        bytes: &[u8],
    ) -> Result<Option<RawRecordBlock>> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let text = String::from_utf8_lossy(bytes);

        let mut lines = text.lines().skip(self.config.skip_lines);
        let header = lines
            .next()
            .filter(|line| !line.trim().is_empty())
            .ok_or_else(|| {
                self.failure(
                    file,
                    format!("no column header at line {}", self.config.skip_lines + 1),
                )
            })?;

        let data_lines: Vec<&str> = lines
            .filter(|line| !line.trim().is_empty())
            .take(self.config.max_rows)
            .collect();

        if data_lines.is_empty() {
            warn!("No data rows in {}", file.path.display());
            return Ok(None);
        }

        let mut block = String::with_capacity(
            header.len() + data_lines.iter().map(|l| l.len() + 1).sum::<usize>() + 1,
        );
        block.push_str(header);
        block.push('\n');
        for line in &data_lines {
            block.push_str(line);
            block.push('\n');
        }

        let frame = parse_block(&block)
            .map_err(|e| self.failure(file, format!("unparsable block: {}", e)))?;

        if frame.width() == 0 {
            return Err(self.failure(file, "header has no columns".to_string()));
        }

        debug!(
            "Extracted {} rows x {} columns from {}",
            frame.height(),
            frame.width(),
            file.path.display()
        );

        Ok(Some(RawRecordBlock {
            file: file.clone(),
            frame,
        }))
    }

    fn failure(&self, file: &SourceFile, reason: String) -> ConsolidateError {
        ConsolidateError::ExtractionFailure {
            path: file.path.clone(),
            reason,
        }
    }
}

/// Parse a header-plus-rows CSV block with every column as `String`
fn parse_block(block: &str) -> PolarsResult<DataFrame> {
    let mut cursor = Cursor::new(block.as_bytes());
    let options = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| opts.with_truncate_ragged_lines(true));

    CsvReader::new(&mut cursor).with_options(options).finish()
}
