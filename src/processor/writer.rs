//! CSV artifact writing
//!
//! Writes the consolidated dataset to `<output_root>/<source>/consolidated-<tag>.csv`.
//! The file is first written next to its destination and then renamed, so a
//! failed run never leaves a partial artifact behind.

use crate::error::{ConsolidateError, Result};
use crate::fields::format_duration_ms;
use crate::models::ConsolidatedDataset;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Writer for the consolidated artifact
#[derive(Debug)]
pub struct CsvOutputWriter {
    output_path: PathBuf,
}

impl CsvOutputWriter {
    pub fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Sibling file the artifact is written to before being moved into place
    pub fn temp_path(&self) -> PathBuf {
        self.output_path.with_extension("csv.tmp")
    }

    /// Remove a temporary file left by an interrupted write; returns whether
    /// one existed
    pub async fn discard_partial(&self) -> Result<bool> {
        match tokio::fs::remove_file(self.temp_path()).await {
            Ok(()) => {
                warn!("Removed partial artifact {}", self.temp_path().display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the dataset, replacing any existing artifact; returns rows written
    pub async fn write(&self, dataset: &ConsolidatedDataset) -> Result<usize> {
        if let Some(parent) = self.output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        self.discard_partial().await?;

        let mut frame = render_durations(&dataset.frame)?;
        let temp_path = self.temp_path();

        let write_result = (|| -> Result<()> {
            let mut file = File::create(&temp_path)?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut frame)
                .map_err(|e| self.failed(format!("CSV serialization failed: {}", e)))?;
            file.sync_all()?;
            Ok(())
        })();

        if let Err(e) = write_result {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e);
        }

        tokio::fs::rename(&temp_path, &self.output_path)
            .await
            .map_err(|e| self.failed(format!("failed to move artifact into place: {}", e)))?;

        debug!(
            "Wrote {} rows to {}",
            frame.height(),
            self.output_path.display()
        );
        Ok(frame.height())
    }

    fn failed(&self, reason: String) -> ConsolidateError {
        ConsolidateError::OutputFailed {
            path: self.output_path.clone(),
            reason,
        }
    }
}

/// Replace duration columns with `HH:MM:SS` strings
fn render_durations(frame: &DataFrame) -> Result<DataFrame> {
    let mut rendered = frame.clone();

    for column in frame.get_columns() {
        let DataType::Duration(unit) = column.dtype() else {
            continue;
        };
        let per_milli = match unit {
            TimeUnit::Nanoseconds => 1_000_000,
            TimeUnit::Microseconds => 1_000,
            TimeUnit::Milliseconds => 1,
        };

        let physical = column.as_materialized_series().to_physical_repr();
        let text: StringChunked = physical
            .i64()?
            .into_iter()
            .map(|value| value.map(|v| format_duration_ms(v / per_milli)))
            .collect();

        rendered.replace(
            column.name().as_str(),
            text.with_name(column.name().clone()).into_series(),
        )?;
    }

    Ok(rendered)
}
