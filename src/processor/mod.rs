//! Main consolidation engine.
//!
//! Orchestrates the per-source workflow: discovery, per-file extraction,
//! repair and normalization, ordered merge and artifact writing. Files are
//! processed one after another in discovery order; a failure inside one file
//! is turned into a skipped outcome and never stops the batch.

pub mod discovery;
pub mod extraction;
pub mod merge;
pub mod normalize;
pub mod repair;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::{
    discovery::{FileDiscovery, resolve_source_file},
    extraction::RecordExtractor,
    merge::DatasetMerger,
    normalize::FieldNormalizer,
    repair::repair_block,
    writer::CsvOutputWriter,
};

use crate::config::ConsolidatorConfig;
use crate::diagnostics::DiagnosticSink;
use crate::error::{ConsolidateError, Result};
use crate::models::{ConsolidationReport, FileOutcome, ProcessingStats, SkipReason, SourceFile};

use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::DataFrame;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, warn};

/// Main processor for export consolidation
#[derive(Debug)]
pub struct Consolidator {
    config: ConsolidatorConfig,
    extractor: RecordExtractor,
}

impl Consolidator {
    /// Create a new consolidator; the configuration is validated up front
    pub fn new(config: ConsolidatorConfig) -> Result<Self> {
        config.validate()?;
        let extractor = RecordExtractor::new(config.extraction.clone());
        Ok(Self { config, extractor })
    }

    pub fn config(&self) -> &ConsolidatorConfig {
        &self.config
    }

    /// Consolidate every export of `source_name` and write
    /// `consolidated-<artifact_tag>.csv`
    pub async fn consolidate(
        &self,
        source_name: &str,
        artifact_tag: &str,
    ) -> Result<ConsolidationReport> {
        let start_time = Instant::now();
        let output_path = self.config.artifact_path(source_name, artifact_tag);

        // Step 1: Discover export files
        let discovery = FileDiscovery::new(self.config.source_dir(source_name));
        let paths = discovery.discover_csv_files().await?;
        debug!(
            "Discovered {} files in {}",
            paths.len(),
            discovery.source_path().display()
        );

        // Step 2: Discovery-only mode stops after period inference
        if self.config.discovery_only {
            let mut discovered = Vec::new();
            let mut skipped = Vec::new();
            for path in &paths {
                match resolve_source_file(path) {
                    Ok(file) => discovered.push(file),
                    Err(reason) => skipped.push((path.clone(), reason)),
                }
            }

            return Ok(ConsolidationReport {
                dataset: None,
                stats: ProcessingStats {
                    files_discovered: paths.len(),
                    files_processed: 0,
                    files_skipped: skipped.len(),
                    total_rows: 0,
                    output_path,
                    processing_time_ms: start_time.elapsed().as_millis(),
                },
                discovered,
                skipped,
                diagnostics: Vec::new(),
            });
        }

        // Step 3: Process files sequentially in discovery order
        let progress = self.progress_bar(paths.len());
        let mut sink = DiagnosticSink::new();
        let mut merger = DatasetMerger::new(source_name);
        let mut discovered = Vec::new();

        for path in &paths {
            if let Some(file_name) = path.file_name() {
                progress.set_message(format!("Processing: {}", file_name.to_string_lossy()));
            }

            let outcome = self.process_file(path, &mut sink).await;
            if let FileOutcome::Processed { file, .. } = &outcome {
                discovered.push(file.clone());
            }
            merger.push(outcome);
            progress.inc(1);
        }
        progress.finish_with_message("All export files processed");

        // Step 4: Merge; fails with NoData when nothing survived
        let (dataset, skipped) = merger.finish()?;

        // Step 5: Write artifact
        let writer = CsvOutputWriter::new(output_path.clone());
        let total_rows = writer.write(&dataset).await?;

        let stats = ProcessingStats {
            files_discovered: paths.len(),
            files_processed: dataset.files_merged,
            files_skipped: skipped.len(),
            total_rows,
            output_path,
            processing_time_ms: start_time.elapsed().as_millis(),
        };

        Ok(ConsolidationReport {
            dataset: Some(dataset),
            stats,
            discovered,
            skipped,
            diagnostics: sink.into_records(),
        })
    }

    /// Process one discovered file into a per-file outcome
    ///
    /// Never returns an error: every file-level failure becomes `Skipped`.
    pub async fn process_file(&self, path: &Path, sink: &mut DiagnosticSink) -> FileOutcome {
        let file = match resolve_source_file(path) {
            Ok(file) => file,
            Err(reason) => {
                return FileOutcome::Skipped {
                    path: path.to_path_buf(),
                    reason,
                };
            }
        };

        match self.process_source_file(&file, sink).await {
            Ok(Some(frame)) => {
                debug!("Successfully processed: {}", path.display());
                FileOutcome::Processed { file, frame }
            }
            Ok(None) => {
                warn!("Skipped file (no data): {}", path.display());
                FileOutcome::Skipped {
                    path: file.path,
                    reason: SkipReason::EmptyBlock,
                }
            }
            Err(e) => {
                error!("Failed to process {}: {:#}", path.display(), e);
                let reason = match e {
                    ConsolidateError::ExtractionFailure { reason, .. } => reason,
                    other => other.to_string(),
                };
                FileOutcome::Skipped {
                    path: file.path,
                    reason: SkipReason::ExtractionFailure(reason),
                }
            }
        }
    }

    /// Extract, repair and normalize one file
    async fn process_source_file(
        &self,
        file: &SourceFile,
        sink: &mut DiagnosticSink,
    ) -> Result<Option<DataFrame>> {
        let Some(block) = self.extractor.extract(file).await? else {
            return Ok(None);
        };

        let repaired = repair_block(block, &self.config.extraction)?;
        let normalizer =
            FieldNormalizer::new(&self.config.columns, self.config.extraction.grouping_char)?;
        let frame = normalizer.normalize(repaired, sink)?;

        Ok(Some(frame))
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

/// Consolidate one data source with the given configuration
pub async fn consolidate(
    config: ConsolidatorConfig,
    source_name: &str,
    artifact_tag: &str,
) -> Result<ConsolidationReport> {
    Consolidator::new(config)?
        .consolidate(source_name, artifact_tag)
        .await
}
