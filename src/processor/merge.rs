//! Ordered merge of per-file results
//!
//! Frames are appended in discovery order; nothing is sorted, deduplicated
//! or joined. Files with different column sets align by name.

use crate::constants::{QUARTER_COLUMN, YEAR_COLUMN};
use crate::error::{ConsolidateError, Result};
use crate::models::{ConsolidatedDataset, FileOutcome, SkipReason};
use polars::prelude::*;
use std::path::PathBuf;
use tracing::debug;

/// Accumulates per-file outcomes for one data source
#[derive(Debug)]
pub struct DatasetMerger {
    source_name: String,
    frames: Vec<DataFrame>,
    skipped: Vec<(PathBuf, SkipReason)>,
}

impl DatasetMerger {
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            frames: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Append one file's outcome
    pub fn push(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Processed { file, frame } if frame.height() > 0 => {
                debug!("Merging {} rows from {}", frame.height(), file.path.display());
                self.frames.push(frame);
            }
            FileOutcome::Processed { file, .. } => {
                self.skipped.push((file.path, SkipReason::EmptyBlock));
            }
            FileOutcome::Skipped { path, reason } => {
                self.skipped.push((path, reason));
            }
        }
    }

    pub fn files_merged(&self) -> usize {
        self.frames.len()
    }

    pub fn skipped(&self) -> &[(PathBuf, SkipReason)] {
        &self.skipped
    }

    /// Concatenate everything accumulated so far
    ///
    /// Fails with `NoData` when no file contributed a row.
    pub fn finish(self) -> Result<(ConsolidatedDataset, Vec<(PathBuf, SkipReason)>)> {
        let no_data = |skipped: usize, source_name: String| ConsolidateError::NoData {
            source_name,
            files_skipped: skipped,
        };

        if self.frames.is_empty() {
            return Err(no_data(self.skipped.len(), self.source_name));
        }

        let files_merged = self.frames.len();
        let args = UnionArgs {
            to_supertypes: true,
            ..Default::default()
        };
        let lazy_frames: Vec<LazyFrame> = self.frames.into_iter().map(|f| f.lazy()).collect();
        let combined = concat_lf_diagonal(lazy_frames, args)?.collect()?;

        if combined.height() == 0 {
            return Err(no_data(self.skipped.len(), self.source_name));
        }

        let frame = move_period_columns_last(combined)?;
        debug!(
            "Merged {} rows from {} files for '{}'",
            frame.height(),
            files_merged,
            self.source_name
        );

        Ok((
            ConsolidatedDataset {
                source_name: self.source_name,
                frame,
                files_merged,
            },
            self.skipped,
        ))
    }
}

/// Columns in first-appearance order with `Year` and `Quarter` at the end
fn move_period_columns_last(frame: DataFrame) -> Result<DataFrame> {
    let mut order: Vec<PlSmallStr> = frame
        .get_column_names()
        .into_iter()
        .filter(|name| name.as_str() != YEAR_COLUMN && name.as_str() != QUARTER_COLUMN)
        .cloned()
        .collect();
    order.push(YEAR_COLUMN.into());
    order.push(QUARTER_COLUMN.into());
    Ok(frame.select(order)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Quarter, ReportingPeriod, SourceFile};

    fn processed(name: &str, quarter: Quarter, pages: &[&str], extra: Option<&str>) -> FileOutcome {
        let height = pages.len();
        let mut columns = vec![
            Column::new("Page".into(), pages.to_vec()),
            Column::new("Year".into(), vec![2023i32; height]),
            Column::new("Quarter".into(), vec![quarter.as_str(); height]),
        ];
        if let Some(extra) = extra {
            columns.push(Column::new(extra.into(), vec![1.0f64; height]));
        }

        FileOutcome::Processed {
            file: SourceFile {
                path: PathBuf::from(name),
                period: ReportingPeriod {
                    year: 2023,
                    quarter,
                },
            },
            frame: DataFrame::new(columns).unwrap(),
        }
    }

    #[test]
    fn test_appends_in_push_order() {
        let mut merger = DatasetMerger::new("site");
        merger.push(processed("b.csv", Quarter::Q2, &["/b1", "total"], None));
        merger.push(FileOutcome::Skipped {
            path: PathBuf::from("bad.csv"),
            reason: SkipReason::EmptyBlock,
        });
        merger.push(processed("a.csv", Quarter::Q1, &["/a1", "/a2", "total"], None));

        let (dataset, skipped) = merger.finish().unwrap();
        assert_eq!(dataset.files_merged, 2);
        assert_eq!(dataset.height(), 5);
        assert_eq!(skipped.len(), 1);

        let pages: Vec<Option<&str>> = dataset
            .frame
            .column("Page")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(
            pages,
            vec![Some("/b1"), Some("total"), Some("/a1"), Some("/a2"), Some("total")]
        );
    }

    #[test]
    fn test_differing_columns_align_with_period_last() {
        let mut merger = DatasetMerger::new("site");
        merger.push(processed("a.csv", Quarter::Q1, &["/a", "total"], None));
        merger.push(processed("b.csv", Quarter::Q2, &["/b", "total"], Some("Users")));

        let (dataset, _) = merger.finish().unwrap();
        let names: Vec<String> = dataset
            .frame
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, vec!["Page", "Users", "Year", "Quarter"]);

        let users: Vec<Option<f64>> = dataset
            .frame
            .column("Users")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(users, vec![None, None, Some(1.0), Some(1.0)]);
    }

    #[test]
    fn test_empty_frames_count_as_skipped() {
        let mut merger = DatasetMerger::new("site");
        merger.push(processed("a.csv", Quarter::Q1, &[], None));
        assert_eq!(merger.files_merged(), 0);
        assert_eq!(merger.skipped()[0].1, SkipReason::EmptyBlock);
    }

    #[test]
    fn test_nothing_to_merge_is_no_data() {
        let mut merger = DatasetMerger::new("site");
        merger.push(FileOutcome::Skipped {
            path: PathBuf::from("a.csv"),
            reason: SkipReason::ExtractionFailure("boom".to_string()),
        });

        match merger.finish() {
            Err(ConsolidateError::NoData {
                source_name,
                files_skipped,
            }) => {
                assert_eq!(source_name, "site");
                assert_eq!(files_skipped, 1);
            }
            other => panic!("Expected NoData error, got {:?}", other),
        }
    }
}
