//! Positional repair of extracted blocks
//!
//! Exports end their data region with an aggregate row whose label is wrong
//! and a trailing artifact row, and may echo the header row ("Day Index")
//! inside the data. Repair is positional, not heuristic:
//!
//! 1. the first column of the second-to-last row becomes the aggregate label
//! 2. the last row is dropped
//! 3. rows whose first column equals the echoed header label are dropped

use super::extraction::RawRecordBlock;
use crate::config::ExtractionConfig;
use crate::error::{ConsolidateError, Result};
use polars::prelude::*;
use tracing::debug;

/// Repair one block; blocks with fewer than two rows cannot be repaired
pub fn repair_block(block: RawRecordBlock, config: &ExtractionConfig) -> Result<RawRecordBlock> {
    let RawRecordBlock { file, frame } = block;
    let height = frame.height();

    if height < 2 {
        return Err(ConsolidateError::ExtractionFailure {
            path: file.path.clone(),
            reason: format!("insufficient rows for repair: {} (need at least 2)", height),
        });
    }

    let label_column = frame.get_columns()[0].name().clone();
    let labels = frame
        .column(label_column.as_str())?
        .cast(&DataType::String)?;
    let labels = labels.str()?;

    let aggregate_row = height - 2;
    let relabeled: StringChunked = labels
        .into_iter()
        .take(height - 1)
        .enumerate()
        .map(|(i, label)| {
            if i == aggregate_row {
                Some(config.aggregate_label.as_str())
            } else {
                label
            }
        })
        .collect();
    let relabeled = relabeled.with_name(label_column.clone());

    let keep: BooleanChunked = relabeled
        .into_iter()
        .map(|label| label != Some(config.echoed_header_label.as_str()))
        .collect();

    let mut repaired = frame.slice(0, height - 1);
    repaired.replace(label_column.as_str(), relabeled.into_series())?;
    let repaired = repaired.filter(&keep)?;

    debug!(
        "Repaired {}: {} rows -> {} rows",
        file.path.display(),
        height,
        repaired.height()
    );

    Ok(RawRecordBlock {
        file,
        frame: repaired,
    })
}
