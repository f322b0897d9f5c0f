//! Column type normalization
//!
//! Coerces the known columns of a repaired block to clean scalar types and
//! tags every row with the file's reporting period. Bad values never fail
//! the file: they are substituted and reported to the diagnostic sink.
//! Columns outside the schema keep their text, except that cells holding a
//! thousands-grouped number lose their grouping characters.

use super::extraction::RawRecordBlock;
use crate::config::{ColumnKind, ColumnSchema};
use crate::constants::{QUARTER_COLUMN, YEAR_COLUMN};
use crate::diagnostics::{Diagnostic, DiagnosticSink, Resolution};
use crate::error::{ConsolidateError, Result};
use crate::fields::{
    grouped_number_pattern, parse_duration, parse_grouped_number, parse_percentage,
    strip_grouping,
};
use polars::prelude::*;
use regex::Regex;
use tracing::{debug, warn};

/// Applies the known-column schema to repaired blocks
#[derive(Debug, Clone)]
pub struct FieldNormalizer<'a> {
    schema: &'a ColumnSchema,
    grouping: char,
    grouped: Regex,
}

impl<'a> FieldNormalizer<'a> {
    pub fn new(schema: &'a ColumnSchema, grouping: char) -> Result<Self> {
        let grouped = grouped_number_pattern(grouping).map_err(|e| {
            ConsolidateError::Configuration {
                message: format!("invalid grouping character '{}': {}", grouping, e),
            }
        })?;
        Ok(Self {
            schema,
            grouping,
            grouped,
        })
    }

    /// Normalize a block and append `Year` and `Quarter`
    pub fn normalize(&self, block: RawRecordBlock, sink: &mut DiagnosticSink) -> Result<DataFrame> {
        let RawRecordBlock { file, mut frame } = block;
        let file_name = file.file_name();

        let names: Vec<PlSmallStr> = frame
            .get_column_names()
            .into_iter()
            .cloned()
            .collect();

        for name in names {
            let column = frame.column(name.as_str())?;
            let Some(kind) = self.schema.kind_of(name.as_str()) else {
                if let Some(plain) = self.ungroup_text(column)? {
                    debug!("Removed grouping from column '{}' in {}", name, file_name);
                    frame.replace(name.as_str(), plain)?;
                }
                continue;
            };

            let coerced = match kind {
                ColumnKind::Percentage => {
                    self.coerce_float(column, &file_name, sink, |v| parse_percentage(v, self.grouping))?
                }
                ColumnKind::Numeric => {
                    self.coerce_float(column, &file_name, sink, |v| {
                        parse_grouped_number(v, self.grouping)
                    })?
                }
                ColumnKind::Duration => match self.coerce_duration(column, &file_name, sink)? {
                    Some(series) => series,
                    None => continue,
                },
            };

            debug!("Normalized column '{}' as {:?} in {}", name, kind, file_name);
            frame.replace(name.as_str(), coerced)?;
        }

        for period_column in [YEAR_COLUMN, QUARTER_COLUMN] {
            if frame.get_column_index(period_column).is_some() {
                warn!(
                    "{} already has a '{}' column; replacing it with the file period",
                    file_name, period_column
                );
            }
        }

        let height = frame.height();
        frame.with_column(Series::new(
            YEAR_COLUMN.into(),
            vec![file.period.year; height],
        ))?;
        frame.with_column(Series::new(
            QUARTER_COLUMN.into(),
            vec![file.period.quarter.as_str(); height],
        ))?;

        Ok(frame)
    }

    /// Coerce a column to `Float64`; unparsable strings become null
    fn coerce_float(
        &self,
        column: &Column,
        file_name: &str,
        sink: &mut DiagnosticSink,
        parse: impl Fn(&str) -> Option<f64>,
    ) -> Result<Series> {
        let series = column.as_materialized_series();
        if series.dtype() != &DataType::String {
            return Ok(series.cast(&DataType::Float64)?);
        }

        let values: Vec<Option<f64>> = series
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, raw)| match non_empty(raw) {
                None => None,
                Some(value) => {
                    let parsed = parse(value);
                    if parsed.is_none() {
                        sink.record(diagnostic(file_name, series.name(), row, value, Resolution::Missing));
                    }
                    parsed
                }
            })
            .collect();

        Ok(Series::new(series.name().clone(), values))
    }

    /// Rewrite cells that are entirely a grouped number ("2,000") as plain
    /// digits; other text is left as is. `None` when nothing matched.
    fn ungroup_text(&self, column: &Column) -> Result<Option<Series>> {
        if column.dtype() != &DataType::String {
            return Ok(None);
        }

        let series = column.as_materialized_series();
        let values = series.str()?;
        let is_grouped = |raw: &str| self.grouped.is_match(raw.trim());
        if !values.into_iter().flatten().any(is_grouped) {
            return Ok(None);
        }

        let plain: StringChunked = values
            .into_iter()
            .map(|raw| {
                raw.map(|value| {
                    if is_grouped(value) {
                        strip_grouping(value.trim(), self.grouping)
                    } else {
                        value.to_string()
                    }
                })
            })
            .collect();

        Ok(Some(plain.with_name(series.name().clone()).into_series()))
    }

    /// Coerce a column to `Duration(ms)`; returns `None` for columns that
    /// already carry a duration type
    fn coerce_duration(
        &self,
        column: &Column,
        file_name: &str,
        sink: &mut DiagnosticSink,
    ) -> Result<Option<Series>> {
        if matches!(column.dtype(), DataType::Duration(_)) {
            return Ok(None);
        }

        let series = column.as_materialized_series().cast(&DataType::String)?;
        let millis: Vec<i64> = series
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, raw)| match non_empty(raw) {
                None => 0,
                Some(value) => match parse_duration(value) {
                    Some(duration) => duration.num_milliseconds(),
                    None => {
                        sink.record(diagnostic(
                            file_name,
                            series.name(),
                            row,
                            value,
                            Resolution::ZeroDuration,
                        ));
                        0
                    }
                },
            })
            .collect();

        let durations = Int64Chunked::from_vec(series.name().clone(), millis)
            .into_duration(TimeUnit::Milliseconds);
        Ok(Some(durations.into_series()))
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty())
}

fn diagnostic(
    file_name: &str,
    column: &PlSmallStr,
    row: usize,
    raw_value: &str,
    resolution: Resolution,
) -> Diagnostic {
    Diagnostic {
        file: file_name.to_string(),
        column: column.to_string(),
        row,
        raw_value: raw_value.to_string(),
        resolution,
    }
}
