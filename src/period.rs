//! Reporting period inference from export filenames.
//!
//! Export files are named like `Pages 20230101-20230331.csv`: the last
//! whitespace-delimited token carries the date range and the start date
//! decides the (year, quarter) the file belongs to.

use crate::error::{ConsolidateError, Result};
use crate::models::{Quarter, ReportingPeriod};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

fn start_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{8}$").expect("static pattern is valid"))
}

/// Infer the reporting period of an export from its filename
pub fn infer_period(file_name: &str) -> Result<ReportingPeriod> {
    let malformed = |reason: &str| ConsolidateError::MalformedFilename {
        file_name: file_name.to_string(),
        reason: reason.to_string(),
    };

    let token = file_name
        .split_whitespace()
        .last()
        .ok_or_else(|| malformed("empty filename"))?;
    let range = token.strip_suffix(".csv").unwrap_or(token);
    let start = range.split('-').next().unwrap_or(range);

    if !start_date_pattern().is_match(start) {
        return Err(malformed(&format!(
            "expected YYYYMMDD start date, found '{}'",
            start
        )));
    }

    let date = NaiveDate::parse_from_str(start, "%Y%m%d")
        .map_err(|e| malformed(&format!("invalid start date '{}': {}", start, e)))?;
    let quarter = Quarter::from_month(date.month()).ok_or_else(|| malformed("month out of range"))?;

    Ok(ReportingPeriod {
        year: date.year(),
        quarter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(year: i32, quarter: Quarter) -> ReportingPeriod {
        ReportingPeriod { year, quarter }
    }

    #[test]
    fn test_quarter_boundaries() {
        assert_eq!(
            infer_period("Pages 20230115-20230331.csv").unwrap(),
            period(2023, Quarter::Q1)
        );
        assert_eq!(
            infer_period("Pages 20230401-20230630.csv").unwrap(),
            period(2023, Quarter::Q2)
        );
        assert_eq!(
            infer_period("Pages 20220701-20220930.csv").unwrap(),
            period(2022, Quarter::Q3)
        );
        assert_eq!(
            infer_period("Pages 20211231-20211231.csv").unwrap(),
            period(2021, Quarter::Q4)
        );
    }

    #[test]
    fn test_only_last_token_counts() {
        // Earlier tokens that look like dates are ignored
        assert_eq!(
            infer_period("Analytics 20190101 All Web Site Data Pages 20200401-20200630.csv")
                .unwrap(),
            period(2020, Quarter::Q2)
        );
    }

    #[test]
    fn test_without_csv_suffix_or_range() {
        assert_eq!(
            infer_period("Pages 20231001-20231231").unwrap(),
            period(2023, Quarter::Q4)
        );
        assert_eq!(
            infer_period("20230501.csv").unwrap(),
            period(2023, Quarter::Q2)
        );
    }

    #[test]
    fn test_malformed_filenames() {
        for name in [
            "",
            "Pages.csv",
            "Pages 2023-01-01.csv",
            "Pages 2023011-20230331.csv",
            "Pages 20231301-20231331.csv",
            "Pages 20230230-20230331.csv",
            "Pages x20230101-20230331.csv",
        ] {
            match infer_period(name) {
                Err(ConsolidateError::MalformedFilename { file_name, .. }) => {
                    assert_eq!(file_name, name);
                }
                other => panic!("Expected MalformedFilename for '{}', got {:?}", name, other),
            }
        }
    }
}
