//! Analytics Consolidator Library
//!
//! Consolidates quarterly web-analytics CSV exports into a single normalized
//! dataset per data source.
//!
//! This library provides tools for:
//! - Discovering export files and inferring their reporting period from the filename
//! - Extracting the fixed-offset tabular block out of each export
//! - Repairing the mislabeled aggregate row, trailing artifact row and echoed headers
//! - Coercing percentage, duration and grouped numeric columns to clean types
//! - Merging every file in discovery order and writing one CSV artifact

pub mod cli;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod fields;
pub mod models;
pub mod period;
pub mod processor;

// Re-export commonly used types
pub use config::ConsolidatorConfig;
pub use error::{ConsolidateError, Result};
pub use models::{ConsolidatedDataset, ConsolidationReport, Quarter, ReportingPeriod};
pub use processor::{Consolidator, consolidate};
