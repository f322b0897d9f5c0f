//! Application constants for the analytics consolidator
//!
//! Default values for directory conventions, the fixed export layout and the
//! known-column schema.

// =============================================================================
// Directory and File Conventions
// =============================================================================

/// Root directory holding one folder per data source
pub const DEFAULT_ROOT_DIR: &str = "data";

/// Root directory for consolidated artifacts
pub const DEFAULT_OUTPUT_ROOT: &str = "output";

/// Artifact tag used when none is given
pub const DEFAULT_ARTIFACT_TAG: &str = "pages";

/// Extension of export files (case sensitive)
pub const EXPORT_FILE_EXTENSION: &str = "csv";

/// Prefix of the consolidated artifact file name
pub const ARTIFACT_PREFIX: &str = "consolidated";

// =============================================================================
// Export Layout
// =============================================================================

/// Metadata lines preceding the column header in every export
pub const METADATA_LINES: usize = 6;

/// Maximum data rows read after the header
pub const MAX_DATA_ROWS: usize = 12;

/// Thousands grouping character used in numeric fields
pub const GROUPING_CHAR: char = ',';

/// Label written over the first column of the aggregate row
pub const AGGREGATE_LABEL: &str = "total";

/// First-column value of header rows echoed into the data region
pub const ECHOED_HEADER_LABEL: &str = "Day Index";

/// UTF-8 byte-order marker
pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

// =============================================================================
// Period Columns
// =============================================================================

pub const YEAR_COLUMN: &str = "Year";
pub const QUARTER_COLUMN: &str = "Quarter";

// =============================================================================
// Known Columns
// =============================================================================

/// Columns holding percentages such as "45.67%"
pub const PERCENTAGE_COLUMNS: &[&str] = &["Bounce Rate", "% New Sessions"];

/// Columns holding durations such as "00:01:23" or "<00:00:01"
pub const DURATION_COLUMNS: &[&str] = &["Avg. Session Duration", "Avg. Time on Page"];

/// Columns holding counts or ratios, possibly with grouping characters
pub const NUMERIC_COLUMNS: &[&str] = &[
    "Users",
    "New Users",
    "Sessions",
    "Pageviews",
    "Pages / Session",
];
