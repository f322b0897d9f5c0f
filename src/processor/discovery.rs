//! File discovery module for data sources
//!
//! Lists the export files of one data source and infers each file's
//! reporting period from its name.

use crate::constants::EXPORT_FILE_EXTENSION;
use crate::error::{ConsolidateError, Result};
use crate::models::{SkipReason, SourceFile, file_name_of};
use crate::period::infer_period;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// File discovery component for one data source
///
/// Data sources follow this structure:
/// ```text
/// <root>/
///   <source>/
///     Pages 20230101-20230331.csv
///     Pages 20230401-20230630.csv
/// ```
#[derive(Debug)]
pub struct FileDiscovery {
    source_path: PathBuf,
}

impl FileDiscovery {
    /// Create a new file discovery instance
    pub fn new(source_path: PathBuf) -> Self {
        Self { source_path }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Discover all export files in the source directory
    ///
    /// Files are returned sorted by name so that the merge order does not
    /// depend on the platform's directory listing order.
    pub async fn discover_csv_files(&self) -> Result<Vec<PathBuf>> {
        match fs::metadata(&self.source_path).await {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => {
                return Err(ConsolidateError::DirectoryNotFound {
                    path: self.source_path.clone(),
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConsolidateError::DirectoryNotFound {
                    path: self.source_path.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        debug!("Searching for CSV files in: {}", self.source_path.display());

        let mut files = Vec::new();
        let mut dir = fs::read_dir(&self.source_path).await?;

        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && is_csv_file(&path) {
                files.push(path);
            }
        }

        if files.is_empty() {
            return Err(ConsolidateError::EmptyInput {
                path: self.source_path.clone(),
            });
        }

        files.sort_by_key(|path| file_name_of(path));
        debug!("Found {} CSV files", files.len());

        Ok(files)
    }
}

/// Attach a reporting period to a discovered file
pub fn resolve_source_file(path: &Path) -> std::result::Result<SourceFile, SkipReason> {
    let file_name = file_name_of(path);
    match infer_period(&file_name) {
        Ok(period) => Ok(SourceFile {
            path: path.to_path_buf(),
            period,
        }),
        Err(e) => {
            warn!("Skipping {}: {}", path.display(), e);
            let reason = match e {
                ConsolidateError::MalformedFilename { reason, .. } => reason,
                other => other.to_string(),
            };
            Err(SkipReason::MalformedFilename(reason))
        }
    }
}

/// Check if a path is an export file
pub(crate) fn is_csv_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == EXPORT_FILE_EXTENSION)
}
