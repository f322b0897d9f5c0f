//! Pipeline tests for the processor module
//!
//! Tests the complete consolidation workflow using temporary source folders.


use crate::config::ConsolidatorConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Six metadata lines as written at the top of every export
pub const METADATA: &str = "# ----------------------------------------
# All Web Site Data
# Pages
# 20230101-20230331
# ----------------------------------------

";

pub const HEADER: &str =
    "Page,Pageviews,Users,Bounce Rate,Avg. Session Duration,Pages / Session,Entrances";

/// Twelve data lines: ten pages, the mislabeled aggregate row and the
/// trailing artifact row
pub fn data_lines(tag: &str) -> Vec<String> {
    let mut lines: Vec<String> = (1..=10)
        .map(|i| {
            format!(
                "/{}/page-{},\"1,{:03}\",{},{}.25%,00:0{}:1{},2.{}0,\"2,000\"",
                tag,
                i,
                i,
                i * 10,
                i,
                i % 10,
                i % 10,
                i % 10
            )
        })
        .collect();
    lines.push(",\"10,055\",550,55.00%,<00:00:01,2.50,\"20,000\"".to_string());
    lines.push("Day Index,Pageviews".to_string());
    lines
}

/// Full export content with the standard layout
pub fn export_content(tag: &str) -> String {
    let mut content = format!("{}{}\n", METADATA, HEADER);
    for line in data_lines(tag) {
        content.push_str(&line);
        content.push('\n');
    }
    content
}

/// Create `<root>/<source>` containing the given files
pub fn create_source(temp_dir: &TempDir, source: &str, files: &[(&str, String)]) -> PathBuf {
    let source_path = temp_dir.path().join("data").join(source);
    fs::create_dir_all(&source_path).unwrap();
    for (name, content) in files {
        fs::write(source_path.join(name), content).unwrap();
    }
    source_path
}

/// Configuration rooted in the temporary directory
pub fn test_config(temp_dir: &TempDir) -> ConsolidatorConfig {
    ConsolidatorConfig::default()
        .with_root_dir(temp_dir.path().join("data"))
        .with_output_root(temp_dir.path().join("output"))
        .without_progress()
}

pub fn artifact(temp_dir: &TempDir, source: &str, tag: &str) -> PathBuf {
    temp_dir
        .path()
        .join("output")
        .join(source)
        .join(format!("consolidated-{}.csv", tag))
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| l.to_string())
        .collect()
}
