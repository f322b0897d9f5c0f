//! Integration tests for export consolidation through the public API
//!
//! Builds a source folder in the standard export layout and checks the
//! consolidated artifact end to end.

use analytics_consolidator::{ConsolidateError, ConsolidatorConfig, Quarter, consolidate};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const METADATA_LINES: [&str; 6] = [
    "# ----------------------------------------",
    "# All Web Site Data",
    "# Pages",
    "# 20230101-20230630",
    "# ----------------------------------------",
    "",
];

/// Export with 12 data lines: 10 pages, the aggregate row and the artifact row
fn write_export(dir: &Path, name: &str) {
    let mut lines: Vec<String> = METADATA_LINES.iter().map(|l| l.to_string()).collect();
    lines.push("Page,Pageviews,Sessions,Bounce Rate,Avg. Session Duration".to_string());
    for i in 1..=10 {
        lines.push(format!("/page-{},\"{},500\",{},40.00%,00:02:00", i, i, i));
    }
    lines.push(",\"55,000\",55,40.00%,00:02:00".to_string());
    lines.push(",,,,".to_string());

    let mut content = vec![0xEF, 0xBB, 0xBF];
    content.extend_from_slice(lines.join("\r\n").as_bytes());
    fs::write(dir.join(name), content).unwrap();
}

fn config(temp_dir: &TempDir) -> ConsolidatorConfig {
    ConsolidatorConfig::default()
        .with_root_dir(temp_dir.path().join("data"))
        .with_output_root(temp_dir.path().join("output"))
        .without_progress()
}

/// Two quarterly exports produce 22 rows tagged Q1 then Q2
#[tokio::test]
async fn test_consolidate_two_quarters() {
    let temp_dir = TempDir::new().unwrap();
    let source_dir = temp_dir.path().join("data").join("example.com");
    fs::create_dir_all(&source_dir).unwrap();
    write_export(&source_dir, "Pages 20230101-20230331.csv");
    write_export(&source_dir, "Pages 20230401-20230630.csv");

    let report = consolidate(config(&temp_dir), "example.com", "pages")
        .await
        .expect("consolidation should succeed");

    let dataset = report.dataset.expect("dataset should be present");
    assert_eq!(dataset.height(), 22);
    assert_eq!(dataset.files_merged, 2);

    let quarters: Vec<Option<&str>> = dataset
        .frame
        .column("Quarter")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .collect();
    assert!(quarters[..11].iter().all(|q| *q == Some(Quarter::Q1.as_str())));
    assert!(quarters[11..].iter().all(|q| *q == Some(Quarter::Q2.as_str())));

    let output = temp_dir
        .path()
        .join("output")
        .join("example.com")
        .join("consolidated-pages.csv");
    assert_eq!(report.stats.output_path, output);

    let content = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 23);
    assert_eq!(
        lines[0],
        "Page,Pageviews,Sessions,Bounce Rate,Avg. Session Duration,Year,Quarter"
    );
    assert!(lines[11].starts_with("total,"));
    assert!(lines[11].ends_with(",00:02:00,2023,Q1"));
    assert!(lines[22].starts_with("total,"));
}

/// A run where no file yields data fails without writing an artifact
#[tokio::test]
async fn test_no_data_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let source_dir = temp_dir.path().join("data").join("broken");
    fs::create_dir_all(&source_dir).unwrap();
    fs::write(source_dir.join("Pages 20230101-20230331.csv"), "truncated").unwrap();

    let result = consolidate(config(&temp_dir), "broken", "pages").await;

    assert!(matches!(result, Err(ConsolidateError::NoData { .. })));
    assert!(!temp_dir.path().join("output").join("broken").join("consolidated-pages.csv").exists());
}
