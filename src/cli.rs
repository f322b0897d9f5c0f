//! Command-line interface components.

use crate::config::ConsolidatorConfig;
use crate::constants::DEFAULT_ARTIFACT_TAG;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "analytics-consolidator")]
#[command(about = "Consolidate quarterly web-analytics CSV exports into one dataset per source")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Name of the data source folder under the root (optional - will list sources if not provided)
    #[arg(value_name = "SOURCE")]
    pub source: Option<String>,

    /// Directory holding one folder per data source
    #[arg(short, long, default_value = crate::constants::DEFAULT_ROOT_DIR)]
    pub root: PathBuf,

    /// Directory receiving consolidated artifacts
    #[arg(short, long, default_value = crate::constants::DEFAULT_OUTPUT_ROOT)]
    pub output_root: PathBuf,

    /// Artifact tag: output is written to consolidated-<TAG>.csv
    #[arg(short, long, default_value = DEFAULT_ARTIFACT_TAG)]
    pub tag: String,

    /// Discovery mode: list files and inferred periods then exit (no output written)
    #[arg(long)]
    pub discovery_only: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Build the run configuration from the arguments
    pub fn to_config(&self) -> ConsolidatorConfig {
        let config = ConsolidatorConfig::default()
            .with_root_dir(self.root.clone())
            .with_output_root(self.output_root.clone());

        if self.discovery_only {
            config.with_discovery_only()
        } else {
            config
        }
    }
}

/// Data source discovery and selection functionality
pub mod source_discovery {
    use crate::processor::discovery::is_csv_file;
    use anyhow::{Context, Result};
    use colored::*;
    use std::io::{self, Write};
    use std::path::{Path, PathBuf};

    #[derive(Debug, Clone)]
    pub struct DiscoveredSource {
        pub name: String,
        pub path: PathBuf,
        pub size_estimate: String,
    }

    /// Discover data source folders (directories holding export files)
    pub fn discover_sources(root_dir: &Path) -> Result<Vec<DiscoveredSource>> {
        if !root_dir.exists() {
            anyhow::bail!("Source root directory not found at {}", root_dir.display());
        }

        let mut sources = Vec::new();

        for entry in std::fs::read_dir(root_dir).context("Failed to read root directory")? {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if !path.is_dir() {
                continue;
            }

            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string();

            if let Some(size_estimate) = estimate_source_size(&path)? {
                sources.push(DiscoveredSource {
                    name,
                    path,
                    size_estimate,
                });
            }
        }

        // Sort by name for consistent ordering
        sources.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(sources)
    }

    /// Count export files directly inside a source folder; `None` if there are none
    fn estimate_source_size(source_path: &Path) -> Result<Option<String>> {
        let mut total_files = 0;
        let mut total_size = 0u64;

        for entry in walkdir::WalkDir::new(source_path).max_depth(1) {
            let entry = entry.context("Failed to walk directory")?;
            if entry.file_type().is_file() && is_csv_file(entry.path()) {
                total_files += 1;
                if let Ok(metadata) = entry.metadata() {
                    total_size += metadata.len();
                }
            }
        }

        if total_files == 0 {
            return Ok(None);
        }

        Ok(Some(format!(
            "{} files, ~{}",
            total_files,
            format_size(total_size)
        )))
    }

    fn format_size(total_size: u64) -> String {
        if total_size > 1_000_000_000 {
            format!("{:.1} GB", total_size as f64 / 1_000_000_000.0)
        } else if total_size > 1_000_000 {
            format!("{:.1} MB", total_size as f64 / 1_000_000.0)
        } else if total_size > 1_000 {
            format!("{:.1} KB", total_size as f64 / 1_000.0)
        } else {
            format!("{} bytes", total_size)
        }
    }

    /// Present sources to the user and get their selection
    pub fn select_source(sources: &[DiscoveredSource]) -> Result<&DiscoveredSource> {
        if sources.is_empty() {
            anyhow::bail!("No data sources with CSV exports found under the root directory.");
        }

        println!("{}", "Available data sources:".bright_green().bold());
        println!();

        for (i, source) in sources.iter().enumerate() {
            println!(
                "  {}. {} {}",
                (i + 1).to_string().bright_yellow().bold(),
                source.name.bright_cyan(),
                format!("({})", source.size_estimate).bright_black()
            );
        }

        println!();
        print!("{}", "Select source to consolidate (number): ".bright_white());
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut input = String::new();
        io::stdin()
            .read_line(&mut input)
            .context("Failed to read user input")?;

        let selection = parse_selection(&input, sources.len())?;
        Ok(&sources[selection - 1])
    }

    fn parse_selection(input: &str, count: usize) -> Result<usize> {
        let selection: usize = input
            .trim()
            .parse()
            .context("Please enter a valid number")?;

        if selection == 0 || selection > count {
            anyhow::bail!(
                "Invalid selection. Please choose a number between 1 and {}",
                count
            );
        }

        Ok(selection)
    }

}
