use analytics_consolidator::cli::{Args, source_discovery};
use analytics_consolidator::processor::writer::CsvOutputWriter;
use analytics_consolidator::{ConsolidationReport, Consolidator};
use clap::Parser;
use colored::*;
use std::process;
use tracing::Level;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    // Resolve the source, asking the user when none was given
    let source_name = match &args.source {
        Some(name) => name.clone(),
        None => {
            let selected = source_discovery::discover_sources(&args.root).and_then(|sources| {
                source_discovery::select_source(&sources).map(|source| source.name.clone())
            });
            match selected {
                Ok(name) => name,
                Err(error) => {
                    eprintln!("Error: {:#}", error);
                    process::exit(1);
                }
            }
        }
    };

    let consolidator = match Consolidator::new(args.to_config()) {
        Ok(consolidator) => consolidator,
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    };

    // Create async runtime and run the consolidation with signal handling
    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    println!(
        "{} {}",
        "Consolidating data source".bright_green().bold(),
        source_name.bright_white().bold()
    );

    let result = runtime.block_on(async {
        tokio::select! {
            result = consolidator.consolidate(&source_name, &args.tag) => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        }
    });

    match result {
        Some(Ok(report)) => {
            print_summary(&report, consolidator.config().discovery_only);
            process::exit(0);
        }
        Some(Err(error)) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
        None => {
            eprintln!("\nReceived CTRL+C, stopping without writing output");
            let writer = CsvOutputWriter::new(
                consolidator
                    .config()
                    .artifact_path(&source_name, &args.tag),
            );
            if let Err(error) = runtime.block_on(writer.discard_partial()) {
                eprintln!(
                    "Could not remove partial artifact {}: {}",
                    writer.temp_path().display(),
                    error
                );
            }
            process::exit(1);
        }
    }
}

/// Print the run summary
fn print_summary(report: &ConsolidationReport, discovery_only: bool) {
    let stats = &report.stats;

    if discovery_only {
        println!("\n{}", "Discovered export files".bright_green().bold());
        for file in &report.discovered {
            println!(
                "  {} {}",
                file.period.to_string().bright_cyan(),
                file.file_name()
            );
        }
    }

    for (path, reason) in &report.skipped {
        println!(
            "  {} {} ({})",
            "Skipped:".bright_red(),
            path.display(),
            reason
        );
    }

    if discovery_only {
        return;
    }

    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}/{}",
        "Files processed:".bright_cyan(),
        stats.files_processed.to_string().bright_white(),
        stats.files_discovered
    );
    if stats.files_skipped > 0 {
        println!(
            "  {} {}",
            "Files skipped:".bright_red(),
            stats.files_skipped.to_string().bright_red().bold()
        );
    }
    if !report.diagnostics.is_empty() {
        println!(
            "  {} {}",
            "Values substituted:".bright_yellow(),
            report.diagnostics.len().to_string().bright_yellow()
        );
    }
    println!(
        "  {} {}",
        "Total rows:".bright_cyan(),
        stats.total_rows.to_string().bright_white().bold()
    );
    println!(
        "  {} {}",
        "Output:".bright_cyan(),
        stats.output_path.display()
    );
}
