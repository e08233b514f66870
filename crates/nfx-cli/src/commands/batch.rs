//! Batch processing command for multiple invoice files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use nfx_core::extract::aggregate;
use nfx_core::{DocumentExtractor, Table};

use super::config::load_config;
use super::process::{file_name, format_table, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output file for the combined table (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format for the combined table
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Also write a per-file summary CSV
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    table: Option<Table>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files = expand_pattern(&args.input)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let extractor = Arc::new(DocumentExtractor::from_config(&config)?);
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));

    let mut handles = Vec::with_capacity(files.len());
    for path in files {
        let permit = semaphore.clone().acquire_owned().await?;
        let extractor = Arc::clone(&extractor);

        handles.push(tokio::task::spawn_blocking(move || {
            let file_start = Instant::now();
            let result = process_single_file(&path, &extractor);
            drop(permit);

            let processing_time_ms = file_start.elapsed().as_millis() as u64;
            match result {
                Ok(table) => ProcessResult {
                    path,
                    table: Some(table),
                    error: None,
                    processing_time_ms,
                },
                Err(e) => ProcessResult {
                    path,
                    table: None,
                    error: Some(e.to_string()),
                    processing_time_ms,
                },
            }
        }));
    }

    // Await in submission order so the combined table follows the input order
    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let result = handle.await?;
        progress.inc(1);

        if let Some(error_msg) = &result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                progress.abandon();
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                anyhow::bail!("Processing failed: {}", error_msg);
            }
        }
        results.push(result);
    }

    progress.finish_and_clear();

    let table = aggregate(results.iter().filter_map(|r| r.table.clone()));
    let output = format_table(&table, args.format)?;

    match &args.output {
        Some(path) => {
            fs::write(path, &output)?;
            debug!("Wrote combined table to {}", path.display());
            eprintln!(
                "{} {} rows saved to {}",
                style("✓").green(),
                table.len(),
                path.display()
            );
        }
        None => print!("{}", output),
    }

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for result in &failed {
            eprintln!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Expand a glob pattern into the PDF files it matches, sorted by path.
fn expand_pattern(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = glob(pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && is_pdf(p))
        .collect();
    files.sort();
    Ok(files)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

fn process_single_file(path: &Path, extractor: &DocumentExtractor) -> anyhow::Result<Table> {
    let data = fs::read(path)?;
    let table = extractor.extract_document(&data, &file_name(path))?;
    Ok(table)
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::WriterBuilder::new().delimiter(b';').from_path(path)?;

    wtr.write_record(["filename", "status", "rows", "processing_time_ms", "error"])?;

    for result in results {
        let filename = file_name(&result.path);
        let processing_time = result.processing_time_ms.to_string();

        match &result.table {
            Some(table) => wtr.write_record([
                filename.as_str(),
                "success",
                &table.len().to_string(),
                &processing_time,
                "",
            ])?,
            None => wtr.write_record([
                filename.as_str(),
                "error",
                "0",
                &processing_time,
                result.error.as_deref().unwrap_or(""),
            ])?,
        }
    }

    wtr.flush()?;
    Ok(())
}
