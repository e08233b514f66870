//! Process command - extract the line-item table of a single invoice PDF.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use nfx_core::{DocumentExtractor, Table, COLUMNS};

use super::config::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: <name>_extracted.<ext> in the current directory)
    #[arg(short, long, conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Print the table instead of writing a file
    #[arg(long)]
    stdout: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Semicolon-delimited CSV with a header row
    Csv,
    /// JSON object with a "rows" array
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Reading PDF...");

    let data = fs::read(&args.input)?;
    let filename = file_name(&args.input);

    pb.set_message("Extracting line items...");
    let extractor = DocumentExtractor::from_config(&config)?;
    let table = extractor.extract_document(&data, &filename)?;

    pb.finish_and_clear();

    let output = format_table(&table, args.format)?;

    if args.stdout {
        print!("{}", output);
    } else {
        let output_path = args
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(&args.input, args.format));
        fs::write(&output_path, &output)?;
        eprintln!(
            "{} Extracted {} rows, saved to {}",
            style("✓").green(),
            table.len(),
            output_path.display()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Filename used for invoice-code lookup.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn default_output_path(input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "invoice".to_string());
    PathBuf::from(format!("{}_extracted.{}", stem, format.extension()))
}

/// Render a table in the requested format.
pub fn format_table(table: &Table, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Csv => format_csv(table),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(table)?),
    }
}

fn format_csv(table: &Table) -> anyhow::Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(vec![]);

    wtr.write_record(COLUMNS)?;
    for row in table {
        wtr.write_record(row.values())?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}
