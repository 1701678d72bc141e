use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ltready_core::{ConfigFile, CsvSheetSink, RunReport, TracingProgress};
use ltready_parser::{parse_sample_file, VendorMode};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Merge ICP-MS sample exports into a LaserTRAM-ready table", long_about = None)]
struct Cli {
    /// Emit JSON logs and a JSON summary
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge every .csv export in a directory
    Merge(MergeArgs),
    /// Parse a single export and print what was recovered
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Default)]
struct MergeArgs {
    /// Directory holding the per-sample .csv exports
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Instrument vendor: thermo or agilent
    #[arg(short, long)]
    vendor: Option<VendorMode>,

    /// Base name of the output workbook
    #[arg(short, long)]
    name: Option<String>,

    /// Write output here instead of next to the inputs
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// TOML file with defaults for any of the options above
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep numeric-looking labels as text (quoted) in the output
    #[arg(long)]
    no_strings_to_numbers: bool,
}

#[derive(Args, Debug)]
struct InspectArgs {
    file: PathBuf,

    #[arg(short, long)]
    vendor: VendorMode,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json);

    match cli.command {
        Command::Merge(args) => merge(args, cli.json),
        Command::Inspect(args) => inspect(args, cli.json),
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn merge(args: MergeArgs, json_output: bool) -> Result<()> {
    let defaults = match &args.config {
        Some(path) => ConfigFile::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ConfigFile::default(),
    };
    let flags = ConfigFile {
        input_dir: args.input_dir,
        vendor: args.vendor,
        base_name: args.name,
        output_dir: args.output_dir,
        strings_to_numbers: args.no_strings_to_numbers.then_some(false),
    };
    let config = defaults
        .merged_with(flags)
        .into_run_config()
        .context("invalid run configuration")?;

    info!(dir = %config.input_dir.display(), vendor = %config.vendor, "starting merge");
    let report = ltready_core::run(
        &config,
        &mut CsvSheetSink,
        &mut TracingProgress,
        &mut TracingProgress,
    )
    .with_context(|| format!("merge of {} failed", config.input_dir.display()))?;

    print_report(&report, json_output);
    Ok(())
}

fn print_report(report: &RunReport, json_output: bool) {
    if json_output {
        let failures: Vec<_> = report
            .failures
            .iter()
            .map(|f| {
                json!({
                    "path": f.path.display().to_string(),
                    "parser": f.error.parser(),
                    "reason": f.error.to_string(),
                })
            })
            .collect();
        let samples: Vec<_> = report
            .samples
            .iter()
            .map(|s| {
                json!({
                    "label": s.label,
                    "acquired": s.timestamp.to_string(),
                    "source": s.source_path.display().to_string(),
                    "rows": s.rows,
                })
            })
            .collect();
        let summary = json!({
            "output": report.output_path.display().to_string(),
            "succeeded": report.summary.succeeded,
            "failed": report.summary.failed,
            "rows": report.rows,
            "samples": samples,
            "failures": failures,
        });
        println!("{summary}");
        return;
    }

    println!("Samples merged: {}", report.summary.succeeded);
    for sample in &report.samples {
        println!(
            "  {}  {}  {} rows  ({})",
            sample.timestamp,
            sample.label,
            sample.rows,
            sample.source_path.display()
        );
    }
    println!("Files skipped:  {}", report.summary.failed);
    for failure in &report.failures {
        match failure.error.parser() {
            Some(parser) => println!("  {} [{parser}]: {}", failure.path.display(), failure.error),
            None => println!("  {}: {}", failure.path.display(), failure.error),
        }
    }
    println!("Rows written:   {}", report.rows);
    println!("Saved: {}", report.output_path.display());
}

fn inspect(args: InspectArgs, json_output: bool) -> Result<()> {
    let record = parse_sample_file(&args.file, args.vendor)
        .with_context(|| format!("{} is not a valid {} export", args.file.display(), args.vendor))?;

    if json_output {
        let summary = json!({
            "sample": record.sample_label,
            "timestamp": record.timestamp.to_string(),
            "columns": record.table.columns(),
            "rows": record.table.height(),
        });
        println!("{summary}");
    } else {
        println!("Sample:    {}", record.sample_label);
        println!("Acquired:  {}", record.timestamp);
        println!("Columns:   {}", record.table.columns().join(", "));
        println!("Rows:      {}", record.table.height());
    }
    Ok(())
}
