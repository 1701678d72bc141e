use std::path::PathBuf;

use tracing::{info, warn};

use crate::collector::{collect_batch, BatchSummary, FileFailure};
use crate::config::RunConfig;
use crate::error::{PipelineError, Result};
use crate::merge::{merge_records, MergeOptions, MergedSample};
use crate::ordering::order_chronologically;
use crate::output::{OutputBundle, WorkbookSink};
use crate::progress::ProgressObserver;

/// Outcome of a successful run.
#[derive(Debug)]
pub struct RunReport {
    pub output_path: PathBuf,
    pub summary: BatchSummary,
    pub failures: Vec<FileFailure>,
    pub rows: usize,
    /// Merged samples in output order.
    pub samples: Vec<MergedSample>,
}

impl RunReport {
    pub fn sample_labels(&self) -> Vec<&str> {
        self.samples.iter().map(|s| s.label.as_str()).collect()
    }
}

/// Collects, orders and merges every sample in `config.input_dir`, then hands
/// the two-sheet workbook to `sink`.
///
/// Each phase reports to its own observer. Files that fail to parse are
/// listed in the report; schema mismatches and empty batches abort the run
/// before anything reaches the sink.
pub fn run(
    config: &RunConfig,
    sink: &mut dyn WorkbookSink,
    extraction: &mut dyn ProgressObserver,
    merging: &mut dyn ProgressObserver,
) -> Result<RunReport> {
    config.validate()?;

    let batch = collect_batch(&config.input_dir, config.vendor, extraction)?;
    let summary = batch.summary();
    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "metadata extraction finished"
    );

    if batch.records.is_empty() {
        return Err(PipelineError::NoParsedFiles {
            failures: batch.failures,
        });
    }
    for failure in &batch.failures {
        warn!(path = %failure.path.display(), "excluded from output: {}", failure.error);
    }

    let records = order_chronologically(batch.records);
    let first_input = records[0].source_path.clone();

    let merged = merge_records(&records, MergeOptions::for_vendor(config.vendor), merging)?;
    let rows = merged.height();
    let samples = merged.samples.clone();

    let bundle = OutputBundle::assemble(
        merged,
        &config.base_name,
        config.vendor,
        &first_input,
        config.output_dir.as_deref(),
    );
    info!(path = %bundle.target.path().display(), rows, "saving spreadsheet");
    let output_path = sink.write(&bundle, &config.sink)?;

    Ok(RunReport {
        output_path,
        summary,
        failures: batch.failures,
        rows,
        samples,
    })
}
