use std::path::{Path, PathBuf};

use ltready_parser::{parse_sample_file, IntermediateRecord, ParserError, VendorMode};
use tracing::{debug, info, warn};

use crate::error::{PipelineError, Result};
use crate::progress::{Phase, ProgressEvent, ProgressObserver};

/// An input file that could not be turned into a sample.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: ParserError,
}

#[derive(Debug, Default)]
pub struct BatchResult {
    pub records: Vec<IntermediateRecord>,
    pub failures: Vec<FileFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub failed_paths: Vec<PathBuf>,
}

impl BatchResult {
    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            succeeded: self.records.len(),
            failed: self.failures.len(),
            failed_paths: self.failures.iter().map(|f| f.path.clone()).collect(),
        }
    }
}

/// Lists the `.csv` files directly inside `dir`.
pub fn list_input_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = Path::new(&escaped).join("*.csv");

    let mut files = Vec::new();
    for entry in glob::glob(&pattern.to_string_lossy())? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(err) => warn!(path = %err.path().display(), "could not read directory entry: {err}"),
        }
    }
    Ok(files)
}

/// Parses every `.csv` file in `dir` with the parser for `mode`.
///
/// Files that fail to parse are collected in [`BatchResult::failures`]; only
/// an empty directory aborts the batch.
pub fn collect_batch(
    dir: &Path,
    mode: VendorMode,
    observer: &mut dyn ProgressObserver,
) -> Result<BatchResult> {
    let files = list_input_files(dir)?;
    if files.is_empty() {
        return Err(PipelineError::EmptyBatch {
            dir: dir.to_path_buf(),
        });
    }

    info!(dir = %dir.display(), files = files.len(), %mode, "collecting samples");

    let total = files.len();
    let mut batch = BatchResult::default();
    for (idx, path) in files.into_iter().enumerate() {
        match parse_sample_file(&path, mode) {
            Ok(record) => {
                debug!(
                    path = %path.display(),
                    label = %record.sample_label,
                    timestamp = %record.timestamp,
                    rows = record.table.height(),
                    "parsed sample"
                );
                batch.records.push(record);
            }
            Err(error) => {
                warn!(path = %path.display(), "skipping file: {error}");
                batch.failures.push(FileFailure { path, error });
            }
        }
        observer.on_progress(ProgressEvent::new(Phase::Extraction, idx + 1, total));
    }

    Ok(batch)
}
