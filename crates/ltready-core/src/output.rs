use std::fs::File;
use std::path::{Path, PathBuf};

use ltready_parser::VendorMode;
use polars::prelude::*;
use tracing::info;

use crate::error::SinkError;
use crate::merge::MergedTable;

pub const BUFFER_SHEET: &str = "Buffer";
pub const BLANK_SHEET: &str = "Sheet1";

/// Appended to the run's base name for both vendors.
pub const OUTPUT_SUFFIX: &str = "_LT_ready.xlsx";

#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub df: DataFrame,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub directory: PathBuf,
    pub file_name: String,
}

impl OutputTarget {
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

pub fn output_file_name(base_name: &str, mode: VendorMode) -> String {
    match mode {
        VendorMode::Thermo | VendorMode::Agilent => format!("{base_name}{OUTPUT_SUFFIX}"),
    }
}

/// The workbook handed to a sink: the merged `Buffer` sheet followed by the
/// blank `Sheet1` that LaserTRAM expects.
#[derive(Debug, Clone)]
pub struct OutputBundle {
    pub sheets: Vec<Sheet>,
    pub target: OutputTarget,
}

impl OutputBundle {
    /// Output goes next to the first input file unless `output_dir` is given.
    pub fn assemble(
        merged: MergedTable,
        base_name: &str,
        mode: VendorMode,
        first_input: &Path,
        output_dir: Option<&Path>,
    ) -> Self {
        let directory = output_dir
            .map(Path::to_path_buf)
            .or_else(|| first_input.parent().map(Path::to_path_buf))
            .unwrap_or_default();

        Self {
            sheets: vec![
                Sheet {
                    name: BUFFER_SHEET.to_string(),
                    df: merged.df,
                },
                Sheet {
                    name: BLANK_SHEET.to_string(),
                    df: DataFrame::empty(),
                },
            ],
            target: OutputTarget {
                directory,
                file_name: output_file_name(base_name, mode),
            },
        }
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkOptions {
    /// Store numeric-looking text as numbers instead of strings.
    pub strings_to_numbers: bool,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            strings_to_numbers: true,
        }
    }
}

/// Persists a finished workbook. Returns the path that was written.
pub trait WorkbookSink {
    fn write(&mut self, bundle: &OutputBundle, options: &SinkOptions) -> Result<PathBuf, SinkError>;
}

/// Keeps bundles in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub written: Vec<(OutputBundle, SinkOptions)>,
}

impl WorkbookSink for MemorySink {
    fn write(&mut self, bundle: &OutputBundle, options: &SinkOptions) -> Result<PathBuf, SinkError> {
        self.written.push((bundle.clone(), *options));
        Ok(bundle.target.path())
    }
}

/// Writes each sheet as `<target stem>.<sheet>.csv` in the target directory
/// and reports the `Buffer` file as the written path.
///
/// Text cells are quoted only when `strings_to_numbers` is off, so a label
/// such as `612` reads back as a number unless told otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvSheetSink;

impl CsvSheetSink {
    pub fn sheet_path(target: &OutputTarget, sheet: &str) -> PathBuf {
        let stem = Path::new(&target.file_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| target.file_name.clone());
        target.directory.join(format!("{stem}.{sheet}.csv"))
    }

    fn quote_style(options: &SinkOptions) -> QuoteStyle {
        if options.strings_to_numbers {
            QuoteStyle::Necessary
        } else {
            QuoteStyle::NonNumeric
        }
    }
}

impl WorkbookSink for CsvSheetSink {
    fn write(&mut self, bundle: &OutputBundle, options: &SinkOptions) -> Result<PathBuf, SinkError> {
        std::fs::create_dir_all(&bundle.target.directory).map_err(|source| SinkError::Io {
            path: bundle.target.directory.clone(),
            source,
        })?;

        for sheet in &bundle.sheets {
            let path = Self::sheet_path(&bundle.target, &sheet.name);
            let mut file = File::create(&path).map_err(|source| SinkError::Io {
                path: path.clone(),
                source,
            })?;
            let mut df = sheet.df.clone();
            // the blank sheet stays an empty file
            if df.width() > 0 {
                CsvWriter::new(&mut file)
                    .include_header(true)
                    .with_quote_style(Self::quote_style(options))
                    .finish(&mut df)?;
            }
            info!(sheet = %sheet.name, path = %path.display(), rows = df.height(), "wrote sheet");
        }

        Ok(Self::sheet_path(&bundle.target, BUFFER_SHEET))
    }
}
