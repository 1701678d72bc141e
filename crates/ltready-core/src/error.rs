// crates/ltready-core/src/error.rs

use std::path::PathBuf;

use thiserror::Error;

use crate::collector::FileFailure;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no .csv files found in {}", dir.display())]
    EmptyBatch { dir: PathBuf },

    #[error("none of the {} input files could be parsed", failures.len())]
    NoParsedFiles { failures: Vec<FileFailure> },

    #[error(
        "sample '{label}' has columns {found:?} but '{reference_label}' has {expected:?}"
    )]
    SchemaMismatch {
        reference_label: String,
        label: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("failed to write output: {0}")]
    Sink(#[from] SinkError),

    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("File I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
