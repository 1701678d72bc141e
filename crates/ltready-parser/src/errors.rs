use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn one export file into a sample. Every variant is scoped to a
/// single file; the batch collector records these rather than aborting.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("{parser} format mismatch: {reason}")]
    FormatMismatch {
        parser: &'static str,
        reason: String,
    },

    #[error("{parser} header row {row_index} invalid: {message}")]
    InvalidHeader {
        parser: &'static str,
        row_index: usize,
        message: String,
    },

    #[error("{parser} CSV error: {source}")]
    Csv {
        parser: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{parser} data row {line_index} invalid: {message}")]
    DataRow {
        parser: &'static str,
        line_index: usize,
        message: String,
    },

    #[error("{parser} could not parse timestamp '{value}'")]
    Timestamp { parser: &'static str, value: String },

    #[error("{parser} file did not contain any data rows")]
    EmptyData { parser: &'static str },

    #[error("row {row_index} has {found} cells but the table has {expected} columns")]
    RowWidth {
        row_index: usize,
        expected: usize,
        found: usize,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ParserError {
    /// Timestamp failures are a subtype of format failures; callers that want
    /// to single them out in a summary can ask here.
    pub fn is_timestamp_error(&self) -> bool {
        matches!(self, ParserError::Timestamp { .. })
    }

    pub fn parser(&self) -> Option<&'static str> {
        match self {
            ParserError::FormatMismatch { parser, .. }
            | ParserError::InvalidHeader { parser, .. }
            | ParserError::Csv { parser, .. }
            | ParserError::DataRow { parser, .. }
            | ParserError::Timestamp { parser, .. }
            | ParserError::EmptyData { parser } => Some(parser),
            ParserError::RowWidth { .. } | ParserError::Io { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown vendor mode '{0}' (expected 'thermo' or 'agilent')")]
pub struct UnknownVendorMode(pub String);
