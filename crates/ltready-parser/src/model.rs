use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::{ParserError, UnknownVendorMode};

/// Name of the elapsed-time column every sample table carries.
pub const TIME_COLUMN: &str = "Time";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorMode {
    Thermo,
    Agilent,
}

impl VendorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            VendorMode::Thermo => "thermo",
            VendorMode::Agilent => "agilent",
        }
    }
}

impl fmt::Display for VendorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VendorMode {
    type Err = UnknownVendorMode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "thermo" => Ok(VendorMode::Thermo),
            "agilent" => Ok(VendorMode::Agilent),
            _ => Err(UnknownVendorMode(value.to_string())),
        }
    }
}

/// One sample's per-cycle time series.
///
/// Rows are stored in acquisition order; each row holds one cell per column
/// and a `None` cell marks a missing value. Tables never contain a row whose
/// cells are all missing.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
}

impl CycleTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a table from row-major data, dropping rows with no values.
    pub fn from_rows(
        columns: Vec<String>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, ParserError> {
        let mut table = Self::new(columns);
        for (row_index, row) in rows.into_iter().enumerate() {
            if row.len() != table.width() {
                return Err(ParserError::RowWidth {
                    row_index,
                    expected: table.width(),
                    found: row.len(),
                });
            }
            table.push_row(row);
        }
        Ok(table)
    }

    pub(crate) fn push_row(&mut self, row: Vec<Option<f64>>) {
        debug_assert_eq!(row.len(), self.columns.len());
        if row.iter().any(Option::is_some) {
            self.rows.push(row);
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn column_values(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// Channel columns, i.e. everything except the time axis.
    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(|name| *name != TIME_COLUMN)
    }
}

/// Output of a single header parser run.
#[derive(Debug, Clone)]
pub struct ParsedSample {
    pub timestamp: NaiveDateTime,
    pub sample_label: String,
    pub table: CycleTable,
}

/// A parsed sample tagged with the file it came from.
#[derive(Debug, Clone)]
pub struct IntermediateRecord {
    pub timestamp: NaiveDateTime,
    pub sample_label: String,
    pub source_path: PathBuf,
    pub table: CycleTable,
}

impl IntermediateRecord {
    pub fn from_parsed(parsed: ParsedSample, source_path: impl Into<PathBuf>) -> Self {
        Self {
            timestamp: parsed.timestamp,
            sample_label: parsed.sample_label,
            source_path: source_path.into(),
            table: parsed.table,
        }
    }
}

/// Trims a raw sample name and replaces each interior whitespace character
/// with an underscore.
pub fn normalize_label(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|ch| if ch.is_whitespace() { '_' } else { ch })
        .collect()
}
