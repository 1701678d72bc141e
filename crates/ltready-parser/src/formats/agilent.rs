use crate::errors::ParserError;
use crate::model::{normalize_label, CycleTable, ParsedSample, TIME_COLUMN};
use crate::registry::SampleParser;

use super::{ensure_unique_columns, parse_optional_f64, parse_timestamp, ChannelName};

/// Parser for Agilent 8900 MassHunter per-sample CSV exports.
///
/// Layout (only the first tab-separated cell of each line is meaningful):
///
/// ```text
/// 0  D:\MassHunter\DATA\run.b\Sample_01.d      acquisition path
/// 1  Intensity Vs Time,CPS
/// 2  Acquired      : 04/05/2021 10:15:30 ...   status line
/// 3  Time [Sec],7Li,43Ca,...                   comma-packed header
/// .. comma-packed data rows
/// n  Printed:...                               footer
/// ```
pub struct AgilentParser;

impl Default for AgilentParser {
    fn default() -> Self {
        Self
    }
}

impl AgilentParser {
    const NAME: &'static str = "AGILENT";

    const PATH_ROW: usize = 0;
    const STATUS_ROW: usize = 2;
    const HEADER_ROW: usize = 3;
    const DATE_TOKEN: usize = 7;
    const TIME_TOKEN: usize = 8;

    fn sample_label(path_cell: &str) -> Result<String, ParserError> {
        let file_name = path_cell
            .rsplit(['\\', '/'])
            .next()
            .unwrap_or_default();
        let stem = file_name.split('.').next().unwrap_or_default();
        let label = normalize_label(&stem.replace('_', "-"));

        if label.is_empty() {
            return Err(ParserError::FormatMismatch {
                parser: Self::NAME,
                reason: format!("no sample name in acquisition path '{path_cell}'"),
            });
        }
        Ok(label)
    }

    fn timestamp_text(status_line: &str) -> Result<String, ParserError> {
        let tokens: Vec<&str> = status_line.split(' ').collect();
        match (tokens.get(Self::DATE_TOKEN), tokens.get(Self::TIME_TOKEN)) {
            (Some(date), Some(time)) => Ok(format!("{date} {time}")),
            _ => Err(ParserError::FormatMismatch {
                parser: Self::NAME,
                reason: format!(
                    "status line has {} tokens, expected at least {}",
                    tokens.len(),
                    Self::TIME_TOKEN + 1
                ),
            }),
        }
    }

    fn rename_columns(raw: &[&str]) -> Result<Vec<String>, ParserError> {
        let columns = raw
            .iter()
            .map(|header| {
                ChannelName::parse(header)
                    .map(|name| name.to_string())
                    .ok_or_else(|| ParserError::InvalidHeader {
                        parser: Self::NAME,
                        row_index: Self::HEADER_ROW,
                        message: format!("cannot derive a channel name from '{}'", header.trim()),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if !columns.iter().any(|name| name == TIME_COLUMN) {
            return Err(ParserError::InvalidHeader {
                parser: Self::NAME,
                row_index: Self::HEADER_ROW,
                message: format!("no '{TIME_COLUMN}' column in {columns:?}"),
            });
        }
        ensure_unique_columns(Self::NAME, Self::HEADER_ROW, &columns)?;
        Ok(columns)
    }

    fn parse_block(block: &[&str]) -> Result<CycleTable, ParserError> {
        let rows: Vec<Vec<&str>> = block.iter().map(|line| line.split(',').collect()).collect();
        let (header, data) = rows.split_first().ok_or(ParserError::FormatMismatch {
            parser: Self::NAME,
            reason: "file missing column header row".to_string(),
        })?;

        for (row_idx, row) in data.iter().enumerate() {
            if row.len() != header.len() {
                return Err(ParserError::FormatMismatch {
                    parser: Self::NAME,
                    reason: format!(
                        "data row {} has {} fields but the header has {}",
                        Self::HEADER_ROW + 1 + row_idx,
                        row.len(),
                        header.len()
                    ),
                });
            }
        }

        // a trailing comma leaves a nameless column with no values
        let keep: Vec<usize> = (0..header.len())
            .filter(|&idx| {
                !header[idx].trim().is_empty() || data.iter().any(|row| !row[idx].trim().is_empty())
            })
            .collect();

        let raw_columns: Vec<&str> = keep.iter().map(|&idx| header[idx]).collect();
        let columns = Self::rename_columns(&raw_columns)?;

        let mut table = CycleTable::new(columns);
        for (row_idx, row) in data.iter().enumerate() {
            let line_index = Self::HEADER_ROW + 1 + row_idx;
            let mut values = Vec::with_capacity(keep.len());
            for (pos, &idx) in keep.iter().enumerate() {
                let column = &table.columns()[pos];
                values.push(parse_optional_f64(Self::NAME, row[idx], line_index, column)?);
            }
            table.push_row(values);
        }

        if table.height() == 0 {
            return Err(ParserError::EmptyData { parser: Self::NAME });
        }

        Ok(table)
    }
}

impl SampleParser for AgilentParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(&self, content: &str) -> Result<ParsedSample, ParserError> {
        let cells: Vec<&str> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.split('\t').next().unwrap_or_default().trim_end())
            .collect();

        // path, title, status, header, footer
        if cells.len() < Self::HEADER_ROW + 2 {
            return Err(ParserError::FormatMismatch {
                parser: Self::NAME,
                reason: format!(
                    "expected at least {} non-blank lines, found {}",
                    Self::HEADER_ROW + 2,
                    cells.len()
                ),
            });
        }

        let sample_label = Self::sample_label(cells[Self::PATH_ROW])?;
        let timestamp_text = Self::timestamp_text(cells[Self::STATUS_ROW])?;
        let timestamp = parse_timestamp(Self::NAME, &timestamp_text)?;
        let table = Self::parse_block(&cells[Self::HEADER_ROW..cells.len() - 1])?;

        Ok(ParsedSample {
            timestamp,
            sample_label,
            table,
        })
    }
}
