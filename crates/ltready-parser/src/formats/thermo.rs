use crate::errors::ParserError;
use crate::model::{normalize_label, CycleTable, ParsedSample, TIME_COLUMN};
use crate::registry::SampleParser;

use super::{ensure_unique_columns, parse_optional_f64, parse_timestamp, read_records};

/// Parser for Thermo iCAP RQ (Qtegra) per-sample CSV exports.
///
/// The first line is a single cell `<sample name> : <acquired at>`, followed
/// by twelve further metadata lines. Line 14 holds the column header; the row
/// beneath it carries dwell times with blank cells and is discarded together
/// with any other incomplete row.
pub struct ThermoParser;

impl Default for ThermoParser {
    fn default() -> Self {
        Self
    }
}

impl ThermoParser {
    const NAME: &'static str = "THERMO";

    /// Lines preceding the column header.
    pub const HEADER_SKIP: usize = 13;

    fn split_title(title: &str) -> Result<(String, &str), ParserError> {
        let (raw_sample, timestamp_text) =
            title
                .split_once(':')
                .ok_or_else(|| ParserError::FormatMismatch {
                    parser: Self::NAME,
                    reason: format!("title cell '{title}' has no ':' separating sample and time"),
                })?;

        let sample_label = normalize_label(raw_sample);
        if sample_label.is_empty() {
            return Err(ParserError::FormatMismatch {
                parser: Self::NAME,
                reason: format!("title cell '{title}' has an empty sample name"),
            });
        }

        Ok((sample_label, timestamp_text))
    }

    fn parse_body(body: &str) -> Result<CycleTable, ParserError> {
        let mut records = read_records(Self::NAME, body)?.into_iter();

        let header = records.next().ok_or(ParserError::FormatMismatch {
            parser: Self::NAME,
            reason: "file missing column header row".to_string(),
        })?;

        // the export terminates every row with a comma, leaving an empty last column
        let width = header.len().saturating_sub(1);
        let columns: Vec<String> = header
            .iter()
            .take(width)
            .map(|name| name.trim().to_string())
            .collect();

        if !columns.iter().any(|name| name == TIME_COLUMN) {
            return Err(ParserError::InvalidHeader {
                parser: Self::NAME,
                row_index: Self::HEADER_SKIP,
                message: format!("no '{TIME_COLUMN}' column in {columns:?}"),
            });
        }
        ensure_unique_columns(Self::NAME, Self::HEADER_SKIP, &columns)?;

        let mut table = CycleTable::new(columns);
        for (row_idx, record) in records.enumerate() {
            let line_index = Self::HEADER_SKIP + 1 + row_idx;
            let mut row = Vec::with_capacity(width);
            for idx in 0..width {
                let value = record.get(idx).unwrap_or("");
                let column = &table.columns()[idx];
                // unreadable cells count as missing, which drops the row
                let parsed = parse_optional_f64(Self::NAME, value, line_index, column)
                    .ok()
                    .flatten();
                row.push(parsed);
            }

            if row.iter().all(Option::is_some) {
                table.push_row(row);
            }
        }

        if table.height() == 0 {
            return Err(ParserError::EmptyData { parser: Self::NAME });
        }

        Ok(table)
    }
}

impl SampleParser for ThermoParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(&self, content: &str) -> Result<ParsedSample, ParserError> {
        let lines: Vec<&str> = content.lines().collect();
        if lines.len() <= Self::HEADER_SKIP {
            return Err(ParserError::FormatMismatch {
                parser: Self::NAME,
                reason: format!(
                    "expected more than {} lines, found {}",
                    Self::HEADER_SKIP,
                    lines.len()
                ),
            });
        }

        let title_record = read_records(Self::NAME, lines[0])?;
        let title = title_record
            .first()
            .and_then(|record| record.get(0))
            .unwrap_or_default();
        let (sample_label, timestamp_text) = Self::split_title(title)?;
        let timestamp = parse_timestamp(Self::NAME, timestamp_text)?;

        let body = lines[Self::HEADER_SKIP..].join("\n");
        let table = Self::parse_body(&body)?;

        Ok(ParsedSample {
            timestamp,
            sample_label,
            table,
        })
    }
}
