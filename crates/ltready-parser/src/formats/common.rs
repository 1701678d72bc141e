use std::collections::HashSet;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::errors::ParserError;

/// Date-time layouts tried in order. Slashed dates are read month-first.
static DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%d-%b-%Y %H:%M:%S",
    "%b %d %Y %H:%M:%S",
    "%B %d, %Y %I:%M:%S %p",
    "%B %d, %Y %H:%M:%S",
    "%A, %B %d, %Y %I:%M:%S %p",
    "%A, %B %d, %Y %H:%M:%S",
    "%H:%M:%S %m/%d/%Y",
    "%H:%M %m/%d/%Y",
    "%I:%M:%S %p %m/%d/%Y",
    "%H:%M:%S %Y-%m-%d",
    "%H:%M:%S %d.%m.%Y",
];

static DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y", "%B %d, %Y"];

/// Parses a timestamp embedded in free header text.
///
/// Leading colons and surrounding whitespace are ignored, as are repeated
/// interior spaces. Date-only text resolves to midnight. Two-digit years land
/// in the century closest to the current year.
pub(crate) fn parse_timestamp(parser: &'static str, text: &str) -> Result<NaiveDateTime, ParserError> {
    let cleaned = text.trim().trim_start_matches(':').trim();
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    if cleaned.is_empty() {
        return Err(ParserError::Timestamp {
            parser,
            value: text.to_string(),
        });
    }

    let parsed = match_layouts(&cleaned).ok_or_else(|| ParserError::Timestamp {
        parser,
        value: cleaned.clone(),
    })?;

    pivot_short_year(parsed, Local::now().year()).ok_or(ParserError::Timestamp {
        parser,
        value: cleaned,
    })
}

fn match_layouts(cleaned: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(cleaned) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(cleaned, fmt).ok())
        .find_map(|date| date.and_hms_opt(0, 0, 0))
}

/// `%Y` accepts `21` as year 21; move such years to within fifty years of
/// `current_year`.
fn pivot_short_year(dt: NaiveDateTime, current_year: i32) -> Option<NaiveDateTime> {
    let year = dt.year();
    if !(0..100).contains(&year) {
        return Some(dt);
    }

    let mut resolved = year + current_year / 100 * 100;
    if resolved >= current_year + 50 {
        resolved -= 100;
    } else if resolved < current_year - 50 {
        resolved += 100;
    }
    dt.with_year(resolved)
}

pub(crate) fn read_records(parser: &'static str, content: &str) -> Result<Vec<StringRecord>, ParserError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    reader
        .records()
        .map(|record| record.map_err(|source| ParserError::Csv { parser, source }))
        .collect()
}

/// Parses a numeric cell. Blank and `NaN` cells are missing values.
pub(crate) fn parse_optional_f64(
    parser: &'static str,
    value: &str,
    line_index: usize,
    column: &str,
) -> Result<Option<f64>, ParserError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }

    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|err| ParserError::DataRow {
            parser,
            line_index,
            message: format!("failed to parse column '{column}' as float: {err}"),
        })
}

pub(crate) fn ensure_unique_columns(
    parser: &'static str,
    row_index: usize,
    columns: &[String],
) -> Result<(), ParserError> {
    let mut seen = HashSet::with_capacity(columns.len());
    for column in columns {
        if !seen.insert(column.as_str()) {
            return Err(ParserError::InvalidHeader {
                parser,
                row_index,
                message: format!("duplicate column '{column}'"),
            });
        }
    }
    Ok(())
}
