use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use ltready_parser::{IntermediateRecord, VendorMode, TIME_COLUMN};
use polars::prelude::*;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::progress::{Phase, ProgressEvent, ProgressObserver};

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const SAMPLE_LABEL_COLUMN: &str = "SampleLabel";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeOptions {
    /// Append an all-null row after each sample's block.
    pub separator_rows: bool,
    /// Factor applied to the `Time` column once every sample is merged.
    pub time_scale: f64,
}

impl MergeOptions {
    /// Seconds to milliseconds for both vendors; only Thermo output is
    /// delimited with blank rows.
    pub fn for_vendor(mode: VendorMode) -> Self {
        Self {
            separator_rows: matches!(mode, VendorMode::Thermo),
            time_scale: 1000.0,
        }
    }
}

/// Where a sample landed in the merged table.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedSample {
    pub label: String,
    pub timestamp: NaiveDateTime,
    pub source_path: PathBuf,
    pub rows: usize,
}

#[derive(Debug, Clone)]
pub struct MergedTable {
    pub df: DataFrame,
    pub samples: Vec<MergedSample>,
}

impl MergedTable {
    pub fn height(&self) -> usize {
        self.df.height()
    }
}

struct MergedColumns {
    timestamp: Vec<Option<i64>>,
    sample_label: Vec<Option<String>>,
    channels: Vec<(String, Vec<Option<f64>>)>,
}

impl MergedColumns {
    fn new(schema: &[String], capacity: usize) -> Self {
        Self {
            timestamp: Vec::with_capacity(capacity),
            sample_label: Vec::with_capacity(capacity),
            channels: schema
                .iter()
                .map(|name| (name.clone(), Vec::with_capacity(capacity)))
                .collect(),
        }
    }

    fn push_record(&mut self, record: &IntermediateRecord, positions: &[usize]) {
        let micros = record.timestamp.and_utc().timestamp_micros();
        for row in record.table.rows() {
            self.timestamp.push(Some(micros));
            self.sample_label.push(Some(record.sample_label.clone()));
            for ((_, values), &pos) in self.channels.iter_mut().zip(positions) {
                values.push(row[pos]);
            }
        }
    }

    fn push_separator(&mut self) {
        self.timestamp.push(None);
        self.sample_label.push(None);
        for (_, values) in self.channels.iter_mut() {
            values.push(None);
        }
    }

    fn rescale(&mut self, column: &str, factor: f64) {
        if let Some((_, values)) = self.channels.iter_mut().find(|(name, _)| name == column) {
            for value in values.iter_mut().flatten() {
                *value *= factor;
            }
        }
    }

    fn into_dataframe(self) -> Result<DataFrame> {
        let ts_series = Series::new(TIMESTAMP_COLUMN.into(), self.timestamp)
            .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;
        let labels: Vec<Option<&str>> = self.sample_label.iter().map(|v| v.as_deref()).collect();

        let mut cols: Vec<Column> = Vec::with_capacity(self.channels.len() + 2);
        cols.push(ts_series.into());
        cols.push(Series::new(SAMPLE_LABEL_COLUMN.into(), labels).into());
        for (name, values) in self.channels {
            cols.push(Series::new(name.as_str().into(), values).into());
        }

        Ok(DataFrame::new(cols)?)
    }
}

/// Position of each reference column inside `record`'s table, or a schema
/// mismatch when the channel sets differ.
fn align_schema(
    reference: &IntermediateRecord,
    record: &IntermediateRecord,
) -> Result<Vec<usize>> {
    let expected: BTreeSet<&str> = reference.table.columns().iter().map(String::as_str).collect();
    let found: BTreeSet<&str> = record.table.columns().iter().map(String::as_str).collect();

    if expected != found {
        return Err(PipelineError::SchemaMismatch {
            reference_label: reference.sample_label.clone(),
            label: record.sample_label.clone(),
            expected: reference.table.columns().to_vec(),
            found: record.table.columns().to_vec(),
        });
    }

    Ok(reference
        .table
        .columns()
        .iter()
        .filter_map(|name| record.table.column_index(name))
        .collect())
}

/// Folds chronologically ordered records into one table.
///
/// Each sample's rows are prefixed with its timestamp and label. The `Time`
/// column is rescaled once, after every sample has been appended. A record
/// whose channel set differs from the first record's aborts the merge.
pub fn merge_records(
    records: &[IntermediateRecord],
    options: MergeOptions,
    observer: &mut dyn ProgressObserver,
) -> Result<MergedTable> {
    let reference = records.first().ok_or(PipelineError::NoParsedFiles {
        failures: Vec::new(),
    })?;

    let capacity: usize = records
        .iter()
        .map(|r| r.table.height() + usize::from(options.separator_rows))
        .sum();
    let mut columns = MergedColumns::new(reference.table.columns(), capacity);
    let mut samples = Vec::with_capacity(records.len());

    let total = records.len();
    for (idx, record) in records.iter().enumerate() {
        let positions = align_schema(reference, record)?;
        columns.push_record(record, &positions);
        if options.separator_rows {
            columns.push_separator();
        }

        debug!(label = %record.sample_label, rows = record.table.height(), "merged sample");
        samples.push(MergedSample {
            label: record.sample_label.clone(),
            timestamp: record.timestamp,
            source_path: record.source_path.clone(),
            rows: record.table.height(),
        });
        observer.on_progress(ProgressEvent::new(Phase::Merge, idx + 1, total));
    }

    columns.rescale(TIME_COLUMN, options.time_scale);
    let df = columns.into_dataframe()?;

    Ok(MergedTable { df, samples })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{NoProgress, ProgressRecorder};
    use ltready_parser::CycleTable;

    fn record(label: &str, hour: u32, columns: &[&str], rows: usize) -> IntermediateRecord {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let data = (0..rows)
            .map(|r| {
                columns
                    .iter()
                    .enumerate()
                    .map(|(c, _)| Some(r as f64 * 0.5 + c as f64))
                    .collect()
            })
            .collect();
        IntermediateRecord {
            timestamp: chrono::NaiveDate::from_ymd_opt(2021, 4, 5)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            sample_label: label.to_string(),
            source_path: format!("{label}.csv").into(),
            table: CycleTable::from_rows(columns, data).unwrap(),
        }
    }

    #[test]
    fn thermo_merge_adds_one_separator_per_sample() {
        let records = vec![
            record("A", 9, &["Time", "Rb85"], 3),
            record("B", 10, &["Time", "Rb85"], 2),
        ];
        let merged = merge_records(
            &records,
            MergeOptions::for_vendor(VendorMode::Thermo),
            &mut NoProgress,
        )
        .unwrap();

        assert_eq!(merged.height(), 3 + 2 + 2);
        let labels = merged.df.column(SAMPLE_LABEL_COLUMN).unwrap().str().unwrap();
        assert_eq!(labels.get(0), Some("A"));
        assert_eq!(labels.get(3), None);
        assert_eq!(labels.get(4), Some("B"));
        assert_eq!(labels.get(6), None);

        let rb = merged.df.column("Rb85").unwrap().f64().unwrap();
        assert_eq!(rb.get(3), None);
    }

    #[test]
    fn agilent_merge_has_no_separators() {
        let records = vec![
            record("A", 9, &["Time", "Rb85"], 3),
            record("B", 10, &["Time", "Rb85"], 2),
        ];
        let merged = merge_records(
            &records,
            MergeOptions::for_vendor(VendorMode::Agilent),
            &mut NoProgress,
        )
        .unwrap();

        assert_eq!(merged.height(), 5);
        let labels = merged.df.column(SAMPLE_LABEL_COLUMN).unwrap().str().unwrap();
        assert!(labels.into_iter().all(|label| label.is_some()));
    }

    #[test]
    fn leading_columns_precede_channels_and_time_is_scaled() {
        let records = vec![record("A", 9, &["Time", "Sr88"], 2)];
        let merged = merge_records(
            &records,
            MergeOptions::for_vendor(VendorMode::Agilent),
            &mut NoProgress,
        )
        .unwrap();

        let names: Vec<&str> = merged
            .df
            .get_column_names()
            .into_iter()
            .map(|name| name.as_str())
            .collect();
        assert_eq!(names, vec!["timestamp", "SampleLabel", "Time", "Sr88"]);

        let time = merged.df.column("Time").unwrap().f64().unwrap();
        assert_eq!(time.get(0), Some(0.0));
        assert_eq!(time.get(1), Some(500.0));
        let sr = merged.df.column("Sr88").unwrap().f64().unwrap();
        assert_eq!(sr.get(1), Some(1.5));
    }

    #[test]
    fn reordered_columns_are_realigned() {
        let records = vec![
            record("A", 9, &["Time", "Rb85", "Sr88"], 1),
            record("B", 10, &["Sr88", "Time", "Rb85"], 1),
        ];
        let merged = merge_records(
            &records,
            MergeOptions::for_vendor(VendorMode::Agilent),
            &mut NoProgress,
        )
        .unwrap();

        // B's first cell (index 0) belongs to Sr88
        let sr = merged.df.column("Sr88").unwrap().f64().unwrap();
        assert_eq!(sr.get(1), Some(0.0));
        let time = merged.df.column("Time").unwrap().f64().unwrap();
        assert_eq!(time.get(1), Some(1000.0));
    }

    #[test]
    fn differing_channel_sets_fail_the_merge() {
        let records = vec![
            record("A", 9, &["Time", "Rb85", "Sr88"], 2),
            record("B", 10, &["Time", "Rb85"], 2),
        ];
        let err = merge_records(
            &records,
            MergeOptions::for_vendor(VendorMode::Thermo),
            &mut NoProgress,
        )
        .expect_err("schema mismatch expected");

        match err {
            PipelineError::SchemaMismatch {
                reference_label,
                label,
                expected,
                found,
            } => {
                assert_eq!(reference_label, "A");
                assert_eq!(label, "B");
                assert_eq!(expected, vec!["Time", "Rb85", "Sr88"]);
                assert_eq!(found, vec!["Time", "Rb85"]);
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn merge_reports_progress_per_sample() {
        let records = vec![
            record("A", 9, &["Time"], 1),
            record("B", 10, &["Time"], 1),
            record("C", 11, &["Time"], 1),
        ];
        let mut recorder = ProgressRecorder::new();
        merge_records(
            &records,
            MergeOptions::for_vendor(VendorMode::Thermo),
            &mut recorder,
        )
        .unwrap();

        let indices: Vec<usize> = recorder.events().iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert!(recorder.events().iter().all(|e| e.phase == Phase::Merge && e.total == 3));
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = merge_records(&[], MergeOptions::for_vendor(VendorMode::Thermo), &mut NoProgress)
            .expect_err("no records");
        assert!(matches!(err, PipelineError::NoParsedFiles { .. }));
    }
}
