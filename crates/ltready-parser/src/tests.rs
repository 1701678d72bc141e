use std::fs;
use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::errors::ParserError;
use crate::formats::{AgilentParser, ThermoParser};
use crate::model::{VendorMode, TIME_COLUMN};
use crate::registry::SampleParser;
use crate::{parse_sample, parse_sample_file, ChannelName};

fn fixture_path(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(path)
}

fn fixture(path: &str) -> String {
    let full_path = fixture_path(path);
    fs::read_to_string(&full_path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", full_path.display(), err))
}

fn at(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").unwrap()
}

#[test]
fn parses_thermo_export() {
    let content = fixture("thermo_nist612.csv");
    let parsed = parse_sample(&content, VendorMode::Thermo).expect("thermo parse failed");

    assert_eq!(parsed.sample_label, "NIST_612_run1");
    assert_eq!(parsed.timestamp, at("2021-04-05 10:00:00"));
    assert_eq!(parsed.table.columns(), ["Time", "7Li", "43Ca", "88Sr"]);
    // dwell-time row is gone, all five cycles remain
    assert_eq!(parsed.table.height(), 5);
    assert_eq!(
        parsed.table.column_values(TIME_COLUMN).unwrap()[0],
        Some(0.123)
    );
    assert!(parsed
        .table
        .rows()
        .iter()
        .all(|row| row.iter().all(Option::is_some)));
}

#[test]
fn thermo_label_never_contains_whitespace() {
    let content = fixture("thermo_nist612.csv");
    let mutated = content.replacen("NIST 612 run1", "  BCR 2G\tspot  3 ", 1);
    let parsed = ThermoParser.parse(&mutated).expect("thermo parse failed");

    assert_eq!(parsed.sample_label, "BCR_2G_spot__3");
    assert!(!parsed.sample_label.chars().any(char::is_whitespace));
}

#[test]
fn thermo_timestamp_parse_is_stable() {
    let content = fixture("thermo_nist612.csv");
    let first = ThermoParser.parse(&content).unwrap();
    let second = ThermoParser.parse(&content).unwrap();
    assert_eq!(first.timestamp, second.timestamp);
}

#[test]
fn thermo_rejects_unparseable_timestamp() {
    let content = fixture("thermo_nist612.csv");
    let mutated = content.replacen("04/05/2021 10:00:00 AM", "sometime on tuesday", 1);

    let err = ThermoParser
        .parse(&mutated)
        .expect_err("timestamp should not parse");
    assert!(err.is_timestamp_error(), "unexpected error {err:?}");
    assert_eq!(err.parser(), Some("THERMO"));
}

#[test]
fn thermo_rejects_title_without_separator() {
    let content = fixture("thermo_nist612.csv");
    let mutated = content.replacen("NIST 612 run1 : 04/05/2021 10:00:00 AM", "NIST 612 run1", 1);

    match ThermoParser.parse(&mutated) {
        Err(ParserError::FormatMismatch { parser, .. }) => assert_eq!(parser, "THERMO"),
        other => panic!("expected FormatMismatch error, got {other:?}"),
    }
}

#[test]
fn thermo_rejects_short_files() {
    let content = fixture("thermo_nist612.csv");
    let truncated = content.lines().take(13).collect::<Vec<_>>().join("\r\n");

    match ThermoParser.parse(&truncated) {
        Err(ParserError::FormatMismatch { reason, .. }) => {
            assert!(reason.contains("found 13"), "{reason}");
        }
        other => panic!("expected FormatMismatch error, got {other:?}"),
    }
}

#[test]
fn thermo_header_only_triggers_empty_error() {
    let content = fixture("thermo_nist612.csv");
    let header_only = content.lines().take(15).collect::<Vec<_>>().join("\r\n") + "\r\n";

    match ThermoParser.parse(&header_only) {
        Err(ParserError::EmptyData { .. }) => {}
        other => panic!("expected EmptyData error, got {other:?}"),
    }
}

#[test]
fn thermo_requires_time_column() {
    let content = fixture("thermo_nist612.csv");
    let mutated = content.replacen("Time,7Li", "Elapsed,7Li", 1);

    match ThermoParser.parse(&mutated) {
        Err(ParserError::InvalidHeader { row_index, .. }) => assert_eq!(row_index, 13),
        other => panic!("expected InvalidHeader error, got {other:?}"),
    }
}

#[test]
fn thermo_drops_rows_with_missing_cells() {
    let content = fixture("thermo_nist612.csv");
    let mutated = content.replacen("0.789,125,29950,4610,", "0.789,,29950,4610,", 1);
    let parsed = ThermoParser.parse(&mutated).unwrap();

    assert_eq!(parsed.table.height(), 4);
    let times = parsed.table.column_values(TIME_COLUMN).unwrap();
    assert!(!times.contains(&Some(0.789)));
}

#[test]
fn parses_agilent_export() {
    let content = fixture("agilent_gse1g.csv");
    let parsed = AgilentParser.parse(&content).expect("agilent parse failed");

    assert_eq!(parsed.sample_label, "GSE-1G-spot_1");
    assert_eq!(parsed.timestamp, at("2021-04-05 10:15:30"));
    assert_eq!(parsed.table.columns(), ["Time", "Li7", "Ca43", "Ti47", "Sr88"]);
    assert_eq!(parsed.table.height(), 4);

    let titanium = parsed.table.column_values("Ti47").unwrap();
    assert_eq!(titanium[1], None);
    assert_eq!(titanium[2], Some(305.0));
}

#[test]
fn agilent_columns_are_time_or_element_mass() {
    let content = fixture("agilent_gse1g.csv");
    let parsed = AgilentParser.parse(&content).unwrap();

    for column in parsed.table.columns() {
        let renamed = ChannelName::parse(column).expect("renamed column must classify");
        assert_eq!(&renamed.to_string(), column);
        if let ChannelName::Isotope { element, mass } = renamed {
            assert_eq!(column, &format!("{element}{mass}"));
        }
    }
}

#[test]
fn agilent_rejects_short_status_line() {
    let content = fixture("agilent_gse1g.csv");
    let mutated = content.replacen("Acquired      : 04/05/2021 10:15:30", "Acquired : 04/05/2021", 1);

    match AgilentParser.parse(&mutated) {
        Err(ParserError::FormatMismatch { reason, .. }) => {
            assert!(reason.contains("status line"), "{reason}");
        }
        other => panic!("expected FormatMismatch error, got {other:?}"),
    }
}

#[test]
fn agilent_rejects_ragged_rows() {
    let content = fixture("agilent_gse1g.csv");
    let mutated = content.replacen("0.7530,99.5,24900,305.0,3990,", "0.7530,99.5,24900", 1);

    match AgilentParser.parse(&mutated) {
        Err(ParserError::FormatMismatch { reason, .. }) => {
            assert!(reason.contains("fields"), "{reason}");
        }
        other => panic!("expected FormatMismatch error, got {other:?}"),
    }
}

#[test]
fn agilent_rejects_unclassifiable_header() {
    let content = fixture("agilent_gse1g.csv");
    let mutated = content.replacen("47Ti", "Counts", 1);

    match AgilentParser.parse(&mutated) {
        Err(ParserError::InvalidHeader { message, .. }) => {
            assert!(message.contains("Counts"), "{message}");
        }
        other => panic!("expected InvalidHeader error, got {other:?}"),
    }
}

#[test]
fn agilent_rejects_non_numeric_cells() {
    let content = fixture("agilent_gse1g.csv");
    let mutated = content.replacen("4010", "overrange", 1);

    match AgilentParser.parse(&mutated) {
        Err(ParserError::DataRow { line_index, .. }) => assert_eq!(line_index, 5),
        other => panic!("expected DataRow error, got {other:?}"),
    }
}

#[test]
fn agilent_rejects_duplicate_channels() {
    let content = fixture("agilent_gse1g.csv");
    let mutated = content.replacen("Mass43Ca", "7Li", 1);

    match AgilentParser.parse(&mutated) {
        Err(ParserError::InvalidHeader { message, .. }) => {
            assert!(message.contains("duplicate"), "{message}");
        }
        other => panic!("expected InvalidHeader error, got {other:?}"),
    }
}

#[test]
fn wrong_vendor_is_a_format_failure() {
    let thermo = fixture("thermo_nist612.csv");
    assert!(parse_sample(&thermo, VendorMode::Agilent).is_err());

    let agilent = fixture("agilent_gse1g.csv");
    assert!(parse_sample(&agilent, VendorMode::Thermo).is_err());
}

#[test]
fn parse_sample_file_keeps_source_path() {
    let path = fixture_path("agilent_gse1g.csv");
    let record = parse_sample_file(&path, VendorMode::Agilent).expect("agilent file parse failed");

    assert_eq!(record.source_path, path);
    assert_eq!(record.sample_label, "GSE-1G-spot_1");
}

#[test]
fn parse_sample_file_reports_missing_file() {
    let path = fixture_path("does_not_exist.csv");
    match parse_sample_file(&path, VendorMode::Thermo) {
        Err(err @ ParserError::Io { .. }) => {
            assert!(matches!(&err, ParserError::Io { path: reported, .. } if *reported == path));
            assert_eq!(err.parser(), None);
        }
        other => panic!("expected Io error, got {other:?}"),
    }
}
