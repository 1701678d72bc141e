use std::path::Path;

use crate::errors::ParserError;
use crate::formats::{AgilentParser, ThermoParser};
use crate::model::{IntermediateRecord, ParsedSample, VendorMode};

pub trait SampleParser {
    fn name(&self) -> &'static str;
    fn parse(&self, content: &str) -> Result<ParsedSample, ParserError>;
}

static THERMO: ThermoParser = ThermoParser;
static AGILENT: AgilentParser = AgilentParser;

pub fn parser_for(mode: VendorMode) -> &'static dyn SampleParser {
    match mode {
        VendorMode::Thermo => &THERMO,
        VendorMode::Agilent => &AGILENT,
    }
}

pub fn parse_sample(content: &str, mode: VendorMode) -> Result<ParsedSample, ParserError> {
    parser_for(mode).parse(content)
}

/// Reads one export file and parses it with the parser for `mode`.
///
/// Bytes that are not valid UTF-8 (MassHunter writes Windows-1252 paths) are
/// replaced rather than rejected.
pub fn parse_sample_file(path: &Path, mode: VendorMode) -> Result<IntermediateRecord, ParserError> {
    let bytes = std::fs::read(path).map_err(|source| ParserError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let content = String::from_utf8_lossy(&bytes);
    let parsed = parse_sample(&content, mode)?;
    Ok(IntermediateRecord::from_parsed(parsed, path))
}
