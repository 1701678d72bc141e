pub mod errors;
pub mod formats;
pub mod model;
mod registry;

pub use errors::{ParserError, UnknownVendorMode};
pub use formats::{ChannelName, ChannelToken};
pub use model::{
    normalize_label, CycleTable, IntermediateRecord, ParsedSample, VendorMode, TIME_COLUMN,
};
pub use registry::{parse_sample, parse_sample_file, parser_for, SampleParser};

#[cfg(test)]
mod tests;
