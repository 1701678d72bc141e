mod agilent;
mod channel;
mod common;
mod thermo;

pub use agilent::AgilentParser;
pub use channel::{tokenize_header, ChannelName, ChannelToken};
pub use thermo::ThermoParser;

pub(crate) use common::{ensure_unique_columns, parse_optional_f64, parse_timestamp, read_records};
