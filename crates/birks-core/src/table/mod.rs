//! Stopping-power table loader.
//!
//! Raw text is handed in by the caller; nothing here touches the file system.

pub mod model;
pub mod parser;
pub mod units;

pub use model::{
    LoaderConfig, ParseOutcome, SkippedRow, StoppingPowerSample, StoppingPowerTable, TableSummary,
};
pub use parser::{ParseError, parse_stopping_power_table, parse_with_diagnostics};
pub use units::{EnergyUnit, PathFamily, PathUnit, StoppingUnit, UnknownUnit};
