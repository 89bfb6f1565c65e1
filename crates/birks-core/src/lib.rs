//! Birks-law quenching for scintillators.
//!
//! [`table`] turns stopping-power tables (SRIM-style text or numeric presets)
//! into a unit-normalized [`table::StoppingPowerTable`]; [`engine`] integrates
//! Birks' law over it and inverts the integral for the Birks constant.

pub mod domain;
pub mod engine;
pub mod numerics;
pub mod presets;
pub mod table;

pub use domain::{BirksError, BirksErrorCategory, BirksResult};
pub use engine::{
    BirksEngine, CalculationResult, EngineConfig, EngineError, InverseResult, SolveStatus,
    StoppingPowerCurve, compute_visible_energy, convert_birks_constant, solve_birks_constant,
};
pub use presets::{PresetCatalog, load_preset_catalog};
pub use table::{
    LoaderConfig, ParseError, ParseOutcome, StoppingPowerSample, StoppingPowerTable,
    parse_stopping_power_table, parse_with_diagnostics,
};
