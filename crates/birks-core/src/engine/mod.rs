//! Birks engine: forward quenching integral and inverse kB solve.
//!
//! Energies are in MeV. A Birks constant is expressed in the canonical path
//! unit of the table's [`PathFamily`] per MeV (mm/MeV for length tables), so
//! that kB * S(E) is dimensionless.

mod config;
mod curve;
mod forward;
mod inverse;

pub use config::{
    DEFAULT_ENERGY_OVERSHOOT_FRACTION, DEFAULT_ENERGY_TOLERANCE, DEFAULT_INITIAL_KB_GUESS,
    DEFAULT_KB_TOLERANCE, DEFAULT_MAX_BRACKET_EXPANSIONS, DEFAULT_MAX_ITERATIONS,
    DEFAULT_PANELS_PER_SEGMENT, EngineConfig, EngineConfigError, load_engine_config,
};
pub use curve::StoppingPowerCurve;
pub use forward::CalculationResult;
pub use inverse::{InverseResult, SolveStatus, SolverPhase};

use crate::table::{PathFamily, PathUnit, StoppingPowerTable};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("Birks constant must be finite and non-negative, got {value}")]
    InvalidBirksConstant { value: f64 },
    #[error("initial energy must be finite and non-negative, got {value} MeV")]
    InvalidEnergy { value: f64 },
    #[error(
        "initial energy {requested} MeV exceeds the supported maximum {max_supported} MeV of the stopping-power table"
    )]
    EnergyOutOfRange { requested: f64, max_supported: f64 },
    #[error("observed visible energy {target} MeV must lie in (0, {initial}] MeV")]
    InvalidTarget { target: f64, initial: f64 },
    #[error(
        "no Birks constant up to {max_kb} brings the visible energy down to {target} MeV (still {visible_at_max} MeV)"
    )]
    NoBracketFound {
        target: f64,
        max_kb: f64,
        visible_at_max: f64,
    },
    #[error("invalid engine configuration: {field} = {value}")]
    InvalidConfig { field: &'static str, value: f64 },
    #[error("Birks constant unit '{unit}' does not apply to {family} stopping-power tables")]
    IncompatibleBirksUnit { unit: PathUnit, family: PathFamily },
    #[error("numerical failure during {stage}: {reason}")]
    NumericalFailure { stage: &'static str, reason: String },
}

impl EngineError {
    pub const fn placeholder(&self) -> &'static str {
        match self {
            Self::InvalidBirksConstant { .. } => "INPUT.BIRKS_CONSTANT",
            Self::InvalidEnergy { .. } => "INPUT.ENERGY",
            Self::EnergyOutOfRange { .. } => "INPUT.ENERGY_RANGE",
            Self::InvalidTarget { .. } => "INPUT.OBSERVED_ENERGY",
            Self::NoBracketFound { .. } => "RUN.NO_BRACKET",
            Self::InvalidConfig { .. } => "INPUT.ENGINE_CONFIG",
            Self::IncompatibleBirksUnit { .. } => "INPUT.BIRKS_UNIT",
            Self::NumericalFailure { .. } => "RUN.NUMERICAL",
        }
    }
}

/// Stateless calculator holding a validated [`EngineConfig`].
///
/// Every call builds its own [`StoppingPowerCurve`] from the table it is
/// given; nothing is cached between calls.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BirksEngine {
    config: EngineConfig,
}

impl BirksEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// E_visible = integral over [0, E] of dE / (1 + kB S(E)).
    pub fn compute_visible_energy(
        &self,
        table: &StoppingPowerTable,
        initial_energy: f64,
        birks_constant: f64,
    ) -> Result<CalculationResult, EngineError> {
        if !birks_constant.is_finite() || birks_constant < 0.0 {
            return Err(EngineError::InvalidBirksConstant {
                value: birks_constant,
            });
        }
        let curve = self.curve_for(table, initial_energy)?;
        let visible_energy = forward::integrate_visible_energy(
            &curve,
            initial_energy,
            birks_constant,
            self.config.panels_per_segment,
        )?;

        Ok(CalculationResult {
            initial_energy,
            birks_constant,
            visible_energy,
        })
    }

    /// Find the kB that turns `initial_energy` into `observed_visible_energy`.
    ///
    /// Hitting the iteration cap is reported through
    /// [`InverseResult::status`], not as an error.
    pub fn solve_birks_constant(
        &self,
        table: &StoppingPowerTable,
        initial_energy: f64,
        observed_visible_energy: f64,
    ) -> Result<InverseResult, EngineError> {
        let curve = self.curve_for(table, initial_energy)?;
        if !observed_visible_energy.is_finite()
            || observed_visible_energy <= 0.0
            || observed_visible_energy > initial_energy
        {
            return Err(EngineError::InvalidTarget {
                target: observed_visible_energy,
                initial: initial_energy,
            });
        }

        inverse::solve(&self.config, &curve, initial_energy, observed_visible_energy)
    }

    fn curve_for(
        &self,
        table: &StoppingPowerTable,
        initial_energy: f64,
    ) -> Result<StoppingPowerCurve, EngineError> {
        if !initial_energy.is_finite() || initial_energy < 0.0 {
            return Err(EngineError::InvalidEnergy {
                value: initial_energy,
            });
        }
        let max_supported = self.config.max_supported_energy(table.max_energy());
        if initial_energy > max_supported {
            return Err(EngineError::EnergyOutOfRange {
                requested: initial_energy,
                max_supported,
            });
        }
        Ok(StoppingPowerCurve::from_table(table))
    }
}

/// Forward calculation with the default [`EngineConfig`].
pub fn compute_visible_energy(
    table: &StoppingPowerTable,
    initial_energy: f64,
    birks_constant: f64,
) -> Result<CalculationResult, EngineError> {
    BirksEngine::default().compute_visible_energy(table, initial_energy, birks_constant)
}

/// Inverse solve with the default [`EngineConfig`].
pub fn solve_birks_constant(
    table: &StoppingPowerTable,
    initial_energy: f64,
    observed_visible_energy: f64,
) -> Result<InverseResult, EngineError> {
    BirksEngine::default().solve_birks_constant(table, initial_energy, observed_visible_energy)
}

/// Convert a Birks constant given as `unit` per MeV into the canonical path
/// unit of `family` per MeV (e.g. 12 um/MeV -> 0.012 mm/MeV).
pub fn convert_birks_constant(
    value: f64,
    unit: PathUnit,
    family: PathFamily,
) -> Result<f64, EngineError> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::InvalidBirksConstant { value });
    }
    if unit.family() != family {
        return Err(EngineError::IncompatibleBirksUnit { unit, family });
    }
    Ok(value * unit.canonical_scale())
}
