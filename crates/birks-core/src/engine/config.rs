use super::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Fraction of the table's maximum energy that may be extrapolated past it.
pub const DEFAULT_ENERGY_OVERSHOOT_FRACTION: f64 = 0.05;
pub const DEFAULT_PANELS_PER_SEGMENT: usize = 32;
/// First upper bracket tried by the inverse solve, in canonical kB units.
pub const DEFAULT_INITIAL_KB_GUESS: f64 = 1.0e-3;
pub const DEFAULT_MAX_BRACKET_EXPANSIONS: usize = 64;
pub const DEFAULT_KB_TOLERANCE: f64 = 1.0e-12;
/// Residual |E_vis(kB) - target| accepted as converged, in MeV.
pub const DEFAULT_ENERGY_TOLERANCE: f64 = 1.0e-12;
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct EngineConfig {
    pub energy_overshoot_fraction: f64,
    pub panels_per_segment: usize,
    pub initial_kb_guess: f64,
    pub max_bracket_expansions: usize,
    pub kb_tolerance: f64,
    pub energy_tolerance: f64,
    pub max_iterations: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            energy_overshoot_fraction: DEFAULT_ENERGY_OVERSHOOT_FRACTION,
            panels_per_segment: DEFAULT_PANELS_PER_SEGMENT,
            initial_kb_guess: DEFAULT_INITIAL_KB_GUESS,
            max_bracket_expansions: DEFAULT_MAX_BRACKET_EXPANSIONS,
            kb_tolerance: DEFAULT_KB_TOLERANCE,
            energy_tolerance: DEFAULT_ENERGY_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.energy_overshoot_fraction.is_finite() || self.energy_overshoot_fraction < 0.0 {
            return Err(invalid("energyOvershootFraction", self.energy_overshoot_fraction));
        }
        if self.panels_per_segment == 0 || self.panels_per_segment % 2 != 0 {
            return Err(invalid(
                "panelsPerSegment",
                self.panels_per_segment as f64,
            ));
        }
        require_positive("initialKbGuess", self.initial_kb_guess)?;
        require_positive("kbTolerance", self.kb_tolerance)?;
        require_positive("energyTolerance", self.energy_tolerance)?;
        if self.max_bracket_expansions == 0 {
            return Err(invalid("maxBracketExpansions", 0.0));
        }
        if self.max_iterations == 0 {
            return Err(invalid("maxIterations", 0.0));
        }
        Ok(())
    }

    /// Largest initial energy accepted for a table ending at `max_energy`.
    pub fn max_supported_energy(&self, max_energy: f64) -> f64 {
        max_energy * (1.0 + self.energy_overshoot_fraction)
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value))
    }
}

fn invalid(field: &'static str, value: f64) -> EngineError {
    EngineError::InvalidConfig { field, value }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineConfigError {
    #[error("failed to read engine config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse engine config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Read an [`EngineConfig`] from a JSON file. Missing fields take their
/// defaults; the result is not validated here.
pub fn load_engine_config(config_path: impl AsRef<Path>) -> Result<EngineConfig, EngineConfigError> {
    let config_path = config_path.as_ref();
    let source = fs::read_to_string(config_path).map_err(|source| EngineConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| EngineConfigError::Parse {
        path: config_path.to_path_buf(),
        source,
    })
}
