use crate::numerics::PiecewiseLinear;
use crate::table::{PathFamily, StoppingPowerTable};
use std::ops::RangeInclusive;

/// Continuous S(E) built from a [`StoppingPowerTable`].
///
/// Extrapolation policy:
/// - below the first sample, S is interpolated linearly from S(0) = 0 when the
///   table starts above zero energy;
/// - above the last sample, the last segment's slope is continued and the
///   result is clamped at zero from below.
///
/// How far above the table the curve may be used is decided by the engine
/// (see [`super::EngineConfig::energy_overshoot_fraction`]).
#[derive(Debug, Clone, PartialEq)]
pub struct StoppingPowerCurve {
    interpolant: PiecewiseLinear,
    data_range: RangeInclusive<f64>,
    path_family: PathFamily,
}

impl StoppingPowerCurve {
    pub fn from_table(table: &StoppingPowerTable) -> Self {
        let mut energies = Vec::with_capacity(table.len() + 1);
        let mut stopping = Vec::with_capacity(table.len() + 1);
        if table.min_energy() > 0.0 {
            energies.push(0.0);
            stopping.push(0.0);
        }
        for sample in table.samples() {
            energies.push(sample.energy);
            stopping.push(sample.stopping_power);
        }

        Self {
            interpolant: PiecewiseLinear::from_validated(energies, stopping),
            data_range: table.min_energy()..=table.max_energy(),
            path_family: table.path_family(),
        }
    }

    /// dE/dx at `energy` (MeV), in MeV per canonical path unit.
    pub fn evaluate(&self, energy: f64) -> f64 {
        self.interpolant.evaluate(energy.max(0.0)).max(0.0)
    }

    /// Energy span covered by tabulated samples.
    pub fn energy_range(&self) -> RangeInclusive<f64> {
        self.data_range.clone()
    }

    pub fn max_energy(&self) -> f64 {
        *self.data_range.end()
    }

    pub fn path_family(&self) -> PathFamily {
        self.path_family
    }

    /// Interpolation nodes, including the origin anchor when one was added.
    pub fn nodes(&self) -> &[f64] {
        self.interpolant.grid()
    }
}
