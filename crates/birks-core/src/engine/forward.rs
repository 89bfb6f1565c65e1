use super::EngineError;
use super::curve::StoppingPowerCurve;
use crate::numerics::{integrate_simpson, stable_sum};
use serde::Serialize;

/// Outcome of a forward Birks integration.
///
/// Only the visible energy is stored; the quenching factor is always derived
/// from it and the initial energy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalculationResult {
    /// MeV.
    pub initial_energy: f64,
    /// Canonical path unit per MeV.
    pub birks_constant: f64,
    /// MeV.
    pub visible_energy: f64,
}

impl CalculationResult {
    /// E_visible / E, or 1 for zero initial energy.
    pub fn quenching_factor(&self) -> f64 {
        if self.initial_energy == 0.0 {
            1.0
        } else {
            self.visible_energy / self.initial_energy
        }
    }

    /// Fraction of the deposited energy lost to quenching.
    pub fn quenched_fraction(&self) -> f64 {
        1.0 - self.quenching_factor()
    }
}

/// Integrate dE / (1 + kB S(E)) over [0, `initial_energy`].
///
/// Inputs are assumed validated. Every sub-interval between curve nodes gets
/// `panels_per_segment` Simpson panels; node positions do not depend on `kb`.
pub(crate) fn integrate_visible_energy(
    curve: &StoppingPowerCurve,
    initial_energy: f64,
    kb: f64,
    panels_per_segment: usize,
) -> Result<f64, EngineError> {
    if initial_energy == 0.0 {
        return Ok(0.0);
    }
    if kb == 0.0 {
        return Ok(initial_energy);
    }

    let integrand = |energy: f64| 1.0 / (1.0 + kb * curve.evaluate(energy));

    let mut lower = 0.0;
    let interior = curve
        .nodes()
        .iter()
        .copied()
        .filter(|&node| node > 0.0 && node < initial_energy);
    let segments = interior
        .chain(std::iter::once(initial_energy))
        .map(|upper| {
            let segment = integrate_simpson(integrand, lower, upper, panels_per_segment);
            lower = upper;
            segment.map_err(|error| EngineError::NumericalFailure {
                stage: "quadrature",
                reason: error.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(stable_sum(segments).clamp(0.0, initial_energy))
}
