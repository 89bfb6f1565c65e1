use super::curve::StoppingPowerCurve;
use super::forward::integrate_visible_energy;
use super::{EngineConfig, EngineError};
use crate::numerics::{BrentOptions, brent_root};
use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Converged,
    MaxIterationsReached,
}

impl SolveStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Converged => "converged",
            Self::MaxIterationsReached => "max_iterations_reached",
        }
    }
}

impl Display for SolveStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverPhase {
    Bracketing,
    Refining,
}

impl Display for SolverPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Bracketing => "bracketing",
            Self::Refining => "refining",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InverseResult {
    /// Best kB estimate, canonical path unit per MeV.
    pub solved_kb: f64,
    pub status: SolveStatus,
    /// Refinement steps taken after the bracket was found.
    pub iterations: usize,
    pub bracket_width: f64,
    /// Visible energy at `solved_kb`, MeV.
    pub visible_energy: f64,
    /// `visible_energy - target`, MeV.
    pub residual: f64,
}

impl InverseResult {
    pub fn converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }
}

/// Find kB >= 0 with E_vis(kB) = `target`.
///
/// Inputs are assumed validated: `0 < target <= initial_energy` and the
/// energy is inside the supported range.
pub(crate) fn solve(
    config: &EngineConfig,
    curve: &StoppingPowerCurve,
    initial_energy: f64,
    target: f64,
) -> Result<InverseResult, EngineError> {
    if target == initial_energy {
        return Ok(InverseResult {
            solved_kb: 0.0,
            status: SolveStatus::Converged,
            iterations: 0,
            bracket_width: 0.0,
            visible_energy: initial_energy,
            residual: 0.0,
        });
    }

    let visible_at = |kb: f64| {
        integrate_visible_energy(curve, initial_energy, kb, config.panels_per_segment)
    };

    // E_vis(0) = E > target, so the lower end always has a positive residual.
    let mut lower = 0.0;
    let mut f_lower = initial_energy - target;
    let mut upper = config.initial_kb_guess;
    let mut visible_upper = visible_at(upper)?;
    let mut expansions = 0;
    while visible_upper > target {
        if expansions == config.max_bracket_expansions {
            return Err(EngineError::NoBracketFound {
                target,
                max_kb: upper,
                visible_at_max: visible_upper,
            });
        }
        lower = upper;
        f_lower = visible_upper - target;
        upper *= 2.0;
        visible_upper = visible_at(upper)?;
        expansions += 1;
        tracing::debug!(
            phase = %SolverPhase::Bracketing,
            kb = upper,
            visible = visible_upper,
            "expanded kB bracket"
        );
    }
    tracing::debug!(
        phase = %SolverPhase::Refining,
        lower,
        upper,
        expansions,
        "kB bracket found"
    );

    let mut failure = None;
    let objective = |kb: f64| match visible_at(kb) {
        Ok(visible) => visible - target,
        Err(error) => {
            failure.get_or_insert(error);
            f64::NAN
        }
    };
    let options = BrentOptions {
        x_tolerance: config.kb_tolerance,
        f_tolerance: config.energy_tolerance,
        max_iterations: config.max_iterations,
    };
    let estimate = brent_root(
        objective,
        lower,
        upper,
        f_lower,
        visible_upper - target,
        options,
    );
    let estimate = match (estimate, failure) {
        (Ok(estimate), _) => estimate,
        (Err(_), Some(error)) => return Err(error),
        (Err(error), None) => {
            return Err(EngineError::NumericalFailure {
                stage: "root finding",
                reason: error.to_string(),
            });
        }
    };

    let status = if estimate.converged {
        SolveStatus::Converged
    } else {
        SolveStatus::MaxIterationsReached
    };
    let result = InverseResult {
        solved_kb: estimate.root.max(0.0),
        status,
        iterations: estimate.iterations,
        bracket_width: estimate.bracket_width,
        visible_energy: target + estimate.residual,
        residual: estimate.residual,
    };

    match status {
        SolveStatus::Converged => tracing::debug!(
            status = %status,
            kb = result.solved_kb,
            iterations = result.iterations,
            residual = result.residual,
            "kB solve finished"
        ),
        SolveStatus::MaxIterationsReached => tracing::warn!(
            kb = result.solved_kb,
            iterations = result.iterations,
            bracket_width = result.bracket_width,
            residual = result.residual,
            "kB solve stopped at the iteration cap"
        ),
    }

    Ok(result)
}
