use super::KahanSum;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuadratureError {
    #[error("simpson integration needs an even, non-zero panel count, got {panels}")]
    InvalidPanelCount { panels: usize },
    #[error("integration bounds must be finite, got [{lower}, {upper}]")]
    NonFiniteBounds { lower: f64, upper: f64 },
    #[error("integrand returned non-finite value {value} at x={x}")]
    NonFiniteIntegrand { x: f64, value: f64 },
}

/// Composite Simpson rule over `[lower, upper]` with `panels` equal panels
/// (weights 1-4-2-...-2-4-1).
pub fn integrate_simpson<F>(
    mut integrand: F,
    lower: f64,
    upper: f64,
    panels: usize,
) -> Result<f64, QuadratureError>
where
    F: FnMut(f64) -> f64,
{
    if panels == 0 || panels % 2 != 0 {
        return Err(QuadratureError::InvalidPanelCount { panels });
    }
    if !lower.is_finite() || !upper.is_finite() {
        return Err(QuadratureError::NonFiniteBounds { lower, upper });
    }
    if lower == upper {
        return Ok(0.0);
    }

    let step = (upper - lower) / panels as f64;
    let mut sum = KahanSum::default();
    for index in 0..=panels {
        // Pin the last node so rounding in `index * step` cannot overshoot.
        let x = if index == panels {
            upper
        } else {
            lower + step * index as f64
        };
        let value = integrand(x);
        if !value.is_finite() {
            return Err(QuadratureError::NonFiniteIntegrand { x, value });
        }

        let weight = if index == 0 || index == panels {
            1.0
        } else if index % 2 == 1 {
            4.0
        } else {
            2.0
        };
        sum.add(weight * value);
    }

    Ok(sum.value() * step / 3.0)
}
