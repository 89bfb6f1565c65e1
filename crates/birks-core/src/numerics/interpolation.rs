#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InterpolationError {
    #[error("linear interpolation requires at least 2 grid points, got {actual}")]
    InsufficientPoints { actual: usize },
    #[error("interpolation length mismatch: grid={grid}, values={values}")]
    LengthMismatch { grid: usize, values: usize },
    #[error("interpolation grid entries must be finite, index {index} got {value}")]
    NonFiniteGridValue { index: usize, value: f64 },
    #[error(
        "interpolation grid must be strictly increasing, index {index} has {current} after {previous}"
    )]
    NonIncreasingGrid {
        index: usize,
        previous: f64,
        current: f64,
    },
    #[error("interpolated values must be finite, index {index} got {value}")]
    NonFiniteValue { index: usize, value: f64 },
}

/// Piecewise-linear function through `(grid[i], values[i])`.
///
/// Queries outside the grid continue the nearest edge segment's slope.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinear {
    grid: Vec<f64>,
    values: Vec<f64>,
}

impl PiecewiseLinear {
    pub fn new(grid: Vec<f64>, values: Vec<f64>) -> Result<Self, InterpolationError> {
        validate_grid_and_values(&grid, &values)?;
        Ok(Self { grid, values })
    }

    /// Skip validation for grids whose invariants the caller already holds.
    pub(crate) fn from_validated(grid: Vec<f64>, values: Vec<f64>) -> Self {
        debug_assert!(validate_grid_and_values(&grid, &values).is_ok());
        Self { grid, values }
    }

    pub fn grid(&self) -> &[f64] {
        &self.grid
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// NaN queries give NaN.
    pub fn evaluate(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        let grid = &self.grid;
        let values = &self.values;
        let last = grid.len() - 1;

        let (lower, upper) = if x <= grid[0] {
            (0, 1)
        } else if x >= grid[last] {
            (last - 1, last)
        } else {
            match grid.binary_search_by(|probe| probe.total_cmp(&x)) {
                Ok(index) => return values[index],
                Err(upper) => (upper - 1, upper),
            }
        };

        let x0 = grid[lower];
        let x1 = grid[upper];
        let y0 = values[lower];
        let y1 = values[upper];
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }
}

fn validate_grid_and_values(grid: &[f64], values: &[f64]) -> Result<(), InterpolationError> {
    if grid.len() < 2 {
        return Err(InterpolationError::InsufficientPoints { actual: grid.len() });
    }
    if grid.len() != values.len() {
        return Err(InterpolationError::LengthMismatch {
            grid: grid.len(),
            values: values.len(),
        });
    }

    for (index, value) in grid.iter().copied().enumerate() {
        if !value.is_finite() {
            return Err(InterpolationError::NonFiniteGridValue { index, value });
        }
        if index > 0 && value <= grid[index - 1] {
            return Err(InterpolationError::NonIncreasingGrid {
                index,
                previous: grid[index - 1],
                current: value,
            });
        }
    }

    for (index, value) in values.iter().copied().enumerate() {
        if !value.is_finite() {
            return Err(InterpolationError::NonFiniteValue { index, value });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{InterpolationError, PiecewiseLinear};

    #[test]
    fn interpolates_between_and_on_nodes() {
        let curve = PiecewiseLinear::new(vec![0.0, 1.0, 3.0], vec![0.0, 5.0, 1.0])
            .expect("valid grid");
        assert_eq!(curve.evaluate(1.0), 5.0);
        assert!((curve.evaluate(0.5) - 2.5).abs() < 1.0e-15);
        assert!((curve.evaluate(2.0) - 3.0).abs() < 1.0e-15);
    }

    #[test]
    fn extends_edge_segments_outside_the_grid() {
        let curve =
            PiecewiseLinear::new(vec![1.0, 2.0, 4.0], vec![2.0, 4.0, 5.0]).expect("valid grid");
        assert!((curve.evaluate(0.0) - 0.0).abs() < 1.0e-15);
        assert!((curve.evaluate(6.0) - 6.0).abs() < 1.0e-15);
    }

    #[test]
    fn nan_queries_return_nan() {
        let curve = PiecewiseLinear::new(vec![0.0, 1.0], vec![0.0, 5.0]).expect("valid grid");
        assert!(curve.evaluate(f64::NAN).is_nan());
        assert!(curve.evaluate(-f64::NAN).is_nan());
        assert_eq!(curve.evaluate(f64::NEG_INFINITY), f64::NEG_INFINITY);
    }

    #[test]
    fn rejects_non_increasing_grid() {
        let error = PiecewiseLinear::new(vec![0.0, 1.0, 1.0], vec![0.0, 1.0, 2.0])
            .expect_err("duplicate grid point should fail");
        assert_eq!(
            error,
            InterpolationError::NonIncreasingGrid {
                index: 2,
                previous: 1.0,
                current: 1.0,
            }
        );
    }

    #[test]
    fn rejects_short_or_mismatched_input() {
        assert_eq!(
            PiecewiseLinear::new(vec![0.0], vec![0.0]),
            Err(InterpolationError::InsufficientPoints { actual: 1 })
        );
        assert_eq!(
            PiecewiseLinear::new(vec![0.0, 1.0], vec![0.0]),
            Err(InterpolationError::LengthMismatch { grid: 2, values: 1 })
        );
    }
}
