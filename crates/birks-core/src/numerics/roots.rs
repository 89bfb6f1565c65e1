#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrentOptions {
    /// Absolute tolerance on the root location.
    pub x_tolerance: f64,
    /// Residual magnitude accepted as a root.
    pub f_tolerance: f64,
    pub max_iterations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootEstimate {
    pub root: f64,
    pub residual: f64,
    /// Objective evaluations spent inside the bracket.
    pub iterations: usize,
    pub bracket_width: f64,
    pub converged: bool,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RootFindingError {
    #[error(
        "root is not bracketed: f({lower})={f_lower} and f({upper})={f_upper} share a sign"
    )]
    NotBracketed {
        lower: f64,
        upper: f64,
        f_lower: f64,
        f_upper: f64,
    },
    #[error("objective returned non-finite value {value} at x={x}")]
    NonFiniteEvaluation { x: f64, value: f64 },
}

/// Brent's method on a sign-changing bracket `[lower, upper]`.
///
/// `f_lower` and `f_upper` are the objective values at the bracket ends, which
/// callers usually already hold from their bracketing phase. Running out of
/// iterations is not an error: the best estimate is returned with
/// `converged == false`.
pub fn brent_root<F>(
    mut objective: F,
    lower: f64,
    upper: f64,
    f_lower: f64,
    f_upper: f64,
    options: BrentOptions,
) -> Result<RootEstimate, RootFindingError>
where
    F: FnMut(f64) -> f64,
{
    check_finite(lower, f_lower)?;
    check_finite(upper, f_upper)?;

    let width = (upper - lower).abs();
    if f_lower == 0.0 {
        return Ok(exact_root(lower, width));
    }
    if f_upper == 0.0 {
        return Ok(exact_root(upper, width));
    }
    if (f_lower > 0.0) == (f_upper > 0.0) {
        return Err(RootFindingError::NotBracketed {
            lower,
            upper,
            f_lower,
            f_upper,
        });
    }

    let (mut a, mut fa) = (lower, f_lower);
    let (mut b, mut fb) = (upper, f_upper);
    let (mut c, mut fc) = (b, fb);
    let mut step = b - a;
    let mut previous_step = step;
    let mut iterations = 0;

    loop {
        // Keep the root between b and c.
        if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
            c = a;
            fc = fa;
            step = b - a;
            previous_step = step;
        }
        // b is always the best estimate.
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tolerance = 2.0 * f64::EPSILON * b.abs() + 0.5 * options.x_tolerance;
        let midpoint = 0.5 * (c - b);
        if midpoint.abs() <= tolerance || fb.abs() <= options.f_tolerance {
            return Ok(RootEstimate {
                root: b,
                residual: fb,
                iterations,
                bracket_width: (c - b).abs(),
                converged: true,
            });
        }
        if iterations >= options.max_iterations {
            return Ok(RootEstimate {
                root: b,
                residual: fb,
                iterations,
                bracket_width: (c - b).abs(),
                converged: false,
            });
        }

        if previous_step.abs() >= tolerance && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * midpoint * s, 1.0 - s)
            } else {
                let q0 = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * midpoint * q0 * (q0 - r) - (b - a) * (r - 1.0)),
                    (q0 - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();

            let interpolation_limit = 3.0 * midpoint * q - (tolerance * q).abs();
            let step_limit = (previous_step * q).abs();
            if 2.0 * p < interpolation_limit.min(step_limit) {
                previous_step = step;
                step = p / q;
            } else {
                step = midpoint;
                previous_step = step;
            }
        } else {
            step = midpoint;
            previous_step = step;
        }

        a = b;
        fa = fb;
        b += if step.abs() > tolerance {
            step
        } else {
            tolerance.copysign(midpoint)
        };
        fb = objective(b);
        iterations += 1;
        check_finite(b, fb)?;
    }
}

fn exact_root(root: f64, bracket_width: f64) -> RootEstimate {
    RootEstimate {
        root,
        residual: 0.0,
        iterations: 0,
        bracket_width,
        converged: true,
    }
}

fn check_finite(x: f64, value: f64) -> Result<(), RootFindingError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RootFindingError::NonFiniteEvaluation { x, value })
    }
}
