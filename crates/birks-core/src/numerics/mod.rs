pub mod interpolation;
pub mod quadrature;
pub mod roots;

pub use interpolation::{InterpolationError, PiecewiseLinear};
pub use quadrature::{QuadratureError, integrate_simpson};
pub use roots::{BrentOptions, RootEstimate, RootFindingError, brent_root};

/// Compensated running sum.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KahanSum {
    sum: f64,
    correction: f64,
}

impl KahanSum {
    pub fn add(&mut self, value: f64) {
        let corrected = value - self.correction;
        let next = self.sum + corrected;
        self.correction = (next - self.sum) - corrected;
        self.sum = next;
    }

    pub fn value(&self) -> f64 {
        self.sum
    }
}

pub fn stable_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut sum = KahanSum::default();
    for value in values {
        sum.add(value);
    }
    sum.value()
}
