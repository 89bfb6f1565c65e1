use super::parser::ParseError;
use super::units::{PathFamily, StoppingUnit};

/// One tabulated point of dE/dx(E). Energy is in MeV, stopping power in MeV per
/// canonical path unit of the owning table's [`PathFamily`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoppingPowerSample {
    pub energy: f64,
    pub stopping_power: f64,
}

impl StoppingPowerSample {
    pub const fn new(energy: f64, stopping_power: f64) -> Self {
        Self {
            energy,
            stopping_power,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Unit assumed for stopping-power values when the text declares none.
    pub default_stopping_unit: StoppingUnit,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            default_stopping_unit: StoppingUnit::MEV_PER_MM,
        }
    }
}

/// Validated, unit-normalized stopping-power table.
///
/// Energies are non-negative and strictly increasing and there are at least
/// two samples. The table is immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct StoppingPowerTable {
    samples: Vec<StoppingPowerSample>,
    path_family: PathFamily,
}

impl StoppingPowerTable {
    pub const MIN_SAMPLES: usize = 2;

    /// Build a table from numeric pairs (energy in MeV, stopping power in
    /// `stopping_unit`). Samples are validated, sorted and de-duplicated the
    /// same way parsed rows are; `line` in any error is the 1-based position of
    /// the offending pair.
    pub fn from_samples(
        samples: impl IntoIterator<Item = StoppingPowerSample>,
        stopping_unit: StoppingUnit,
    ) -> Result<Self, ParseError> {
        let mut normalized = Vec::new();
        for (index, sample) in samples.into_iter().enumerate() {
            let line = index + 1;
            check_sample_value(line, "energy", sample.energy)?;
            check_sample_value(line, "stopping power", sample.stopping_power)?;
            normalized.push(StoppingPowerSample::new(
                sample.energy,
                stopping_unit.to_canonical(sample.stopping_power),
            ));
        }

        if normalized.is_empty() {
            return Err(ParseError::EmptyTable { skipped: 0 });
        }

        Self::from_normalized(normalized, stopping_unit.family())
    }

    /// Sort by energy (stable), keep the first sample of every energy and
    /// enforce the minimum table size.
    pub(crate) fn from_normalized(
        mut samples: Vec<StoppingPowerSample>,
        path_family: PathFamily,
    ) -> Result<Self, ParseError> {
        samples.sort_by(|left, right| left.energy.total_cmp(&right.energy));
        let before = samples.len();
        samples.dedup_by(|later, earlier| later.energy == earlier.energy);
        let dropped = before - samples.len();
        if dropped > 0 {
            tracing::debug!(dropped, "dropped duplicate stopping-power energies");
        }

        if samples.len() < Self::MIN_SAMPLES {
            return Err(ParseError::TooFewSamples {
                count: samples.len(),
            });
        }

        Ok(Self {
            samples,
            path_family,
        })
    }

    pub fn samples(&self) -> &[StoppingPowerSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn min_energy(&self) -> f64 {
        self.samples[0].energy
    }

    pub fn max_energy(&self) -> f64 {
        self.samples[self.samples.len() - 1].energy
    }

    pub fn path_family(&self) -> PathFamily {
        self.path_family
    }

    /// Unit every stored stopping power is expressed in.
    pub fn stopping_unit(&self) -> StoppingUnit {
        StoppingUnit::canonical(self.path_family)
    }

    pub fn summary(&self) -> TableSummary {
        TableSummary {
            sample_count: self.samples.len(),
            min_energy: self.min_energy(),
            max_energy: self.max_energy(),
            max_stopping_power: self
                .samples
                .iter()
                .map(|sample| sample.stopping_power)
                .fold(0.0, f64::max),
            stopping_unit: self.stopping_unit(),
        }
    }
}

fn check_sample_value(line: usize, column: &str, value: f64) -> Result<(), ParseError> {
    if !value.is_finite() {
        return Err(ParseError::MalformedRow {
            line,
            reason: format!("{column} must be finite, got {value}"),
        });
    }
    if value < 0.0 {
        return Err(ParseError::MalformedRow {
            line,
            reason: format!("{column} must be non-negative, got {value}"),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableSummary {
    pub sample_count: usize,
    pub min_energy: f64,
    pub max_energy: f64,
    pub max_stopping_power: f64,
    pub stopping_unit: StoppingUnit,
}

/// A row inside the data region that was dropped instead of aborting the parse.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// 1-based line number in the raw text.
    pub line: usize,
    pub error: ParseError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub table: StoppingPowerTable,
    pub skipped: Vec<SkippedRow>,
}
