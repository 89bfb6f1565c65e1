use super::CliError;
use birks_core::domain::BirksError;
use birks_core::engine::{CalculationResult, InverseResult, SolveStatus};
use birks_core::presets::{PresetCatalog, PresetSource};
use birks_core::table::{ParseOutcome, PathFamily, PathUnit};
use serde::Serialize;

const KEV_PER_MEV: f64 = 1.0e3;

#[derive(Debug, Serialize)]
pub(super) struct ForwardReport {
    pub(super) source: String,
    pub(super) initial_energy_mev: f64,
    pub(super) birks_constant: f64,
    pub(super) birks_constant_unit: String,
    pub(super) visible_energy_mev: f64,
    pub(super) visible_energy_kevee: f64,
    pub(super) quenching_factor: f64,
    pub(super) energy_loss_percent: f64,
}

impl ForwardReport {
    pub(super) fn new(source: String, family: PathFamily, result: &CalculationResult) -> Self {
        Self {
            source,
            initial_energy_mev: result.initial_energy,
            birks_constant: result.birks_constant,
            birks_constant_unit: kb_unit_label(family.canonical_unit()),
            visible_energy_mev: result.visible_energy,
            visible_energy_kevee: result.visible_energy * KEV_PER_MEV,
            quenching_factor: result.quenching_factor(),
            energy_loss_percent: result.quenched_fraction() * 100.0,
        }
    }

    pub(super) fn render_human(&self) -> String {
        [
            format!("Table:            {}", self.source),
            format!("Initial energy:   {:.6} MeV", self.initial_energy_mev),
            format!(
                "Birks constant:   {:.6e} {}",
                self.birks_constant, self.birks_constant_unit
            ),
            format!(
                "Visible energy:   {:.6} MeV ({:.2} keVee)",
                self.visible_energy_mev, self.visible_energy_kevee
            ),
            format!("Quenching factor: {:.4}", self.quenching_factor),
            format!("Energy loss:      {:.2} %", self.energy_loss_percent),
        ]
        .join("\n")
    }
}

#[derive(Debug, Serialize)]
pub(super) struct InverseReport {
    pub(super) source: String,
    pub(super) initial_energy_mev: f64,
    pub(super) observed_energy_mev: f64,
    pub(super) solved_kb: f64,
    pub(super) kb_unit: String,
    /// Only meaningful for length tables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) solved_kb_um_per_mev: Option<f64>,
    pub(super) status: SolveStatus,
    pub(super) iterations: usize,
    pub(super) bracket_width: f64,
    pub(super) residual_mev: f64,
    pub(super) verification_energy_mev: f64,
    pub(super) verification_error_percent: f64,
}

impl InverseReport {
    pub(super) fn new(
        source: String,
        family: PathFamily,
        initial_energy: f64,
        observed_energy: f64,
        result: &InverseResult,
        verification_error_percent: f64,
    ) -> Self {
        let solved_kb_um_per_mev = (family == PathFamily::Length)
            .then(|| result.solved_kb / PathUnit::Micrometer.canonical_scale());
        Self {
            source,
            initial_energy_mev: initial_energy,
            observed_energy_mev: observed_energy,
            solved_kb: result.solved_kb,
            kb_unit: kb_unit_label(family.canonical_unit()),
            solved_kb_um_per_mev,
            status: result.status,
            iterations: result.iterations,
            bracket_width: result.bracket_width,
            residual_mev: result.residual,
            verification_energy_mev: result.visible_energy,
            verification_error_percent,
        }
    }

    pub(super) fn warning_line(&self) -> Option<String> {
        (self.status == SolveStatus::MaxIterationsReached).then(|| {
            format!(
                "WARNING: kB solve did not converge after {} iterations (bracket width {:.3e}); showing the best estimate",
                self.iterations, self.bracket_width
            )
        })
    }

    pub(super) fn render_human(&self) -> String {
        let mut lines = vec![format!("Table:            {}", self.source)];
        let mut solved = format!("Solved kB:        {:.6e} {}", self.solved_kb, self.kb_unit);
        if let Some(um_per_mev) = self.solved_kb_um_per_mev {
            solved.push_str(&format!(" ({um_per_mev:.3} um/MeV)"));
        }
        lines.push(solved);
        lines.push(format!("Status:           {}", self.status));
        lines.push(format!("Iterations:       {}", self.iterations));
        lines.push(format!("Residual:         {:.3e} MeV", self.residual_mev));
        lines.push(format!(
            "Verification:     {:.6} MeV visible for {:.6} MeV observed (error {:.4} %)",
            self.verification_energy_mev, self.observed_energy_mev, self.verification_error_percent
        ));
        lines.join("\n")
    }
}

#[derive(Debug, Serialize)]
pub(super) struct SkippedRowReport {
    pub(super) line: usize,
    pub(super) placeholder: &'static str,
    pub(super) message: String,
}

#[derive(Debug, Serialize)]
pub(super) struct TableReport {
    pub(super) source: String,
    pub(super) sample_count: usize,
    pub(super) min_energy_mev: f64,
    pub(super) max_energy_mev: f64,
    pub(super) max_stopping_power: f64,
    pub(super) stopping_unit: String,
    /// `[energy_mev, stopping_power]` pairs.
    pub(super) samples: Vec<[f64; 2]>,
    pub(super) skipped: Vec<SkippedRowReport>,
}

impl TableReport {
    pub(super) fn new(source: String, outcome: &ParseOutcome) -> Self {
        let summary = outcome.table.summary();
        Self {
            source,
            sample_count: summary.sample_count,
            min_energy_mev: summary.min_energy,
            max_energy_mev: summary.max_energy,
            max_stopping_power: summary.max_stopping_power,
            stopping_unit: summary.stopping_unit.to_string(),
            samples: outcome
                .table
                .samples()
                .iter()
                .map(|sample| [sample.energy, sample.stopping_power])
                .collect(),
            skipped: outcome
                .skipped
                .iter()
                .map(|row| SkippedRowReport {
                    line: row.line,
                    placeholder: row.error.placeholder(),
                    message: row.error.to_string(),
                })
                .collect(),
        }
    }

    pub(super) fn render_human(&self) -> String {
        let mut lines = vec![
            format!("Table:          {}", self.source),
            format!("Samples:        {}", self.sample_count),
            format!(
                "Energy range:   {:.4} - {:.2} MeV",
                self.min_energy_mev, self.max_energy_mev
            ),
            format!(
                "Max dE/dx:      {:.2} {}",
                self.max_stopping_power, self.stopping_unit
            ),
            String::new(),
            format!("{:>14}  {:>14}", "Energy (MeV)", "dE/dx"),
        ];
        lines.extend(
            self.samples
                .iter()
                .map(|[energy, stopping]| format!("{energy:>14.6e}  {stopping:>14.6e}")),
        );
        if !self.skipped.is_empty() {
            lines.push(String::new());
            lines.push(format!("Skipped rows:   {}", self.skipped.len()));
            lines.extend(
                self.skipped
                    .iter()
                    .map(|row| format!("  [{}] {}", row.placeholder, row.message)),
            );
        }
        lines.join("\n")
    }
}

#[derive(Debug, Serialize)]
pub(super) struct PresetEntry {
    pub(super) name: String,
    pub(super) description: String,
    pub(super) source: &'static str,
}

pub(super) fn preset_entries(catalog: &PresetCatalog) -> Vec<PresetEntry> {
    catalog
        .iter()
        .map(|(name, preset)| PresetEntry {
            name: name.to_string(),
            description: preset.description.clone(),
            source: match preset.source {
                PresetSource::DataPoints { .. } => "data_points",
                PresetSource::SrimText { .. } => "srim_text",
            },
        })
        .collect()
}

pub(super) fn render_presets_human(entries: &[PresetEntry]) -> String {
    if entries.is_empty() {
        return "No presets in catalog".to_string();
    }
    entries
        .iter()
        .map(|entry| format!("{}\t{}", entry.name, entry.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialization failures are reported as internal errors (exit code 5).
pub(super) fn to_json(value: &impl Serialize) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|error| {
        CliError::Compute(BirksError::internal(
            "RUN.REPORT_JSON",
            format!("failed to serialize JSON report: {error}"),
        ))
    })
}

fn kb_unit_label(unit: PathUnit) -> String {
    format!("{}/MeV", unit.symbol())
}
