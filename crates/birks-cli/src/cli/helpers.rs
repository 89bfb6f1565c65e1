use super::CliError;
use anyhow::Context;
use birks_core::domain::BirksError;
use birks_core::engine::{BirksEngine, EngineConfig, load_engine_config};
use birks_core::presets::{PresetCatalog, load_preset_catalog};
use birks_core::table::{LoaderConfig, ParseOutcome, StoppingUnit, parse_with_diagnostics};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(clap::Args)]
#[command(group(clap::ArgGroup::new("source").required(true).args(["table", "preset"])))]
pub(super) struct TableSourceArgs {
    /// Stopping-power table file (SRIM output or `<energy> <unit> <dE/dx>` rows)
    #[arg(long, value_name = "FILE")]
    pub(super) table: Option<PathBuf>,

    /// Preset name from the catalog given by --presets
    #[arg(long, value_name = "NAME", requires = "presets")]
    pub(super) preset: Option<String>,

    /// Preset catalog JSON
    #[arg(long, value_name = "FILE")]
    pub(super) presets: Option<PathBuf>,

    /// Stopping unit assumed when the table declares none
    #[arg(long, value_name = "UNIT", default_value = "MeV/mm")]
    pub(super) stopping_unit: StoppingUnit,
}

/// A parsed table together with where it came from.
pub(super) struct LoadedTable {
    pub(super) source: String,
    pub(super) outcome: ParseOutcome,
}

pub(super) fn compute_error(error: impl Into<BirksError>) -> CliError {
    CliError::Compute(error.into())
}

pub(super) fn load_table(args: &TableSourceArgs) -> Result<LoadedTable, CliError> {
    let loader = LoaderConfig {
        default_stopping_unit: args.stopping_unit,
    };

    if let Some(path) = &args.table {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read stopping-power table '{}'", path.display()))?;
        let outcome = parse_with_diagnostics(&text, &loader).map_err(compute_error)?;
        return Ok(LoadedTable {
            source: path.display().to_string(),
            outcome,
        });
    }

    let (Some(name), Some(catalog_path)) = (&args.preset, &args.presets) else {
        return Err(CliError::Usage(
            "either --table or --preset together with --presets is required".to_string(),
        ));
    };
    let catalog = load_catalog(catalog_path)?;
    let outcome = catalog.load_table(name, &loader).map_err(compute_error)?;
    Ok(LoadedTable {
        source: format!("preset '{name}'"),
        outcome,
    })
}

pub(super) fn load_catalog(path: &Path) -> Result<PresetCatalog, CliError> {
    load_preset_catalog(path).map_err(compute_error)
}

pub(super) fn build_engine(config_path: Option<&Path>) -> Result<BirksEngine, CliError> {
    let config = match config_path {
        Some(path) => load_engine_config(path).map_err(compute_error)?,
        None => EngineConfig::default(),
    };
    BirksEngine::new(config).map_err(compute_error)
}

/// |actual - expected| / |expected| in percent.
pub(super) fn relative_error_percent(actual: f64, expected: f64) -> f64 {
    if expected == 0.0 {
        0.0
    } else {
        (actual - expected).abs() / expected.abs() * 100.0
    }
}

pub(super) fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A subscriber may already be installed when running in-process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
