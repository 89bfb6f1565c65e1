use super::CliError;
use super::helpers::{
    TableSourceArgs, build_engine, compute_error, load_catalog, load_table,
    relative_error_percent,
};
use super::report::{
    ForwardReport, InverseReport, TableReport, preset_entries, render_presets_human, to_json,
};
use birks_core::engine::convert_birks_constant;
use birks_core::table::{EnergyUnit, PathUnit};
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct EngineArgs {
    /// Engine configuration JSON (camelCase keys, missing keys keep their defaults)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct ForwardArgs {
    #[command(flatten)]
    source: TableSourceArgs,

    /// Deposited particle energy
    #[arg(long, allow_negative_numbers = true)]
    energy: f64,

    /// Unit of --energy
    #[arg(long, default_value = "MeV")]
    energy_unit: EnergyUnit,

    /// Birks constant, in --kb-unit per MeV
    #[arg(long, allow_negative_numbers = true)]
    kb: f64,

    /// Path unit of --kb (defaults to the table's canonical unit, mm for length tables)
    #[arg(long, value_name = "UNIT")]
    kb_unit: Option<PathUnit>,

    #[command(flatten)]
    engine: EngineArgs,

    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct InverseArgs {
    #[command(flatten)]
    source: TableSourceArgs,

    /// Deposited particle energy
    #[arg(long, allow_negative_numbers = true)]
    energy: f64,

    /// Unit of --energy
    #[arg(long, default_value = "MeV")]
    energy_unit: EnergyUnit,

    /// Observed visible (electron-equivalent) energy
    #[arg(long, allow_negative_numbers = true)]
    observed: f64,

    /// Unit of --observed
    #[arg(long, default_value = "MeV")]
    observed_unit: EnergyUnit,

    #[command(flatten)]
    engine: EngineArgs,

    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct TableArgs {
    #[command(flatten)]
    source: TableSourceArgs,

    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct PresetsArgs {
    /// Preset catalog JSON
    #[arg(long, value_name = "FILE")]
    presets: PathBuf,

    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,
}

pub(super) fn run_forward_command(args: ForwardArgs) -> Result<i32, CliError> {
    let engine = build_engine(args.engine.config.as_deref())?;
    let loaded = load_table(&args.source)?;
    let table = &loaded.outcome.table;
    let family = table.path_family();

    let kb_unit = args.kb_unit.unwrap_or(family.canonical_unit());
    let kb = convert_birks_constant(args.kb, kb_unit, family).map_err(compute_error)?;
    let energy = args.energy_unit.to_mev(args.energy);
    let result = engine
        .compute_visible_energy(table, energy, kb)
        .map_err(compute_error)?;

    let report = ForwardReport::new(loaded.source, family, &result);
    if args.json {
        println!("{}", to_json(&report)?);
    } else {
        println!("{}", report.render_human());
    }
    Ok(0)
}

pub(super) fn run_inverse_command(args: InverseArgs) -> Result<i32, CliError> {
    let engine = build_engine(args.engine.config.as_deref())?;
    let loaded = load_table(&args.source)?;
    let table = &loaded.outcome.table;

    let energy = args.energy_unit.to_mev(args.energy);
    let observed = args.observed_unit.to_mev(args.observed);
    let result = engine
        .solve_birks_constant(table, energy, observed)
        .map_err(compute_error)?;

    let report = InverseReport::new(
        loaded.source,
        table.path_family(),
        energy,
        observed,
        &result,
        relative_error_percent(result.visible_energy, observed),
    );
    let warning = report.warning_line();
    if args.json {
        if let Some(warning) = &warning {
            eprintln!("{warning}");
        }
        println!("{}", to_json(&report)?);
    } else {
        if let Some(warning) = &warning {
            println!("{warning}");
        }
        println!("{}", report.render_human());
    }
    Ok(0)
}

pub(super) fn run_table_command(args: TableArgs) -> Result<i32, CliError> {
    let loaded = load_table(&args.source)?;
    let report = TableReport::new(loaded.source, &loaded.outcome);
    if args.json {
        println!("{}", to_json(&report)?);
    } else {
        println!("{}", report.render_human());
    }
    Ok(0)
}

pub(super) fn run_presets_command(args: PresetsArgs) -> Result<i32, CliError> {
    let catalog = load_catalog(&args.presets)?;
    let entries = preset_entries(&catalog);
    if args.json {
        println!("{}", to_json(&entries)?);
    } else {
        println!("{}", render_presets_human(&entries));
    }
    Ok(0)
}
