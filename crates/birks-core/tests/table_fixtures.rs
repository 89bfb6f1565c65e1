use birks_core::presets::{PresetCatalog, load_preset_catalog};
use birks_core::table::{
    LoaderConfig, ParseError, PathFamily, StoppingUnit, parse_stopping_power_table,
    parse_with_diagnostics,
};
use std::fs;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn srim_fixture() -> String {
    fs::read_to_string(fixture_path("srim_helium_in_test_crystal.txt"))
        .expect("SRIM fixture should be readable")
}

#[test]
fn srim_output_parses_between_header_and_trailer() {
    let outcome = parse_with_diagnostics(&srim_fixture(), &LoaderConfig::default())
        .expect("SRIM fixture should parse");
    let table = &outcome.table;

    assert_eq!(table.len(), 13);
    assert_eq!(table.path_family(), PathFamily::Length);
    assert_eq!(table.stopping_unit(), StoppingUnit::MEV_PER_MM);
    assert!((table.min_energy() - 0.01).abs() < 1.0e-15);
    assert_eq!(table.max_energy(), 10.0);

    let summary = table.summary();
    assert_eq!(summary.max_stopping_power, 200.0);

    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].line, 29);
    assert!(matches!(
        outcome.skipped[0].error,
        ParseError::MalformedRow { line: 29, .. }
    ));

    let energies: Vec<f64> = table.samples().iter().map(|sample| sample.energy).collect();
    assert!(energies.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn equivalent_declared_units_give_identical_tables() {
    let text = srim_fixture();
    let per_mm = parse_stopping_power_table(&text).expect("MeV/mm should parse");
    let per_micron = parse_stopping_power_table(&text.replace("MeV / mm  ", "keV / micron"))
        .expect("keV/micron should parse");

    for (left, right) in per_mm.samples().iter().zip(per_micron.samples()) {
        assert_eq!(left.energy, right.energy);
        assert!(
            (left.stopping_power - right.stopping_power).abs() <= 1.0e-12 * left.stopping_power,
            "{left:?} vs {right:?}"
        );
    }

    let per_angstrom = parse_stopping_power_table(&text.replace("MeV / mm  ", "eV / Angstrom"))
        .expect("eV/Angstrom should parse");
    // 1 eV/A = 10 MeV/mm
    assert!((per_angstrom.samples()[0].stopping_power - 450.0).abs() < 1.0e-9);
}

#[test]
fn mass_stopping_declaration_switches_family() {
    let text = srim_fixture().replace("MeV / mm  ", "MeV / (mg/cm2)");
    let table = parse_stopping_power_table(&text).expect("mass stopping should parse");
    assert_eq!(table.path_family(), PathFamily::MassThickness);
    assert_eq!(table.samples()[0].stopping_power, 45.0);
}

#[test]
fn truncated_srim_output_without_rows_fails() {
    let text = srim_fixture();
    let header_only: String = text
        .lines()
        .take(26)
        .map(|line| format!("{line}\n"))
        .collect();
    assert_eq!(
        parse_stopping_power_table(&header_only),
        Err(ParseError::NoDataRegionFound)
    );
}

#[test]
fn preset_catalog_fixture_loads_every_preset() {
    let catalog =
        load_preset_catalog(fixture_path("presets.json")).expect("catalog should load");
    let names: Vec<&str> = catalog.names().collect();
    assert_eq!(
        names,
        [
            "Helium in Test Crystal",
            "Proton in Test Crystal",
            "Proton in Test Foil"
        ]
    );

    for name in names {
        let outcome = catalog
            .load_table(name, &LoaderConfig::default())
            .unwrap_or_else(|error| panic!("preset '{name}' should load: {error}"));
        assert!(outcome.table.len() >= 3, "{name}");
        assert!(outcome.skipped.is_empty(), "{name}");
    }

    let foil = catalog
        .load_table("Proton in Test Foil", &LoaderConfig::default())
        .expect("foil preset should load");
    assert_eq!(foil.table.path_family(), PathFamily::MassThickness);
}

#[test]
fn srim_preset_matches_the_standalone_parser() {
    let source = fs::read_to_string(fixture_path("presets.json")).expect("catalog readable");
    let catalog = PresetCatalog::from_json_str(&source).expect("catalog should parse");
    let outcome = catalog
        .load_table("Helium in Test Crystal", &LoaderConfig::default())
        .expect("preset should load");

    let full = parse_stopping_power_table(&srim_fixture()).expect("fixture should parse");
    for sample in outcome.table.samples() {
        let matching = full
            .samples()
            .iter()
            .find(|candidate| candidate.energy == sample.energy)
            .expect("preset energies are a subset of the fixture");
        assert_eq!(matching.stopping_power, sample.stopping_power);
    }
}
