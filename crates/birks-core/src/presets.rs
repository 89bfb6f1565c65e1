//! Named stopping-power datasets stored as JSON.
//!
//! ```json
//! {
//!   "Alpha in GAGG": {
//!     "description": "SRIM, alpha in Gd3Al2Ga3O12",
//!     "data_points": [[0.01, 95.0], [0.1, 180.0]],
//!     "stopping_unit": "MeV/mm"
//!   },
//!   "Proton in LYSO": { "description": "...", "srim_text": "..." }
//! }
//! ```
//!
//! `data_points` energies are in MeV; their stopping powers use
//! `stopping_unit` or, when absent, the loader's default unit.

use crate::table::{
    LoaderConfig, ParseError, ParseOutcome, StoppingPowerSample, StoppingPowerTable, StoppingUnit,
    parse_with_diagnostics,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PresetSource {
    DataPoints {
        data_points: Vec<[f64; 2]>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stopping_unit: Option<String>,
    },
    SrimText {
        srim_text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Preset {
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub source: PresetSource,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PresetCatalog {
    presets: BTreeMap<String, Preset>,
}

#[derive(Debug, thiserror::Error)]
pub enum PresetCatalogError {
    #[error("failed to read preset catalog '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse preset catalog '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PresetError {
    #[error("unknown preset '{name}'")]
    UnknownPreset { name: String },
    #[error("preset '{name}' has an unrecognized stopping unit '{token}'")]
    InvalidStoppingUnit { name: String, token: String },
    #[error("preset '{name}': {source}")]
    Table {
        name: String,
        #[source]
        source: ParseError,
    },
}

impl PresetCatalog {
    pub fn from_json_str(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Preset names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Preset)> {
        self.presets
            .iter()
            .map(|(name, preset)| (name.as_str(), preset))
    }

    /// Build the named preset's table. Numeric presets never skip rows; text
    /// presets go through the regular parser and report its skipped rows.
    pub fn load_table(
        &self,
        name: &str,
        loader: &LoaderConfig,
    ) -> Result<ParseOutcome, PresetError> {
        let preset = self.get(name).ok_or_else(|| PresetError::UnknownPreset {
            name: name.to_string(),
        })?;
        let table_error = |source| PresetError::Table {
            name: name.to_string(),
            source,
        };

        let outcome = match &preset.source {
            PresetSource::DataPoints {
                data_points,
                stopping_unit,
            } => {
                let unit = match stopping_unit {
                    Some(token) => StoppingUnit::from_token(token).ok_or_else(|| {
                        PresetError::InvalidStoppingUnit {
                            name: name.to_string(),
                            token: token.clone(),
                        }
                    })?,
                    None => loader.default_stopping_unit,
                };
                let samples = data_points
                    .iter()
                    .map(|&[energy, stopping]| StoppingPowerSample::new(energy, stopping));
                let table =
                    StoppingPowerTable::from_samples(samples, unit).map_err(table_error)?;
                ParseOutcome {
                    table,
                    skipped: Vec::new(),
                }
            }
            PresetSource::SrimText { srim_text } => {
                parse_with_diagnostics(srim_text, loader).map_err(table_error)?
            }
        };

        tracing::debug!(
            preset = name,
            samples = outcome.table.len(),
            "loaded preset table"
        );
        Ok(outcome)
    }
}

pub fn load_preset_catalog(
    catalog_path: impl AsRef<Path>,
) -> Result<PresetCatalog, PresetCatalogError> {
    let catalog_path = catalog_path.as_ref();
    let source = fs::read_to_string(catalog_path).map_err(|source| PresetCatalogError::Read {
        path: catalog_path.to_path_buf(),
        source,
    })?;
    PresetCatalog::from_json_str(&source).map_err(|source| PresetCatalogError::Parse {
        path: catalog_path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{PresetCatalog, PresetCatalogError, PresetError, PresetSource, load_preset_catalog};
    use crate::table::{LoaderConfig, ParseError, PathFamily};
    use tempfile::TempDir;

    const CATALOG: &str = r#"{
        "Proton in Test Crystal": {
            "description": "synthetic proton table",
            "data_points": [[0.5, 40.0], [0.1, 60.0], [2.0, 20.0]]
        },
        "Alpha in Foil": {
            "description": "areal stopping",
            "data_points": [[1.0, 2.0], [2.0, 1.5]],
            "stopping_unit": "keV / (mg/cm2)"
        },
        "Text Table": {
            "description": "SRIM-like text",
            "srim_text": " Stopping Units =  MeV / mm\n 100.00 keV   5.000E+01   1.000E-01\n 1.00 MeV   3.000E+01   2.000E-02\n garbage row\n"
        }
    }"#;

    fn catalog() -> PresetCatalog {
        PresetCatalog::from_json_str(CATALOG).expect("catalog should parse")
    }

    #[test]
    fn names_are_sorted_and_sources_are_distinguished() {
        let catalog = catalog();
        let names: Vec<&str> = catalog.names().collect();
        assert_eq!(names, ["Alpha in Foil", "Proton in Test Crystal", "Text Table"]);
        assert!(matches!(
            catalog.get("Text Table").map(|preset| &preset.source),
            Some(PresetSource::SrimText { .. })
        ));
        assert_eq!(
            catalog
                .get("Alpha in Foil")
                .map(|preset| preset.description.as_str()),
            Some("areal stopping")
        );
    }

    #[test]
    fn numeric_presets_are_sorted_and_converted() {
        let catalog = catalog();
        let outcome = catalog
            .load_table("Proton in Test Crystal", &LoaderConfig::default())
            .expect("preset should load");
        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.table.min_energy(), 0.1);
        assert_eq!(outcome.table.max_energy(), 2.0);

        let outcome = catalog
            .load_table("Alpha in Foil", &LoaderConfig::default())
            .expect("preset should load");
        assert_eq!(outcome.table.path_family(), PathFamily::MassThickness);
        assert!((outcome.table.samples()[0].stopping_power - 2.0e-3).abs() < 1.0e-15);
    }

    #[test]
    fn text_presets_report_skipped_rows() {
        let outcome = catalog()
            .load_table("Text Table", &LoaderConfig::default())
            .expect("preset should load");
        assert_eq!(outcome.table.len(), 2);
        assert_eq!(outcome.table.min_energy(), 0.1);
        assert_eq!(outcome.skipped.len(), 1);
    }

    #[test]
    fn unknown_and_invalid_presets_fail() {
        let catalog = catalog();
        assert_eq!(
            catalog.load_table("Missing", &LoaderConfig::default()),
            Err(PresetError::UnknownPreset {
                name: "Missing".to_string(),
            })
        );

        let broken = PresetCatalog::from_json_str(
            r#"{
                "One Point": { "description": "", "data_points": [[1.0, 2.0]] },
                "Odd Unit": { "description": "", "data_points": [[1.0, 2.0]], "stopping_unit": "MeV/furlong" }
            }"#,
        )
        .expect("catalog should parse");
        assert_eq!(
            broken.load_table("One Point", &LoaderConfig::default()),
            Err(PresetError::Table {
                name: "One Point".to_string(),
                source: ParseError::TooFewSamples { count: 1 },
            })
        );
        assert!(matches!(
            broken.load_table("Odd Unit", &LoaderConfig::default()),
            Err(PresetError::InvalidStoppingUnit { .. })
        ));
    }

    #[test]
    fn load_preset_catalog_reports_path_on_failure() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("presets.json");
        let error = load_preset_catalog(&path).expect_err("missing catalog should fail");
        assert!(matches!(error, PresetCatalogError::Read { .. }));

        std::fs::write(&path, r#"{"x": {"description": "no data"}}"#)
            .expect("fixture should be written");
        let error = load_preset_catalog(&path).expect_err("preset without data should fail");
        assert!(matches!(error, PresetCatalogError::Parse { .. }));

        std::fs::write(&path, CATALOG).expect("fixture should be written");
        let catalog = load_preset_catalog(&path).expect("catalog should load");
        assert_eq!(catalog.len(), 3);
    }
}
