use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized unit '{token}'")]
pub struct UnknownUnit {
    pub token: String,
}

impl UnknownUnit {
    fn new(token: &str) -> Self {
        Self {
            token: token.trim().to_string(),
        }
    }
}

/// Energy suffixes accepted on tabulated rows. The vocabulary is closed:
/// anything else (including `TeV`) is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnergyUnit {
    #[serde(rename = "eV")]
    ElectronVolt,
    #[serde(rename = "keV")]
    KiloElectronVolt,
    #[serde(rename = "MeV")]
    MegaElectronVolt,
    #[serde(rename = "GeV")]
    GigaElectronVolt,
}

impl EnergyUnit {
    pub const ALL: [Self; 4] = [
        Self::ElectronVolt,
        Self::KiloElectronVolt,
        Self::MegaElectronVolt,
        Self::GigaElectronVolt,
    ];

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::ElectronVolt => "eV",
            Self::KiloElectronVolt => "keV",
            Self::MegaElectronVolt => "MeV",
            Self::GigaElectronVolt => "GeV",
        }
    }

    /// Exact, case-sensitive match against the four symbols, so `meV` is
    /// never read as `MeV`.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL.into_iter().find(|unit| unit.symbol() == token)
    }

    pub fn to_mev(self, value: f64) -> f64 {
        match self {
            Self::ElectronVolt => value / 1.0e6,
            Self::KiloElectronVolt => value / 1.0e3,
            Self::MegaElectronVolt => value,
            Self::GigaElectronVolt => value * 1.0e3,
        }
    }

    pub fn from_mev(self, value_mev: f64) -> f64 {
        match self {
            Self::ElectronVolt => value_mev * 1.0e6,
            Self::KiloElectronVolt => value_mev * 1.0e3,
            Self::MegaElectronVolt => value_mev,
            Self::GigaElectronVolt => value_mev / 1.0e3,
        }
    }
}

impl Display for EnergyUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).symbol())
    }
}

impl FromStr for EnergyUnit {
    type Err = UnknownUnit;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::from_token(token).ok_or_else(|| UnknownUnit::new(token))
    }
}

/// Which kind of "path length" a stopping power is expressed per.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathFamily {
    Length,
    MassThickness,
    ArealDensity,
}

impl PathFamily {
    pub const fn canonical_unit(self) -> PathUnit {
        match self {
            Self::Length => PathUnit::Millimeter,
            Self::MassThickness => PathUnit::MilligramPerSquareCentimeter,
            Self::ArealDensity => PathUnit::AtomsPerSquareCentimeter1e15,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Length => "length",
            Self::MassThickness => "mass-thickness",
            Self::ArealDensity => "areal-density",
        }
    }
}

impl Display for PathFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathUnit {
    Angstrom,
    Nanometer,
    Micrometer,
    Millimeter,
    Centimeter,
    Meter,
    MilligramPerSquareCentimeter,
    GramPerSquareCentimeter,
    AtomsPerSquareCentimeter1e15,
}

impl PathUnit {
    pub const fn family(self) -> PathFamily {
        match self {
            Self::Angstrom
            | Self::Nanometer
            | Self::Micrometer
            | Self::Millimeter
            | Self::Centimeter
            | Self::Meter => PathFamily::Length,
            Self::MilligramPerSquareCentimeter | Self::GramPerSquareCentimeter => {
                PathFamily::MassThickness
            }
            Self::AtomsPerSquareCentimeter1e15 => PathFamily::ArealDensity,
        }
    }

    /// Size of one of these units expressed in the family's canonical unit.
    pub const fn canonical_scale(self) -> f64 {
        match self {
            Self::Angstrom => 1.0e-7,
            Self::Nanometer => 1.0e-6,
            Self::Micrometer => 1.0e-3,
            Self::Millimeter => 1.0,
            Self::Centimeter => 10.0,
            Self::Meter => 1.0e3,
            Self::MilligramPerSquareCentimeter => 1.0,
            Self::GramPerSquareCentimeter => 1.0e3,
            Self::AtomsPerSquareCentimeter1e15 => 1.0,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Angstrom => "Angstrom",
            Self::Nanometer => "nm",
            Self::Micrometer => "um",
            Self::Millimeter => "mm",
            Self::Centimeter => "cm",
            Self::Meter => "m",
            Self::MilligramPerSquareCentimeter => "mg/cm2",
            Self::GramPerSquareCentimeter => "g/cm2",
            Self::AtomsPerSquareCentimeter1e15 => "1E15 atoms/cm2",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        let normalized = normalize_path_token(token);
        let unit = match normalized.as_str() {
            "a" | "å" | "ang" | "angstrom" | "angstroms" => Self::Angstrom,
            "nm" => Self::Nanometer,
            "um" | "micron" | "microns" | "micrometer" | "micrometers" => Self::Micrometer,
            "mm" => Self::Millimeter,
            "cm" => Self::Centimeter,
            "m" => Self::Meter,
            "mg/cm2" => Self::MilligramPerSquareCentimeter,
            "g/cm2" => Self::GramPerSquareCentimeter,
            "1e15atoms/cm2" => Self::AtomsPerSquareCentimeter1e15,
            _ => return None,
        };
        Some(unit)
    }
}

impl Display for PathUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).symbol())
    }
}

impl FromStr for PathUnit {
    type Err = UnknownUnit;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::from_token(token).ok_or_else(|| UnknownUnit::new(token))
    }
}

fn normalize_path_token(token: &str) -> String {
    let mut normalized: String = token
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect::<String>()
        .to_lowercase()
        .replace(['µ', 'μ'], "u")
        .replace("^2", "2")
        .replace('²', "2");

    while normalized.starts_with('(') && normalized.ends_with(')') && normalized.len() >= 2 {
        normalized = normalized[1..normalized.len() - 1].to_string();
    }

    normalized
}

/// Unit of a stopping-power value: energy per path unit, e.g. `keV / micron`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoppingUnit {
    pub energy: EnergyUnit,
    pub path: PathUnit,
}

impl StoppingUnit {
    pub const MEV_PER_MM: Self = Self {
        energy: EnergyUnit::MegaElectronVolt,
        path: PathUnit::Millimeter,
    };

    pub const fn new(energy: EnergyUnit, path: PathUnit) -> Self {
        Self { energy, path }
    }

    /// MeV per canonical path unit of `family`.
    pub const fn canonical(family: PathFamily) -> Self {
        Self {
            energy: EnergyUnit::MegaElectronVolt,
            path: family.canonical_unit(),
        }
    }

    pub const fn family(self) -> PathFamily {
        self.path.family()
    }

    pub fn to_canonical(self, value: f64) -> f64 {
        self.energy.to_mev(value) / self.path.canonical_scale()
    }

    pub fn from_token(token: &str) -> Option<Self> {
        let (energy, path) = token.split_once('/')?;
        Some(Self {
            energy: EnergyUnit::from_token(energy)?,
            path: PathUnit::from_token(path)?,
        })
    }
}

impl Default for StoppingUnit {
    fn default() -> Self {
        Self::MEV_PER_MM
    }
}

impl Display for StoppingUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.path.family() {
            PathFamily::Length => write!(f, "{} / {}", self.energy, self.path),
            _ => write!(f, "{} / ({})", self.energy, self.path),
        }
    }
}

impl FromStr for StoppingUnit {
    type Err = UnknownUnit;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::from_token(token).ok_or_else(|| UnknownUnit::new(token))
    }
}
