use crate::engine::{EngineConfigError, EngineError};
use crate::presets::{PresetCatalogError, PresetError};
use crate::table::ParseError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BirksResult<T> = Result<T, BirksError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BirksErrorCategory {
    Success,
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl BirksErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
            Self::InternalError => "InternalError",
        }
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success)
    }
}

/// Categorized error surfaced at the calling-layer boundary.
///
/// The placeholder is a stable dotted identifier naming the check that failed
/// (`INPUT.TABLE_EMPTY`, `RUN.NO_BRACKET`, ...); the message carries the
/// offending values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirksError {
    category: BirksErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl BirksError {
    pub fn new(
        category: BirksErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            BirksErrorCategory::InputValidationError,
            placeholder,
            message,
        )
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(BirksErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn computation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(BirksErrorCategory::ComputationError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(BirksErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> BirksErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        let severity = if self.category.is_fatal() {
            "ERROR"
        } else {
            "INFO"
        };
        format!("{}: [{}] {}", severity, self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> Option<String> {
        self.category
            .is_fatal()
            .then(|| format!("FATAL EXIT CODE: {}", self.exit_code()))
    }
}

impl Display for BirksError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.as_str(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for BirksError {}

impl From<ParseError> for BirksError {
    fn from(error: ParseError) -> Self {
        Self::input_validation(error.placeholder(), error.to_string())
    }
}

impl From<EngineError> for BirksError {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::NoBracketFound { .. } | EngineError::NumericalFailure { .. } => {
                Self::computation(error.placeholder(), error.to_string())
            }
            _ => Self::input_validation(error.placeholder(), error.to_string()),
        }
    }
}

impl From<EngineConfigError> for BirksError {
    fn from(error: EngineConfigError) -> Self {
        match error {
            EngineConfigError::Read { .. } => Self::io_system("IO.ENGINE_CONFIG", error.to_string()),
            EngineConfigError::Parse { .. } => {
                Self::input_validation("INPUT.ENGINE_CONFIG", error.to_string())
            }
        }
    }
}

impl From<PresetCatalogError> for BirksError {
    fn from(error: PresetCatalogError) -> Self {
        match error {
            PresetCatalogError::Read { .. } => {
                Self::io_system("IO.PRESET_CATALOG", error.to_string())
            }
            PresetCatalogError::Parse { .. } => {
                Self::input_validation("INPUT.PRESET_CATALOG", error.to_string())
            }
        }
    }
}

impl From<PresetError> for BirksError {
    fn from(error: PresetError) -> Self {
        match error {
            PresetError::Table { source, .. } => source.into(),
            PresetError::UnknownPreset { .. } => {
                Self::input_validation("INPUT.PRESET_UNKNOWN", error.to_string())
            }
            PresetError::InvalidStoppingUnit { .. } => {
                Self::input_validation("INPUT.PRESET_UNIT", error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BirksError, BirksErrorCategory};
    use crate::engine::EngineError;
    use crate::table::ParseError;

    #[test]
    fn exit_mapping_is_stable() {
        let cases = [
            (BirksErrorCategory::Success, 0, "Success"),
            (
                BirksErrorCategory::InputValidationError,
                2,
                "InputValidationError",
            ),
            (BirksErrorCategory::IoSystemError, 3, "IoSystemError"),
            (BirksErrorCategory::ComputationError, 4, "ComputationError"),
            (BirksErrorCategory::InternalError, 5, "InternalError"),
        ];

        for (category, exit_code, name) in cases {
            assert_eq!(category.exit_code(), exit_code);
            assert_eq!(category.as_str(), name);
        }
    }

    #[test]
    fn fatal_error_renders_diagnostic_lines() {
        let error = BirksError::input_validation(
            "INPUT.TABLE_EMPTY",
            "stopping-power table has no valid rows",
        );

        assert_eq!(error.exit_code(), 2);
        assert_eq!(
            error.diagnostic_line(),
            "ERROR: [INPUT.TABLE_EMPTY] stopping-power table has no valid rows"
        );
        assert_eq!(
            error.fatal_exit_line().as_deref(),
            Some("FATAL EXIT CODE: 2")
        );
    }

    #[test]
    fn parse_errors_map_to_input_validation() {
        let error: BirksError = ParseError::EmptyTable { skipped: 3 }.into();
        assert_eq!(error.category(), BirksErrorCategory::InputValidationError);
        assert_eq!(error.placeholder(), "INPUT.TABLE_EMPTY");
        assert!(error.message().contains("3 rows skipped"));
    }

    #[test]
    fn missing_bracket_is_a_computation_failure() {
        let error: BirksError = EngineError::NoBracketFound {
            target: 0.1,
            max_kb: 1.0e6,
            visible_at_max: 0.5,
        }
        .into();
        assert_eq!(error.category(), BirksErrorCategory::ComputationError);
        assert_eq!(error.exit_code(), 4);
        assert_eq!(error.placeholder(), "RUN.NO_BRACKET");
    }

    #[test]
    fn energy_errors_name_the_offending_value() {
        let error: BirksError = EngineError::InvalidEnergy { value: -1.5 }.into();
        assert_eq!(error.placeholder(), "INPUT.ENERGY");
        assert!(error.message().contains("-1.5"));
    }
}
