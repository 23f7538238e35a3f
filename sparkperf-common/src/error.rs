use thiserror::Error;

/// Broad class of a failure, used by callers that orchestrate many tests and
/// decide per class whether to skip a test or halt the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    TypeMismatch,
    Io,
    Parse,
}

/// Main error type for sparkperf
#[derive(Error, Debug)]
pub enum PerfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Axis '{axis}' has no values")]
    EmptyValues { axis: String },

    #[error("Boolean flag '{axis}' must have exactly one value, got {count}")]
    MultipleFlagValues { axis: String, count: usize },

    #[error("Axis '{axis}' of kind {kind} cannot be scalable")]
    UnscalableKind { axis: String, kind: String },

    #[error("Axis '{axis}' declared as both {first} and {second}")]
    ConflictingAxis {
        axis: String,
        first: String,
        second: String,
    },

    #[error("Scale factor must be a finite number > 0, got {0}")]
    NonPositiveScaleFactor(f64),

    #[error("Invalid platform version: {0}")]
    InvalidVersion(String),

    #[error("Unknown suite: {0}")]
    UnknownSuite(String),

    #[error("Type mismatch on axis '{axis}': expected {expected}, found {found}")]
    TypeMismatch {
        axis: String,
        expected: String,
        found: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl PerfError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PerfError::Io(_) => ErrorCategory::Io,
            PerfError::TypeMismatch { .. } => ErrorCategory::TypeMismatch,
            PerfError::TomlParse(_) | PerfError::TomlSerialize(_) => ErrorCategory::Parse,
            PerfError::EmptyValues { .. }
            | PerfError::MultipleFlagValues { .. }
            | PerfError::UnscalableKind { .. }
            | PerfError::ConflictingAxis { .. }
            | PerfError::NonPositiveScaleFactor(_)
            | PerfError::InvalidVersion(_)
            | PerfError::UnknownSuite(_)
            | PerfError::Config(_) => ErrorCategory::Configuration,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    pub fn is_type_mismatch(&self) -> bool {
        self.category() == ErrorCategory::TypeMismatch
    }
}

pub type Result<T> = std::result::Result<T, PerfError>;
