//! Error handling for VISIM file exchange and engine runs.
//!
//! Format errors name the file format, the field or section involved and,
//! where there is one, the 1-based line number. No decoder ever hands back a
//! partially filled value alongside an error.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The plain-text formats exchanged with the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Parameter,
    Tabular,
    SimulationOutput,
    EstimationOutput,
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileFormat::Parameter => "parameter file",
            FileFormat::Tabular => "GEO-EAS file",
            FileFormat::SimulationOutput => "simulation output",
            FileFormat::EstimationOutput => "estimation output",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum VisimError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{format}: no line containing '{marker}' found")]
    SentinelNotFound {
        format: FileFormat,
        marker: &'static str,
    },

    #[error("{format}: line {line} ({field}) has {found} tokens, expected {expected}")]
    FieldCountMismatch {
        format: FileFormat,
        line: usize,
        field: String,
        expected: usize,
        found: usize,
    },

    #[error("{format}: line {line} ({field}): '{token}' is not a valid number")]
    NumericParse {
        format: FileFormat,
        line: usize,
        field: String,
        token: String,
    },

    #[error(
        "{format}: nst declares {declared} variogram structures but only {found} are present (input ends before line {line})"
    )]
    StructureCountMismatch {
        format: FileFormat,
        declared: usize,
        found: usize,
        line: usize,
    },

    #[error(
        "{format}: {field} '{value}' cannot be written; it must be a single non-empty token"
    )]
    UnwritableField {
        format: FileFormat,
        field: &'static str,
        value: String,
    },

    #[error("{context}: expected {expected} values, found {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("Schema mismatch for {view}: needs at least {required} columns, found {found}")]
    SchemaMismatch {
        view: &'static str,
        required: usize,
        found: usize,
    },

    #[error("Parameter file not found: {path}")]
    ParameterFileNotFound { path: PathBuf },

    #[error("VISIM executable not found: {name} (put it on PATH, set VISIM_EXE or pass --exe)")]
    ExecutableNotFound { name: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Configuration file error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl VisimError {
    /// Create a dimension mismatch error
    pub fn dimension_mismatch(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }

    /// True for errors caused by malformed input text. Re-reading the same
    /// input gives the same error, so callers must not retry these.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::SentinelNotFound { .. }
                | Self::FieldCountMismatch { .. }
                | Self::NumericParse { .. }
                | Self::StructureCountMismatch { .. }
                | Self::UnwritableField { .. }
                | Self::DimensionMismatch { .. }
                | Self::SchemaMismatch { .. }
        )
    }

    /// The 1-based line number the error refers to, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::FieldCountMismatch { line, .. }
            | Self::NumericParse { line, .. }
            | Self::StructureCountMismatch { line, .. } => Some(*line),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, VisimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_classification() {
        let err = VisimError::SentinelNotFound {
            format: FileFormat::Parameter,
            marker: "START OF PARAMETERS",
        };
        assert!(err.is_format_error());
        assert_eq!(err.line(), None);

        let err = VisimError::from(std::io::Error::other("disk gone"));
        assert!(!err.is_format_error());
    }

    #[test]
    fn test_messages_name_format_field_and_line() {
        let err = VisimError::NumericParse {
            format: FileFormat::Parameter,
            line: 12,
            field: "nx,xmn,xsiz".to_string(),
            token: "fifty".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("parameter file"));
        assert!(message.contains("line 12"));
        assert!(message.contains("nx,xmn,xsiz"));
        assert!(message.contains("'fifty'"));
        assert_eq!(err.line(), Some(12));
    }
}
