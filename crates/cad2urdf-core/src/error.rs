//! Fatal export errors

use std::fmt;

use crate::config::ConfigError;

/// Which bound of a limit pair is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitBound {
    Lower,
    Upper,
}

impl fmt::Display for LimitBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitBound::Lower => write!(f, "lower"),
            LimitBound::Upper => write!(f, "upper"),
        }
    }
}

/// Errors that abort an export run. No partial joint table is produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExportError {
    #[error("{joint} is not set its {missing} limit. Please set it and try again.")]
    AsymmetricLimit { joint: String, missing: LimitBound },

    #[error("{0} doesn't have joint origin. Please set it and run again.")]
    MissingJointOrigin(String),

    #[error("No joints were found. Please check the design and try again.")]
    EmptySnapshot,

    #[error("Failed to parse host snapshot: {0}")]
    Snapshot(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for export passes
pub type ExportResult<T> = Result<T, ExportError>;
