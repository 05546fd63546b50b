//! Error types for comparisons
//!
//! [`CompareError`] never escapes a comparison: every instance is recorded
//! on the FAILED result node it was raised for.

use mv_config::ConfigError;
use mv_core::{FilterError, ScalarKind, ValueKind};
use rust_decimal::Decimal;
use thiserror::Error;

/// Per-field comparison errors
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("type mismatch: expected {expected} but actual is {actual}")]
    ScalarTypeMismatch {
        expected: ScalarKind,
        actual: ScalarKind,
    },

    #[error("type mismatch: expected {expected} but actual is {actual}")]
    KindMismatch {
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("structure declares {declared} but expected value is {expected}")]
    StructureMismatch {
        declared: ValueKind,
        expected: ValueKind,
    },

    #[error("invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("value '{value}' cannot be checked against system precision {step}")]
    SystemPrecision { value: String, step: Decimal },

    #[error("filter failed: {0}")]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result tree errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResultError {
    #[error("node '{parent}' already has a child named '{name}'")]
    DuplicateChild { parent: String, name: String },
}

/// Result type for result tree operations
pub type ResultResult<T> = Result<T, ResultError>;
