//! Error types for comparison configuration

use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while building, loading or resolving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A message field must have exactly one configuration node
    #[error("field '{field}' needs exactly one configuration node, found {count}")]
    AmbiguousFieldConfig { field: String, count: usize },

    /// Precisions must be strictly positive
    #[error("invalid {kind} precision for '{field}': {value}")]
    InvalidPrecision {
        field: String,
        kind: &'static str,
        value: Decimal,
    },

    /// Result order cannot be kept when group order is checked
    #[error("keep_result_group_order cannot be combined with check_groups_order")]
    ConflictingOrderSettings,

    /// Failed to read a file
    #[error("failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML
    #[error("failed to parse YAML in {path}: {source}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Failed to parse JSON
    #[error("failed to parse JSON in {path}: {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// File extension is neither YAML nor JSON
    #[error("unsupported settings format: {path}")]
    UnsupportedFormat { path: PathBuf },
}
