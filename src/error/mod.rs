//! Error handling for the AKI pipeline.
//!
//! Per-encounter data problems are never errors: they surface as
//! [`UnstageableReason`](crate::models::results::UnstageableReason) counts.
//! The variants below cover the run-level failures that happen before or
//! after encounters are processed.

use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

/// Specialized error type for the AKI pipeline
#[derive(Debug, Error)]
pub enum AkiError {
    /// Error opening or reading a file
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    ParquetError(#[from] ParquetError),
    /// Error building or slicing Arrow data
    #[error("Arrow error: {0}")]
    ArrowError(#[from] ArrowError),
    /// Error mapping rows to or from Arrow record batches
    #[error("Conversion error: {0}")]
    ConversionError(#[from] serde_arrow::Error),
    /// Error parsing a JSON configuration or reference artifact
    #[error("JSON error in {path}: {source}")]
    JsonError {
        /// File (or embedded artifact name) being parsed
        path: PathBuf,
        /// Underlying parse error
        source: serde_json::Error,
    },
    /// A reference table failed validation
    #[error("Reference table {table} is invalid: {reason}")]
    ReferenceTableError {
        /// Table name
        table: &'static str,
        /// What was wrong with it
        reason: String,
    },
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AkiError {
    /// Build a reference-table validation error
    pub fn reference_table(table: &'static str, reason: impl Into<String>) -> Self {
        Self::ReferenceTableError {
            table,
            reason: reason.into(),
        }
    }

    /// Build a JSON parse error tagged with its source path
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::JsonError {
            path: path.into(),
            source,
        }
    }
}

/// Result type for AKI pipeline operations
pub type Result<T> = std::result::Result<T, AkiError>;
