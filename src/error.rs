//! Error types for the shotconvert transformation pipeline.
//!
//! The taxonomy mirrors the blast radius of each failure:
//!
//! - [`ConfigError`] - fatal, aborts the run before any input file is touched
//! - [`CsvError`] - per-file, fails that file but not the run
//! - [`SkipReason`] - per-row, drops that row but not the file
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Configuration Errors (fatal)
// =============================================================================

/// Errors while loading or validating the configuration artifact.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration artifact exists.
    #[error("configuration file not found at '{0}' - run `shotconvert setup` first")]
    Missing(PathBuf),

    /// The artifact exists but is malformed or semantically invalid.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// Failed to read or write the artifact.
    #[error("configuration io error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize the configuration.
    #[error("configuration json error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// CSV Parsing Errors (per-file)
// =============================================================================

/// Errors while parsing one Garmin export.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read the file.
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The file contains no data at all.
    #[error("csv file is empty")]
    EmptyFile,

    /// The first line yields no usable header names.
    #[error("no headers found in csv")]
    NoHeaders,

    /// The file cannot be parsed as delimited text.
    #[error("malformed csv: {0}")]
    Malformed(String),
}

impl From<csv::Error> for CsvError {
    fn from(e: csv::Error) -> Self {
        match e.into_kind() {
            csv::ErrorKind::Io(io) => CsvError::Io(io),
            other => CsvError::Malformed(format!("{:?}", other)),
        }
    }
}

// =============================================================================
// Row Skip Reasons (per-row)
// =============================================================================

/// Why a single row was dropped instead of converted.
///
/// A row producing any of these is dropped whole - the pipeline never emits
/// a partially converted record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    /// A required mapped column is absent from the row.
    #[error("missing required column '{0}'")]
    MissingField(String),

    /// A numeric cell could not be parsed.
    #[error("unparseable value '{value}' in column '{field}'")]
    UnparseableValue { field: String, value: String },

    /// The club name has no alias and the policy is `reject`.
    #[error("unknown club '{0}'")]
    UnknownClub(String),
}

impl SkipReason {
    /// Stable tag used to group skips in file reports.
    pub fn kind(&self) -> &'static str {
        match self {
            SkipReason::MissingField(_) => "missing_field",
            SkipReason::UnparseableValue { .. } => "unparseable_value",
            SkipReason::UnknownClub(_) => "unknown_club",
        }
    }
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// CSV parsing error.
    #[error("csv error: {0}")]
    Csv(#[from] CsvError),

    /// The input directory holds no `*.csv` files.
    #[error("no input files found in '{0}'")]
    NoInputFiles(PathBuf),

    /// IO error outside of parsing (output dir, atomic write).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for CSV parsing operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
