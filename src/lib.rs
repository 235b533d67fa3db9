//! # shotconvert - Garmin launch-monitor exports to ShotPattern
//!
//! Converts the CSV a Garmin device exports after a range session into the
//! CSV schema the ShotPattern app imports. Column names, club names, units
//! and encoding vary by device firmware and locale; a user-maintained
//! `config.json` absorbs all of that variability.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐    ┌────────────┐    ┌────────────┐    ┌─────────────┐
//! │ Garmin CSV │───▶│   Parser   │───▶│ Normalizer │───▶│ ShotPattern │
//! │ (any enc.) │    │ (auto-enc) │    │ (mapping)  │    │     CSV     │
//! └────────────┘    └────────────┘    └────────────┘    └─────────────┘
//!                          ▲ configuration (loaded once, read-only)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shotconvert::{config::Config, transform};
//! use std::path::Path;
//!
//! let config = Config::load(Path::new("config.json"))?;
//! let reports = transform::run_dir(
//!     Path::new("data/garmin"),
//!     &config,
//!     Path::new("data/output"),
//! )?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - error taxonomy (fatal / per-file / per-row)
//! - [`models`] - club identifiers, units, shot records
//! - [`config`] - the `config.json` store
//! - [`parser`] - CSV reading with encoding/delimiter detection
//! - [`transform`] - normalizer and pipeline
//! - [`writer`] - ShotPattern output files
//! - [`report`] - console reporting

pub mod config;
pub mod error;
pub mod models;
pub mod parser;
pub mod report;
pub mod transform;
pub mod writer;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConfigError, CsvError, PipelineError, SkipReason};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{clubs, ShotRecord, ShotType, UnitSystem, UnknownClubPolicy};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{Config, ColumnMapping};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{detect_delimiter, decode_bytes, read_headers, CsvFile, RawRecord, ReadOptions};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{normalize, run_dir, run_file, FileReport, SkippedRow};

// =============================================================================
// Re-exports - Writer
// =============================================================================

pub use writer::{write_shots, OutputWriter, TARGET_HEADER};
