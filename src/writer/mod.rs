//! CSV writer for the ShotPattern import schema.
//!
//! The header row and its capitalization are owned by the ShotPattern app's
//! import contract and must match exactly. Output filenames embed the source
//! name, the unit system and a timestamp - the filename is the only channel
//! telling the operator which units to select at import time.
//!
//! Writes are atomic: rows land in a temp file inside the output directory
//! and only a completed file is persisted under the final name, so an
//! interrupted run never leaves a partial export behind.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::models::{ShotRecord, UnitSystem};

/// Column order and names of the ShotPattern import contract.
pub const TARGET_HEADER: [&str; 5] = ["Club", "Type", "Target", "Total", "Side"];

/// Incremental writer for one output file.
pub struct OutputWriter {
    writer: csv::Writer<NamedTempFile>,
    output_dir: PathBuf,
    file_stem: String,
    unit_system: UnitSystem,
    rows: usize,
}

impl OutputWriter {
    /// Create the output directory and start a temp file with the target
    /// header already written.
    pub fn create(output_dir: &Path, source: &Path, unit_system: UnitSystem) -> io::Result<Self> {
        std::fs::create_dir_all(output_dir)?;
        let tmp = NamedTempFile::new_in(output_dir)?;
        let mut writer = csv::WriterBuilder::new().from_writer(tmp);
        writer.write_record(TARGET_HEADER).map_err(csv_io)?;

        let file_stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("garmin")
            .to_string();

        Ok(Self {
            writer,
            output_dir: output_dir.to_path_buf(),
            file_stem,
            unit_system,
            rows: 0,
        })
    }

    /// Append one record in target column order.
    pub fn write(&mut self, shot: &ShotRecord) -> io::Result<()> {
        let target = format_number(shot.target);
        let total = format_number(shot.total);
        let side = format_number(shot.side);
        self.writer
            .write_record([
                shot.club.as_str(),
                shot.shot_type.as_str(),
                target.as_str(),
                total.as_str(),
                side.as_str(),
            ])
            .map_err(csv_io)?;
        self.rows += 1;
        Ok(())
    }

    /// Number of data rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and persist under a timestamped, collision-free name.
    /// The temp file is simply dropped if this is never called.
    pub fn finish(self) -> io::Result<PathBuf> {
        let mut tmp = self.writer.into_inner().map_err(|e| e.into_error())?;

        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let base = format!(
            "{}_shotpattern_{}_{}",
            self.file_stem, self.unit_system, timestamp
        );

        // never clobber an earlier export, even within the same second
        let mut suffix = 0u32;
        loop {
            let name = if suffix == 0 {
                format!("{base}.csv")
            } else {
                format!("{base}_{suffix}.csv")
            };
            let candidate = self.output_dir.join(name);
            match tmp.persist_noclobber(&candidate) {
                Ok(_) => return Ok(candidate),
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                    tmp = e.file;
                    suffix += 1;
                }
                Err(e) => return Err(e.error),
            }
        }
    }
}

/// Write a whole batch of records and return the output path.
pub fn write_shots(
    shots: &[ShotRecord],
    output_dir: &Path,
    source: &Path,
    unit_system: UnitSystem,
) -> io::Result<PathBuf> {
    let mut writer = OutputWriter::create(output_dir, source, unit_system)?;
    for shot in shots {
        writer.write(shot)?;
    }
    writer.finish()
}

/// Round to two decimals and render without trailing zeros, matching what
/// ShotPattern's importer expects ("245.3", "152", "-4.25").
fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded}")
}

fn csv_io(e: csv::Error) -> io::Error {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => io,
        other => io::Error::new(io::ErrorKind::InvalidData, format!("{other:?}")),
    }
}
