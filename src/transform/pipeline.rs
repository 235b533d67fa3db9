//! Pipeline orchestration: discover input files, stream each one through
//! reader -> normalizer -> writer, and report what happened.
//!
//! Fault isolation is per layer: a row that fails to normalize is skipped
//! and counted; a file that fails to parse is reported as a whole-file
//! failure; neither stops the remaining files. Only configuration problems
//! abort a run, and those happen before any file is opened.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::parser::{self, ReadOptions};
use crate::report;
use crate::transform::normalizer::normalize;
use crate::writer::OutputWriter;

/// One skipped row with its reason.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedRow {
    /// 1-based data row number (units row excluded).
    pub row: usize,
    /// Stable grouping tag, see [`crate::error::SkipReason::kind`].
    pub kind: &'static str,
    /// Human-readable reason.
    pub reason: String,
}

/// Outcome of one input file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    /// The input file.
    pub file: PathBuf,
    /// Data rows read.
    pub rows_read: usize,
    /// Rows converted and written.
    pub rows_written: usize,
    /// Rows dropped, in input order.
    pub skipped: Vec<SkippedRow>,
    /// Output path; `None` when nothing was written.
    pub output: Option<PathBuf>,
    /// Whole-file failure, when the file could not be processed at all.
    pub failure: Option<String>,
}

impl FileReport {
    fn failed(file: &Path, error: &PipelineError) -> Self {
        Self {
            file: file.to_path_buf(),
            rows_read: 0,
            rows_written: 0,
            skipped: Vec::new(),
            output: None,
            failure: Some(error.to_string()),
        }
    }

    /// Whether the file was processed (skipped rows still count as success).
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    /// Skip counts grouped by reason kind.
    pub fn skip_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for skip in &self.skipped {
            *counts.entry(skip.kind).or_insert(0) += 1;
        }
        counts
    }
}

/// Process every `*.csv` file in `input_dir`.
///
/// Fails only when the directory holds no input files; per-file problems are
/// captured inside the returned reports.
pub fn run_dir(
    input_dir: &Path,
    config: &Config,
    output_dir: &Path,
) -> PipelineResult<Vec<FileReport>> {
    let inputs = discover_inputs(input_dir)?;
    Ok(inputs
        .iter()
        .map(|path| run_file(path, config, output_dir))
        .collect())
}

/// List the `*.csv` files of a directory, sorted by name.
pub fn discover_inputs(input_dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        return Err(PipelineError::NoInputFiles(input_dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(PipelineError::NoInputFiles(input_dir.to_path_buf()));
    }
    Ok(files)
}

/// Process one input file; never panics, never propagates - failures are
/// folded into the report.
pub fn run_file(path: &Path, config: &Config, output_dir: &Path) -> FileReport {
    report::info(format!("processing {}", path.display()));
    match process_file(path, config, output_dir) {
        Ok(file_report) => file_report,
        Err(e) => {
            report::error(format!("{}: {e}", path.display()));
            FileReport::failed(path, &e)
        }
    }
}

fn process_file(path: &Path, config: &Config, output_dir: &Path) -> PipelineResult<FileReport> {
    let csv_file = parser::open(
        path,
        &ReadOptions {
            delimiter: None,
            skip_units_row: config.skip_units_row,
        },
    )?;
    report::info(format!(
        "encoding {}, delimiter '{}'",
        csv_file.encoding,
        printable_delimiter(csv_file.delimiter)
    ));

    let mut writer = OutputWriter::create(output_dir, path, config.unit_system)?;
    let mut rows_read = 0;
    let mut skipped = Vec::new();

    for (index, record) in csv_file.records().enumerate() {
        // a record-level parse error fails the whole file; the temp output
        // is dropped unpersisted
        let record = record?;
        rows_read += 1;
        match normalize(&record, config) {
            Ok(shot) => writer.write(&shot)?,
            Err(reason) => skipped.push(SkippedRow {
                row: index + 1,
                kind: reason.kind(),
                reason: reason.to_string(),
            }),
        }
    }

    let rows_written = writer.rows();
    let output = if rows_written > 0 {
        Some(writer.finish()?)
    } else {
        None
    };

    Ok(FileReport {
        file: path.to_path_buf(),
        rows_read,
        rows_written,
        skipped,
        output,
        failure: None,
    })
}

fn printable_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

/// Print one file's outcome through the report facade.
pub fn print_report(file_report: &FileReport) {
    if let Some(ref failure) = file_report.failure {
        report::error(format!("{}: {failure}", file_report.file.display()));
        return;
    }

    report::success(format!(
        "{}: {} of {} rows converted",
        file_report.file.display(),
        file_report.rows_written,
        file_report.rows_read
    ));
    if let Some(ref output) = file_report.output {
        report::info(format!("wrote {}", output.display()));
    }

    if !file_report.skipped.is_empty() {
        report::warning(format!("{} rows skipped:", file_report.skipped.len()));
        for (kind, count) in file_report.skip_counts() {
            let rows: Vec<String> = file_report
                .skipped
                .iter()
                .filter(|s| s.kind == kind)
                .take(5)
                .map(|s| s.row.to_string())
                .collect();
            let more = if count > rows.len() {
                format!(" ... +{}", count - rows.len())
            } else {
                String::new()
            };
            report::warning(format!("  {kind}: {count} (rows {}{more})", rows.join(", ")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn test_config() -> Config {
        Config::from_json(
            r#"{
                "unit_system": "yards",
                "column_mapping": { "club": "Club Type", "total": "Total Distance", "side": "Offline" },
                "club_aliases": { "Driver": "Dr", "7 Iron": "7i" },
                "unknown_club_policy": "reject",
                "skip_units_row": false
            }"#,
        )
        .unwrap()
    }

    fn write_input(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_valid_and_unparseable_rows() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        let mut content = String::from("Club Type,Total Distance,Offline\n");
        for i in 0..10 {
            content.push_str(&format!("Driver,24{i}.5,-1.{i}\n"));
        }
        content.push_str("Driver,not-a-number,0\n");
        content.push_str("7 Iron,,1.0\n");
        let input = write_input(dir.path(), "session.csv", &content);

        let file_report = run_file(&input, &test_config(), &out);
        assert!(file_report.succeeded());
        assert_eq!(file_report.rows_read, 12);
        assert_eq!(file_report.rows_written, 10);
        assert_eq!(file_report.skipped.len(), 2);
        assert!(file_report
            .skipped
            .iter()
            .all(|s| s.kind == "unparseable_value"));

        // the output really has exactly 10 data rows
        let mut reader = csv::Reader::from_path(file_report.output.unwrap()).unwrap();
        assert_eq!(reader.records().count(), 10);
    }

    #[test]
    fn test_malformed_file_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        write_input(
            dir.path(),
            "a_broken.csv",
            "Club Type,Total Distance,Offline\n\"Driver,245.3,0\n",
        );
        write_input(
            dir.path(),
            "b_good.csv",
            "Club Type,Total Distance,Offline\nDriver,245.3,-4.1\n",
        );

        let reports = run_dir(dir.path(), &test_config(), &out).unwrap();
        assert_eq!(reports.len(), 2);

        assert!(!reports[0].succeeded());
        assert_eq!(reports[0].rows_written, 0);
        assert!(reports[0].output.is_none());

        assert!(reports[1].succeeded());
        assert_eq!(reports[1].rows_written, 1);
        assert!(reports[1].output.is_some());
    }

    #[test]
    fn test_no_input_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_dir(dir.path(), &test_config(), dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::NoInputFiles(_)));

        let err = discover_inputs(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, PipelineError::NoInputFiles(_)));
    }

    #[test]
    fn test_discovery_sorted_csv_only() {
        let dir = tempfile::tempdir().unwrap();
        write_input(dir.path(), "b.csv", "x\n");
        write_input(dir.path(), "a.CSV", "x\n");
        write_input(dir.path(), "notes.txt", "x\n");

        let inputs = discover_inputs(dir.path()).unwrap();
        let names: Vec<_> = inputs
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.CSV", "b.csv"]);
    }

    #[test]
    fn test_unknown_club_counted() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let input = write_input(
            dir.path(),
            "s.csv",
            "Club Type,Total Distance,Offline\nMystery,100,0\nDriver,245.3,0\n",
        );

        let file_report = run_file(&input, &test_config(), &out);
        assert_eq!(file_report.rows_written, 1);
        assert_eq!(file_report.skip_counts().get("unknown_club"), Some(&1));
        assert_eq!(file_report.skipped[0].row, 1);
    }

    #[test]
    fn test_all_rows_skipped_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let input = write_input(
            dir.path(),
            "s.csv",
            "Club Type,Total Distance,Offline\nMystery,100,0\n",
        );

        let file_report = run_file(&input, &test_config(), &out);
        assert!(file_report.succeeded());
        assert_eq!(file_report.rows_written, 0);
        assert!(file_report.output.is_none());
        // no stray files in the output dir
        let count = fs::read_dir(&out).map(|d| d.count()).unwrap_or(0);
        assert_eq!(count, 0);
    }
}
