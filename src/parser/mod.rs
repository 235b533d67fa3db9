//! CSV reader with encoding and delimiter auto-detection.
//!
//! Garmin exports vary by device firmware and locale: column names move
//! around, the delimiter can be `;` instead of `,`, and files saved through
//! Windows tools arrive as ISO-8859-1 or Windows-1252 rather than UTF-8.
//! This module absorbs all of that and yields plain
//! `header name -> cell value` records; it knows nothing about shots.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use crate::error::{CsvError, CsvResult};

/// One parsed row: trimmed header name -> trimmed cell value.
///
/// Ephemeral - produced lazily by [`RecordIter`] and consumed immediately by
/// the normalizer. Cells beyond the header width are dropped; short rows
/// simply lack the trailing keys.
pub type RawRecord = HashMap<String, String>;

/// Delimiters considered during auto-detection.
const DELIMITER_CANDIDATES: [char; 4] = [';', ',', '\t', '|'];

/// Parsing knobs for one file.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Explicit delimiter; auto-detected from the header line when `None`.
    pub delimiter: Option<char>,
    /// Drop the first data row (Garmin places a units row under the header).
    pub skip_units_row: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            skip_units_row: true,
        }
    }
}

/// An opened Garmin export, headers parsed, rows not yet consumed.
#[derive(Debug)]
pub struct CsvFile {
    /// Encoding the bytes were decoded with.
    pub encoding: String,
    /// Delimiter in effect.
    pub delimiter: char,
    /// Trimmed header names, source order.
    pub headers: Vec<String>,
    reader: csv::Reader<Cursor<Vec<u8>>>,
    skip_units_row: bool,
}

/// Detect the encoding of raw bytes and decode them.
///
/// Returns the decoded text and the name of the encoding used. Unknown
/// charsets fall back to lossy UTF-8.
pub fn decode_bytes(bytes: &[u8]) -> (String, String) {
    let (charset, _confidence, _language) = chardet::detect(bytes);
    let label = chardet::charset2encoding(&charset);
    let encoding =
        encoding_rs::Encoding::for_label(label.as_bytes()).unwrap_or(encoding_rs::UTF_8);
    let (content, _, _) = encoding.decode(bytes);
    (content.into_owned(), encoding.name().to_string())
}

/// Detect the delimiter by counting candidates in the header line.
pub fn detect_delimiter(content: &str) -> char {
    let header_line = content.lines().next().unwrap_or("");

    let mut best = ';';
    let mut best_count = 0;
    for candidate in DELIMITER_CANDIDATES {
        let count = header_line.matches(candidate).count();
        if count > best_count {
            best_count = count;
            best = candidate;
        }
    }
    best
}

/// Open a Garmin export from disk.
pub fn open(path: &Path, options: &ReadOptions) -> CsvResult<CsvFile> {
    let bytes = std::fs::read(path)?;
    from_bytes(&bytes, options)
}

/// Open a Garmin export from raw bytes.
pub fn from_bytes(bytes: &[u8], options: &ReadOptions) -> CsvResult<CsvFile> {
    let (content, encoding) = decode_bytes(bytes);

    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }
    // A well-quoted file always contains an even number of quote characters;
    // an odd count means an unterminated field, which the csv crate would
    // otherwise silently swallow to EOF.
    if content.matches('"').count() % 2 == 1 {
        return Err(CsvError::Malformed("unmatched quote".to_string()));
    }

    let delimiter = match options.delimiter {
        Some(d) if !d.is_ascii() => {
            return Err(CsvError::Malformed(format!(
                "delimiter '{d}' is not a single-byte character"
            )))
        }
        Some(d) => d,
        None => detect_delimiter(&content),
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(Cursor::new(content.into_bytes()));

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    Ok(CsvFile {
        encoding,
        delimiter,
        headers,
        reader,
        skip_units_row: options.skip_units_row,
    })
}

impl CsvFile {
    /// Consume the file into a lazy record iterator. Rows are parsed as they
    /// are pulled, never buffered all at once.
    pub fn records(self) -> RecordIter {
        RecordIter {
            headers: self.headers,
            inner: self.reader.into_records(),
            skip_next: self.skip_units_row,
        }
    }
}

/// Streaming iterator over the data rows of a [`CsvFile`].
pub struct RecordIter {
    headers: Vec<String>,
    inner: csv::StringRecordsIntoIter<Cursor<Vec<u8>>>,
    skip_next: bool,
}

impl Iterator for RecordIter {
    type Item = CsvResult<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.inner.next()? {
                Ok(r) => r,
                Err(e) => return Some(Err(e.into())),
            };

            if std::mem::take(&mut self.skip_next) {
                continue;
            }
            // rows of nothing but empty cells are padding, not data
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }

            let row: RawRecord = self
                .headers
                .iter()
                .zip(record.iter())
                .filter(|(h, _)| !h.is_empty())
                .map(|(h, cell)| (h.clone(), cell.trim().to_string()))
                .collect();
            return Some(Ok(row));
        }
    }
}

/// Read just the header names of an export (used by `setup` and `clubs`).
pub fn read_headers(path: &Path) -> CsvResult<Vec<String>> {
    let file = open(
        path,
        &ReadOptions {
            delimiter: None,
            skip_units_row: false,
        },
    )?;
    Ok(file.headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(bytes: &[u8], options: &ReadOptions) -> Vec<RawRecord> {
        from_bytes(bytes, options)
            .unwrap()
            .records()
            .collect::<CsvResult<Vec<_>>>()
            .unwrap()
    }

    fn no_skip() -> ReadOptions {
        ReadOptions {
            delimiter: None,
            skip_units_row: false,
        }
    }

    #[test]
    fn test_simple_csv() {
        let rows = collect(b"Club,Total,Side\nDriver,245.3,-4.1\n7 Iron,152,2.0\n", &no_skip());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Club"], "Driver");
        assert_eq!(rows[0]["Total"], "245.3");
        assert_eq!(rows[1]["Side"], "2.0");
    }

    #[test]
    fn test_detect_delimiter_semicolon() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
    }

    #[test]
    fn test_detect_delimiter_comma() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
    }

    #[test]
    fn test_detect_delimiter_tab() {
        assert_eq!(detect_delimiter("a\tb\tc"), '\t');
    }

    #[test]
    fn test_semicolon_auto_detected() {
        let file = from_bytes(b"Club;Total;Side\nDriver;245,3;-4,1\n", &no_skip()).unwrap();
        assert_eq!(file.delimiter, ';');
        let rows = file.records().collect::<CsvResult<Vec<_>>>().unwrap();
        assert_eq!(rows[0]["Total"], "245,3");
    }

    #[test]
    fn test_units_row_skipped() {
        let rows = collect(
            b"Club,Total,Side\n,(yds),(yds)\nDriver,245.3,-4.1\n",
            &ReadOptions {
                delimiter: None,
                skip_units_row: true,
            },
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Club"], "Driver");
    }

    #[test]
    fn test_extra_columns_ignored() {
        let rows = collect(b"a,b\n1,2,3,4\n", &no_skip());
        assert_eq!(rows[0]["a"], "1");
        assert_eq!(rows[0]["b"], "2");
        assert_eq!(rows[0].len(), 2);
    }

    #[test]
    fn test_short_rows_leave_keys_absent() {
        let rows = collect(b"a,b,c\n1,2\n", &no_skip());
        assert_eq!(rows[0].get("a").map(String::as_str), Some("1"));
        assert!(rows[0].get("c").is_none());
    }

    #[test]
    fn test_empty_lines_skipped() {
        let rows = collect(b"a,b\n1,2\n\n,,\n3,4\n", &no_skip());
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_quoted_values() {
        let rows = collect(b"Club,Total\n\"Pitching Wedge, new\",103.2\n", &no_skip());
        assert_eq!(rows[0]["Club"], "Pitching Wedge, new");
    }

    #[test]
    fn test_unmatched_quote_is_malformed() {
        let err = from_bytes(b"Club,Total\n\"Driver,245.3\nmore,1\n", &no_skip()).unwrap_err();
        assert!(matches!(err, CsvError::Malformed(_)));
        assert!(err.to_string().contains("quote"));
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(
            from_bytes(b"", &no_skip()),
            Err(CsvError::EmptyFile)
        ));
        assert!(matches!(
            from_bytes(b"  \n ", &no_skip()),
            Err(CsvError::EmptyFile)
        ));
    }

    #[test]
    fn test_latin1_decoding() {
        // "Attaque 56°" with ISO-8859-1 degree sign
        let bytes: &[u8] = b"Club,Total\nAttaque 56\xb0,98.5\n";
        let file = from_bytes(bytes, &no_skip()).unwrap();
        let rows = file.records().collect::<CsvResult<Vec<_>>>().unwrap();
        // decoded through a single-byte encoding, never replacement chars
        assert!(!rows[0]["Club"].contains('\u{FFFD}'));
    }

    #[test]
    fn test_utf8_passthrough() {
        let (content, encoding) = decode_bytes("Club,Total\n56°,98.5\n".as_bytes());
        assert_eq!(encoding, "UTF-8");
        assert!(content.contains("56°"));
    }

    #[test]
    fn test_headers_trimmed() {
        let file = from_bytes(b" Club , Total \nDriver,245\n", &no_skip()).unwrap();
        assert_eq!(file.headers, vec!["Club", "Total"]);
    }
}
