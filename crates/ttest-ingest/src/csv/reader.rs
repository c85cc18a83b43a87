//! CSV file reading with explicit header row configuration.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use polars::prelude::{CsvReadOptions, DataFrame, SerReader};

use crate::error::{IngestError, Result};

use super::header::{CsvHeaders, parse_csv_line};

/// Maximum file size for CSV loading (500 MB).
pub const MAX_CSV_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Check file size before loading.
pub fn check_file_size(path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| IngestError::open(path, e))?;
    if metadata.len() > MAX_CSV_FILE_SIZE {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size: MAX_CSV_FILE_SIZE,
        });
    }
    Ok(())
}

fn read_first_lines(path: &Path, n: usize) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| IngestError::open(path, e))?;
    let reader = BufReader::new(file);
    let mut lines = Vec::with_capacity(n);
    for line_result in reader.lines().take(n) {
        let line = line_result.map_err(|e| IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let cleaned = line.strip_prefix('\u{feff}').unwrap_or(&line).to_string();
        lines.push(cleaned);
    }
    Ok(lines)
}

/// Reads CSV headers.
///
/// - `header_rows = 1`: single header row (column names only)
/// - `header_rows = 2`: row 1 = variable labels, row 2 = column names
pub fn read_csv_schema(path: &Path, header_rows: usize) -> Result<CsvHeaders> {
    let lines = read_first_lines(path, header_rows.max(1))?;
    if lines.is_empty() {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    match header_rows {
        2 if lines.len() >= 2 => Ok(CsvHeaders::double(
            parse_csv_line(&lines[0]),
            parse_csv_line(&lines[1]),
        )),
        _ => Ok(CsvHeaders::single(parse_csv_line(&lines[0]))),
    }
}

/// Reads a CSV file into a Polars DataFrame.
pub fn read_csv_table(path: &Path, header_rows: usize) -> Result<(DataFrame, CsvHeaders)> {
    let headers = read_csv_schema(path, header_rows)?;
    let skip_rows = if headers.labels.is_some() { 1 } else { 0 };

    let parse_error = |e: polars::prelude::PolarsError| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_skip_rows(skip_rows)
        .with_infer_schema_length(Some(100))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(parse_error)?
        .finish()
        .map_err(parse_error)?;

    Ok((df, headers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_read_csv_schema_with_bom() {
        let file = create_temp_csv("\u{feff}A,B,C\n1,2,3\n");
        let headers = read_csv_schema(file.path(), 1).unwrap();
        assert_eq!(headers.columns, vec!["A", "B", "C"]);
        assert!(headers.labels.is_none());
    }

    #[test]
    fn test_read_csv_schema_empty_file() {
        let file = create_temp_csv("");
        let result = read_csv_schema(file.path(), 1);
        assert!(matches!(result, Err(IngestError::EmptyCsv { .. })));
    }

    #[test]
    fn test_read_csv_table_double_header() {
        let file = create_temp_csv("Label A,Label B\nA,B\n1,x\n4,y\n");
        let (df, headers) = read_csv_table(file.path(), 2).unwrap();
        assert_eq!(headers.columns, vec!["A", "B"]);
        assert_eq!(headers.label_at(1), Some("Label B"));
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 2);
    }

    #[test]
    fn test_missing_file() {
        let result = check_file_size(Path::new("/definitely/not/here.csv"));
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }
}
