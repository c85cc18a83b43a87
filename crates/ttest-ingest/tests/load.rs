//! Integration tests for dataset loading.

use std::io::Write;

use tempfile::NamedTempFile;
use ttest_ingest::{IngestError, load_dataset};
use ttest_model::{CellValue, VariableType};

fn csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{content}").unwrap();
    file
}

#[test]
fn loads_rows_and_roster() {
    let file = csv("id,group,score\n1,1,10.5\n2,2,\n3,1,12\n");
    let loaded = load_dataset(file.path(), 1).unwrap();

    assert_eq!(loaded.variables.len(), 3);
    assert_eq!(loaded.variables[2].name, "score");
    assert_eq!(loaded.variables[2].decimals, 1);
    assert_eq!(loaded.variables[1].var_type, VariableType::Numeric);
    assert_eq!(loaded.dataset.row_count(), 3);
    assert_eq!(
        loaded.dataset.column(2),
        vec![
            CellValue::from(10.5),
            CellValue::Missing,
            CellValue::from(12.0)
        ]
    );
}

#[test]
fn header_only_file_is_rejected() {
    let file = csv("id,group\n");
    let result = load_dataset(file.path(), 1);
    assert!(matches!(
        result,
        Err(IngestError::EmptyDataFrame { .. }) | Err(IngestError::CsvParse { .. })
    ));
}
