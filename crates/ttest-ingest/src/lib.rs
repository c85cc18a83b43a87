//! Dataset ingestion for T-Test Studio.
//!
//! Loads a CSV file into a Polars `DataFrame`, flattens it into the row-major
//! [`Dataset`] the analysis side reads from, and infers the variable roster
//! (names, optional labels from a second header row, storage type, measure,
//! display decimals).
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use ttest_ingest::load_dataset;
//!
//! // 1 = single header row, 2 = labels row followed by names row
//! let loaded = load_dataset(Path::new("study.csv"), 1)?;
//! println!("{} variables, {} cases", loaded.variables.len(), loaded.dataset.row_count());
//! ```

mod csv;
mod error;
mod roster;

use std::path::Path;

use ttest_model::{Dataset, Variable};

pub use csv::{CsvHeaders, MAX_CSV_FILE_SIZE, check_file_size, read_csv_schema, read_csv_table};
pub use error::{IngestError, Result};
pub use roster::infer_variables;

/// A dataset together with its inferred variable roster.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    pub variables: Vec<Variable>,
}

/// Reads a CSV file and infers its variable roster.
pub fn load_dataset(path: &Path, header_rows: usize) -> Result<LoadedDataset> {
    check_file_size(path)?;
    let (df, headers) = read_csv_table(path, header_rows)?;
    if df.height() == 0 {
        return Err(IngestError::EmptyDataFrame {
            path: path.to_path_buf(),
        });
    }
    let variables = infer_variables(&df, &headers);
    let dataset = Dataset::from_frame(&df);
    tracing::info!(
        path = %path.display(),
        variables = variables.len(),
        cases = dataset.row_count(),
        "loaded dataset"
    );
    Ok(LoadedDataset { dataset, variables })
}
