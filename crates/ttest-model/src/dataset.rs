//! Row-major in-memory dataset.
//!
//! The analysis side only ever reads from a [`Dataset`]: columns are extracted
//! by index and shipped to the worker, the rows themselves are never mutated.

use polars::prelude::{AnyValue, DataFrame};
use serde::{Deserialize, Serialize};
use ttest_common::{any_to_f64, any_to_string};

use crate::value::CellValue;

/// Row-major table of cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Flattens a Polars frame into row-major cells.
    pub fn from_frame(df: &DataFrame) -> Self {
        let columns = df.get_columns();
        let rows = (0..df.height())
            .map(|row_idx| {
                columns
                    .iter()
                    .map(|column| cell_from_any(column.get(row_idx).unwrap_or(AnyValue::Null)))
                    .collect()
            })
            .collect();
        Self { rows }
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    #[inline]
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Extracts one column. Rows shorter than `index` contribute `Missing`.
    pub fn column(&self, index: usize) -> Vec<CellValue> {
        self.rows
            .iter()
            .map(|row| row.get(index).cloned().unwrap_or_default())
            .collect()
    }
}

fn cell_from_any(value: AnyValue<'_>) -> CellValue {
    match value {
        AnyValue::Null => CellValue::Missing,
        AnyValue::String(s) => CellValue::text(s),
        AnyValue::StringOwned(s) => CellValue::text(s.as_str()),
        AnyValue::Boolean(b) => CellValue::Number(if b { 1.0 } else { 0.0 }),
        other => match any_to_f64(other.clone()) {
            Some(number) if number.is_nan() => CellValue::Missing,
            Some(number) => CellValue::Number(number),
            None => CellValue::text(&any_to_string(other)),
        },
    }
}
