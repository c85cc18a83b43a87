//! Cell values of the in-memory dataset.

use std::fmt;

use serde::{Deserialize, Serialize};
use ttest_common::{format_numeric, parse_f64};

/// A single data cell. Serialized as a bare JSON number, string, or `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl CellValue {
    /// Builds a text cell; blank text is treated as missing.
    pub fn text(value: &str) -> Self {
        if value.trim().is_empty() {
            CellValue::Missing
        } else {
            CellValue::Text(value.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Missing => true,
            CellValue::Number(v) => v.is_nan(),
            CellValue::Text(s) => s.trim().is_empty(),
        }
    }

    /// Numeric reading of the cell. Text cells are parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) if !v.is_nan() => Some(*v),
            CellValue::Text(s) => parse_f64(s),
            _ => None,
        }
    }

    /// Value equality as a user would read it: numerically when both sides are
    /// numbers, otherwise on the trimmed display text.
    pub fn same_value(&self, other: &CellValue) -> bool {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => self.to_string().trim() == other.to_string().trim(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(v) => f.write_str(&format_numeric(*v)),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Missing => Ok(()),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(f64::from(value))
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::text(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::text(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_missing() {
        assert_eq!(CellValue::text("  "), CellValue::Missing);
        assert!(CellValue::Number(f64::NAN).is_missing());
    }

    #[test]
    fn same_value_compares_numbers_numerically() {
        assert!(CellValue::from(1).same_value(&CellValue::from("1.0")));
        assert!(!CellValue::from(1).same_value(&CellValue::from(2)));
        assert!(CellValue::from("M").same_value(&CellValue::from(" M ")));
    }

    #[test]
    fn display_trims_integral_numbers() {
        assert_eq!(CellValue::from(2.0).to_string(), "2");
        assert_eq!(CellValue::from(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Missing.to_string(), "");
    }
}
