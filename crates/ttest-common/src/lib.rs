//! Shared utilities for T-Test Studio crates.

pub mod polars;

pub use self::polars::{any_to_f64, any_to_string, format_numeric, fraction_digits, parse_f64};
