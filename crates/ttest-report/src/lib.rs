//! Result formatters.
//!
//! Pure functions that turn the raw results accumulated during one analysis
//! run into display tables (`{ title, columnHeaders, rows }`) and the
//! informational notes attached to the persisted analytic.
//!
//! Number formatting is exact: values are rounded on their exact decimal
//! expansion with halves going away from zero, see [`to_fixed`].

pub mod format;
pub mod independent;
pub mod notes;
pub mod paired;
pub mod table;

pub use format::{
    MAX_FIXED_DECIMALS, MAX_VARIABLE_DECIMALS, format_df, format_number, format_number_or_blank,
    format_p_value, precision, to_fixed,
};
pub use independent::{
    group_statistics_table, independent_effect_sizes_table, independent_samples_test_table,
    independent_tables,
};
pub use notes::{independent_note, paired_note};
pub use paired::{
    paired_correlations_table, paired_effect_sizes_table, paired_statistics_table,
    paired_tables, paired_test_table,
};
pub use table::{Cell, ColumnHeader, OutputData, ROW_HEADER_KEY, Row, Table};

/// Analytic title of an independent-samples run.
pub const INDEPENDENT_TITLE: &str = "Independent Samples T Test";
/// Analytic title of a paired-samples run.
pub const PAIRED_TITLE: &str = "Paired Samples T Test";

/// `0.95` → `"95"`, used in confidence interval headers.
pub(crate) fn confidence_percent(level: f64) -> String {
    ttest_common::format_numeric((level * 100.0 * 1e6).round() / 1e6)
}
