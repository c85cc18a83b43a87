//! Test procedures: what differs between the independent and paired runs.
//!
//! The orchestrator drives one [`Procedure`] through
//! validate → build requests → (collect) → format. Everything variant
//! specific lives behind this trait.

mod independent;
mod paired;

pub use independent::IndependentSamplesProcedure;
pub use paired::PairedSamplesProcedure;

use ttest_model::{Dataset, UnitResults, WorkerRequest};
use ttest_report::Table;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;

/// Tables and note produced from one run's results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormattedOutput {
    /// Every table of the procedure, empty ones included. Only non-empty
    /// tables are persisted.
    pub tables: Vec<Table>,
    /// Informational note about units with insufficient data.
    pub note: Option<String>,
}

impl FormattedOutput {
    pub fn non_empty_tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter().filter(|t| !t.is_empty())
    }
}

/// One T-Test variant.
pub trait Procedure: Send {
    /// Short name for logs, e.g. `"independent"`.
    fn name(&self) -> &'static str;

    /// Analytic title.
    fn title(&self) -> &'static str;

    /// Reject selections that cannot be analyzed. No side effects.
    fn validate(&self) -> Result<(), AnalysisError>;

    /// One request per unit of work, with column data extracted from
    /// `dataset`.
    fn build_requests(&self, dataset: &Dataset, config: &AnalysisConfig) -> Vec<WorkerRequest>;

    /// Command-log line describing the invocation.
    fn command_log(&self, config: &AnalysisConfig) -> String;

    /// Turn accumulated results (in arrival order) into tables and a note.
    fn format(&self, results: &[UnitResults], config: &AnalysisConfig) -> FormattedOutput;
}

/// `{ES DISPLAY (TRUE)}`
fn effect_size_clause(enabled: bool) -> String {
    format!("{{ES DISPLAY ({})}}", if enabled { "TRUE" } else { "FALSE" })
}

/// `{CRITERIA=0.95}`
fn criteria_clause(config: &AnalysisConfig) -> String {
    format!(
        "{{CRITERIA={}}}",
        ttest_common::format_numeric(config.confidence_level)
    )
}
