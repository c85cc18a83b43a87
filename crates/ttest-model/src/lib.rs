//! Data model for T-Test Studio.
//!
//! - [`Variable`]: a column of the active dataset as known to the variable roster
//! - [`CellValue`] / [`Dataset`]: row-major in-memory data
//! - [`IndependentSettings`] / [`PairedSettings`]: per-dialog test options
//! - [`WorkerRequest`] / [`WorkerResponse`]: the message contract with the compute worker
//! - [`UnitResults`]: raw statistical results for one unit of work

pub mod dataset;
pub mod message;
pub mod results;
pub mod settings;
pub mod value;
pub mod variable;

pub use dataset::Dataset;
pub use message::{
    AnalysisKind, IndependentOptions, IndependentRequest, PairedOptions, PairedRequest,
    ResponseStatus, WorkerRequest, WorkerResponse,
};
pub use results::{
    ConfidenceInterval, EffectSize, GroupStatistic, IndependentEffectSizes,
    IndependentGroupStatistics, IndependentResults, IndependentSamplesTest, InsufficientType,
    LeveneTest, PairedCorrelation, PairedEffectSizes, PairedResults, PairedStatistics,
    PairedTest, ResultMetadata, TTestRow, UnitResults,
};
pub use settings::{GroupDefinition, IndependentSettings, PairedSettings, Standardizer};
pub use value::CellValue;
pub use variable::{Measure, Variable, VariableType};
