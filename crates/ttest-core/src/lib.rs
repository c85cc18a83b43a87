//! Analysis orchestration for T-Test Studio.
//!
//! - [`procedure`]: validation, request building, command log and formatting
//!   for the independent and paired variants
//! - [`channel`]: the compute worker seam ([`ThreadChannel`], [`ProcessChannel`])
//! - [`store`]: data source and result store interfaces
//! - [`orchestrator`]: the run state machine tying them together

pub mod channel;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod procedure;
pub mod store;

pub use channel::{
    ChannelEvent, ChannelFactory, ComputeChannel, ProcessChannel, ThreadChannel, UnitComputation,
};
pub use config::{AnalysisConfig, ConfigError};
pub use error::{AnalysisError, ChannelError, Result, StoreError};
pub use orchestrator::{
    AnalysisOrchestrator, Dispatch, Phase, Progress, RunId, RunOutcome, RunSummary,
};
pub use procedure::{
    FormattedOutput, IndependentSamplesProcedure, PairedSamplesProcedure, Procedure,
};
pub use store::{
    AnalyticRecord, DataSource, InMemoryDataSource, LogRecord, MemoryResultStore, NewAnalytic,
    NewStatistic, ResultStore, StatisticRecord,
};
