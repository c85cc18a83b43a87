//! Message contract between the analysis orchestrator and the compute worker.
//!
//! One [`WorkerRequest`] is one self-contained unit of work: it carries the
//! variables involved, their raw column data and the options bag. The worker
//! answers every request with exactly one [`WorkerResponse`].

use serde::{Deserialize, Serialize};

use crate::results::UnitResults;
use crate::settings::{GroupDefinition, Standardizer};
use crate::value::CellValue;
use crate::variable::Variable;

/// Statistic families requested from the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnalysisKind {
    GroupStatistics,
    IndependentSamplesTest,
    IndependentSamplesEffectSize,
    PairedSamplesStatistics,
    PairedSamplesCorrelation,
    PairedSamplesTest,
    PairedSamplesEffectSize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndependentOptions {
    #[serde(flatten)]
    pub group_definition: GroupDefinition,
    pub estimate_effect_size: bool,
    pub confidence_level: f64,
}

/// One test variable of an independent-samples run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndependentRequest {
    pub analysis_type: Vec<AnalysisKind>,
    pub variable: Variable,
    pub data: Vec<CellValue>,
    pub grouping_variable: Variable,
    pub grouping_data: Vec<CellValue>,
    pub options: IndependentOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairedOptions {
    pub estimate_effect_size: bool,
    pub standardizer: Standardizer,
    pub confidence_level: f64,
}

/// One pair of a paired-samples run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairedRequest {
    pub analysis_type: Vec<AnalysisKind>,
    pub pair: usize,
    pub variable1: Variable,
    pub variable2: Variable,
    pub data1: Vec<CellValue>,
    pub data2: Vec<CellValue>,
    pub options: PairedOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkerRequest {
    Independent(IndependentRequest),
    Paired(PairedRequest),
}

impl WorkerRequest {
    /// Human-readable name of the unit, used in error text.
    pub fn unit_label(&self) -> String {
        match self {
            WorkerRequest::Independent(request) => request.variable.name.clone(),
            WorkerRequest::Paired(request) => pair_label(
                Some(request.pair),
                &request.variable1.name,
                &request.variable2.name,
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Reply to exactly one [`WorkerRequest`].
///
/// Responses can arrive in any order; the unit they belong to is identified by
/// the names (and pair number) echoed back, never by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerResponse {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable1_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable2_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<UnitResults>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkerResponse {
    /// Successful reply for the given request.
    pub fn success(request: &WorkerRequest, results: UnitResults) -> Self {
        Self {
            status: ResponseStatus::Success,
            results: Some(results),
            ..Self::addressed_to(request)
        }
    }

    /// Per-unit failure reply for the given request.
    pub fn failure(request: &WorkerRequest, error: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            error: Some(error.into()),
            ..Self::addressed_to(request)
        }
    }

    fn addressed_to(request: &WorkerRequest) -> Self {
        let (variable_name, variable1_name, variable2_name, pair) = match request {
            WorkerRequest::Independent(request) => {
                (Some(request.variable.name.clone()), None, None, None)
            }
            WorkerRequest::Paired(request) => (
                None,
                Some(request.variable1.name.clone()),
                Some(request.variable2.name.clone()),
                Some(request.pair),
            ),
        };
        Self {
            status: ResponseStatus::Success,
            variable_name,
            variable1_name,
            variable2_name,
            pair,
            results: None,
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }

    /// Human-readable name of the unit this response belongs to.
    pub fn unit_label(&self) -> String {
        if let Some(name) = &self.variable_name {
            return name.clone();
        }
        match (&self.variable1_name, &self.variable2_name) {
            (Some(first), Some(second)) => pair_label(self.pair, first, second),
            _ => "unknown unit".to_string(),
        }
    }
}

fn pair_label(pair: Option<usize>, first: &str, second: &str) -> String {
    match pair {
        Some(number) => format!("Pair {number} ({first} - {second})"),
        None => format!("{first} - {second}"),
    }
}
