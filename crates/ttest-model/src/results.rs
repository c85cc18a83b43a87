//! Raw statistical results produced by the compute worker.
//!
//! Every numeric field is optional: the worker reports `null` whenever a
//! statistic is undefined for the unit (no cases, a single case, zero
//! variance). Why a unit could not be fully analyzed is carried in
//! [`ResultMetadata`].

use serde::{Deserialize, Serialize};

use crate::variable::Variable;

/// Reason a unit of work could not be fully analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InsufficientType {
    /// No valid cases.
    Empty,
    /// N <= 1 in at least one group.
    Single,
    /// Zero variance, the test statistic is undefined.
    StdDev,
}

/// Annotation attached to every result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    #[serde(default)]
    pub has_insufficient_data: bool,
    #[serde(default)]
    pub insufficient_type: Vec<InsufficientType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_name: Option<String>,
}

impl ResultMetadata {
    pub fn insufficient(types: impl IntoIterator<Item = InsufficientType>) -> Self {
        Self {
            has_insufficient_data: true,
            insufficient_type: types.into_iter().collect(),
            variable_name: None,
        }
    }

    pub fn has_type(&self, kind: InsufficientType) -> bool {
        self.has_insufficient_data && self.insufficient_type.contains(&kind)
    }

    /// Units with no data or zero variance get no test-statistics row.
    pub fn skips_test_row(&self) -> bool {
        self.has_type(InsufficientType::Empty) || self.has_type(InsufficientType::StdDev)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    #[serde(default)]
    pub lower: Option<f64>,
    #[serde(default)]
    pub upper: Option<f64>,
}

/// Descriptives of one group (or one side of a pair).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStatistic {
    #[serde(rename = "N", default)]
    pub n: usize,
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub std_deviation: Option<f64>,
    #[serde(default)]
    pub std_error_mean: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndependentGroupStatistics {
    pub group1: GroupStatistic,
    pub group2: GroupStatistic,
}

/// Levene's test for equality of variances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LeveneTest {
    #[serde(rename = "F", default)]
    pub f: Option<f64>,
    #[serde(default)]
    pub sig: Option<f64>,
}

/// One t-test line (pooled or Welch).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TTestRow {
    #[serde(default)]
    pub t: Option<f64>,
    #[serde(default)]
    pub df: Option<f64>,
    #[serde(default)]
    pub sig_two_tailed: Option<f64>,
    #[serde(default)]
    pub mean_difference: Option<f64>,
    #[serde(default)]
    pub std_error_difference: Option<f64>,
    #[serde(default)]
    pub confidence_interval: ConfidenceInterval,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndependentSamplesTest {
    #[serde(default)]
    pub levene: LeveneTest,
    #[serde(default)]
    pub equal_variances_assumed: TTestRow,
    #[serde(default)]
    pub equal_variances_not_assumed: TTestRow,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectSize {
    #[serde(default)]
    pub standardizer: Option<f64>,
    #[serde(default)]
    pub point_estimate: Option<f64>,
    #[serde(default)]
    pub confidence_interval: ConfidenceInterval,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndependentEffectSizes {
    pub cohens_d: EffectSize,
    pub hedges_correction: EffectSize,
    pub glass_delta: EffectSize,
}

/// Results for one test variable of an independent-samples run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndependentResults {
    pub variable: Variable,
    pub group_statistics: IndependentGroupStatistics,
    #[serde(default)]
    pub independent_samples_test: Option<IndependentSamplesTest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect_sizes: Option<IndependentEffectSizes>,
    #[serde(default)]
    pub metadata: ResultMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairedStatistics {
    pub group1: GroupStatistic,
    pub group2: GroupStatistic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PairedCorrelation {
    #[serde(rename = "N", default)]
    pub n: usize,
    #[serde(default)]
    pub correlation: Option<f64>,
    #[serde(default)]
    pub sig: Option<f64>,
}

/// Test on the paired differences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairedTest {
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub std_deviation: Option<f64>,
    #[serde(default)]
    pub std_error_mean: Option<f64>,
    #[serde(default)]
    pub confidence_interval: ConfidenceInterval,
    #[serde(default)]
    pub t: Option<f64>,
    #[serde(default)]
    pub df: Option<f64>,
    #[serde(default)]
    pub sig: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairedEffectSizes {
    pub cohens_d: EffectSize,
    pub hedges_correction: EffectSize,
}

/// Results for one pair of a paired-samples run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairedResults {
    /// 1-based pair number as displayed when the run was dispatched.
    pub pair: usize,
    pub variable1: Variable,
    pub variable2: Variable,
    pub paired_samples_statistics: PairedStatistics,
    #[serde(default)]
    pub paired_samples_correlation: Option<PairedCorrelation>,
    #[serde(default)]
    pub paired_samples_test: Option<PairedTest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect_sizes: Option<PairedEffectSizes>,
    #[serde(default)]
    pub metadata: ResultMetadata,
}

/// Results of one unit of work, keyed by their distinguishing table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnitResults {
    Independent(IndependentResults),
    Paired(PairedResults),
}

impl UnitResults {
    pub fn metadata(&self) -> &ResultMetadata {
        match self {
            UnitResults::Independent(results) => &results.metadata,
            UnitResults::Paired(results) => &results.metadata,
        }
    }

    pub fn as_independent(&self) -> Option<&IndependentResults> {
        match self {
            UnitResults::Independent(results) => Some(results),
            UnitResults::Paired(_) => None,
        }
    }

    pub fn as_paired(&self) -> Option<&PairedResults> {
        match self {
            UnitResults::Paired(results) => Some(results),
            UnitResults::Independent(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_test_row_only_for_empty_and_std_dev() {
        assert!(ResultMetadata::insufficient([InsufficientType::Empty]).skips_test_row());
        assert!(ResultMetadata::insufficient([InsufficientType::StdDev]).skips_test_row());
        assert!(!ResultMetadata::insufficient([InsufficientType::Single]).skips_test_row());
        assert!(!ResultMetadata::default().skips_test_row());
    }

    #[test]
    fn flag_gates_insufficient_types() {
        let metadata = ResultMetadata {
            has_insufficient_data: false,
            insufficient_type: vec![InsufficientType::Empty],
            variable_name: None,
        };
        assert!(!metadata.has_type(InsufficientType::Empty));
    }
}
