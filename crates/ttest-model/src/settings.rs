//! Per-dialog test options.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::CellValue;

/// How the grouping variable splits cases into two groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum GroupDefinition {
    /// Cases whose grouping value equals `group1` or `group2`.
    SpecifiedValues {
        #[serde(default)]
        group1: Option<CellValue>,
        #[serde(default)]
        group2: Option<CellValue>,
    },
    /// Cases at or above the cut point form group 1, the rest group 2.
    CutPoint {
        #[serde(default, rename = "cutPoint")]
        value: Option<CellValue>,
    },
}

impl Default for GroupDefinition {
    fn default() -> Self {
        GroupDefinition::SpecifiedValues {
            group1: None,
            group2: None,
        }
    }
}

impl GroupDefinition {
    pub fn specified(group1: impl Into<CellValue>, group2: impl Into<CellValue>) -> Self {
        GroupDefinition::SpecifiedValues {
            group1: Some(group1.into()),
            group2: Some(group2.into()),
        }
    }

    pub fn cut_point(value: impl Into<CellValue>) -> Self {
        GroupDefinition::CutPoint {
            value: Some(value.into()),
        }
    }

    /// Both codes (or the cut value) are present and non-missing.
    pub fn is_complete(&self) -> bool {
        let present = |value: &Option<CellValue>| value.as_ref().is_some_and(|v| !v.is_missing());
        match self {
            GroupDefinition::SpecifiedValues { group1, group2 } => {
                present(group1) && present(group2)
            }
            GroupDefinition::CutPoint { value } => present(value),
        }
    }

    /// Display labels of the two groups, e.g. `("1", "2")` or `(">= 5", "< 5")`.
    pub fn group_labels(&self) -> (String, String) {
        let show = |value: &Option<CellValue>| value.as_ref().map(ToString::to_string).unwrap_or_default();
        match self {
            GroupDefinition::SpecifiedValues { group1, group2 } => (show(group1), show(group2)),
            GroupDefinition::CutPoint { value } => {
                let cut = show(value);
                (format!(">= {cut}"), format!("< {cut}"))
            }
        }
    }
}

/// Options of the Independent-Samples T Test dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndependentSettings {
    #[serde(default)]
    pub group_definition: GroupDefinition,
    #[serde(default = "default_true")]
    pub estimate_effect_size: bool,
}

impl Default for IndependentSettings {
    fn default() -> Self {
        Self {
            group_definition: GroupDefinition::default(),
            estimate_effect_size: true,
        }
    }
}

impl IndependentSettings {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_group_definition(mut self, definition: GroupDefinition) -> Self {
        self.group_definition = definition;
        self
    }

    #[must_use]
    pub fn with_effect_size(mut self, enable: bool) -> Self {
        self.estimate_effect_size = enable;
        self
    }
}

/// Denominator used for paired-samples effect sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Standardizer {
    /// Standard deviation of the differences.
    #[default]
    StandardDeviation,
    /// Standard deviation of the differences corrected for the correlation.
    CorrectedStandardDeviation,
    /// Square root of the average of the two variances.
    AverageOfVariances,
}

impl Standardizer {
    /// Keyword used in the command log.
    pub fn keyword(&self) -> &'static str {
        match self {
            Standardizer::StandardDeviation => "SD",
            Standardizer::CorrectedStandardDeviation => "CORRECTED SD",
            Standardizer::AverageOfVariances => "AVERAGE VARIANCE",
        }
    }
}

impl fmt::Display for Standardizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Standardizer::StandardDeviation => "Standard deviation of the difference",
            Standardizer::CorrectedStandardDeviation => "Corrected standard deviation of the difference",
            Standardizer::AverageOfVariances => "Average of variances",
        })
    }
}

/// Options of the Paired-Samples T Test dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairedSettings {
    #[serde(default = "default_true")]
    pub estimate_effect_size: bool,
    #[serde(default)]
    pub standardizer: Standardizer,
}

impl Default for PairedSettings {
    fn default() -> Self {
        Self {
            estimate_effect_size: true,
            standardizer: Standardizer::default(),
        }
    }
}

impl PairedSettings {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_effect_size(mut self, enable: bool) -> Self {
        self.estimate_effect_size = enable;
        self
    }

    #[must_use]
    pub fn with_standardizer(mut self, standardizer: Standardizer) -> Self {
        self.standardizer = standardizer;
        self
    }
}

fn default_true() -> bool {
    true
}
