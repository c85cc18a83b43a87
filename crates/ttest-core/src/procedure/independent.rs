//! Independent-samples T test.

use ttest_model::{
    AnalysisKind, Dataset, GroupDefinition, IndependentOptions, IndependentRequest,
    IndependentResults, IndependentSettings, UnitResults, Variable, WorkerRequest,
};
use ttest_report::{INDEPENDENT_TITLE, independent_note, independent_tables};
use ttest_select::IndependentSelection;

use super::{FormattedOutput, Procedure, criteria_clause, effect_size_clause};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;

/// Snapshot of an independent-samples selection plus its settings.
#[derive(Debug, Clone, PartialEq)]
pub struct IndependentSamplesProcedure {
    test_variables: Vec<Variable>,
    grouping_variable: Option<Variable>,
    settings: IndependentSettings,
}

impl IndependentSamplesProcedure {
    pub fn new(
        test_variables: Vec<Variable>,
        grouping_variable: Option<Variable>,
        settings: IndependentSettings,
    ) -> Self {
        Self {
            test_variables,
            grouping_variable,
            settings,
        }
    }

    pub fn from_selection(selection: &IndependentSelection, settings: IndependentSettings) -> Self {
        Self::new(
            selection.test_variables().to_vec(),
            selection.grouping_variable().cloned(),
            settings,
        )
    }

    pub fn test_variables(&self) -> &[Variable] {
        &self.test_variables
    }

    pub fn settings(&self) -> &IndependentSettings {
        &self.settings
    }

    fn analysis_types(&self) -> Vec<AnalysisKind> {
        let mut kinds = vec![
            AnalysisKind::GroupStatistics,
            AnalysisKind::IndependentSamplesTest,
        ];
        if self.settings.estimate_effect_size {
            kinds.push(AnalysisKind::IndependentSamplesEffectSize);
        }
        kinds
    }

    /// `score(1 2)` or `score(70)` for cut points.
    fn groups_clause(grouping: &Variable, definition: &GroupDefinition) -> String {
        let show = |value: &Option<ttest_model::CellValue>| {
            value.as_ref().map(ToString::to_string).unwrap_or_default()
        };
        match definition {
            GroupDefinition::SpecifiedValues { group1, group2 } => {
                format!("{}({} {})", grouping.name, show(group1), show(group2))
            }
            GroupDefinition::CutPoint { value } => format!("{}({})", grouping.name, show(value)),
        }
    }

    /// Results ordered like the test variable list. Units the list does not
    /// know keep their arrival order at the end.
    ///
    /// Display decimals come from the selected variable, not from the
    /// worker's echo of it.
    fn ordered(&self, results: &[UnitResults]) -> Vec<IndependentResults> {
        let mut ordered: Vec<(usize, IndependentResults)> = results
            .iter()
            .filter_map(UnitResults::as_independent)
            .map(|result| {
                let mut result = result.clone();
                let position = self
                    .test_variables
                    .iter()
                    .position(|v| v.same_id(&result.variable));
                match position {
                    Some(index) => {
                        result.variable.decimals = self.test_variables[index].decimals;
                        (index, result)
                    }
                    None => (usize::MAX, result),
                }
            })
            .collect();
        ordered.sort_by_key(|(position, _)| *position);
        ordered.into_iter().map(|(_, result)| result).collect()
    }
}

impl Procedure for IndependentSamplesProcedure {
    fn name(&self) -> &'static str {
        "independent"
    }

    fn title(&self) -> &'static str {
        INDEPENDENT_TITLE
    }

    fn validate(&self) -> Result<(), AnalysisError> {
        if self.test_variables.is_empty() {
            return Err(AnalysisError::validation(
                "Please select at least one test variable.",
            ));
        }
        if self.grouping_variable.is_none() {
            return Err(AnalysisError::validation("Please select a grouping variable."));
        }
        let definition = &self.settings.group_definition;
        if !definition.is_complete() {
            let message = match definition {
                GroupDefinition::SpecifiedValues { .. } => "Please define both group values.",
                GroupDefinition::CutPoint { .. } => "Please specify a cut point.",
            };
            return Err(AnalysisError::validation(message));
        }
        if let GroupDefinition::SpecifiedValues {
            group1: Some(group1),
            group2: Some(group2),
        } = definition
            && group1.same_value(group2)
        {
            return Err(AnalysisError::validation(
                "Group 1 and Group 2 must be different.",
            ));
        }
        Ok(())
    }

    fn build_requests(&self, dataset: &Dataset, config: &AnalysisConfig) -> Vec<WorkerRequest> {
        let Some(grouping) = &self.grouping_variable else {
            return Vec::new();
        };
        let grouping_data = dataset.column(grouping.column_index);
        let options = IndependentOptions {
            group_definition: self.settings.group_definition.clone(),
            estimate_effect_size: self.settings.estimate_effect_size,
            confidence_level: config.confidence_level,
        };

        self.test_variables
            .iter()
            .map(|variable| {
                WorkerRequest::Independent(IndependentRequest {
                    analysis_type: self.analysis_types(),
                    variable: variable.clone(),
                    data: dataset.column(variable.column_index),
                    grouping_variable: grouping.clone(),
                    grouping_data: grouping_data.clone(),
                    options: options.clone(),
                })
            })
            .collect()
    }

    fn command_log(&self, config: &AnalysisConfig) -> String {
        let groups = self
            .grouping_variable
            .as_ref()
            .map(|g| Self::groups_clause(g, &self.settings.group_definition))
            .unwrap_or_default();
        let variables = self
            .test_variables
            .iter()
            .map(|v| v.name.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "T-TEST GROUPS={groups} {{{variables}}}{}{}",
            effect_size_clause(self.settings.estimate_effect_size),
            criteria_clause(config)
        )
    }

    fn format(&self, results: &[UnitResults], config: &AnalysisConfig) -> FormattedOutput {
        let ordered = self.ordered(results);
        FormattedOutput {
            tables: independent_tables(&ordered, &self.settings, config.confidence_level),
            note: independent_note(&ordered),
        }
    }
}
