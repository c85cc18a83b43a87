//! Paired-samples T test.

use ttest_model::{
    AnalysisKind, Dataset, PairedOptions, PairedRequest, PairedResults, PairedSettings,
    UnitResults, WorkerRequest,
};
use ttest_report::{PAIRED_TITLE, paired_note, paired_tables};
use ttest_select::{CompletePair, PairedSelection};

use super::{FormattedOutput, Procedure, criteria_clause, effect_size_clause};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;

/// The complete pairs of a paired-samples selection plus its settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedSamplesProcedure {
    pairs: Vec<CompletePair>,
    settings: PairedSettings,
}

impl PairedSamplesProcedure {
    pub fn new(pairs: Vec<CompletePair>, settings: PairedSettings) -> Self {
        Self { pairs, settings }
    }

    /// Rows with a hole or a same-column pair are left out.
    pub fn from_selection(selection: &PairedSelection, settings: PairedSettings) -> Self {
        Self::new(selection.valid_pairs(), settings)
    }

    pub fn pairs(&self) -> &[CompletePair] {
        &self.pairs
    }

    fn analysis_types(&self) -> Vec<AnalysisKind> {
        let mut kinds = vec![
            AnalysisKind::PairedSamplesStatistics,
            AnalysisKind::PairedSamplesCorrelation,
            AnalysisKind::PairedSamplesTest,
        ];
        if self.settings.estimate_effect_size {
            kinds.push(AnalysisKind::PairedSamplesEffectSize);
        }
        kinds
    }
}

impl Procedure for PairedSamplesProcedure {
    fn name(&self) -> &'static str {
        "paired"
    }

    fn title(&self) -> &'static str {
        PAIRED_TITLE
    }

    fn validate(&self) -> Result<(), AnalysisError> {
        if self.pairs.is_empty() {
            return Err(AnalysisError::validation(
                "Please select at least one pair of variables.",
            ));
        }
        Ok(())
    }

    fn build_requests(&self, dataset: &Dataset, config: &AnalysisConfig) -> Vec<WorkerRequest> {
        let options = PairedOptions {
            estimate_effect_size: self.settings.estimate_effect_size,
            standardizer: self.settings.standardizer,
            confidence_level: config.confidence_level,
        };
        self.pairs
            .iter()
            .map(|pair| {
                WorkerRequest::Paired(PairedRequest {
                    analysis_type: self.analysis_types(),
                    pair: pair.number,
                    variable1: pair.first.clone(),
                    variable2: pair.second.clone(),
                    data1: dataset.column(pair.first.column_index),
                    data2: dataset.column(pair.second.column_index),
                    options: options.clone(),
                })
            })
            .collect()
    }

    fn command_log(&self, config: &AnalysisConfig) -> String {
        let (first, second): (Vec<&str>, Vec<&str>) = self
            .pairs
            .iter()
            .map(|p| (p.first.name.as_str(), p.second.name.as_str()))
            .unzip();
        let (first, second) = (first.join(" "), second.join(" "));

        let mut log = format!(
            "T-TEST PAIRS={first} WITH {second} PAIRED {}",
            effect_size_clause(self.settings.estimate_effect_size)
        );
        if self.settings.estimate_effect_size {
            log.push_str(&format!(
                "{{STANDARDIZER ({})}}",
                self.settings.standardizer.keyword()
            ));
        }
        log.push_str(&criteria_clause(config));
        log
    }

    fn format(&self, results: &[UnitResults], config: &AnalysisConfig) -> FormattedOutput {
        let mut ordered: Vec<PairedResults> = results
            .iter()
            .filter_map(UnitResults::as_paired)
            .map(|result| {
                let mut result = result.clone();
                if let Some(pair) = self.pairs.iter().find(|p| p.number == result.pair) {
                    result.variable1.decimals = pair.first.decimals;
                    result.variable2.decimals = pair.second.decimals;
                }
                result
            })
            .collect();
        ordered.sort_by_key(|result| result.pair);
        FormattedOutput {
            tables: paired_tables(&ordered, &self.settings, config.confidence_level),
            note: paired_note(&ordered),
        }
    }
}

#[cfg(test)]
mod tests {
    use ttest_model::{
        CellValue, InsufficientType, PairedStatistics, ResultMetadata, Standardizer, Variable,
    };

    use super::*;

    fn pair(number: usize, first: (&str, usize), second: (&str, usize)) -> CompletePair {
        CompletePair {
            number,
            first: Variable::new(first.0, first.1),
            second: Variable::new(second.0, second.1),
        }
    }

    fn procedure(settings: PairedSettings) -> PairedSamplesProcedure {
        PairedSamplesProcedure::new(
            vec![
                pair(1, ("pre", 0), ("post", 1)),
                pair(2, ("pre", 0), ("followup", 2)),
            ],
            settings,
        )
    }

    #[test]
    fn rejects_empty_pair_list() {
        let err = PairedSamplesProcedure::new(Vec::new(), PairedSettings::default())
            .validate()
            .unwrap_err();
        assert_eq!(
            err.user_message(),
            "Please select at least one pair of variables."
        );
    }

    #[test]
    fn from_selection_skips_incomplete_rows() {
        let roster = [Variable::new("pre", 0), Variable::new("post", 1)];
        let mut selection = PairedSelection::new(&roster);
        selection.move_to_test_variables(&roster[0], None).unwrap();
        let procedure = PairedSamplesProcedure::from_selection(&selection, PairedSettings::default());
        assert!(procedure.validate().is_err());

        selection.move_to_test_variables(&roster[1], None).unwrap();
        let procedure = PairedSamplesProcedure::from_selection(&selection, PairedSettings::default());
        assert_eq!(procedure.pairs().len(), 1);
    }

    #[test]
    fn command_log_with_effect_size() {
        let settings = PairedSettings::default().with_standardizer(Standardizer::AverageOfVariances);
        insta::assert_snapshot!(
            procedure(settings).command_log(&AnalysisConfig::default()),
            @"T-TEST PAIRS=pre pre WITH post followup PAIRED {ES DISPLAY (TRUE)}{STANDARDIZER (AVERAGE VARIANCE)}{CRITERIA=0.95}"
        );
    }

    #[test]
    fn command_log_without_effect_size() {
        let settings = PairedSettings::default().with_effect_size(false);
        insta::assert_snapshot!(
            procedure(settings).command_log(&AnalysisConfig::default()),
            @"T-TEST PAIRS=pre pre WITH post followup PAIRED {ES DISPLAY (FALSE)}{CRITERIA=0.95}"
        );
    }

    #[test]
    fn requests_carry_pair_numbers_and_columns() {
        let dataset = Dataset::new(vec![
            vec![CellValue::from(1), CellValue::from(2), CellValue::from(3)],
            vec![CellValue::from(4), CellValue::from(5)],
        ]);
        let requests = procedure(PairedSettings::default().with_effect_size(false))
            .build_requests(&dataset, &AnalysisConfig::default());
        assert_eq!(requests.len(), 2);

        let WorkerRequest::Paired(second) = &requests[1] else {
            panic!("expected paired request");
        };
        assert_eq!(second.pair, 2);
        assert_eq!(second.data1, vec![CellValue::from(1), CellValue::from(4)]);
        assert_eq!(second.data2, vec![CellValue::from(3), CellValue::Missing]);
        assert_eq!(second.analysis_type.len(), 3);
        assert_eq!(requests[1].unit_label(), "Pair 2 (pre - followup)");
    }

    #[test]
    fn format_orders_by_pair_number() {
        let result = |pair: usize, metadata: ResultMetadata| {
            UnitResults::Paired(PairedResults {
                pair,
                variable1: Variable::new("pre", 0),
                variable2: Variable::new(if pair == 1 { "post" } else { "followup" }, pair),
                paired_samples_statistics: PairedStatistics::default(),
                paired_samples_correlation: None,
                paired_samples_test: None,
                effect_sizes: None,
                metadata,
            })
        };
        let output = procedure(PairedSettings::default()).format(
            &[
                result(2, ResultMetadata::insufficient([InsufficientType::Empty])),
                result(1, ResultMetadata::default()),
            ],
            &AnalysisConfig::default(),
        );
        assert_eq!(output.tables.len(), 4);
        assert_eq!(output.tables[0].rows[0].row_header[0], "Pair 1");
        assert_eq!(output.tables[0].rows[2].row_header[0], "Pair 2");
        assert!(output.note.unwrap().starts_with("Pair 2 (pre - followup): "));
    }
}
