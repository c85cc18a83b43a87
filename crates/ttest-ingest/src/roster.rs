//! Variable roster inference from a loaded frame.

use polars::prelude::{AnyValue, DataFrame};
use ttest_common::{any_to_f64, fraction_digits};
use ttest_model::{Measure, Variable, VariableType};

use crate::csv::CsvHeaders;

/// Upper bound on inferred display decimals.
const MAX_DECIMALS: usize = 8;

/// Builds one [`Variable`] per frame column, in column order.
///
/// A column is numeric when every non-null cell reads as a number; numeric
/// columns are `scale`, text columns `nominal`, all-null columns `unknown`.
/// Display decimals are the largest number of fraction digits seen.
pub fn infer_variables(df: &DataFrame, headers: &CsvHeaders) -> Vec<Variable> {
    df.get_columns()
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let mut seen = false;
            let mut numeric = true;
            let mut decimals = 0usize;
            for row_idx in 0..df.height() {
                let value = column.get(row_idx).unwrap_or(AnyValue::Null);
                if matches!(value, AnyValue::Null) {
                    continue;
                }
                let is_text = matches!(value, AnyValue::String(_) | AnyValue::StringOwned(_));
                match any_to_f64(value) {
                    Some(number) if !is_text => {
                        seen = true;
                        decimals = decimals.max(fraction_digits(number));
                    }
                    _ => {
                        seen = true;
                        numeric = false;
                    }
                }
            }

            let (var_type, measure) = match (seen, numeric) {
                (false, _) => (VariableType::Numeric, Measure::Unknown),
                (true, true) => (VariableType::Numeric, Measure::Scale),
                (true, false) => (VariableType::String, Measure::Nominal),
            };
            let mut variable = Variable::new(column.name().to_string(), index)
                .with_type(var_type)
                .with_measure(measure)
                .with_decimals(if numeric { decimals.min(MAX_DECIMALS) } else { 0 });
            if let Some(label) = headers.label_at(index) {
                variable = variable.with_label(label);
            }
            tracing::debug!(
                variable = %variable.name,
                column = index,
                kind = %variable.var_type,
                measure = %variable.measure,
                "inferred variable"
            );
            variable
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use polars::prelude::{IntoColumn, NamedFrom, Series};

    use super::*;

    fn frame() -> DataFrame {
        let score = Series::new("score".into(), &[Some(1.25), None, Some(3.5)]);
        let group = Series::new("group".into(), &["a", "b", "a"]);
        let empty = Series::new("blank".into(), &[None::<f64>, None, None]);
        DataFrame::new(vec![
            score.into_column(),
            group.into_column(),
            empty.into_column(),
        ])
        .unwrap()
    }

    #[test]
    fn infers_type_measure_and_decimals() {
        let headers = CsvHeaders::single(vec![
            "score".to_string(),
            "group".to_string(),
            "blank".to_string(),
        ]);
        let variables = infer_variables(&frame(), &headers);

        assert_eq!(variables.len(), 3);
        assert_eq!(variables[0].name, "score");
        assert_eq!(variables[0].var_type, VariableType::Numeric);
        assert_eq!(variables[0].measure, Measure::Scale);
        assert_eq!(variables[0].decimals, 2);
        assert_eq!(variables[1].var_type, VariableType::String);
        assert_eq!(variables[1].measure, Measure::Nominal);
        assert_eq!(variables[2].measure, Measure::Unknown);
        assert_eq!(variables[2].column_index, 2);
    }

    #[test]
    fn applies_labels_from_second_header_row() {
        let headers = CsvHeaders::double(
            vec!["Test score".to_string(), String::new(), String::new()],
            vec!["score".to_string(), "group".to_string(), "blank".to_string()],
        );
        let variables = infer_variables(&frame(), &headers);
        assert_eq!(variables[0].label.as_deref(), Some("Test score"));
        assert_eq!(variables[1].label, None);
    }
}
