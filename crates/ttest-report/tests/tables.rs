//! Formatter output for realistic result sets.

use ttest_model::{
    ConfidenceInterval, EffectSize, GroupDefinition, GroupStatistic, IndependentEffectSizes,
    IndependentGroupStatistics, IndependentResults, IndependentSamplesTest, IndependentSettings,
    InsufficientType, LeveneTest, PairedCorrelation, PairedResults, PairedSettings,
    PairedStatistics, PairedTest, ResultMetadata, TTestRow, Variable,
};
use ttest_report::{
    Cell, OutputData, Table, group_statistics_table, independent_note,
    independent_samples_test_table, independent_tables, paired_correlations_table, paired_note,
    paired_statistics_table, paired_tables, paired_test_table,
};

fn render(table: &Table) -> String {
    let keys = table.data_keys();
    table
        .rows
        .iter()
        .map(|row| {
            let mut parts = row.row_header.clone();
            for key in &keys {
                parts.push(match row.get(key) {
                    Some(Cell::Empty) | None => "null".to_string(),
                    Some(Cell::Text(s)) if s.is_empty() => "''".to_string(),
                    Some(cell) => cell.to_string(),
                });
            }
            parts.join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn stat(n: usize, mean: f64, sd: f64, se: f64) -> GroupStatistic {
    GroupStatistic {
        n,
        mean: Some(mean),
        std_deviation: Some(sd),
        std_error_mean: Some(se),
    }
}

fn ci(lower: f64, upper: f64) -> ConfidenceInterval {
    ConfidenceInterval {
        lower: Some(lower),
        upper: Some(upper),
    }
}

fn t_row(t: f64, df: f64, sig: f64, md: f64, sed: f64, lower: f64, upper: f64) -> TTestRow {
    TTestRow {
        t: Some(t),
        df: Some(df),
        sig_two_tailed: Some(sig),
        mean_difference: Some(md),
        std_error_difference: Some(sed),
        confidence_interval: ci(lower, upper),
    }
}

fn effect(standardizer: f64, point: f64, lower: f64, upper: f64) -> EffectSize {
    EffectSize {
        standardizer: Some(standardizer),
        point_estimate: Some(point),
        confidence_interval: ci(lower, upper),
    }
}

fn independent_results() -> Vec<IndependentResults> {
    vec![
        IndependentResults {
            variable: Variable::new("score", 1).with_decimals(2),
            group_statistics: IndependentGroupStatistics {
                group1: stat(12, 75.4166667, 8.123456, 2.345),
                group2: stat(11, 70.0, 9.5, 2.864),
            },
            independent_samples_test: Some(IndependentSamplesTest {
                levene: LeveneTest {
                    f: Some(0.4521),
                    sig: Some(0.50812),
                },
                equal_variances_assumed: t_row(1.4823, 21.0, 0.15311, 5.4166667, 3.6543, -2.1829, 13.0162),
                equal_variances_not_assumed: t_row(1.4712, 19.8764, 0.1569, 5.4166667, 3.6819, -2.2677, 13.1010),
            }),
            effect_sizes: Some(IndependentEffectSizes {
                cohens_d: effect(8.7654, 0.6180, -0.2251, 1.4467),
                hedges_correction: effect(9.0921, 0.5957, -0.2170, 1.3946),
                glass_delta: effect(9.5, 0.5702, -0.2803, 1.3947),
            }),
            metadata: ResultMetadata::default(),
        },
        IndependentResults {
            variable: Variable::new("weight", 3),
            group_statistics: IndependentGroupStatistics {
                group1: stat(5, 60.0, 0.0, 0.0),
                group2: stat(5, 60.0, 0.0, 0.0),
            },
            independent_samples_test: Some(IndependentSamplesTest::default()),
            effect_sizes: None,
            metadata: ResultMetadata::insufficient([InsufficientType::StdDev]),
        },
    ]
}

fn paired_results() -> Vec<PairedResults> {
    vec![
        PairedResults {
            pair: 1,
            variable1: Variable::new("pre", 0),
            variable2: Variable::new("post", 1).with_decimals(1),
            paired_samples_statistics: PairedStatistics {
                group1: stat(10, 10.5, 2.0, 0.632456),
                group2: stat(10, 12.25, 1.5, 0.474342),
            },
            paired_samples_correlation: Some(PairedCorrelation {
                n: 10,
                correlation: Some(0.81234),
                sig: Some(0.0042),
            }),
            paired_samples_test: Some(PairedTest {
                mean: Some(-1.75),
                std_deviation: Some(1.2),
                std_error_mean: Some(0.379473),
                confidence_interval: ci(-2.608, -0.892),
                t: Some(-4.6117),
                df: Some(9.0),
                sig: Some(0.00127),
            }),
            effect_sizes: None,
            metadata: ResultMetadata::default(),
        },
        PairedResults {
            pair: 2,
            variable1: Variable::new("pre", 0),
            variable2: Variable::new("followup", 2),
            paired_samples_statistics: PairedStatistics::default(),
            paired_samples_correlation: None,
            paired_samples_test: None,
            effect_sizes: None,
            metadata: ResultMetadata::insufficient([InsufficientType::Empty]),
        },
    ]
}

#[test]
fn group_statistics_keep_insufficient_units() {
    let table = group_statistics_table(
        &independent_results(),
        &GroupDefinition::specified(1, 2),
    );
    insta::assert_snapshot!(render(&table), @r"
    score | 1 | 12 | 75.4167 | 8.12346 | 2.34500
    score | 2 | 11 | 70.0000 | 9.50000 | 2.86400
    weight | 1 | 5 | 60.00 | 0.000 | 0.000
    weight | 2 | 5 | 60.00 | 0.000 | 0.000
    ");
}

#[test]
fn independent_test_skips_zero_variance_units() {
    let table = independent_samples_test_table(&independent_results(), 0.95);
    insta::assert_snapshot!(render(&table), @r"
    score | Equal variances assumed | 0.45210 | 0.508 | 1.48230 | 21 | 0.153 | 5.41667 | 3.65430 | -2.18290 | 13.01620
    score | Equal variances not assumed | '' | '' | 1.47120 | 19.876 | 0.157 | 5.41667 | 3.68190 | -2.26770 | 13.10100
    ");
}

#[test]
fn confidence_level_appears_in_headers() {
    let table = independent_samples_test_table(&independent_results(), 0.9);
    let json = serde_json::to_string(&table).unwrap();
    assert!(json.contains("90% Confidence Interval of the Difference"));
}

#[test]
fn cut_point_labels_groups() {
    let table = group_statistics_table(
        &independent_results()[..1],
        &GroupDefinition::cut_point(70),
    );
    assert_eq!(table.rows[0].row_header, ["score", ">= 70"]);
    assert_eq!(table.rows[1].row_header[1], "< 70");
}

#[test]
fn independent_effect_sizes_follow_setting() {
    let results = independent_results();
    let with = independent_tables(&results, &IndependentSettings::default(), 0.95);
    assert_eq!(with.len(), 3);
    assert_eq!(with[2].rows.len(), 3);
    assert_eq!(with[2].rows[1].row_header, ["score", "Hedges' correction"]);

    let without = independent_tables(
        &results,
        &IndependentSettings::default().with_effect_size(false),
        0.95,
    );
    assert_eq!(without.len(), 2);
}

#[test]
fn paired_statistics_keep_empty_pair_with_nulls() {
    let table = paired_statistics_table(&paired_results());
    insta::assert_snapshot!(render(&table), @r"
    Pair 1 | pre | 10.50 | 10 | 2.000 | 0.632
    Pair 1 | post | 12.250 | 10 | 1.5000 | 0.4743
    Pair 2 | pre | null | 0 | null | null
    Pair 2 | followup | null | 0 | null | null
    ");
}

#[test]
fn worker_decimals_are_capped() {
    let mut independent = independent_results();
    independent[0].variable.decimals = usize::MAX;
    let groups = group_statistics_table(&independent[..1], &GroupDefinition::specified(1, 2));
    let Some(Cell::Text(mean)) = groups.rows[0].get("Mean") else {
        panic!("expected a formatted mean");
    };
    assert_eq!(mean, "75.4166667000");
    assert_eq!(independent_samples_test_table(&independent, 0.95).rows.len(), 2);

    let mut paired = paired_results();
    paired[0].variable2.decimals = usize::MAX;
    let test = paired_test_table(&paired, 0.95);
    let Some(Cell::Text(mean)) = test.rows[0].get("Mean") else {
        panic!("expected a formatted mean");
    };
    assert_eq!(mean, "-1.75000000000");
    assert_eq!(paired_statistics_table(&paired).rows.len(), 4);
}

#[test]
fn paired_test_and_correlation_skip_empty_pair() {
    let results = paired_results();
    let test = paired_test_table(&results, 0.95);
    insta::assert_snapshot!(render(&test), @"Pair 1 | pre - post | -1.7500 | 1.2000 | 0.3795 | -2.6080 | -0.8920 | -4.6117 | 9 | 0.001");

    let correlations = paired_correlations_table(&results);
    insta::assert_snapshot!(render(&correlations), @"Pair 1 | pre & post | 10 | 0.8123 | 0.004");
}

#[test]
fn correlation_table_empty_when_all_pairs_insufficient() {
    let results = &paired_results()[1..];
    assert!(paired_correlations_table(results).is_empty());
    assert!(paired_test_table(results, 0.95).is_empty());
    assert!(!paired_statistics_table(results).is_empty());
}

#[test]
fn paired_effect_size_table_empty_without_results() {
    let tables = paired_tables(&paired_results(), &PairedSettings::default(), 0.95);
    assert_eq!(tables.len(), 4);
    assert!(tables[3].is_empty());
}

#[test]
fn paired_test_headers_nest_differences() {
    let table = paired_test_table(&[], 0.95);
    assert_eq!(
        table.data_keys(),
        ["Mean", "StdDeviation", "StdErrorMean", "Lower", "Upper", "t", "df", "SigTwoTailed"]
    );
    assert_eq!(table.column_headers[1].header, "Paired Differences");
}

#[test]
fn output_data_is_json_with_nulls() {
    let table = paired_statistics_table(&paired_results()[1..]);
    let json = OutputData::single(&table).to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let row = &value["tables"][0]["rows"][0];
    assert_eq!(row["rowHeader"][0], "Pair 2");
    assert!(row["Mean"].is_null());
    assert_eq!(row["N"], 0);
}

#[test]
fn notes_describe_insufficient_units() {
    let note = independent_note(&independent_results()).unwrap();
    assert!(note.starts_with("weight: "));
    assert!(note.contains("standard deviations of both groups are 0"));

    let note = paired_note(&paired_results()).unwrap();
    assert!(note.starts_with("Pair 2 (pre - followup): "));
}
