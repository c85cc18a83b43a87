//! Independent-samples tables.
//!
//! Missing statistics render as empty strings in these tables.

use ttest_model::{
    EffectSize, GroupDefinition, GroupStatistic, IndependentResults, IndependentSettings,
    TTestRow,
};

use crate::confidence_percent;
use crate::format::{format_df, format_number_or_blank, format_p_value, precision};
use crate::table::{ColumnHeader, Row, Table};

pub const GROUP_STATISTICS_TITLE: &str = "Group Statistics";
pub const INDEPENDENT_TEST_TITLE: &str = "Independent Samples Test";
pub const INDEPENDENT_EFFECT_SIZES_TITLE: &str = "Independent Samples Effect Sizes";

const MEAN_OFFSET: usize = 2;
const STAT_OFFSET: usize = 3;

/// All tables of an independent-samples run, empty ones included.
pub fn independent_tables(
    results: &[IndependentResults],
    settings: &IndependentSettings,
    confidence_level: f64,
) -> Vec<Table> {
    let mut tables = vec![
        group_statistics_table(results, &settings.group_definition),
        independent_samples_test_table(results, confidence_level),
    ];
    if settings.estimate_effect_size {
        tables.push(independent_effect_sizes_table(results, confidence_level));
    }
    tables
}

/// Two rows per test variable, one per group. Units without data keep their
/// rows with blank statistics.
pub fn group_statistics_table(results: &[IndependentResults], groups: &GroupDefinition) -> Table {
    let mut table = Table::new(
        GROUP_STATISTICS_TITLE,
        vec![
            ColumnHeader::row_header(),
            ColumnHeader::leaf("N", "N"),
            ColumnHeader::leaf("Mean", "Mean"),
            ColumnHeader::leaf("Std. Deviation", "StdDeviation"),
            ColumnHeader::leaf("Std. Error Mean", "StdErrorMean"),
        ],
    );
    let (label1, label2) = groups.group_labels();

    for result in results {
        let decimals = result.variable.decimals;
        let name = result.variable.display_name();
        for (label, stats) in [
            (&label1, &result.group_statistics.group1),
            (&label2, &result.group_statistics.group2),
        ] {
            table.push(group_row(Row::new([name, label.as_str()]), stats, decimals));
        }
    }
    table
}

fn group_row(row: Row, stats: &GroupStatistic, decimals: usize) -> Row {
    row.cell("N", stats.n)
        .cell(
            "Mean",
            format_number_or_blank(stats.mean, precision(decimals, MEAN_OFFSET)),
        )
        .cell(
            "StdDeviation",
            format_number_or_blank(stats.std_deviation, precision(decimals, STAT_OFFSET)),
        )
        .cell(
            "StdErrorMean",
            format_number_or_blank(stats.std_error_mean, precision(decimals, STAT_OFFSET)),
        )
}

/// Levene's test plus the pooled and Welch t-test lines per variable.
///
/// Variables without data or with zero variance get no rows.
pub fn independent_samples_test_table(
    results: &[IndependentResults],
    confidence_level: f64,
) -> Table {
    let mut table = Table::new(
        INDEPENDENT_TEST_TITLE,
        vec![
            ColumnHeader::row_header(),
            ColumnHeader::group(
                "Levene's Test for Equality of Variances",
                vec![
                    ColumnHeader::leaf("F", "F"),
                    ColumnHeader::leaf("Sig.", "LeveneSig"),
                ],
            ),
            ColumnHeader::group(
                "t-test for Equality of Means",
                vec![
                    ColumnHeader::leaf("t", "t"),
                    ColumnHeader::leaf("df", "df"),
                    ColumnHeader::leaf("Sig. (2-tailed)", "SigTwoTailed"),
                    ColumnHeader::leaf("Mean Difference", "MeanDifference"),
                    ColumnHeader::leaf("Std. Error Difference", "StdErrorDifference"),
                    ColumnHeader::group(
                        format!(
                            "{}% Confidence Interval of the Difference",
                            confidence_percent(confidence_level)
                        ),
                        vec![
                            ColumnHeader::leaf("Lower", "Lower"),
                            ColumnHeader::leaf("Upper", "Upper"),
                        ],
                    ),
                ],
            ),
        ],
    );

    for result in results {
        if result.metadata.skips_test_row() {
            continue;
        }
        let Some(test) = &result.independent_samples_test else {
            continue;
        };
        let decimals = precision(result.variable.decimals, STAT_OFFSET);
        let name = result.variable.display_name();

        let assumed = Row::new([name, "Equal variances assumed"])
            .cell("F", format_number_or_blank(test.levene.f, decimals))
            .cell("LeveneSig", format_p_value(test.levene.sig).or_blank());
        table.push(t_test_cells(assumed, &test.equal_variances_assumed, decimals));

        let not_assumed = Row::new([name, "Equal variances not assumed"])
            .cell("F", "")
            .cell("LeveneSig", "");
        table.push(t_test_cells(
            not_assumed,
            &test.equal_variances_not_assumed,
            decimals,
        ));
    }
    table
}

fn t_test_cells(row: Row, test: &TTestRow, decimals: usize) -> Row {
    row.cell("t", format_number_or_blank(test.t, decimals))
        .cell("df", format_df(test.df).or_blank())
        .cell("SigTwoTailed", format_p_value(test.sig_two_tailed).or_blank())
        .cell(
            "MeanDifference",
            format_number_or_blank(test.mean_difference, decimals),
        )
        .cell(
            "StdErrorDifference",
            format_number_or_blank(test.std_error_difference, decimals),
        )
        .cell(
            "Lower",
            format_number_or_blank(test.confidence_interval.lower, decimals),
        )
        .cell(
            "Upper",
            format_number_or_blank(test.confidence_interval.upper, decimals),
        )
}

/// Cohen's d, Hedges' correction and Glass's delta per variable.
pub fn independent_effect_sizes_table(
    results: &[IndependentResults],
    confidence_level: f64,
) -> Table {
    let mut table = Table::new(
        INDEPENDENT_EFFECT_SIZES_TITLE,
        effect_size_headers(confidence_level),
    );

    for result in results {
        if result.metadata.skips_test_row() {
            continue;
        }
        let Some(sizes) = &result.effect_sizes else {
            continue;
        };
        let decimals = precision(result.variable.decimals, STAT_OFFSET);
        let name = result.variable.display_name();
        for (label, size) in [
            ("Cohen's d", &sizes.cohens_d),
            ("Hedges' correction", &sizes.hedges_correction),
            ("Glass's delta", &sizes.glass_delta),
        ] {
            table.push(effect_size_row(Row::new([name, label]), size, decimals, false));
        }
    }
    table
}

pub(crate) fn effect_size_headers(confidence_level: f64) -> Vec<ColumnHeader> {
    vec![
        ColumnHeader::row_header(),
        ColumnHeader::leaf("Standardizer", "Standardizer"),
        ColumnHeader::leaf("Point Estimate", "PointEstimate"),
        ColumnHeader::group(
            format!("{}% Confidence Interval", confidence_percent(confidence_level)),
            vec![
                ColumnHeader::leaf("Lower", "Lower"),
                ColumnHeader::leaf("Upper", "Upper"),
            ],
        ),
    ]
}

/// `null_missing` selects the paired convention for missing values.
pub(crate) fn effect_size_row(
    row: Row,
    size: &EffectSize,
    decimals: usize,
    null_missing: bool,
) -> Row {
    let fmt = |value: Option<f64>| {
        let cell = crate::format::format_number(value, decimals);
        if null_missing { cell } else { cell.or_blank() }
    };
    row.cell("Standardizer", fmt(size.standardizer))
        .cell("PointEstimate", fmt(size.point_estimate))
        .cell("Lower", fmt(size.confidence_interval.lower))
        .cell("Upper", fmt(size.confidence_interval.upper))
}
