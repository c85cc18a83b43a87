//! Paired-samples tables.
//!
//! Missing statistics render as null cells in these tables. Rows are labelled
//! with the pair number carried by each result.

use ttest_model::{GroupStatistic, PairedResults, PairedSettings};

use crate::confidence_percent;
use crate::format::{format_df, format_number, format_p_value, precision};
use crate::independent::{effect_size_headers, effect_size_row};
use crate::table::{ColumnHeader, Row, Table};

pub const PAIRED_STATISTICS_TITLE: &str = "Paired Samples Statistics";
pub const PAIRED_CORRELATIONS_TITLE: &str = "Paired Samples Correlations";
pub const PAIRED_TEST_TITLE: &str = "Paired Samples Test";
pub const PAIRED_EFFECT_SIZES_TITLE: &str = "Paired Samples Effect Sizes";

const MEAN_OFFSET: usize = 2;
const STAT_OFFSET: usize = 3;

fn pair_header(result: &PairedResults) -> String {
    format!("Pair {}", result.pair)
}

/// Precision of rows that combine both members (differences, correlation).
fn pair_precision(result: &PairedResults, offset: usize) -> usize {
    precision(
        result.variable1.decimals.max(result.variable2.decimals),
        offset,
    )
}

/// All tables of a paired-samples run, empty ones included.
pub fn paired_tables(
    results: &[PairedResults],
    settings: &PairedSettings,
    confidence_level: f64,
) -> Vec<Table> {
    let mut tables = vec![
        paired_statistics_table(results),
        paired_correlations_table(results),
        paired_test_table(results, confidence_level),
    ];
    if settings.estimate_effect_size {
        tables.push(paired_effect_sizes_table(results, confidence_level));
    }
    tables
}

/// Two rows per pair, one per member, each at its own variable's precision.
/// Insufficient pairs keep their rows.
pub fn paired_statistics_table(results: &[PairedResults]) -> Table {
    let mut table = Table::new(
        PAIRED_STATISTICS_TITLE,
        vec![
            ColumnHeader::row_header(),
            ColumnHeader::leaf("Mean", "Mean"),
            ColumnHeader::leaf("N", "N"),
            ColumnHeader::leaf("Std. Deviation", "StdDeviation"),
            ColumnHeader::leaf("Std. Error Mean", "StdErrorMean"),
        ],
    );

    for result in results {
        let pair = pair_header(result);
        let stats = &result.paired_samples_statistics;
        for (variable, member) in [
            (&result.variable1, &stats.group1),
            (&result.variable2, &stats.group2),
        ] {
            let row = Row::new([pair.as_str(), variable.display_name()]);
            table.push(member_row(row, member, variable.decimals));
        }
    }
    table
}

fn member_row(row: Row, stats: &GroupStatistic, decimals: usize) -> Row {
    row.cell("Mean", format_number(stats.mean, precision(decimals, MEAN_OFFSET)))
        .cell("N", stats.n)
        .cell(
            "StdDeviation",
            format_number(stats.std_deviation, precision(decimals, STAT_OFFSET)),
        )
        .cell(
            "StdErrorMean",
            format_number(stats.std_error_mean, precision(decimals, STAT_OFFSET)),
        )
}

/// One row per pair with sufficient data.
pub fn paired_correlations_table(results: &[PairedResults]) -> Table {
    let mut table = Table::new(
        PAIRED_CORRELATIONS_TITLE,
        vec![
            ColumnHeader::row_header(),
            ColumnHeader::leaf("N", "N"),
            ColumnHeader::leaf("Correlation", "Correlation"),
            ColumnHeader::leaf("Sig.", "Sig"),
        ],
    );

    for result in results {
        if result.metadata.has_insufficient_data {
            continue;
        }
        let Some(correlation) = &result.paired_samples_correlation else {
            continue;
        };
        let label = format!(
            "{} & {}",
            result.variable1.display_name(),
            result.variable2.display_name()
        );
        table.push(
            Row::new([pair_header(result), label])
                .cell("N", correlation.n)
                .cell(
                    "Correlation",
                    format_number(correlation.correlation, pair_precision(result, STAT_OFFSET)),
                )
                .cell("Sig", format_p_value(correlation.sig)),
        );
    }
    table
}

/// Test on the paired differences. Pairs without data or with zero variance
/// get no row.
pub fn paired_test_table(results: &[PairedResults], confidence_level: f64) -> Table {
    let mut table = Table::new(
        PAIRED_TEST_TITLE,
        vec![
            ColumnHeader::row_header(),
            ColumnHeader::group(
                "Paired Differences",
                vec![
                    ColumnHeader::leaf("Mean", "Mean"),
                    ColumnHeader::leaf("Std. Deviation", "StdDeviation"),
                    ColumnHeader::leaf("Std. Error Mean", "StdErrorMean"),
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
            ColumnHeader::leaf("t", "t"),
            ColumnHeader::leaf("df", "df"),
            ColumnHeader::leaf("Sig. (2-tailed)", "SigTwoTailed"),
        ],
    );

    for result in results {
        if result.metadata.skips_test_row() {
            continue;
        }
        let Some(test) = &result.paired_samples_test else {
            continue;
        };
        let decimals = pair_precision(result, STAT_OFFSET);
        let label = format!(
            "{} - {}",
            result.variable1.display_name(),
            result.variable2.display_name()
        );
        table.push(
            Row::new([pair_header(result), label])
                .cell("Mean", format_number(test.mean, decimals))
                .cell("StdDeviation", format_number(test.std_deviation, decimals))
                .cell("StdErrorMean", format_number(test.std_error_mean, decimals))
                .cell("Lower", format_number(test.confidence_interval.lower, decimals))
                .cell("Upper", format_number(test.confidence_interval.upper, decimals))
                .cell("t", format_number(test.t, decimals))
                .cell("df", format_df(test.df))
                .cell("SigTwoTailed", format_p_value(test.sig)),
        );
    }
    table
}

/// Cohen's d and Hedges' correction per pair.
pub fn paired_effect_sizes_table(results: &[PairedResults], confidence_level: f64) -> Table {
    let mut table = Table::new(
        PAIRED_EFFECT_SIZES_TITLE,
        effect_size_headers(confidence_level),
    );

    for result in results {
        if result.metadata.skips_test_row() {
            continue;
        }
        let Some(sizes) = &result.effect_sizes else {
            continue;
        };
        let decimals = pair_precision(result, STAT_OFFSET);
        let pair = pair_header(result);
        let label = format!(
            "{} - {}",
            result.variable1.display_name(),
            result.variable2.display_name()
        );
        for (estimator, size) in [
            ("Cohen's d", &sizes.cohens_d),
            ("Hedges' correction", &sizes.hedges_correction),
        ] {
            let row = Row::new([pair.as_str(), label.as_str(), estimator]);
            table.push(effect_size_row(row, size, decimals, true));
        }
    }
    table
}
