//! Informational notes for units with insufficient data.
//!
//! Insufficient data is not an error. Each affected unit contributes one
//! sentence per reason; the sentences end up in the analytic note.

use ttest_model::{IndependentResults, InsufficientType, PairedResults, ResultMetadata};

/// Note for an independent-samples run, `None` when every unit had data.
pub fn independent_note(results: &[IndependentResults]) -> Option<String> {
    let units = results
        .iter()
        .map(|result| (result.variable.display_name().to_string(), &result.metadata));
    collect(units, independent_reason)
}

/// Note for a paired-samples run, `None` when every pair had data.
pub fn paired_note(results: &[PairedResults]) -> Option<String> {
    let units = results.iter().map(|result| {
        let unit = format!(
            "Pair {} ({} - {})",
            result.pair,
            result.variable1.display_name(),
            result.variable2.display_name()
        );
        (unit, &result.metadata)
    });
    collect(units, paired_reason)
}

fn independent_reason(kind: InsufficientType) -> &'static str {
    match kind {
        InsufficientType::Empty => {
            "t cannot be computed because there are no valid cases in at least one group."
        }
        InsufficientType::Single => {
            "at least one group has fewer than two valid cases, so its standard deviation cannot be computed."
        }
        InsufficientType::StdDev => {
            "t cannot be computed because the standard deviations of both groups are 0."
        }
    }
}

fn paired_reason(kind: InsufficientType) -> &'static str {
    match kind {
        InsufficientType::Empty => {
            "the correlation and t cannot be computed because there are no valid pairs of values."
        }
        InsufficientType::Single => {
            "the correlation and t cannot be computed because there are fewer than two valid pairs of values."
        }
        InsufficientType::StdDev => {
            "the correlation and t cannot be computed because the standard error of the difference is 0."
        }
    }
}

fn collect<'a>(
    units: impl Iterator<Item = (String, &'a ResultMetadata)>,
    reason: fn(InsufficientType) -> &'static str,
) -> Option<String> {
    let mut lines = Vec::new();
    for (unit, metadata) in units {
        if !metadata.has_insufficient_data {
            continue;
        }
        let mut kinds = metadata.insufficient_type.clone();
        kinds.sort();
        kinds.dedup();
        for kind in kinds {
            lines.push(format!("{unit}: {}", reason(kind)));
        }
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use ttest_model::{PairedStatistics, Variable};

    use super::*;

    fn paired(pair: usize, metadata: ResultMetadata) -> PairedResults {
        PairedResults {
            pair,
            variable1: Variable::new("pre", 0),
            variable2: Variable::new("post", 1),
            paired_samples_statistics: PairedStatistics::default(),
            paired_samples_correlation: None,
            paired_samples_test: None,
            effect_sizes: None,
            metadata,
        }
    }

    #[test]
    fn no_note_when_all_sufficient() {
        assert_eq!(paired_note(&[paired(1, ResultMetadata::default())]), None);
        assert_eq!(independent_note(&[]), None);
    }

    #[test]
    fn one_line_per_reason() {
        let results = [
            paired(1, ResultMetadata::default()),
            paired(
                2,
                ResultMetadata::insufficient([
                    InsufficientType::StdDev,
                    InsufficientType::Empty,
                    InsufficientType::Empty,
                ]),
            ),
        ];
        let note = paired_note(&results).unwrap();
        let lines: Vec<_> = note.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Pair 2 (pre - post): "));
        assert!(lines[0].contains("no valid pairs"));
        assert!(lines[1].contains("standard error of the difference is 0"));
    }

    #[test]
    fn types_without_flag_are_ignored() {
        let metadata = ResultMetadata {
            has_insufficient_data: false,
            insufficient_type: vec![InsufficientType::Single],
            variable_name: None,
        };
        assert_eq!(paired_note(&[paired(1, metadata)]), None);
    }
}
