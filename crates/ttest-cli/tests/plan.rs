//! Selections built from a CSV file, checked up to the point of dispatch.

use std::io::Write;

use tempfile::NamedTempFile;
use ttest_cli::plan::{group_definition, independent_selection, paired_selection};
use ttest_core::{AnalysisConfig, IndependentSamplesProcedure, PairedSamplesProcedure, Procedure};
use ttest_ingest::load_dataset;
use ttest_model::{IndependentSettings, PairedSettings, Standardizer, WorkerRequest};

fn study() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "group,pre,post\n1,10,12\n2,11,\n1,9,10\n2,14,15\n"
    )
    .unwrap();
    file
}

#[test]
fn independent_run_from_csv() {
    let file = study();
    let loaded = load_dataset(file.path(), 1).unwrap();
    let selection = independent_selection(
        &loaded.variables,
        &["post".to_string(), "pre".to_string()],
        Some("group"),
    )
    .unwrap();
    let settings = IndependentSettings::new()
        .with_group_definition(group_definition(&["1".into(), "2".into()], None));
    let procedure = IndependentSamplesProcedure::from_selection(&selection, settings);

    assert!(procedure.validate().is_ok());
    let config = AnalysisConfig::default();
    let requests = procedure.build_requests(&loaded.dataset, &config);
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].unit_label(), "post");
    insta::assert_snapshot!(
        procedure.command_log(&config),
        @"T-TEST GROUPS=group(1 2) {post pre}{ES DISPLAY (TRUE)}{CRITERIA=0.95}"
    );
}

#[test]
fn independent_run_without_groups_fails_validation() {
    let file = study();
    let loaded = load_dataset(file.path(), 1).unwrap();
    let selection =
        independent_selection(&loaded.variables, &["pre".to_string()], Some("group")).unwrap();
    let settings = IndependentSettings::new().with_group_definition(group_definition(&[], None));
    let procedure = IndependentSamplesProcedure::from_selection(&selection, settings);

    let err = procedure.validate().unwrap_err();
    assert_eq!(err.to_string(), "Please define both group values.");
}

#[test]
fn paired_run_from_csv() {
    let file = study();
    let loaded = load_dataset(file.path(), 1).unwrap();
    let selection =
        paired_selection(&loaded.variables, &[("pre".to_string(), "post".to_string())]).unwrap();
    let settings = PairedSettings::new().with_standardizer(Standardizer::AverageOfVariances);
    let procedure = PairedSamplesProcedure::from_selection(&selection, settings);

    let config = AnalysisConfig::default();
    let requests = procedure.build_requests(&loaded.dataset, &config);
    assert_eq!(requests.len(), 1);
    assert!(matches!(requests[0], WorkerRequest::Paired(_)));
    insta::assert_snapshot!(
        procedure.command_log(&config),
        @"T-TEST PAIRS=pre WITH post PAIRED {ES DISPLAY (TRUE)}{STANDARDIZER (AVERAGE VARIANCE)}{CRITERIA=0.95}"
    );
}
