use anyhow::{Context, Result, anyhow, bail};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, info_span, warn};

use ttest_cli::logging::redact_value;
use ttest_cli::plan::{group_definition, independent_selection, paired_selection};
use ttest_cli::summary::{print_results, print_run_summary, roster_table};
use ttest_core::{
    AnalysisConfig, AnalysisOrchestrator, ChannelError, ComputeChannel, InMemoryDataSource,
    IndependentSamplesProcedure, MemoryResultStore, PairedSamplesProcedure, Procedure,
    ProcessChannel, RunOutcome,
};
use ttest_ingest::{LoadedDataset, load_dataset};
use ttest_model::{IndependentSettings, PairedSettings};

use crate::cli::{DataArgs, IndependentArgs, PairedArgs, RunArgs};

pub fn run_variables(args: &DataArgs) -> Result<()> {
    let loaded = load(args)?;
    println!("{}", roster_table(&loaded.variables));
    println!("{} cases", loaded.dataset.row_count());
    Ok(())
}

/// Returns whether the run finished without any error.
pub fn run_independent(args: &IndependentArgs) -> Result<bool> {
    let span = info_span!("independent", data = %args.data.data.display());
    let _guard = span.enter();

    let loaded = load(&args.data)?;
    let selection =
        independent_selection(&loaded.variables, &args.test, args.grouping.as_deref())?;
    let definition = group_definition(&args.groups, args.cut_point.as_deref());
    let (group1, group2) = definition.group_labels();
    debug!(
        group1 = redact_value(&group1),
        group2 = redact_value(&group2),
        "group definition"
    );
    let settings = IndependentSettings::new()
        .with_group_definition(definition)
        .with_effect_size(!args.no_effect_size);
    let procedure = IndependentSamplesProcedure::from_selection(&selection, settings);
    execute(Box::new(procedure), loaded, &args.run)
}

/// Returns whether the run finished without any error.
pub fn run_paired(args: &PairedArgs) -> Result<bool> {
    let span = info_span!("paired", data = %args.data.data.display());
    let _guard = span.enter();

    let loaded = load(&args.data)?;
    let selection = paired_selection(&loaded.variables, &args.pairs)?;
    let settings = PairedSettings::new()
        .with_effect_size(!args.no_effect_size)
        .with_standardizer(args.standardizer.into());
    let procedure = PairedSamplesProcedure::from_selection(&selection, settings);
    execute(Box::new(procedure), loaded, &args.run)
}

fn load(args: &DataArgs) -> Result<LoadedDataset> {
    load_dataset(&args.data, args.header_rows)
        .with_context(|| format!("load {}", args.data.display()))
}

/// Config file first, then command-line overrides.
fn analysis_config(args: &RunArgs) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(level) = args.confidence {
        config = config.with_confidence_level(level);
    }
    if args.timeout.is_some() {
        config = config.with_worker_timeout(args.timeout);
    }
    config.validate()?;
    Ok(config)
}

fn execute(procedure: Box<dyn Procedure>, loaded: LoadedDataset, args: &RunArgs) -> Result<bool> {
    let config = analysis_config(args)?;

    if args.dry_run {
        procedure.validate()?;
        let requests = procedure.build_requests(&loaded.dataset, &config);
        info!(units = requests.len(), "dry run");
        println!("{}", serde_json::to_string_pretty(&requests)?);
        println!("{}", procedure.command_log(&config));
        return Ok(true);
    }

    let worker = args
        .worker
        .as_deref()
        .ok_or_else(|| anyhow!("--worker is required unless --dry-run is set"))?;
    let mut parts = worker.split_whitespace().map(str::to_string);
    let program = parts
        .next()
        .ok_or_else(|| anyhow!("--worker must name a program"))?;
    let worker_args: Vec<String> = parts.collect();
    let channels = move || -> Result<Box<dyn ComputeChannel>, ChannelError> {
        let channel: Box<dyn ComputeChannel> =
            Box::new(ProcessChannel::spawn(&program, &worker_args)?);
        Ok(channel)
    };

    let mut orchestrator = AnalysisOrchestrator::new(
        InMemoryDataSource::new(loaded.dataset),
        MemoryResultStore::new(),
        channels,
    )
    .with_config(config);

    let dispatch = orchestrator.run_analysis(procedure)?;
    let bar = progress_bar(dispatch.units as u64);
    let outcome = orchestrator.wait(|progress| bar.set_position(progress.processed as u64));
    bar.finish_and_clear();

    match outcome.or_else(|| orchestrator.last_outcome().cloned()) {
        Some(RunOutcome::Completed(summary)) => {
            print_results(orchestrator.store())?;
            print_run_summary(&summary);
            if let Some(message) = orchestrator.error_message() {
                warn!(failed = summary.failed, "analysis finished with errors");
                eprintln!("{message}");
            }
            if let Some(path) = &args.output {
                orchestrator
                    .store()
                    .save_json(path)
                    .with_context(|| format!("save {}", path.display()))?;
            }
            Ok(summary.is_clean())
        }
        Some(RunOutcome::Failed(error)) => Err(error.into()),
        Some(RunOutcome::Cancelled) | None => bail!("analysis did not complete"),
    }
}

fn progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner} {msg} [{bar:30}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar.set_message("Calculating");
    bar
}
