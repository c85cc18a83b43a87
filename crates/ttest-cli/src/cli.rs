//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use ttest_cli::plan::parse_pair;
use ttest_model::Standardizer;

#[derive(Parser)]
#[command(
    name = "ttest",
    version,
    about = "Independent-samples and paired-samples T tests on CSV data",
    long_about = "Run Independent-Samples and Paired-Samples T Tests on a CSV dataset.\n\n\
                  Units of work are dispatched to an external worker process that speaks\n\
                  JSON lines; results are formatted into display tables and stored."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow cell values (group codes, cut points) in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the variables of a dataset.
    Variables(DataArgs),

    /// Compare the means of two groups.
    Independent(IndependentArgs),

    /// Compare the means of paired variables.
    Paired(PairedArgs),
}

#[derive(Args)]
pub struct DataArgs {
    /// CSV file with one column per variable.
    #[arg(value_name = "CSV")]
    pub data: PathBuf,

    /// Header rows: 1 = names only, 2 = labels row followed by names row.
    #[arg(long = "header-rows", default_value_t = 1)]
    pub header_rows: usize,
}

#[derive(Args)]
pub struct IndependentArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Test variable, in output order. Repeat for more variables.
    #[arg(long = "test", value_name = "NAME", required = true)]
    pub test: Vec<String>,

    /// Variable that splits the cases into two groups.
    #[arg(long = "grouping", value_name = "NAME")]
    pub grouping: Option<String>,

    /// The two group codes.
    #[arg(long = "groups", num_args = 2, value_names = ["GROUP1", "GROUP2"])]
    pub groups: Vec<String>,

    /// Split at a cut point instead of two codes.
    #[arg(long = "cut-point", value_name = "VALUE", conflicts_with = "groups")]
    pub cut_point: Option<String>,

    /// Skip the effect-size table.
    #[arg(long = "no-effect-size")]
    pub no_effect_size: bool,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Args)]
pub struct PairedArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// A pair of variables. Repeat for more pairs.
    #[arg(long = "pair", value_name = "FIRST:SECOND", value_parser = parse_pair)]
    pub pairs: Vec<(String, String)>,

    /// Skip the effect-size table.
    #[arg(long = "no-effect-size")]
    pub no_effect_size: bool,

    /// Denominator for the effect sizes.
    #[arg(long = "standardizer", value_enum, default_value = "sd")]
    pub standardizer: StandardizerArg,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Args)]
pub struct RunArgs {
    /// TOML file with analysis options.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Confidence level for intervals (overrides the config file).
    #[arg(long = "confidence", value_name = "LEVEL")]
    pub confidence: Option<f64>,

    /// Give up on the worker after this many seconds.
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Worker command line, e.g. "python3 ttest_worker.py".
    #[arg(long = "worker", value_name = "CMD")]
    pub worker: Option<String>,

    /// Validate and print the requests and command log without running.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Save the stored log, analytic and statistic records as JSON.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StandardizerArg {
    Sd,
    CorrectedSd,
    AverageVariance,
}

impl From<StandardizerArg> for Standardizer {
    fn from(arg: StandardizerArg) -> Self {
        match arg {
            StandardizerArg::Sd => Standardizer::StandardDeviation,
            StandardizerArg::CorrectedSd => Standardizer::CorrectedStandardDeviation,
            StandardizerArg::AverageVariance => Standardizer::AverageOfVariances,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn arguments_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_paired_run() {
        let cli = Cli::try_parse_from([
            "ttest",
            "paired",
            "data.csv",
            "--pair",
            "pre:post",
            "--pair",
            "pre:followup",
            "--standardizer",
            "average-variance",
            "--dry-run",
        ])
        .unwrap();
        let Command::Paired(args) = cli.command else {
            panic!("expected paired command");
        };
        assert_eq!(args.pairs.len(), 2);
        assert_eq!(args.pairs[1], ("pre".to_string(), "followup".to_string()));
        assert!(args.run.dry_run);
        assert_eq!(
            Standardizer::from(args.standardizer),
            Standardizer::AverageOfVariances
        );
    }

    #[test]
    fn groups_conflict_with_cut_point() {
        let result = Cli::try_parse_from([
            "ttest",
            "independent",
            "data.csv",
            "--test",
            "score",
            "--groups",
            "1",
            "2",
            "--cut-point",
            "5",
        ]);
        assert!(result.is_err());
    }
}
