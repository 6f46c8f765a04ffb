use clap::{Parser, Subcommand};
use nettomo_core::{
    aggregate::BaselinePolicy,
    compare::ComparisonConfig,
    defaults,
    path::PathId,
    simulate::SimulationConfig,
};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct CliOpt {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Infer per link loss and delay from a probe log and compare them
    /// with the ground truth
    Analyze(AnalyzeOpt),
    /// Generate a random ground truth for every link of the monitored
    /// paths
    GenerateTruth(GenerateTruthOpt),
    /// Produce the probe log a receiver would have recorded under a
    /// given ground truth
    Simulate(SimulateOpt),
    /// Measure how the delay error grows with the path length
    HopError(HopErrorOpt),
}

#[derive(Parser, Debug, Clone)]
pub struct BaselineOpt {
    /// Source port of the calibration path, whose delay is subtracted
    /// from every other delay sample
    ///
    /// By default every record from a source port that is not a
    /// monitored path is a calibration record
    #[arg(long, conflicts_with = "no_baseline")]
    pub baseline: Option<PathId>,

    /// Do not calibrate: records from unmonitored source ports are
    /// ignored and delays are used as measured
    #[arg(long)]
    pub no_baseline: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeOpt {
    /// Path to the monitored paths file (`<id> -> <node> <node> ...`)
    #[arg(long)]
    pub paths: PathBuf,

    /// Path to the raw probe log
    #[arg(long)]
    pub log: PathBuf,

    /// Path to the JSON file containing the ground truth
    #[arg(long)]
    pub truth: PathBuf,

    /// Directory the reports are written to, `<log>.ans` by default
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub baseline: BaselineOpt,

    /// Number of sequence numbers in a loss window
    #[arg(long, default_value_t = defaults::DEFAULT_LOSS_WINDOW)]
    pub loss_window: u64,

    /// First sequence number of the delay series
    #[arg(long, default_value_t = defaults::DEFAULT_DELAY_WARMUP)]
    pub warmup: u64,

    /// Width of the moving average applied to the delay series
    #[arg(long, default_value_t = defaults::DEFAULT_DELAY_SMOOTHING)]
    pub smoothing: usize,

    /// Number of sequence numbers a ground truth value holds for
    #[arg(long, default_value_t = defaults::DEFAULT_TRUTH_BUCKET)]
    pub truth_bucket: u64,

    /// One delay row out of this many is written in the reports
    #[arg(long, default_value_t = defaults::DEFAULT_DELAY_STRIDE)]
    pub delay_stride: usize,

    /// Offset, in rows, between the measured delays and the ground truth
    #[arg(long, default_value_t = defaults::DEFAULT_DELAY_LEAD)]
    pub delay_lead: usize,

    /// Offset, in rows, between the measured loss and the ground truth
    #[arg(long, default_value_t = defaults::DEFAULT_LOSS_LEAD)]
    pub loss_lead: usize,
}

#[derive(Parser, Debug, Clone)]
pub struct GenerateTruthOpt {
    /// Path to the monitored paths file
    #[arg(long)]
    pub paths: PathBuf,

    /// Where to write the JSON ground truth
    #[arg(long)]
    pub output: PathBuf,

    /// The random seed of the generator
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Lowest per bucket loss, in percent
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(0..=100))]
    pub min_loss: u64,

    /// Highest per bucket loss, in percent
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(0..=100))]
    pub max_loss: u64,
}

#[derive(Parser, Debug, Clone)]
pub struct SimulateOpt {
    /// Path to the monitored paths file
    #[arg(long)]
    pub paths: PathBuf,

    /// Path to the JSON file containing the ground truth
    #[arg(long)]
    pub truth: PathBuf,

    /// Where to write the probe log
    #[arg(long)]
    pub output: PathBuf,

    /// The random seed governing the packet losses
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of sequence numbers to send
    #[arg(long, default_value_t = 10_000)]
    pub probes: u64,

    /// Number of sequence numbers a ground truth value holds for
    #[arg(long, default_value_t = defaults::DEFAULT_TRUTH_BUCKET)]
    pub truth_bucket: u64,

    /// Time between two sequence numbers, in milliseconds
    #[arg(long, default_value_t = 2.0)]
    pub interval_ms: f64,

    /// Processing latency added to every probe, in milliseconds
    #[arg(long, default_value_t = 0.0)]
    pub processing_delay_ms: f64,

    /// Source port of a calibration path that only sees the processing
    /// latency
    #[arg(long)]
    pub baseline: Option<PathId>,
}

#[derive(Parser, Debug, Clone)]
pub struct HopErrorOpt {
    /// Path to the monitored paths file
    #[arg(long)]
    pub paths: PathBuf,

    /// Path to the raw probe log
    #[arg(long)]
    pub log: PathBuf,

    #[command(flatten)]
    pub baseline: BaselineOpt,

    /// Delay every emulated link is configured with, in milliseconds
    #[arg(long, default_value_t = defaults::DEFAULT_EXPECTED_LINK_DELAY)]
    pub expected_delay_ms: f64,
}

/// Settings of one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub baseline: BaselinePolicy,
    pub loss_window: u64,
    pub warmup: u64,
    pub smoothing: usize,
    pub comparison: ComparisonConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            baseline: BaselinePolicy::default(),
            loss_window: defaults::DEFAULT_LOSS_WINDOW,
            warmup: defaults::DEFAULT_DELAY_WARMUP,
            smoothing: defaults::DEFAULT_DELAY_SMOOTHING,
            comparison: ComparisonConfig::default(),
        }
    }
}

impl From<&BaselineOpt> for BaselinePolicy {
    fn from(opt: &BaselineOpt) -> Self {
        match (opt.baseline, opt.no_baseline) {
            (Some(path), _) => Self::Reserved(path),
            (None, true) => Self::None,
            (None, false) => Self::AnyUnmonitored,
        }
    }
}

impl From<&AnalyzeOpt> for AnalysisConfig {
    fn from(opt: &AnalyzeOpt) -> Self {
        Self {
            baseline: BaselinePolicy::from(&opt.baseline),
            loss_window: opt.loss_window,
            warmup: opt.warmup,
            smoothing: opt.smoothing,
            comparison: ComparisonConfig::new(
                opt.truth_bucket as usize,
                opt.delay_stride,
                opt.delay_lead,
                opt.loss_window as usize,
                opt.loss_lead,
            ),
        }
    }
}

impl From<&SimulateOpt> for SimulationConfig {
    fn from(opt: &SimulateOpt) -> Self {
        Self {
            probes: opt.probes,
            probes_per_bucket: opt.truth_bucket,
            interval: opt.interval_ms / 1_000.0,
            processing_delay: opt.processing_delay_ms,
            baseline: opt.baseline,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_defaults() {
        let opt = CliOpt::try_parse_from([
            "nettomo", "analyze", "--paths", "p.txt", "--log", "r.log", "--truth", "t.json",
        ])
        .unwrap();
        let Command::Analyze(opt) = opt.command else {
            panic!("expected analyze");
        };

        assert_eq!(AnalysisConfig::from(&opt), AnalysisConfig::default());
    }

    #[test]
    fn baseline_options() {
        let opt = CliOpt::try_parse_from([
            "nettomo", "hop-error", "--paths", "p.txt", "--log", "r.log", "--baseline", "10000",
        ])
        .unwrap();
        let Command::HopError(opt) = opt.command else {
            panic!("expected hop-error");
        };
        assert_eq!(
            BaselinePolicy::from(&opt.baseline),
            BaselinePolicy::Reserved(PathId::new(10_000))
        );

        assert!(
            CliOpt::try_parse_from([
                "nettomo",
                "hop-error",
                "--paths",
                "p.txt",
                "--log",
                "r.log",
                "--baseline",
                "1",
                "--no-baseline",
            ])
            .is_err()
        );
    }

    #[test]
    fn calibration_on_unless_disabled() {
        let baseline = |extra: &[&str]| {
            let mut args = vec!["nettomo", "hop-error", "--paths", "p.txt", "--log", "r.log"];
            args.extend_from_slice(extra);
            let Command::HopError(opt) = CliOpt::try_parse_from(args).unwrap().command else {
                panic!("expected hop-error");
            };
            BaselinePolicy::from(&opt.baseline)
        };

        assert_eq!(baseline(&[]), BaselinePolicy::AnyUnmonitored);
        assert_eq!(baseline(&["--no-baseline"]), BaselinePolicy::None);
    }

    #[test]
    fn loss_percent_bounds() {
        let parse = |max_loss: &str| {
            CliOpt::try_parse_from([
                "nettomo",
                "generate-truth",
                "--paths",
                "p.txt",
                "--output",
                "t.json",
                "--max-loss",
                max_loss,
            ])
        };

        assert!(parse("100").is_ok());
        assert!(parse("101").is_err());
        assert!(parse("18446744073709551615").is_err());
    }
}
