use anyhow::Context as _;
use clap::Parser as _;
use nettomo::{
    config::{AnalysisConfig, CliOpt, Command},
    pipeline, report,
};
use nettomo_core::{aggregate::BaselinePolicy, simulate::SimulationConfig, truth::TruthGenerator};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let opt = CliOpt::parse();
    match opt.command {
        Command::Analyze(opt) => {
            let output = opt
                .output
                .clone()
                .unwrap_or_else(|| report::default_output(&opt.log));
            let config = AnalysisConfig::from(&opt);

            pipeline::analyze_files(&opt.paths, &opt.log, &opt.truth, &output, &config)
                .context("analysis failed")?;
        }
        Command::GenerateTruth(opt) => {
            let generator = TruthGenerator::default().with_loss_percent(opt.min_loss, opt.max_loss);
            pipeline::generate_truth_file(&opt.paths, &opt.output, &generator, opt.seed)?;
        }
        Command::Simulate(opt) => {
            let config = SimulationConfig::from(&opt);
            pipeline::simulate_file(&opt.paths, &opt.truth, &opt.output, config, opt.seed)?;
        }
        Command::HopError(opt) => {
            let report = pipeline::hop_error_files(
                &opt.paths,
                &opt.log,
                BaselinePolicy::from(&opt.baseline),
                opt.expected_delay_ms,
            )?;

            for link in report.links() {
                info!(link = %link.link, hops = link.hops, error = link.error, "hop error");
            }
            for (hops, error) in report.by_hops() {
                println!("{hops} {error:.4}");
            }
        }
    }

    Ok(())
}
