//! The stages of a run, from the input files to the reports.
//!
//! The topology, its incidence matrix and the inverse are built first:
//! a topology that cannot be inverted stops the run before the probe
//! log is even read.

use crate::{config::AnalysisConfig, report::Report, truth_json};
use anyhow::{Context as _, ensure};
use nettomo_core::{
    IncidenceMatrix, Solver, Topology,
    aggregate::{Aggregator, BaselinePolicy, PathObservations},
    compare::{Comparator, LinkComparison},
    estimate::{DelayEstimate, DelayEstimator, LossEstimate, LossEstimator},
    hop::HopReport,
    probe::{self, ProbeRecord},
    simulate::{ProbeSimulator, SimulationConfig},
    truth::{GroundTruth, TruthGenerator},
};
use rand_chacha::ChaChaRng;
use rand_core::SeedableRng as _;
use std::{fs, io::BufReader, path::Path};
use tracing::info;

/// A topology with its inverted incidence matrix.
pub struct Model {
    pub topology: Topology,
    pub solver: Solver,
}

pub struct Analysis {
    pub observations: PathObservations,
    pub delay: DelayEstimate,
    pub loss: LossEstimate,
    pub comparisons: Vec<LinkComparison>,
}

impl Model {
    pub fn new(topology: Topology) -> anyhow::Result<Self> {
        let incidence =
            IncidenceMatrix::build(&topology).context("the monitored paths cannot be solved")?;
        let solver = Solver::new(&incidence).context("the monitored paths cannot be solved")?;
        info!(
            paths = topology.path_count(),
            links = topology.link_count(),
            "incidence matrix inverted"
        );

        Ok(Self { topology, solver })
    }

    pub fn parse(paths: &str) -> anyhow::Result<Self> {
        let topology = Topology::parse(paths).context("invalid monitored paths")?;
        Self::new(topology)
    }

    pub fn aggregate(
        &self,
        records: &[ProbeRecord],
        baseline: BaselinePolicy,
    ) -> anyhow::Result<PathObservations> {
        let observations = Aggregator::new(&self.topology, baseline).aggregate(records)?;
        info!(
            records = records.len(),
            max_sequence = observations.max_sequence(),
            baseline_offset = observations.baseline_offset(),
            "probe log aggregated"
        );
        Ok(observations)
    }

    /// run the estimators and compare them with the ground truth.
    pub fn analyze(
        &self,
        records: &[ProbeRecord],
        truth: &GroundTruth,
        config: &AnalysisConfig,
    ) -> anyhow::Result<Analysis> {
        let observations = self.aggregate(records, config.baseline)?;

        let loss = LossEstimator::new(config.loss_window)?.estimate(&observations, &self.solver)?;
        info!(
            windows = loss.len(),
            skipped = loss.skipped().len(),
            "loss estimated"
        );

        let delay = DelayEstimator::new(config.warmup, config.smoothing)?
            .estimate(&observations, &self.solver)?;
        info!(start = delay.start(), "delay estimated");

        let comparisons =
            Comparator::new(&self.topology, truth, config.comparison).compare(&delay, &loss)?;

        Ok(Analysis {
            observations,
            delay,
            loss,
            comparisons,
        })
    }
}

fn read(path: &Path, what: &str) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {what} {}", path.display()))
}

fn read_log(path: &Path) -> anyhow::Result<Vec<ProbeRecord>> {
    let file = fs::File::open(path)
        .with_context(|| format!("failed to open probe log {}", path.display()))?;
    let records = probe::read_log(BufReader::new(file))
        .with_context(|| format!("invalid probe log {}", path.display()))?;
    ensure!(!records.is_empty(), "probe log {} is empty", path.display());
    Ok(records)
}

fn read_truth(path: &Path) -> anyhow::Result<GroundTruth> {
    truth_json::parse_truth(&read(path, "ground truth")?)
        .with_context(|| format!("invalid ground truth {}", path.display()))
}

/// read the inputs, analyze them and write the reports in `output`.
pub fn analyze_files(
    paths: &Path,
    log: &Path,
    truth: &Path,
    output: &Path,
    config: &AnalysisConfig,
) -> anyhow::Result<Report> {
    let model = Model::parse(&read(paths, "monitored paths")?)?;
    let truth = read_truth(truth)?;
    let records = read_log(log)?;

    let analysis = model.analyze(&records, &truth, config)?;
    let report = Report::new(&analysis.comparisons);
    report.write_to(output)?;

    Ok(report)
}

pub fn generate_truth_file(
    paths: &Path,
    output: &Path,
    generator: &TruthGenerator,
    seed: u64,
) -> anyhow::Result<GroundTruth> {
    let topology = Topology::parse(&read(paths, "monitored paths")?)
        .context("invalid monitored paths")?;
    let truth = generator.generate(topology.links(), &mut ChaChaRng::seed_from_u64(seed));

    fs::write(output, truth_json::to_json(&truth)?)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(links = truth.len(), buckets = generator.buckets(), "ground truth generated");

    Ok(truth)
}

pub fn simulate_file(
    paths: &Path,
    truth: &Path,
    output: &Path,
    config: SimulationConfig,
    seed: u64,
) -> anyhow::Result<usize> {
    let topology = Topology::parse(&read(paths, "monitored paths")?)
        .context("invalid monitored paths")?;
    let truth = read_truth(truth)?;

    let records = ProbeSimulator::new(&topology, &truth, config)?
        .simulate(&mut ChaChaRng::seed_from_u64(seed));

    let log: String = records.iter().map(|record| format!("{record}\n")).collect();
    fs::write(output, log).with_context(|| format!("failed to write {}", output.display()))?;
    info!(records = records.len(), "probe log simulated");

    Ok(records.len())
}

pub fn hop_error_files(
    paths: &Path,
    log: &Path,
    baseline: BaselinePolicy,
    expected: f64,
) -> anyhow::Result<HopReport> {
    let topology = Topology::parse(&read(paths, "monitored paths")?)
        .context("invalid monitored paths")?;
    let records = read_log(log)?;
    let observations = Aggregator::new(&topology, baseline).aggregate(&records)?;

    Ok(HopReport::analyze(&topology, &observations, expected))
}
