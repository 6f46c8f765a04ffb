//! Synthetic probe logs.
//!
//! Plays a [`GroundTruth`] over a [`Topology`] and produces the probe
//! records a receiver would have logged: every sequence number, every
//! monitored path sends one probe that crosses the path's links one
//! after the other. Each crossing adds the link's delay of the current
//! bucket and may drop the probe with the link's loss of that bucket.

use crate::{
    link::LinkId,
    path::PathId,
    probe::{ProbeRecord, SequenceNumber},
    random,
    topology::Topology,
    truth::GroundTruth,
};
use rand_core::Rng;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// number of sequence numbers to send
    pub probes: u64,
    /// how many sequence numbers a ground truth bucket lasts
    pub probes_per_bucket: u64,
    /// time between two sequence numbers, in seconds
    pub interval: f64,
    /// send time of sequence number `0`, in seconds
    pub start_time: f64,
    /// processing latency added to every probe, in milliseconds
    pub processing_delay: f64,
    /// a calibration path that only sees the processing latency
    pub baseline: Option<PathId>,
    pub source_host: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            probes: 10_000,
            probes_per_bucket: crate::defaults::DEFAULT_TRUTH_BUCKET,
            interval: 0.002,
            start_time: 0.0,
            processing_delay: 0.0,
            baseline: None,
            source_host: "10.0.0.1".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("no ground truth for link {0}")]
    MissingTruth(LinkId),
    #[error("the ground truth of link {0} has no bucket")]
    NoBucket(LinkId),
    #[error("a bucket must last at least one probe")]
    ZeroBucket,
}

pub struct ProbeSimulator<'a> {
    topology: &'a Topology,
    truth: &'a GroundTruth,
    config: SimulationConfig,
}

impl<'a> ProbeSimulator<'a> {
    pub fn new(
        topology: &'a Topology,
        truth: &'a GroundTruth,
        config: SimulationConfig,
    ) -> Result<Self, SimulationError> {
        if config.probes_per_bucket == 0 {
            return Err(SimulationError::ZeroBucket);
        }

        for link in topology.links() {
            let truth = truth
                .get(*link)
                .ok_or(SimulationError::MissingTruth(*link))?;
            if truth.delay_list.is_empty() || truth.loss_list.is_empty() {
                return Err(SimulationError::NoBucket(*link));
            }
        }

        Ok(Self {
            topology,
            truth,
            config,
        })
    }

    /// generate the probe records, in sending order.
    pub fn simulate<R: Rng>(&self, rng: &mut R) -> Vec<ProbeRecord> {
        let mut records = Vec::new();

        for sequence in 0..self.config.probes {
            let send_time = self.config.start_time + sequence as f64 * self.config.interval;
            let bucket = usize::try_from(sequence / self.config.probes_per_bucket)
                .unwrap_or(usize::MAX);

            if let Some(baseline) = self.config.baseline {
                records.push(self.record(baseline, sequence, send_time, 0.0));
            }

            for (id, path) in self.topology.paths() {
                let mut delay = 0.0;
                let mut delivered = true;
                for link in path.links() {
                    // every link was checked at construction
                    let Some(truth) = self.truth.get(link) else {
                        continue;
                    };
                    delay += bucket_value(&truth.delay_list, bucket);
                    let loss = bucket_value(&truth.loss_list, bucket) / 100.0;
                    delivered &= random::unit(rng) >= loss;
                }

                if delivered {
                    records.push(self.record(id, sequence, send_time, delay));
                }
            }
        }

        records
    }

    fn record(
        &self,
        path: PathId,
        sequence: SequenceNumber,
        send_time: f64,
        network_delay: f64,
    ) -> ProbeRecord {
        let delay = network_delay + self.config.processing_delay;
        ProbeRecord {
            source_host: self.config.source_host.clone(),
            path,
            sequence,
            send_time,
            receive_time: send_time + delay / 1_000.0,
        }
    }
}

/// value of the bucket, the last bucket holds after the schedule ends.
fn bucket_value(values: &[f64], bucket: usize) -> f64 {
    values
        .get(bucket)
        .or_else(|| values.last())
        .copied()
        .unwrap_or_default()
}
