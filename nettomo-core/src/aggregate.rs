//! Rebuild per path series from the raw probe records.
//!
//! The log is read to exhaustion before anything is estimated. The
//! aggregation makes two passes over the records: the first one finds
//! the calibration offset and the last sequence number, the second one
//! files every delay sample under its path and sequence number.

use crate::{
    path::PathId,
    probe::{ProbeRecord, SequenceNumber},
    topology::Topology,
};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

/// How the calibration (baseline) records are recognised in the log.
///
/// The calibration path has no network delay of its own: whatever
/// delay its probes show is processing latency common to every path,
/// and it is subtracted from every other delay sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaselinePolicy {
    /// no calibration, the offset is `0`.
    None,
    /// records with this path identifier are calibration records.
    /// Records from other unmonitored identifiers are ignored.
    Reserved(PathId),
    /// every record from an identifier that is not a monitored path
    /// is a calibration record. This is how the controller sets up its
    /// calibration path.
    #[default]
    AnyUnmonitored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("the probe log has no record")]
    Empty,
}

/// Observations of a single monitored path.
///
/// Delays are sparse: a sample only exists for the sequence numbers
/// whose probe made it back. The received counter is dense, defined
/// for every sequence number from `0` to the last one of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSeries {
    delays: BTreeMap<SequenceNumber, f64>,
    cumulative: Vec<u64>,
}

impl PathSeries {
    /// build the series of a path from its `(sequence, delay in ms)`
    /// samples, for a session whose last sequence number is
    /// `max_sequence`.
    ///
    /// When a sequence number appears more than once, the first sample
    /// is kept and the probe is counted once. Samples beyond
    /// `max_sequence` are ignored.
    pub fn new<I>(max_sequence: SequenceNumber, samples: I) -> Self
    where
        I: IntoIterator<Item = (SequenceNumber, f64)>,
    {
        let mut delays = BTreeMap::new();
        for (sequence, delay) in samples {
            if sequence <= max_sequence {
                delays.entry(sequence).or_insert(delay);
            }
        }

        let mut cumulative = Vec::new();
        let mut received = 0;
        for sequence in 0..=max_sequence {
            if delays.contains_key(&sequence) {
                received += 1;
            }
            cumulative.push(received);
        }

        Self { delays, cumulative }
    }

    /// delay observed for exactly this sequence number.
    pub fn sample(&self, sequence: SequenceNumber) -> Option<f64> {
        self.delays.get(&sequence).copied()
    }

    /// last known delay at `sequence`: the sample of the nearest
    /// sequence number lower or equal to `sequence`.
    ///
    /// Returns `None` if no probe of the path arrived at or before
    /// `sequence`.
    ///
    /// ```
    /// # use nettomo_core::aggregate::PathSeries;
    /// let series = PathSeries::new(10, [(0, 3.0), (5, 4.0), (10, 5.0)]);
    /// assert_eq!(series.delay_at(7), Some(4.0));
    /// ```
    pub fn delay_at(&self, sequence: SequenceNumber) -> Option<f64> {
        self.delays
            .range(..=sequence)
            .next_back()
            .map(|(_, delay)| *delay)
    }

    /// number of probes received with a sequence number up to and
    /// including `sequence`.
    pub fn received_until(&self, sequence: SequenceNumber) -> u64 {
        let index = usize::try_from(sequence).unwrap_or(usize::MAX);
        self.cumulative
            .get(index)
            .or_else(|| self.cumulative.last())
            .copied()
            .unwrap_or_default()
    }

    /// total number of probes received on the path.
    pub fn received(&self) -> u64 {
        self.delays.len() as u64
    }

    pub fn first_sequence(&self) -> Option<SequenceNumber> {
        self.delays.keys().next().copied()
    }

    /// average of the observed delays.
    pub fn mean_delay(&self) -> Option<f64> {
        if self.delays.is_empty() {
            return None;
        }
        Some(self.delays.values().sum::<f64>() / self.delays.len() as f64)
    }

    pub fn samples(&self) -> impl Iterator<Item = (SequenceNumber, f64)> + '_ {
        self.delays.iter().map(|(sequence, delay)| (*sequence, *delay))
    }
}

/// Every monitored path's series, ordered by path index.
#[derive(Debug, Clone, PartialEq)]
pub struct PathObservations {
    series: Vec<PathSeries>,
    max_sequence: SequenceNumber,
    baseline_offset: f64,
    ignored: usize,
}

impl PathObservations {
    /// assemble observations from already built series, one per path
    /// index.
    pub fn from_series(series: Vec<PathSeries>, max_sequence: SequenceNumber) -> Self {
        Self {
            series,
            max_sequence,
            baseline_offset: 0.0,
            ignored: 0,
        }
    }

    pub fn path(&self, index: usize) -> Option<&PathSeries> {
        self.series.get(index)
    }

    pub fn series(&self) -> &[PathSeries] {
        &self.series
    }

    pub fn path_count(&self) -> usize {
        self.series.len()
    }

    /// the highest sequence number seen across every path.
    pub fn max_sequence(&self) -> SequenceNumber {
        self.max_sequence
    }

    /// calibration delay (ms) subtracted from every sample.
    pub fn baseline_offset(&self) -> f64 {
        self.baseline_offset
    }

    /// records that neither belonged to a monitored path nor were
    /// used for calibration.
    pub fn ignored(&self) -> usize {
        self.ignored
    }
}

/// Files the probe records of a log under the monitored paths of a
/// [`Topology`].
#[derive(Debug, Clone, Copy)]
pub struct Aggregator<'a> {
    topology: &'a Topology,
    policy: BaselinePolicy,
}

impl<'a> Aggregator<'a> {
    pub fn new(topology: &'a Topology, policy: BaselinePolicy) -> Self {
        Self { topology, policy }
    }

    fn is_baseline(&self, record: &ProbeRecord) -> bool {
        match self.policy {
            BaselinePolicy::None => false,
            BaselinePolicy::Reserved(id) => record.path == id,
            BaselinePolicy::AnyUnmonitored => self.topology.path_index(record.path).is_none(),
        }
    }

    pub fn aggregate(&self, records: &[ProbeRecord]) -> Result<PathObservations, AggregateError> {
        // first pass: calibration and session length
        let max_sequence = records
            .iter()
            .map(|record| record.sequence)
            .max()
            .ok_or(AggregateError::Empty)?;

        let mut calibration = records.iter().filter(|record| self.is_baseline(record));
        let baseline_offset = calibration.next().map_or(0.0, ProbeRecord::delay_ms);
        let extra = calibration.count();
        if extra > 0 {
            debug!(
                extra,
                "only the first calibration record is used for the baseline offset"
            );
        }

        // second pass: per path samples
        let mut samples = vec![Vec::new(); self.topology.path_count()];
        let mut ignored = 0;
        for record in records {
            match self.topology.path_index(record.path) {
                Some(index) => {
                    samples[index].push((record.sequence, record.delay_ms() - baseline_offset))
                }
                None if self.is_baseline(record) => {}
                None => ignored += 1,
            }
        }

        if ignored > 0 {
            warn!(ignored, "records from unmonitored paths were ignored");
        }

        let series: Vec<_> = samples
            .into_iter()
            .map(|samples| PathSeries::new(max_sequence, samples))
            .collect();

        for (id, series) in self.topology.path_ids().iter().zip(series.iter()) {
            debug!(path = %id, received = series.received(), "path aggregated");
        }

        Ok(PathObservations {
            series,
            max_sequence,
            baseline_offset,
            ignored,
        })
    }
}
