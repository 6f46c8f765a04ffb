use super::{EstimateError, smooth};
use crate::{
    aggregate::PathObservations,
    probe::SequenceNumber,
    solver::{Solver, VectorLengthMismatch},
};
use tracing::warn;

/// Per-link delay estimation.
///
/// For every sequence number the last known delay of each path is
/// mapped onto the links through the inverse incidence matrix. The
/// resulting per-link series is then smoothed with a moving average.
#[derive(Debug, Clone, Copy)]
pub struct DelayEstimator {
    warmup: SequenceNumber,
    smoothing: usize,
}

/// Per-link delay series (in milliseconds).
///
/// Entry `k` of a link's raw series is the delay at sequence number
/// `start + k`. Entry `k` of the smoothed series is the mean of raw
/// entries `k..k + smoothing`.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayEstimate {
    start: SequenceNumber,
    smoothing: usize,
    raw: Vec<Vec<f64>>,
    smoothed: Vec<Vec<f64>>,
}

impl DelayEstimator {
    /// `warmup`: sequence numbers below this one are not estimated.
    /// `smoothing`: width of the moving average.
    pub fn new(warmup: SequenceNumber, smoothing: usize) -> Result<Self, EstimateError> {
        if smoothing == 0 {
            return Err(EstimateError::ZeroWindow { what: "delay" });
        }
        Ok(Self { warmup, smoothing })
    }

    pub fn estimate(
        &self,
        observations: &PathObservations,
        solver: &Solver,
    ) -> Result<DelayEstimate, EstimateError> {
        let dimension = solver.dimension();
        if observations.path_count() != dimension {
            return Err(VectorLengthMismatch {
                expected: dimension,
                got: observations.path_count(),
            }
            .into());
        }

        let mut raw = vec![Vec::new(); dimension];

        // the hold-last-value is only defined once every path has
        // delivered its first probe
        let first_complete = observations
            .series()
            .iter()
            .map(|series| series.first_sequence())
            .try_fold(self.warmup, |start, first| first.map(|first| start.max(first)));

        let Some(start) = first_complete else {
            warn!("a monitored path has no delay sample, no delay estimated");
            return Ok(DelayEstimate {
                start: self.warmup,
                smoothing: self.smoothing,
                smoothed: raw.clone(),
                raw,
            });
        };

        let mut path_delays: Vec<f64> = observations
            .series()
            .iter()
            .map(|series| series.delay_at(start).unwrap_or_default())
            .collect();

        for sequence in start..=observations.max_sequence() {
            for (delay, series) in path_delays.iter_mut().zip(observations.series()) {
                if let Some(sample) = series.sample(sequence) {
                    *delay = sample;
                }
            }

            let link_delays = solver.apply(&path_delays)?;
            for (series, delay) in raw.iter_mut().zip(link_delays) {
                series.push(delay);
            }
        }

        let smoothed = raw
            .iter()
            .map(|series| smooth(series, self.smoothing))
            .collect();

        Ok(DelayEstimate {
            start,
            smoothing: self.smoothing,
            raw,
            smoothed,
        })
    }
}

impl DelayEstimate {
    /// sequence number of the first raw sample.
    pub fn start(&self) -> SequenceNumber {
        self.start
    }

    pub fn smoothing(&self) -> usize {
        self.smoothing
    }

    pub fn raw(&self, link: usize) -> Option<&[f64]> {
        self.raw.get(link).map(Vec::as_slice)
    }

    pub fn smoothed(&self, link: usize) -> Option<&[f64]> {
        self.smoothed.get(link).map(Vec::as_slice)
    }

    pub fn smoothed_links(&self) -> &[Vec<f64>] {
        &self.smoothed
    }
}
