use super::EstimateError;
use crate::{
    aggregate::PathObservations,
    probe::SequenceNumber,
    solver::{Solver, VectorLengthMismatch},
};
use thiserror::Error;
use tracing::warn;

/// Windowed per-link loss estimation.
///
/// Loss composes multiplicatively along a path: the probability a
/// probe survives the path is the product of the survival
/// probabilities of its links. In log space the product becomes the
/// sum the incidence matrix describes, so for every window the
/// estimator:
///
/// 1. computes, per path, `ln(received / window)` over the window;
/// 2. applies the inverse incidence matrix;
/// 3. turns each link's log survival back into a loss percentage,
///    `(1 - e^x) * 100`.
#[derive(Debug, Clone, Copy)]
pub struct LossEstimator {
    window: u64,
}

/// A window where a path received nothing: the log survival is
/// undefined and the whole window is left out of every link's series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error(
    "window ending at sequence {window_end}: path #{path} received {received} of {window} probes, loss is undefined"
)]
pub struct LossWindowError {
    pub window_end: SequenceNumber,
    /// index of the path in the topology
    pub path: usize,
    pub received: u64,
    pub window: u64,
}

/// Per-link loss series, one entry per window.
///
/// Entry `k` of a link's series is the window ending at sequence
/// number `window + k`. Skipped windows are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct LossEstimate {
    window: u64,
    links: Vec<Vec<Option<f64>>>,
    skipped: Vec<LossWindowError>,
}

impl LossEstimator {
    pub fn new(window: u64) -> Result<Self, EstimateError> {
        if window == 0 {
            return Err(EstimateError::ZeroWindow { what: "loss" });
        }
        Ok(Self { window })
    }

    pub fn window(&self) -> u64 {
        self.window
    }

    pub fn estimate(
        &self,
        observations: &PathObservations,
        solver: &Solver,
    ) -> Result<LossEstimate, EstimateError> {
        let dimension = solver.dimension();
        if observations.path_count() != dimension {
            return Err(VectorLengthMismatch {
                expected: dimension,
                got: observations.path_count(),
            }
            .into());
        }

        let mut links = vec![Vec::new(); dimension];
        let mut skipped = Vec::new();
        let mut path_log_survival = vec![0.0; observations.path_count()];

        let max_sequence = observations.max_sequence();
        let window = self.window;
        let windows = (window..=max_sequence).map(|end| (end - window, end));

        for (start, end) in windows {
            match self.log_survival(observations, start, end, &mut path_log_survival) {
                Ok(()) => {
                    let link_log_survival = solver.apply(&path_log_survival)?;
                    for (series, log_survival) in links.iter_mut().zip(link_log_survival) {
                        series.push(Some((1.0 - log_survival.exp()) * 100.0));
                    }
                }
                Err(error) => {
                    warn!(%error, "loss window skipped");
                    for series in links.iter_mut() {
                        series.push(None);
                    }
                    skipped.push(error);
                }
            }
        }

        Ok(LossEstimate {
            window,
            links,
            skipped,
        })
    }

    fn log_survival(
        &self,
        observations: &PathObservations,
        start: SequenceNumber,
        end: SequenceNumber,
        output: &mut [f64],
    ) -> Result<(), LossWindowError> {
        for (path, (series, value)) in observations.series().iter().zip(output).enumerate() {
            let received = series
                .received_until(end)
                .saturating_sub(series.received_until(start));
            if received == 0 {
                return Err(LossWindowError {
                    window_end: end,
                    path,
                    received,
                    window: self.window,
                });
            }

            *value = (received as f64 / self.window as f64).ln();
        }
        Ok(())
    }
}

impl LossEstimate {
    pub fn window(&self) -> u64 {
        self.window
    }

    /// sequence number at which the first window ends.
    pub fn first_window_end(&self) -> SequenceNumber {
        self.window
    }

    /// number of windows (including skipped ones).
    pub fn len(&self) -> usize {
        self.links.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// loss percentage series of the link with index `link`.
    pub fn link(&self, link: usize) -> Option<&[Option<f64>]> {
        self.links.get(link).map(Vec::as_slice)
    }

    pub fn links(&self) -> &[Vec<Option<f64>>] {
        &self.links
    }

    pub fn skipped(&self) -> &[LossWindowError] {
        &self.skipped
    }
}
