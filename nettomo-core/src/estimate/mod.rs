//! Windowed per-link estimators.
//!
//! Both estimators only read the [`PathObservations`] and the
//! [`Solver`]: running them twice over the same observations gives the
//! same series.
//!
//! [`PathObservations`]: crate::aggregate::PathObservations
//! [`Solver`]: crate::solver::Solver

mod delay;
mod loss;
mod moving_average;

pub use self::{
    delay::{DelayEstimate, DelayEstimator},
    loss::{LossEstimate, LossEstimator, LossWindowError},
    moving_average::{MovingAverage, smooth},
};
use crate::solver::VectorLengthMismatch;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EstimateError {
    #[error("the {what} window must hold at least one probe")]
    ZeroWindow { what: &'static str },
    #[error("observations do not match the incidence matrix: {0}")]
    Dimension(#[from] VectorLengthMismatch),
}
