//! Network tomography from end to end probes.
//!
//! Probes are sent along a set of monitored paths and logged by the
//! receiver with their send and receive times. From those path level
//! observations and the incidence matrix of the paths over the links,
//! this crate recovers a time series of delay and loss for every link:
//!
//! 1. a [`Topology`] is read from the monitored paths;
//! 2. the [`IncidenceMatrix`] is built and inverted by the [`Solver`];
//! 3. the probe log is parsed ([`probe`]) and aggregated into per path
//!    series ([`aggregate`]);
//! 4. the estimators ([`estimate`]) solve every window of observations
//!    into per link values;
//! 5. the results are compared with a ground truth ([`compare`]).
//!
//! [`truth`] and [`simulate`] produce ground truths and synthetic probe
//! logs to validate the chain.

pub mod aggregate;
pub mod compare;
pub mod defaults;
pub mod estimate;
pub mod hop;
pub mod incidence;
pub mod link;
pub mod node;
pub mod path;
pub mod probe;
mod random;
mod registry;
pub mod simulate;
pub mod solver;
pub mod topology;
pub mod truth;

pub use self::{
    incidence::IncidenceMatrix, registry::Registry, solver::Solver, topology::Topology,
};
