//! Per hop delay error.
//!
//! When a monitored path `q` extends another monitored path `p` by one
//! hop, the difference of their mean delays is the round trip delay of
//! the extra link. Halved, it is compared with the delay every link of
//! the emulated network is configured with. Averaging those errors per
//! path length shows how the measurement error grows with the number
//! of hops.

use crate::{aggregate::PathObservations, link::LinkId, topology::Topology};
use std::collections::BTreeMap;
use tracing::debug;

/// error measured on the last link of a monitored path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkHopError {
    pub link: LinkId,
    /// number of nodes of the longer path
    pub hops: usize,
    /// `rtt / 2 - expected`, in milliseconds
    pub error: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HopReport {
    links: Vec<LinkHopError>,
    by_hops: BTreeMap<usize, f64>,
}

impl HopReport {
    /// compute the errors for every pair of monitored paths where one
    /// is the other extended by one hop.
    ///
    /// Paths without any received probe are left out.
    pub fn analyze(topology: &Topology, observations: &PathObservations, expected: f64) -> Self {
        let mean = |index: usize| {
            observations
                .path(index)
                .and_then(|series| series.mean_delay())
        };

        let mut links = Vec::new();
        for (index, path) in topology.paths().map(|(_, path)| path).enumerate() {
            if path.len() < 3 {
                continue;
            }
            let Some(parent) = topology.find_path(path.prefix()) else {
                continue;
            };
            let (Some(long), Some(short)) = (mean(index), mean(parent)) else {
                debug!(hops = path.len(), "no delay sample, skipping");
                continue;
            };

            links.push(LinkHopError {
                link: path.last_link(),
                hops: path.len(),
                error: (long - short) / 2.0 - expected,
            });
        }

        let mut sums: BTreeMap<usize, (f64, usize)> = BTreeMap::new();
        for error in &links {
            let entry = sums.entry(error.hops).or_default();
            entry.0 += error.error;
            entry.1 += 1;
        }
        let by_hops = sums
            .into_iter()
            .map(|(hops, (sum, count))| (hops, sum / count as f64))
            .collect();

        Self { links, by_hops }
    }

    pub fn links(&self) -> &[LinkHopError] {
        &self.links
    }

    /// mean error for each path length, by increasing length.
    pub fn by_hops(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.by_hops.iter().map(|(hops, error)| (*hops, *error))
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
